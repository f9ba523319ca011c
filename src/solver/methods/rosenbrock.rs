//! Adaptive Rosenbrock solver (ode23s)
//!
//! # Mathematical Background
//!
//! A linearly-implicit second-order method with an embedded third-order
//! error estimate (Shampine & Reichelt). Each step solves three linear
//! systems with the same iteration matrix `W = I - h·d·J`:
//!
//! ```text
//! d   = 1 / (2 + √2),  e32 = 6 + √2
//!
//! k₁ = W⁻¹ f(yₙ)
//! k₂ = W⁻¹ (f(yₙ + h/2·k₁) - k₁) + k₁
//! yₙ₊₁ = yₙ + h·k₂
//! k₃ = W⁻¹ (f(yₙ₊₁) - e32·(k₂ - f(yₙ + h/2·k₁)) - 2·(k₁ - f(yₙ)))
//!
//! err = h/6 · (k₁ - 2k₂ + k₃)
//! ```
//!
//! The Jacobian `J` is built by forward differences once per step and reused
//! for rejected attempts. Steps are clipped so that every output time is hit
//! exactly; the state reported there is the integrated state, not an
//! interpolant.
//!
//! # When to use
//!
//! Droplet growth: the relaxation time of haze droplets is many orders of
//! magnitude shorter than the parcel time scale, which makes any explicit
//! method impractical.

use nalgebra::{DMatrix, DVector};

use crate::error::{MicrophysicsError, Result};
use crate::physics::{PhysicalModel, StateLayout};
use crate::solver::{Scenario, SimulationResult, Solver, SolverConfiguration, SolverType, validate_state};

const D: f64 = 1.0 / (2.0 + std::f64::consts::SQRT_2);
const E32: f64 = 6.0 + std::f64::consts::SQRT_2;

/// Step-size growth bounds per accepted step
const MAX_GROWTH: f64 = 5.0;
const MIN_SHRINK: f64 = 0.2;
const SAFETY: f64 = 0.9;

// =================================================================================================
// Rosenbrock Solver
// =================================================================================================

/// Adaptive linearly-implicit solver for stiff systems
///
/// Requires an [`SolverType::Adaptive`] configuration. The result has one
/// state per entry of the time grid.
///
/// # Example
///
/// ```rust
/// # use dropgrow_rs::solver::{Rosenbrock23Solver, Solver, SolverConfiguration, Scenario};
/// # use dropgrow_rs::physics::{PhysicalModel, PhysicalState, PhysicalQuantity, PhysicalData};
/// # struct Relax;
/// # impl PhysicalModel for Relax {
/// #     fn points(&self) -> usize { 1 }
/// #     fn compute_physics(&self, state: &PhysicalState) -> PhysicalState {
/// #         let r = state.scalar(PhysicalQuantity::Radius).unwrap();
/// #         PhysicalState::new(PhysicalQuantity::Radius, PhysicalData::Scalar(-1.0e4 * (r - 1.0e-7)))
/// #     }
/// #     fn setup_initial_state(&self) -> PhysicalState {
/// #         PhysicalState::new(PhysicalQuantity::Radius, PhysicalData::Scalar(2.0e-7))
/// #     }
/// #     fn name(&self) -> &str { "Relax" }
/// # }
/// let scenario = Scenario::from_model(Box::new(Relax));
/// let config = SolverConfiguration::adaptive(vec![0.0, 1.0, 2.0], 1e-6, 1e-15, 10_000);
///
/// let result = Rosenbrock23Solver::new().solve(&scenario, &config)?;
/// let r = result.final_state.scalar(PhysicalQuantity::Radius).unwrap();
/// assert!((r - 1.0e-7).abs() < 1e-12);
/// # Ok::<(), dropgrow_rs::error::MicrophysicsError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Rosenbrock23Solver;

impl Rosenbrock23Solver {
    pub fn new() -> Self {
        Self
    }
}

/// Right-hand side on flat vectors
struct FlatSystem<'a> {
    model: &'a dyn PhysicalModel,
    layout: StateLayout,
    evaluations: usize,
}

impl FlatSystem<'_> {
    fn rhs(&mut self, y: &DVector<f64>) -> Result<DVector<f64>> {
        self.evaluations += 1;

        let state = self.layout.unflatten(y);
        let (rate, rate_layout) = self.model.compute_physics(&state).flatten();

        if rate_layout != self.layout {
            return Err(MicrophysicsError::configuration(
                "model",
                format!("{} returned derivatives with a different shape than its state", self.model.name()),
            ));
        }
        Ok(rate)
    }

    /// Forward-difference Jacobian around `y`, where `f0 = f(y)`
    fn jacobian(&mut self, y: &DVector<f64>, f0: &DVector<f64>) -> Result<DMatrix<f64>> {
        let n = y.len();
        let sqrt_eps = f64::EPSILON.sqrt();
        let mut jac = DMatrix::zeros(n, n);
        let mut perturbed = y.clone();

        for j in 0..n {
            let delta = if y[j] == 0.0 { sqrt_eps } else { sqrt_eps * y[j].abs() };
            perturbed[j] = y[j] + delta;
            let f = self.rhs(&perturbed)?;
            jac.set_column(j, &((f - f0) / delta));
            perturbed[j] = y[j];
        }
        Ok(jac)
    }

    /// Run the model's constraint hook on a flat vector
    fn project(&self, y: DVector<f64>) -> DVector<f64> {
        let mut state = self.layout.unflatten(&y);
        self.model.enforce_constraints(&mut state);
        state.flatten().0
    }
}

/// Weighted max-norm of the error estimate; NaN if any component is NaN
fn error_norm(err: &DVector<f64>, y: &DVector<f64>, ynew: &DVector<f64>, rtol: f64, atol: f64) -> f64 {
    let mut norm = 0.0f64;
    for (e, (a, b)) in err.iter().zip(y.iter().zip(ynew.iter())) {
        let scaled = e.abs() / (atol + rtol * a.abs().max(b.abs()));
        if scaled.is_nan() {
            return f64::NAN;
        }
        norm = norm.max(scaled);
    }
    norm
}

impl Solver for Rosenbrock23Solver {
    fn solve(&self, scenario: &Scenario, config: &SolverConfiguration) -> Result<SimulationResult> {
        // ====== Step 1: Validation ======

        config.validate()?;
        scenario.validate()?;

        let (time_grid, rtol, atol, max_steps) = match &config.solver_type {
            SolverType::Adaptive {
                time_grid,
                relative_tolerance,
                absolute_tolerance,
                max_steps,
            } => (time_grid, *relative_tolerance, *absolute_tolerance, *max_steps),
            other => {
                return Err(MicrophysicsError::configuration(
                    "solver_type",
                    format!("Rosenbrock23Solver only supports Adaptive configuration, got {}", other.name()),
                ));
            }
        };

        // ====== Step 2: Setup ======

        let (mut y, layout) = scenario.initial_state.flatten();
        let n = y.len();
        let mut system = FlatSystem {
            model: scenario.model.as_ref(),
            layout,
            evaluations: 0,
        };

        let mut t = time_grid[0];
        let t_end = time_grid[time_grid.len() - 1];

        let mut first = system.layout.unflatten(&y);
        first.set_metadata("time", t);

        let mut time_points = Vec::with_capacity(time_grid.len());
        let mut state_trajectory = Vec::with_capacity(time_grid.len());
        time_points.push(t);
        state_trajectory.push(first);

        let mut next_output = 1;
        let mut h: Option<f64> = None;
        let mut attempts = 0usize;
        let mut accepted = 0usize;
        let mut rejected = 0usize;

        let identity = DMatrix::<f64>::identity(n, n);

        log::debug!(
            "Rosenbrock: {} unknowns, t = {} .. {} s, rtol = {rtol:e}, atol = {atol:e}",
            n,
            t,
            t_end
        );

        // ====== Step 3: Time Integration ======

        while next_output < time_grid.len() {
            let f0 = system.rhs(&y)?;
            let jac = system.jacobian(&y, &f0)?;

            let mut step = match h {
                Some(h) => h,
                None => {
                    let rate = f0
                        .iter()
                        .zip(y.iter())
                        .map(|(f, y)| f.abs() / (atol + rtol * y.abs()))
                        .fold(0.0, f64::max);
                    let remaining = t_end - t;
                    if rate > 0.0 { remaining.min(0.01 / rate) } else { remaining }
                }
            };

            loop {
                attempts += 1;
                if attempts > max_steps {
                    log::error!("Rosenbrock: step limit {max_steps} reached at t = {t} s");
                    return Err(MicrophysicsError::non_physical(
                        accepted,
                        t,
                        format!("maximum number of steps ({max_steps}) exceeded"),
                    ));
                }

                let target = time_grid[next_output];
                let remaining = target - t;
                let hits_output = step >= remaining;
                let h_step = if hits_output { remaining } else { step };

                if !(h_step > 16.0 * f64::EPSILON * t.abs()) {
                    log::error!("Rosenbrock: step size collapsed to {h_step:e} at t = {t} s");
                    return Err(MicrophysicsError::non_physical(
                        accepted,
                        t,
                        format!("step size collapsed to {h_step:e} s"),
                    ));
                }

                let lu = (&identity - &jac * (h_step * D)).lu();
                let solve = |b: &DVector<f64>| {
                    lu.solve(b).ok_or_else(|| {
                        MicrophysicsError::non_physical(accepted, t, "singular iteration matrix")
                    })
                };

                let k1 = solve(&f0)?;
                let f1 = system.rhs(&(&y + &k1 * (0.5 * h_step)))?;
                let k2 = solve(&(&f1 - &k1))? + &k1;
                let ynew = &y + &k2 * h_step;
                let f2 = system.rhs(&ynew)?;
                let k3 = solve(&(&f2 - (&k2 - &f1) * E32 - (&k1 - &f0) * 2.0))?;

                let err = (&k1 - &k2 * 2.0 + &k3) * (h_step / 6.0);
                let norm = error_norm(&err, &y, &ynew, rtol, atol);

                if norm <= 1.0 {
                    let t_new = if hits_output { target } else { t + h_step };
                    if ynew.iter().any(|v| !v.is_finite()) {
                        validate_state(&system.layout.unflatten(&ynew), accepted + 1, t_new)?;
                    }

                    t = t_new;
                    y = system.project(ynew);
                    accepted += 1;

                    let growth = if norm == 0.0 {
                        MAX_GROWTH
                    } else {
                        (SAFETY * norm.powf(-1.0 / 3.0)).clamp(MIN_SHRINK, MAX_GROWTH)
                    };
                    h = Some(h_step * growth);

                    if hits_output {
                        let mut state = system.layout.unflatten(&y);
                        state.set_metadata("time", t);
                        validate_state(&state, accepted, t)?;

                        time_points.push(t);
                        state_trajectory.push(state);
                        next_output += 1;
                    }
                    break;
                }

                rejected += 1;
                // NaN norms land on the minimum shrink
                let shrink = MIN_SHRINK.max(SAFETY * norm.powf(-1.0 / 3.0));
                step = h_step * shrink;
                log::debug!("Rosenbrock: rejected h = {h_step:e} at t = {t} s (error norm {norm:.3e})");
            }
        }

        log::debug!("Rosenbrock: {accepted} accepted steps, {rejected} rejected, {} evaluations", system.evaluations);

        // ====== Step 4: Build Result ======

        let final_state = state_trajectory.last().cloned().unwrap_or_default();

        let mut result = SimulationResult::new(time_points, state_trajectory, final_state);

        result.add_metadata("solver", "Rosenbrock (ode23s)");
        result.add_metadata("accepted steps", &accepted.to_string());
        result.add_metadata("rejected steps", &rejected.to_string());
        result.add_metadata("function evaluations", &system.evaluations.to_string());
        result.add_metadata("total time", &(t_end - time_grid[0]).to_string());

        Ok(result)
    }

    fn name(&self) -> &str {
        "Rosenbrock (ode23s)"
    }
}

// =================================================================================================
// Tests
// =================================================================================================
