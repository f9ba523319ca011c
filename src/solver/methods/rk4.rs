//! Runge-Kutta 4 (RK4) numerical solver
//!
//! # Mathematical Background
//!
//! ```text
//! k₁ = f(yₙ)
//! k₂ = f(yₙ + dt/2 · k₁)
//! k₃ = f(yₙ + dt/2 · k₂)
//! k₄ = f(yₙ + dt · k₃)
//!
//! yₙ₊₁ = yₙ + dt/6 · (k₁ + 2k₂ + 2k₃ + k₄)
//! ```
//!
//! # Characteristics
//!
//! - **Order**: fourth-order accurate (global error ~ O(dt⁴))
//! - **Cost**: 4 function evaluations per step
//! - **Stability**: explicit; the stable step for dy/dt = λy is |λ·dt| ≲ 2.78
//!
//! Good for the non-stiff parts of the problem (a parcel with only activated
//! droplets, convergence studies). Haze droplets make the full parcel system
//! stiff; use [`Rosenbrock23Solver`](super::Rosenbrock23Solver) there.

use crate::error::{MicrophysicsError, Result};
use crate::solver::{Scenario, SimulationResult, Solver, SolverConfiguration, SolverType, validate_state};

// =================================================================================================
// RK4 Solver
// =================================================================================================

/// Classical fourth-order Runge-Kutta solver
///
/// # Example
///
/// ```rust
/// # use dropgrow_rs::solver::{RK4Solver, Solver, SolverConfiguration, Scenario};
/// # use dropgrow_rs::physics::{PhysicalModel, PhysicalState, PhysicalQuantity, PhysicalData};
/// # struct Cooling;
/// # impl PhysicalModel for Cooling {
/// #     fn points(&self) -> usize { 1 }
/// #     fn compute_physics(&self, state: &PhysicalState) -> PhysicalState {
/// #         let t = state.scalar(PhysicalQuantity::Temperature).unwrap();
/// #         PhysicalState::new(PhysicalQuantity::Temperature, PhysicalData::Scalar(-0.01 * t))
/// #     }
/// #     fn setup_initial_state(&self) -> PhysicalState {
/// #         PhysicalState::new(PhysicalQuantity::Temperature, PhysicalData::Scalar(280.0))
/// #     }
/// #     fn name(&self) -> &str { "Cooling" }
/// # }
/// let scenario = Scenario::from_model(Box::new(Cooling));
/// let config = SolverConfiguration::time_evolution(100.0, 100);
///
/// let result = RK4Solver::new().solve(&scenario, &config)?;
/// let t_end = result.final_state.scalar(PhysicalQuantity::Temperature).unwrap();
/// assert!((t_end - 280.0 * (-1.0_f64).exp()).abs() < 1e-6);
/// # Ok::<(), dropgrow_rs::error::MicrophysicsError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RK4Solver;

impl RK4Solver {
    /// Create a new RK4 solver
    pub fn new() -> Self {
        Self
    }
}

impl Solver for RK4Solver {
    fn solve(&self, scenario: &Scenario, config: &SolverConfiguration) -> Result<SimulationResult> {
        // ====== Step 1: Validation ======

        config.validate()?;
        scenario.validate()?;

        let (total_time, time_steps) = match &config.solver_type {
            SolverType::TimeEvolution { total_time, time_steps } => (*total_time, *time_steps),
            other => {
                return Err(MicrophysicsError::configuration(
                    "solver_type",
                    format!("RK4Solver only supports TimeEvolution configuration, got {}", other.name()),
                ));
            }
        };

        // ====== Step 2: Setup ======

        let dt = total_time / (time_steps as f64);

        let mut state = scenario.initial_state.clone();
        state.set_metadata("time", 0.0);

        let mut time_points = Vec::with_capacity(time_steps + 1);
        let mut state_trajectory = Vec::with_capacity(time_steps + 1);

        time_points.push(0.0);
        state_trajectory.push(state.clone());

        // ====== Step 3: Time Integration ======

        for step in 0..time_steps {
            let model = &scenario.model;

            let k1 = model.compute_physics(&state);
            let k2 = model.compute_physics(&(state.clone() + k1.clone() * (dt / 2.0)));
            let k3 = model.compute_physics(&(state.clone() + k2.clone() * (dt / 2.0)));
            let k4 = model.compute_physics(&(state.clone() + k3.clone() * dt));

            // Simpson weights
            let weighted_slope = k1 + k2 * 2.0 + k3 * 2.0 + k4;
            state = state + weighted_slope * (dt / 6.0);

            let t = (step as f64 + 1.0) * dt;

            validate_state(&state, step + 1, t)?;
            model.enforce_constraints(&mut state);
            state.set_metadata("time", t);

            state_trajectory.push(state.clone());
            time_points.push(t);
        }

        // ====== Step 4: Build Result ======

        let mut result = SimulationResult::new(time_points, state_trajectory, state);

        result.add_metadata("solver", "Runge-Kutta 4");
        result.add_metadata("time steps", &time_steps.to_string());
        result.add_metadata("dt", &dt.to_string());
        result.add_metadata("total time", &total_time.to_string());
        result.add_metadata("function evaluations", &(4 * time_steps).to_string());

        Ok(result)
    }

    fn name(&self) -> &str {
        "Runge Kutta (RK4)"
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{PhysicalData, PhysicalModel, PhysicalQuantity, PhysicalState};

    /// Parcel-like lift: dz/dt = w, dT/dt = -Γ w with a constant lapse rate
    struct DryLift {
        updraft: f64,
        lapse_rate: f64,
    }

    impl PhysicalModel for DryLift {
        fn points(&self) -> usize {
            1
        }

        fn compute_physics(&self, _state: &PhysicalState) -> PhysicalState {
            let mut rate = PhysicalState::new(PhysicalQuantity::Height, PhysicalData::Scalar(self.updraft));
            rate.set(
                PhysicalQuantity::Temperature,
                PhysicalData::Scalar(-self.lapse_rate * self.updraft),
            );
            rate
        }

        fn setup_initial_state(&self) -> PhysicalState {
            let mut state = PhysicalState::new(PhysicalQuantity::Height, PhysicalData::Scalar(0.0));
            state.set(PhysicalQuantity::Temperature, PhysicalData::Scalar(280.0));
            state
        }

        fn name(&self) -> &str {
            "Dry Lift"
        }
    }

    /// Harmonic oscillator written as a first-order system on two custom quantities
    struct HarmonicOscillator {
        omega: f64,
    }

    const POSITION: PhysicalQuantity = PhysicalQuantity::Custom("position");
    const VELOCITY: PhysicalQuantity = PhysicalQuantity::Custom("velocity");

    impl PhysicalModel for HarmonicOscillator {
        fn points(&self) -> usize {
            1
        }

        fn compute_physics(&self, state: &PhysicalState) -> PhysicalState {
            let x = state.scalar(POSITION).unwrap();
            let v = state.scalar(VELOCITY).unwrap();

            let mut rate = PhysicalState::new(POSITION, PhysicalData::Scalar(v));
            rate.set(VELOCITY, PhysicalData::Scalar(-self.omega * self.omega * x));
            rate
        }

        fn setup_initial_state(&self) -> PhysicalState {
            let mut state = PhysicalState::new(POSITION, PhysicalData::Scalar(1.0));
            state.set(VELOCITY, PhysicalData::Scalar(0.0));
            state
        }

        fn name(&self) -> &str {
            "Harmonic Oscillator"
        }
    }

    #[test]
    fn test_rk4_solver_creation() {
        assert_eq!(RK4Solver::new().name(), "Runge Kutta (RK4)");
        assert_eq!(RK4Solver::default().name(), "Runge Kutta (RK4)");
    }

    #[test]
    fn test_rk4_rejects_adaptive() {
        let scenario = Scenario::from_model(Box::new(DryLift { updraft: 1.0, lapse_rate: 9.8e-3 }));
        let config = SolverConfiguration::adaptive(vec![0.0, 1.0], 1e-6, 1e-9, 100);

        let result = RK4Solver::new().solve(&scenario, &config);
        assert!(result.is_err());
    }

    #[test]
    fn test_rk4_linear_lift_is_exact() {
        let scenario = Scenario::from_model(Box::new(DryLift { updraft: 2.0, lapse_rate: 9.8e-3 }));
        let config = SolverConfiguration::time_evolution(300.0, 30);

        let result = RK4Solver::new().solve(&scenario, &config).unwrap();

        for (t, state) in result.time_points.iter().zip(&result.state_trajectory) {
            let z = state.scalar(PhysicalQuantity::Height).unwrap();
            let temp = state.scalar(PhysicalQuantity::Temperature).unwrap();
            assert!((z - 2.0 * t).abs() < 1e-9);
            assert!((temp - (280.0 - 9.8e-3 * 2.0 * t)).abs() < 1e-9);
        }
        assert_eq!(result.get_metadata("function evaluations"), Some("120"));
    }

    #[test]
    fn test_rk4_harmonic_oscillator_period() {
        let scenario = Scenario::from_model(Box::new(HarmonicOscillator { omega: 1.0 }));
        let period = 2.0 * std::f64::consts::PI;
        let config = SolverConfiguration::time_evolution(period, 1000);

        let result = RK4Solver::new().solve(&scenario, &config).unwrap();

        let x = result.final_state.scalar(POSITION).unwrap();
        let v = result.final_state.scalar(VELOCITY).unwrap();
        assert!((x - 1.0).abs() < 1e-8);
        assert!(v.abs() < 1e-8);
    }
}
