//! Forward Euler numerical solver
//!
//! # Mathematical Background
//!
//! ```text
//! y_{n+1} = y_n + dt * f(y_n)
//! ```
//!
//! First-order accurate, one function evaluation per step, conditionally
//! stable. For the droplet equations the stable step is bounded by the
//! relaxation time of the smallest haze droplets, so this solver is mostly a
//! reference for testing.
//!
//! # Example
//!
//! ```rust,ignore
//! use dropgrow_rs::solver::{EulerSolver, Solver, SolverConfiguration};
//!
//! let solver = EulerSolver::new();
//! let config = SolverConfiguration::time_evolution(1.0, 100_000);
//! let result = solver.solve(&scenario, &config)?;
//! ```

use crate::error::{MicrophysicsError, Result};
use crate::physics::PhysicalState;
use crate::solver::{Scenario, SimulationResult, Solver, SolverConfiguration, SolverType, validate_state};

// =================================================================================================
// Euler Solver
// =================================================================================================

/// Forward Euler solver
///
/// 1. Start with the scenario's initial state y₀
/// 2. For each step: yₙ₊₁ = yₙ + dt·f(yₙ), then apply the model constraints
/// 3. Return the complete trajectory
#[derive(Debug, Clone, Copy, Default)]
pub struct EulerSolver;

impl EulerSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Solver for EulerSolver {
    fn solve(&self, scenario: &Scenario, config: &SolverConfiguration) -> Result<SimulationResult> {
        // ====== Step 1: Validation ======

        config.validate()?;
        scenario.validate()?;

        let (total_time, time_steps) = match &config.solver_type {
            SolverType::TimeEvolution { total_time, time_steps } => (*total_time, *time_steps),
            other => {
                return Err(MicrophysicsError::configuration(
                    "solver_type",
                    format!("EulerSolver only supports TimeEvolution configuration, got {}", other.name()),
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
            let physics: PhysicalState = scenario.model.compute_physics(&state);
            state = state + physics * dt;

            // time from the index, not by accumulating dt
            let t = (step as f64 + 1.0) * dt;

            // before the constraints, which may not preserve NaN
            validate_state(&state, step + 1, t)?;
            scenario.model.enforce_constraints(&mut state);
            state.set_metadata("time", t);

            state_trajectory.push(state.clone());
            time_points.push(t);
        }

        // ====== Step 4: Build Result ======

        let mut result = SimulationResult::new(time_points, state_trajectory, state);

        result.add_metadata("solver", "Forward Euler");
        result.add_metadata("time steps", &time_steps.to_string());
        result.add_metadata("dt", &dt.to_string());
        result.add_metadata("total time", &total_time.to_string());
        result.add_metadata("function evaluations", &time_steps.to_string());

        Ok(result)
    }

    fn name(&self) -> &str {
        "Forward Euler"
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{PhysicalData, PhysicalModel, PhysicalQuantity};

    /// dy/dt = -k y
    struct ExponentialDecay {
        points: usize,
        decay_rate: f64,
    }

    impl PhysicalModel for ExponentialDecay {
        fn points(&self) -> usize {
            self.points
        }

        fn compute_physics(&self, state: &PhysicalState) -> PhysicalState {
            let mut result = state.clone();
            if let Some(radius) = result.get_mut(PhysicalQuantity::Radius) {
                radius.apply(|y| -self.decay_rate * y);
            }
            result
        }

        fn setup_initial_state(&self) -> PhysicalState {
            PhysicalState::new(PhysicalQuantity::Radius, PhysicalData::uniform_vector(self.points, 1.0))
        }

        fn name(&self) -> &str {
            "Exponential Decay"
        }
    }

    /// dy/dt = -1 with a floor at zero
    struct FlooredDrain;

    impl PhysicalModel for FlooredDrain {
        fn points(&self) -> usize {
            1
        }

        fn compute_physics(&self, _state: &PhysicalState) -> PhysicalState {
            PhysicalState::new(PhysicalQuantity::Height, PhysicalData::Scalar(-1.0))
        }

        fn setup_initial_state(&self) -> PhysicalState {
            PhysicalState::new(PhysicalQuantity::Height, PhysicalData::Scalar(1.0))
        }

        fn name(&self) -> &str {
            "Floored Drain"
        }

        fn enforce_constraints(&self, state: &mut PhysicalState) {
            if let Some(height) = state.get_mut(PhysicalQuantity::Height) {
                height.apply(|z| z.max(0.0));
            }
        }
    }

    /// NaN tendency hidden behind a floor that `f64::max` would apply
    struct NanBehindFloor;

    impl PhysicalModel for NanBehindFloor {
        fn points(&self) -> usize {
            1
        }

        fn compute_physics(&self, _state: &PhysicalState) -> PhysicalState {
            PhysicalState::new(PhysicalQuantity::Height, PhysicalData::Scalar(f64::NAN))
        }

        fn setup_initial_state(&self) -> PhysicalState {
            PhysicalState::new(PhysicalQuantity::Height, PhysicalData::Scalar(1.0))
        }

        fn name(&self) -> &str {
            "NaN Behind Floor"
        }

        fn enforce_constraints(&self, state: &mut PhysicalState) {
            if let Some(height) = state.get_mut(PhysicalQuantity::Height) {
                height.apply(|z| z.max(0.0));
            }
        }
    }

    /// dy/dt = y², overflows on the first step from a large start
    struct BlowUp;

    impl PhysicalModel for BlowUp {
        fn points(&self) -> usize {
            1
        }

        fn compute_physics(&self, state: &PhysicalState) -> PhysicalState {
            let mut result = state.clone();
            if let Some(y) = result.get_mut(PhysicalQuantity::Temperature) {
                y.apply(|y| y * y);
            }
            result
        }

        fn setup_initial_state(&self) -> PhysicalState {
            PhysicalState::new(PhysicalQuantity::Temperature, PhysicalData::Scalar(1e200))
        }

        fn name(&self) -> &str {
            "Blow Up"
        }
    }

    #[test]
    fn test_euler_solver_name() {
        assert_eq!(EulerSolver::new().name(), "Forward Euler");
    }

    #[test]
    fn test_euler_rejects_adaptive() {
        let scenario = Scenario::from_model(Box::new(ExponentialDecay { points: 2, decay_rate: 1.0 }));
        let config = SolverConfiguration::adaptive(vec![0.0, 1.0], 1e-6, 1e-9, 100);

        let err = EulerSolver::new().solve(&scenario, &config).unwrap_err();
        assert!(err.to_string().contains("only supports TimeEvolution"));
    }

    #[test]
    fn test_euler_exponential_decay() {
        let scenario = Scenario::from_model(Box::new(ExponentialDecay { points: 3, decay_rate: 0.1 }));
        let config = SolverConfiguration::time_evolution(10.0, 1000);

        let result = EulerSolver::new().solve(&scenario, &config).unwrap();
        let y = result.final_state.vector(PhysicalQuantity::Radius).unwrap()[0];

        assert!((y - (-1.0_f64).exp()).abs() < 1e-3);
        assert_eq!(result.len(), 1001);
        assert_eq!(result.time_points[1000], 10.0);
        assert_eq!(result.final_state.get_metadata("time"), Some(10.0));
    }

    #[test]
    fn test_euler_applies_constraints() {
        let scenario = Scenario::from_model(Box::new(FlooredDrain));
        let config = SolverConfiguration::time_evolution(3.0, 30);

        let result = EulerSolver::new().solve(&scenario, &config).unwrap();

        for state in &result.state_trajectory {
            assert!(state.scalar(PhysicalQuantity::Height).unwrap() >= 0.0);
        }
        assert_eq!(result.final_state.scalar(PhysicalQuantity::Height), Some(0.0));
    }

    #[test]
    fn test_euler_reports_overflow() {
        let scenario = Scenario::from_model(Box::new(BlowUp));
        let config = SolverConfiguration::time_evolution(1.0, 10);

        let err = EulerSolver::new().solve(&scenario, &config).unwrap_err();
        assert!(matches!(err, MicrophysicsError::NonPhysicalState { step: 1, .. }));
    }

    #[test]
    fn test_euler_detects_nan_before_constraints() {
        let scenario = Scenario::from_model(Box::new(NanBehindFloor));
        let config = SolverConfiguration::time_evolution(1.0, 10);

        let err = EulerSolver::new().solve(&scenario, &config).unwrap_err();
        assert!(matches!(err, MicrophysicsError::NonPhysicalState { step: 1, .. }));
        assert!(err.to_string().contains("NaN"));
    }
}
