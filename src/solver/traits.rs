//! Numerical solver traits and types
//!
//! # Design
//!
//! - `SolverType` says what kind of integration is requested and carries its
//!   parameters
//! - `SolverConfiguration` wraps it
//! - `SimulationResult` holds the trajectory plus string metadata
//! - `Solver` is the single entry point every method implements

use std::collections::BTreeMap;

use crate::error::{MicrophysicsError, Result};
use crate::physics::PhysicalState;
use crate::solver::Scenario;

// =================================================================================================
// Solver type
// =================================================================================================

/// Type of numerical integration
///
/// # Examples
///
/// ```rust
/// use dropgrow_rs::solver::SolverType;
///
/// // Fixed step
/// let fixed = SolverType::TimeEvolution { total_time: 300.0, time_steps: 3000 };
/// assert!(fixed.validate().is_ok());
///
/// // Error-controlled, reported on a grid
/// let adaptive = SolverType::Adaptive {
///     time_grid: vec![0.0, 10.0, 20.0],
///     relative_tolerance: 1e-6,
///     absolute_tolerance: 1e-15,
///     max_steps: 10_000,
/// };
/// assert!(adaptive.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum SolverType {
    /// Fixed-step time evolution from t = 0
    ///
    /// Used by: Euler, RK4
    TimeEvolution { total_time: f64, time_steps: usize },

    /// Adaptive time evolution reporting the state at every `time_grid` entry
    ///
    /// Used by: Rosenbrock
    ///
    /// # Parameters
    /// - `time_grid`: strictly increasing output times; the first is the start time
    /// - `relative_tolerance`, `absolute_tolerance`: per-component error control
    /// - `max_steps`: cap on attempted internal steps over the whole run
    Adaptive {
        time_grid: Vec<f64>,
        relative_tolerance: f64,
        absolute_tolerance: f64,
        max_steps: usize,
    },
}

impl SolverType {
    /// Get name identifier
    pub fn name(&self) -> &str {
        match self {
            SolverType::TimeEvolution { .. } => "TimeEvolution",
            SolverType::Adaptive { .. } => "Adaptive",
        }
    }

    /// Validate that parameters are meaningful
    pub fn validate(&self) -> Result<()> {
        match self {
            SolverType::TimeEvolution { total_time, time_steps } => {
                if !(*total_time > 0.0) || !total_time.is_finite() {
                    return Err(MicrophysicsError::configuration(
                        "total_time",
                        "total time must be positive",
                    ));
                }
                if *time_steps == 0 {
                    return Err(MicrophysicsError::configuration(
                        "time_steps",
                        "time steps must be greater than 0",
                    ));
                }
                Ok(())
            }
            SolverType::Adaptive {
                time_grid,
                relative_tolerance,
                absolute_tolerance,
                max_steps,
            } => {
                if time_grid.len() < 2 {
                    return Err(MicrophysicsError::configuration(
                        "time_grid",
                        "need at least a start and an end time",
                    ));
                }
                if time_grid.iter().any(|t| !t.is_finite())
                    || time_grid.windows(2).any(|w| w[1] <= w[0])
                {
                    return Err(MicrophysicsError::configuration(
                        "time_grid",
                        "times must be finite and strictly increasing",
                    ));
                }
                if !(*relative_tolerance > 0.0) {
                    return Err(MicrophysicsError::configuration(
                        "relative_tolerance",
                        "must be positive",
                    ));
                }
                if !(*absolute_tolerance > 0.0) {
                    return Err(MicrophysicsError::configuration(
                        "absolute_tolerance",
                        "must be positive",
                    ));
                }
                if *max_steps == 0 {
                    return Err(MicrophysicsError::configuration(
                        "max_steps",
                        "must be greater than 0",
                    ));
                }
                Ok(())
            }
        }
    }
}

// =================================================================================================
// Solver configuration
// =================================================================================================

/// Configuration for numerical solver
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfiguration {
    /// Type of solver and its parameters
    pub solver_type: SolverType,
}

impl SolverConfiguration {
    /// Create a new configuration with a given solver type
    pub fn new(solver_type: SolverType) -> Self {
        Self { solver_type }
    }

    /// Create a fixed-step configuration
    pub fn time_evolution(total_time: f64, time_steps: usize) -> Self {
        Self::new(SolverType::TimeEvolution { total_time, time_steps })
    }

    /// Create an adaptive configuration reporting on `time_grid`
    pub fn adaptive(
        time_grid: Vec<f64>,
        relative_tolerance: f64,
        absolute_tolerance: f64,
        max_steps: usize,
    ) -> Self {
        Self::new(SolverType::Adaptive {
            time_grid,
            relative_tolerance,
            absolute_tolerance,
            max_steps,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.solver_type.validate()
    }
}

/// Output times `0, dt, 2 dt, ...` up to and including `end` when it falls on the grid
///
/// Times are computed from the index so the last point does not drift.
///
/// ```rust
/// use dropgrow_rs::solver::uniform_grid;
///
/// let grid = uniform_grid(300.0, 10.0);
/// assert_eq!(grid.len(), 31);
/// assert_eq!(grid[30], 300.0);
/// ```
pub fn uniform_grid(end: f64, dt: f64) -> Vec<f64> {
    if !(dt > 0.0) || !(end >= 0.0) {
        return vec![0.0];
    }
    let steps = (end / dt + 1e-9).floor() as usize;
    (0..=steps).map(|i| i as f64 * dt).collect()
}

// =================================================================================================
// Simulation result
// =================================================================================================

/// Output of a solver run
#[derive(Clone, Debug)]
pub struct SimulationResult {
    /// Times at which the state was recorded
    pub time_points: Vec<f64>,

    /// One state per entry of `time_points`
    pub state_trajectory: Vec<PhysicalState>,

    /// Last recorded state
    pub final_state: PhysicalState,

    /// Free-form information written by the solver
    pub metadata: BTreeMap<String, String>,
}

impl SimulationResult {
    pub fn new(
        time_points: Vec<f64>,
        state_trajectory: Vec<PhysicalState>,
        final_state: PhysicalState,
    ) -> Self {
        Self {
            time_points,
            state_trajectory,
            final_state,
            metadata: BTreeMap::new(),
        }
    }

    /// Record a piece of metadata
    pub fn add_metadata(&mut self, key: &str, value: &str) {
        self.metadata.insert(key.to_string(), value.to_string());
    }

    pub fn get_metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Number of recorded states
    pub fn len(&self) -> usize {
        self.state_trajectory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state_trajectory.is_empty()
    }
}

// =================================================================================================
// Solver trait
// =================================================================================================

/// Numerical method applied to a [`Scenario`]
pub trait Solver {
    /// Integrate the scenario as described by `config`
    fn solve(&self, scenario: &Scenario, config: &SolverConfiguration) -> Result<SimulationResult>;

    /// Human-readable method name
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_evolution_validation() {
        assert!(SolverConfiguration::time_evolution(10.0, 100).validate().is_ok());
        assert!(SolverConfiguration::time_evolution(0.0, 100).validate().is_err());
        assert!(SolverConfiguration::time_evolution(10.0, 0).validate().is_err());
        assert!(SolverConfiguration::time_evolution(f64::NAN, 10).validate().is_err());
    }

    #[test]
    fn test_adaptive_validation() {
        let ok = SolverConfiguration::adaptive(vec![0.0, 1.0], 1e-6, 1e-12, 100);
        assert!(ok.validate().is_ok());

        let short = SolverConfiguration::adaptive(vec![0.0], 1e-6, 1e-12, 100);
        assert!(short.validate().is_err());

        let unordered = SolverConfiguration::adaptive(vec![0.0, 2.0, 1.0], 1e-6, 1e-12, 100);
        assert!(unordered.validate().is_err());

        let bad_tolerance = SolverConfiguration::adaptive(vec![0.0, 1.0], 0.0, 1e-12, 100);
        assert!(bad_tolerance.validate().is_err());
    }

    #[test]
    fn test_solver_type_name() {
        assert_eq!(SolverConfiguration::time_evolution(1.0, 1).solver_type.name(), "TimeEvolution");
    }

    #[test]
    fn test_uniform_grid() {
        let grid = uniform_grid(300.0, 10.0);
        assert_eq!(grid.len(), 31);
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[30], 300.0);

        // end not on the grid is not included
        let grid = uniform_grid(25.0, 10.0);
        assert_eq!(grid, vec![0.0, 10.0, 20.0]);
    }

    #[test]
    fn test_result_metadata() {
        let mut result = SimulationResult::new(vec![0.0], vec![PhysicalState::empty()], PhysicalState::empty());
        result.add_metadata("solver", "Rosenbrock");

        assert_eq!(result.get_metadata("solver"), Some("Rosenbrock"));
        assert_eq!(result.len(), 1);
        assert!(!result.is_empty());
    }
}
