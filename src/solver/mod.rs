//! Numerical solvers
//!
//! This module provides the time integrators that drive a [`PhysicalModel`]
//! forward, and the scalar root finder used for nonlinear inversions.
//!
//! # The Architecture (WHAT vs HOW)
//!
//! 1. **Scenario** (`Scenario`) - WHAT to solve: model + initial state
//! 2. **Configuration** (`SolverConfiguration`) - HOW to solve: fixed step or
//!    adaptive, with its numerical parameters
//! 3. **Solver** (`Solver` trait) - the numerical method itself
//!
//! # Module Organization
//!
//! - **`traits`**: `Solver`, `SolverType`, `SolverConfiguration`, `SimulationResult`
//! - **`scenario`**: `Scenario`
//! - **`methods`**: `EulerSolver`, `RK4Solver`, `Rosenbrock23Solver`
//! - **`roots`**: `find_interval`, `fzero`, `find_root`
//!
//! # Choosing a Solver
//!
//! Droplet growth equations are stiff: a haze droplet relaxes to equilibrium
//! in microseconds while the parcel evolves over minutes. Explicit methods
//! (Euler, RK4) are only stable with steps below the fastest relaxation time,
//! so parcel runs use the linearly-implicit [`Rosenbrock23Solver`].
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────────┐     ┌─────────────────┐
//! │ Scenario        │ ──▶ │ Solver Configuration │ ──▶ │ Solver          │
//! │ (model + y₀)    │     │ (fixed / adaptive)   │     │ (Euler, RK4,    │
//! └─────────────────┘     └──────────────────────┘     │  Rosenbrock)    │
//!                                                      └────────┬────────┘
//!                                                               ▼
//!                                                      ┌─────────────────┐
//!                                                      │ SimulationResult│
//!                                                      └─────────────────┘
//! ```
//!
//! # Error Handling
//!
//! Solvers return [`crate::error::Result`]. A NaN or infinite value in any
//! quantity aborts the run with
//! [`MicrophysicsError::NonPhysicalState`](crate::error::MicrophysicsError::NonPhysicalState);
//! no later steps are produced.

// =================================================================================================
// Module Declarations
// =================================================================================================
mod methods;
pub mod roots;
mod scenario;
mod traits;

// =================================================================================================
// Parallel Execution Threshold
// =================================================================================================

use std::sync::atomic::{AtomicUsize, Ordering};

/// Vector length above which element-wise state updates go to rayon
///
/// Parcel runs rarely carry more than a few hundred bins, so they stay
/// sequential unless the threshold is lowered.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4096;

static PARALLEL_THRESHOLD: AtomicUsize = AtomicUsize::new(DEFAULT_PARALLEL_THRESHOLD);

/// Current threshold used by [`PhysicalData::apply`](crate::physics::PhysicalData::apply)
///
/// Only consulted with the `parallel` feature.
///
/// ```rust
/// use dropgrow_rs::solver::parallel_threshold;
///
/// assert!(parallel_threshold() > 0);
/// ```
pub fn parallel_threshold() -> usize {
    PARALLEL_THRESHOLD.load(Ordering::Relaxed)
}

/// Change the threshold for the whole process
///
/// # Panics
///
/// Panics when `threshold` is zero.
pub fn set_parallel_threshold(threshold: usize) {
    assert!(threshold > 0, "parallel threshold must be at least 1");
    PARALLEL_THRESHOLD.store(threshold, Ordering::Relaxed);
}

/// Lowers the threshold for one test and puts the old value back on drop
#[cfg(test)]
pub(crate) struct ThresholdGuard {
    previous: usize,
}

#[cfg(test)]
impl ThresholdGuard {
    pub(crate) fn save(threshold: usize) -> Self {
        let previous = PARALLEL_THRESHOLD.swap(threshold, Ordering::Relaxed);
        Self { previous }
    }
}

#[cfg(test)]
impl Drop for ThresholdGuard {
    fn drop(&mut self) {
        PARALLEL_THRESHOLD.store(self.previous, Ordering::Relaxed);
    }
}

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use traits::{SimulationResult, Solver, SolverConfiguration, SolverType, uniform_grid};

pub use scenario::Scenario;

pub use methods::{EulerSolver, RK4Solver, Rosenbrock23Solver};

// =================================================================================================
// Helper Functions
// =================================================================================================

use crate::error::{MicrophysicsError, Result};
use crate::physics::PhysicalState;

/// Reject states holding NaN or infinite values
///
/// `step` and `time` locate the failure in the error message.
pub(crate) fn validate_state(state: &PhysicalState, step: usize, time: f64) -> Result<()> {
    for (quantity, data) in state.iter() {
        let values = data.as_slice();

        if let Some(index) = values.iter().position(|x| x.is_nan()) {
            log::error!("NaN in {quantity}[{index}] at step {step}, t = {time} s");
            return Err(MicrophysicsError::non_physical(
                step,
                time,
                format!("NaN detected in {quantity} (index {index})"),
            ));
        }

        if let Some(index) = values.iter().position(|x| x.is_infinite()) {
            log::error!("infinity in {quantity}[{index}] at step {step}, t = {time} s");
            return Err(MicrophysicsError::non_physical(
                step,
                time,
                format!("infinity detected in {quantity} (index {index})"),
            ));
        }
    }

    Ok(())
}

// =================================================================================================
// Tests
// =================================================================================================
