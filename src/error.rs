//! Error types shared by the whole crate
//!
//! Every fallible operation returns [`Result<T>`]. Numerical failures carry the
//! bracket, bin index or step that produced them so the caller can tell which
//! part of a run broke without re-running it.

use thiserror::Error;

/// Errors raised by root finding, model setup and integration
#[derive(Debug, Error)]
pub enum MicrophysicsError {
    /// No sign change found while widening the search interval
    #[error("no sign change found around x0 = {x0} after {iterations} expansions (last interval [{left}, {right}])")]
    BracketNotFound {
        x0: f64,
        left: f64,
        right: f64,
        iterations: usize,
    },

    /// The interval handed to the root solver does not bracket a root
    #[error("interval [{left}, {right}] does not bracket a root (f = {f_left}, {f_right})")]
    InvalidBracket {
        left: f64,
        right: f64,
        f_left: f64,
        f_right: f64,
    },

    /// The root solver ran out of iterations
    #[error("root search in [{left}, {right}] did not converge within {iterations} iterations")]
    RootDidNotConverge {
        left: f64,
        right: f64,
        iterations: usize,
    },

    /// Köhler evaluation requested at a radius that is not strictly positive
    #[error("droplet radius must be positive and finite, got {radius} m")]
    InvalidRadius { radius: f64 },

    /// Equilibrium radius search failed for one bin of the distribution
    #[error("equilibrium radius search failed for bin {bin} (aerosol mass {mass:e} kg): {source}")]
    EquilibriumRadius {
        bin: usize,
        mass: f64,
        #[source]
        source: Box<MicrophysicsError>,
    },

    /// Integration produced (or would produce) an unusable state
    #[error("non-physical state at step {step} (t = {time} s): {reason}")]
    NonPhysicalState {
        step: usize,
        time: f64,
        reason: String,
    },

    /// Missing or out-of-range input
    #[error("invalid configuration for '{field}': {reason}")]
    Configuration { field: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, MicrophysicsError>;

impl MicrophysicsError {
    /// Shorthand for a [`MicrophysicsError::Configuration`] error
    pub fn configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`MicrophysicsError::NonPhysicalState`] error
    pub fn non_physical(step: usize, time: f64, reason: impl Into<String>) -> Self {
        Self::NonPhysicalState {
            step,
            time,
            reason: reason.into(),
        }
    }
}
