//! Simulation scenario definition
//!
//! A scenario combines a physical model with the state it starts from.
use crate::error::{MicrophysicsError, Result};
use crate::physics::{PhysicalModel, PhysicalState};

/// Simulation scenario
///
/// The "WHAT to solve": a model and its initial state. The same scenario can
/// be handed to different solvers.
///
/// # Examples
///
/// ```rust,ignore
/// let scenario = Scenario::from_model(Box::new(parcel_model));
///
/// let coarse = rk4.solve(&scenario, &fixed_config)?;
/// let reference = rosenbrock.solve(&scenario, &adaptive_config)?;
/// ```
pub struct Scenario {
    /// Physical model (equations)
    pub model: Box<dyn PhysicalModel>,

    /// State at the first output time
    pub initial_state: PhysicalState,
}

impl Scenario {
    /// Create a scenario with an explicit initial state
    pub fn new(model: Box<dyn PhysicalModel>, initial_state: PhysicalState) -> Self {
        Self { model, initial_state }
    }

    /// Create a scenario starting from the model's own initial state
    pub fn from_model(model: Box<dyn PhysicalModel>) -> Self {
        let initial_state = model.setup_initial_state();
        Self::new(model, initial_state)
    }

    /// Check the initial state is usable
    pub fn validate(&self) -> Result<()> {
        if self.initial_state.dimension() == 0 {
            return Err(MicrophysicsError::configuration(
                "initial_state",
                "initial state has no quantities",
            ));
        }
        if self.initial_state.iter().any(|(_, data)| !data.is_finite()) {
            return Err(MicrophysicsError::configuration(
                "initial_state",
                "initial state contains non-finite values",
            ));
        }
        Ok(())
    }

    /// Get model name
    pub fn get_model_name(&self) -> &str {
        self.model.name()
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.get_model_name())
            .field("points", &self.model.points())
            .field("dimension", &self.initial_state.dimension())
            .finish()
    }
}

// ================================================================================================
// Tests
// ================================================================================================
