//! Models with analytical solutions, for solver accuracy checks

use dropgrow_rs::physics::{PhysicalData, PhysicalModel, PhysicalQuantity, PhysicalState};

// =================================================================================================
// Exponential Decay: dr/dt = -k*r
// =================================================================================================

/// dr/dt = -k*r on every point, r(0) = 1
pub struct ExponentialDecay {
    pub points: usize,
    pub decay_rate: f64,
}

impl ExponentialDecay {
    pub fn new(points: usize, decay_rate: f64) -> Self {
        Self { points, decay_rate }
    }

    pub fn analytical_solution(&self, t: f64) -> f64 {
        (-self.decay_rate * t).exp()
    }
}

impl PhysicalModel for ExponentialDecay {
    fn points(&self) -> usize {
        self.points
    }

    fn compute_physics(&self, state: &PhysicalState) -> PhysicalState {
        let mut result = state.clone();
        if let Some(radii) = result.get_mut(PhysicalQuantity::Radius) {
            radii.apply(|r| -self.decay_rate * r);
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

// =================================================================================================
// Constant Growth: dT/dt = c
// =================================================================================================

/// dT/dt = c on a scalar temperature; every method is exact
pub struct ConstantGrowth {
    pub rate: f64,
    pub start: f64,
}

impl PhysicalModel for ConstantGrowth {
    fn points(&self) -> usize {
        1
    }

    fn compute_physics(&self, _state: &PhysicalState) -> PhysicalState {
        PhysicalState::new(PhysicalQuantity::Temperature, PhysicalData::from_scalar(self.rate))
    }

    fn setup_initial_state(&self) -> PhysicalState {
        PhysicalState::new(PhysicalQuantity::Temperature, PhysicalData::from_scalar(self.start))
    }

    fn name(&self) -> &str {
        "Constant Growth"
    }
}
