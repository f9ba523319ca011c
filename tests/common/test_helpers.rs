//! Helper functions for integration tests

use dropgrow_rs::config::{
    AerosolConfig, AerosolSpeciesConstants, BinConfig, DropGrowConfig, IntegrationConfig, OutputConfig,
    ParcelConstants,
};
use dropgrow_rs::physics::PhysicalQuantity;
use dropgrow_rs::solver::SimulationResult;

/// |a - b| / |b|
pub fn relative_error(value: f64, reference: f64) -> f64 {
    ((value - reference) / reference).abs()
}

/// First entry of `quantity` in the final state
pub fn final_value(result: &SimulationResult, quantity: PhysicalQuantity) -> f64 {
    result
        .final_state
        .get(quantity)
        .map(|data| data.as_slice()[0])
        .expect("quantity missing from final state")
}

/// Ammonium sulphate, 0.05 µm mean radius, 30 bins, 1 m/s for 300 s
pub fn reference_config() -> DropGrowConfig {
    DropGrowConfig {
        aerosol: AerosolConfig::from_mean_radius(0.05e-6, 2.0, 1e-10, AerosolSpeciesConstants::default()),
        initial_conditions: ParcelConstants::default(),
        integration: IntegrationConfig::default(),
        bins: BinConfig::default(),
        output: OutputConfig::default(),
    }
}
