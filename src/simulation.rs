//! Parcel runs
//!
//! Glue between the [`ParcelModel`] and the adaptive solver: integrate a
//! model on an output grid, run a whole configuration, or sweep several
//! updraft velocities from one setup.
//!
//! # Example
//!
//! ```rust,no_run
//! use dropgrow_rs::config::DropGrowConfig;
//! use dropgrow_rs::simulation::run;
//!
//! let config = DropGrowConfig::from_file("dropgrow.json")?;
//! let trajectory = run(&config)?;
//!
//! let last = trajectory.last().unwrap();
//! println!("z = {} m, T = {} K, S = {}", last.height, last.temperature, last.saturation);
//! # Ok::<(), dropgrow_rs::error::MicrophysicsError>(())
//! ```

use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::{DropGrowConfig, IntegrationConfig};
use crate::error::{MicrophysicsError, Result};
use crate::models::parcel::{ParcelModel, ParcelState, total_liquid_water, vapor_mixing_ratio};
use crate::output::export::{CsvExporter, Exporter};
use crate::solver::{Rosenbrock23Solver, Scenario, Solver, SolverConfiguration, uniform_grid};
use crate::thermo::constants::{CPD, G0};
use crate::thermo::find_lv;

// =================================================================================================
// Records
// =================================================================================================

/// Parcel state at one output time
#[derive(Debug, Clone, PartialEq)]
pub struct ParcelRecord {
    /// \[s\]
    pub time: f64,

    /// Droplet radius per bin \[m\]
    pub radii: Vec<f64>,

    /// \[K\]
    pub temperature: f64,

    /// \[Pa\]
    pub pressure: f64,

    /// \[m\]
    pub height: f64,

    /// Ambient saturation ratio
    pub saturation: f64,
}

impl ParcelRecord {
    /// Vapor mixing ratio implied by the ambient saturation \[kg/kg\]
    pub fn vapor_mixing_ratio(&self) -> f64 {
        vapor_mixing_ratio(self.saturation, self.temperature, self.pressure)
    }

    /// Liquid water mixing ratio \[kg/kg\]
    pub fn liquid_water(&self, number_densities: &[f64]) -> f64 {
        total_liquid_water(&self.radii, number_densities)
    }

    /// Vapor plus liquid \[kg/kg\]
    pub fn total_water(&self, number_densities: &[f64]) -> f64 {
        self.vapor_mixing_ratio() + self.liquid_water(number_densities)
    }

    /// `cpd T + Lv(T) rv + g z` \[J/kg\]
    pub fn moist_static_energy(&self) -> f64 {
        CPD * self.temperature + find_lv(self.temperature) * self.vapor_mixing_ratio() + G0 * self.height
    }

    /// Ambient supersaturation in percent
    pub fn supersaturation_percent(&self) -> f64 {
        (self.saturation - 1.0) * 100.0
    }
}

/// Output of one parcel run
#[derive(Debug, Clone, Default)]
pub struct ParcelTrajectory {
    /// One record per output time
    pub records: Vec<ParcelRecord>,

    /// Name of the solver that produced it
    pub solver: String,

    /// Solver statistics and run description
    pub metadata: BTreeMap<String, String>,
}

impl ParcelTrajectory {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&ParcelRecord> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&ParcelRecord> {
        self.records.last()
    }

    /// Number of droplet bins
    pub fn bins(&self) -> usize {
        self.records.first().map_or(0, |r| r.radii.len())
    }

    pub fn times(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.time).collect()
    }

    pub fn temperatures(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.temperature).collect()
    }

    pub fn heights(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.height).collect()
    }

    /// Radius history of one bin
    pub fn radius_history(&self, bin: usize) -> Vec<f64> {
        self.records.iter().filter_map(|r| r.radii.get(bin).copied()).collect()
    }

    /// Highest ambient saturation ratio reached
    pub fn max_saturation(&self) -> Option<f64> {
        self.records.iter().map(|r| r.saturation).reduce(f64::max)
    }
}

// =================================================================================================
// Integration
// =================================================================================================

/// Error control of a parcel run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub rtol: f64,
    pub atol: f64,
    pub max_steps: usize,
}

impl Default for Tolerances {
    fn default() -> Self {
        IntegrationConfig::default().into()
    }
}

impl From<IntegrationConfig> for Tolerances {
    fn from(config: IntegrationConfig) -> Self {
        Self {
            rtol: config.rtol,
            atol: config.atol,
            max_steps: config.max_steps,
        }
    }
}

/// Integrate `model` from its equilibrium state and report it at every `time_grid` entry
///
/// The first grid entry is the start time. The run aborts with
/// `NonPhysicalState` as soon as the solver fails; no partial trajectory is
/// returned.
pub fn integrate(model: &ParcelModel, time_grid: &[f64], tolerances: &Tolerances) -> Result<ParcelTrajectory> {
    let scenario = Scenario::from_model(Box::new(model.clone()));
    let config = SolverConfiguration::adaptive(
        time_grid.to_vec(),
        tolerances.rtol,
        tolerances.atol,
        tolerances.max_steps,
    );

    let solver = Rosenbrock23Solver::new();
    let result = solver.solve(&scenario, &config)?;

    let mut records = Vec::with_capacity(result.len());
    for (step, (time, state)) in result.time_points.iter().zip(&result.state_trajectory).enumerate() {
        let parcel = ParcelState::from_physical(state).ok_or_else(|| {
            MicrophysicsError::non_physical(step, *time, "solver returned a state without parcel quantities")
        })?;

        if let Some(bin) = parcel.radii.iter().position(|r| !(*r > 0.0)) {
            return Err(MicrophysicsError::non_physical(
                step,
                *time,
                format!("radius of bin {bin} is not positive"),
            ));
        }

        let saturation = model.environmental_saturation(&parcel);
        records.push(ParcelRecord {
            time: *time,
            radii: parcel.radii.iter().copied().collect(),
            temperature: parcel.temperature,
            pressure: parcel.pressure,
            height: parcel.height,
            saturation,
        });
    }

    let mut metadata = result.metadata.clone();
    metadata.insert("model".to_string(), scenario.get_model_name().to_string());
    metadata.insert("updraft".to_string(), model.updraft().to_string());
    if let Some(description) = scenario.model.description() {
        metadata.insert("description".to_string(), description.clone());
    }

    let trajectory = ParcelTrajectory {
        records,
        solver: solver.name().to_string(),
        metadata,
    };

    if let Some(last) = trajectory.last() {
        log::info!(
            "parcel run finished at t = {} s: z = {:.1} m, T = {:.3} K, S = {:.5} ({} accepted steps)",
            last.time,
            last.height,
            last.temperature,
            last.saturation,
            trajectory.metadata.get("accepted steps").map_or("?", String::as_str)
        );
    }

    Ok(trajectory)
}

/// Run a whole configuration, writing the CSV file when `dump_output` is set
pub fn run(config: &DropGrowConfig) -> Result<ParcelTrajectory> {
    config.validate()?;

    let model = ParcelModel::from_config(config)?;
    let grid = uniform_grid(config.integration.tend, config.integration.dt);
    let trajectory = integrate(&model, &grid, &config.integration.into())?;

    if config.output.dump_output {
        if let Some(path) = &config.output.output_file {
            CsvExporter::default().export(&trajectory, None, path)?;
            log::info!("trajectory written to {}", path.display());
        }
    }

    Ok(trajectory)
}

/// One run per updraft velocity, all from the same equilibrium state and total water
///
/// With the `parallel` feature the runs share rayon's thread pool. The
/// result order follows `velocities`; the first failure is returned.
pub fn sweep_updrafts(
    model: &ParcelModel,
    velocities: &[f64],
    time_grid: &[f64],
    tolerances: &Tolerances,
) -> Result<Vec<ParcelTrajectory>> {
    log::info!("sweeping {} updraft velocities", velocities.len());

    #[cfg(feature = "parallel")]
    let runs = velocities
        .par_iter()
        .map(|&w| integrate(&model.with_updraft(w), time_grid, tolerances))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let runs = velocities
        .iter()
        .map(|&w| integrate(&model.with_updraft(w), time_grid, tolerances))
        .collect();

    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AerosolConfig, AerosolSpeciesConstants, ParcelConstants};
    use crate::models::{build_lognormal_distribution, log_spaced_edges};
    use crate::thermo::constants::RHOL;

    fn small_model(bins: usize) -> ParcelModel {
        let aerosol = AerosolConfig::from_mean_radius(0.05e-6, 2.0, 1e-10, AerosolSpeciesConstants::default());
        let edges = log_spaced_edges(-20.0, -16.0, bins);
        let distribution =
            build_lognormal_distribution(&edges, aerosol.themean, aerosol.sigma_log(), aerosol.totmass).unwrap();
        ParcelModel::new(distribution, aerosol.species, ParcelConstants::default()).unwrap()
    }

    fn record(saturation: f64) -> ParcelRecord {
        ParcelRecord {
            time: 0.0,
            radii: vec![1e-6],
            temperature: 280.0,
            pressure: 9.0e4,
            height: 100.0,
            saturation,
        }
    }

    #[test]
    fn test_record_diagnostics() {
        let saturated = record(1.0);
        let rv = saturated.vapor_mixing_ratio();

        assert!((rv - crate::thermo::find_rsat(280.0, 9.0e4)).abs() < 1e-15);
        assert!((saturated.total_water(&[1e8]) - rv - 4.0 / 3.0 * std::f64::consts::PI * 1e-10 * RHOL).abs() < 1e-15);
        assert!((saturated.moist_static_energy() - (CPD * 280.0 + find_lv(280.0) * rv + G0 * 100.0)).abs() < 1e-6);
        assert!(saturated.supersaturation_percent().abs() < 1e-12);
    }

    #[test]
    fn test_short_integration_lands_on_grid() {
        let model = small_model(6);
        let grid = uniform_grid(20.0, 5.0);

        let trajectory = integrate(&model, &grid, &Tolerances::default()).unwrap();

        assert_eq!(trajectory.times(), grid);
        assert_eq!(trajectory.bins(), 6);
        assert_eq!(trajectory.solver, "Rosenbrock (ode23s)");
        assert_eq!(trajectory.metadata.get("model").map(String::as_str), Some("Droplet Growth Parcel"));
        assert!((trajectory.first().unwrap().saturation - 0.95).abs() < 1e-9);
        for r in &trajectory.records {
            assert!((r.height - r.time).abs() < 1e-6);
        }
    }

    #[test]
    fn test_step_limit_surfaces_as_error() {
        let model = small_model(4);
        let tolerances = Tolerances {
            max_steps: 2,
            ..Tolerances::default()
        };

        let err = integrate(&model, &[0.0, 100.0], &tolerances).unwrap_err();
        assert!(matches!(err, MicrophysicsError::NonPhysicalState { .. }));
    }

    #[test]
    fn test_sweep_keeps_order_and_setup() {
        let model = small_model(4);
        let grid = uniform_grid(10.0, 5.0);

        let runs = sweep_updrafts(&model, &[0.5, 2.0], &grid, &Tolerances::default()).unwrap();

        assert_eq!(runs.len(), 2);
        assert!((runs[0].last().unwrap().height - 5.0).abs() < 1e-6);
        assert!((runs[1].last().unwrap().height - 20.0).abs() < 1e-6);
        assert_eq!(runs[0].first().unwrap().radii, runs[1].first().unwrap().radii);
    }

    #[test]
    fn test_trajectory_accessors() {
        let trajectory = ParcelTrajectory {
            records: vec![record(0.95), record(1.002)],
            solver: "test".to_string(),
            metadata: BTreeMap::new(),
        };

        assert_eq!(trajectory.len(), 2);
        assert_eq!(trajectory.radius_history(0), vec![1e-6, 1e-6]);
        assert!(trajectory.radius_history(3).is_empty());
        assert_eq!(trajectory.max_saturation(), Some(1.002));
        assert!(ParcelTrajectory::default().max_saturation().is_none());
    }
}
