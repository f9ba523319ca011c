//! dropgrow-rs: bin-resolved cloud droplet growth in a rising parcel
//!
//! An adiabatic air parcel carries a lognormal population of soluble aerosol
//! particles upward at a constant speed. Each mass bin grows a droplet by
//! vapour diffusion while the parcel cools, condenses and releases latent
//! heat. The result is the time history of every bin radius together with
//! temperature, pressure, height and ambient saturation.
//!
//! # Architecture
//!
//! The crate keeps physics and numerics apart:
//!
//! - [`models`] defines the equations: aerosol bins, the Köhler curve and the
//!   parcel tendencies, behind the [`physics::PhysicalModel`] trait
//! - [`solver`] provides the integrators and the scalar root finder
//! - [`thermo`] holds the moist thermodynamics shared by both
//!
//! [`simulation`] ties them together and [`output`] writes the results.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use dropgrow_rs::config::DropGrowConfig;
//! use dropgrow_rs::models::ParcelModel;
//! use dropgrow_rs::simulation::{Tolerances, integrate};
//! use dropgrow_rs::solver::uniform_grid;
//!
//! # fn main() -> dropgrow_rs::error::Result<()> {
//! let config = DropGrowConfig::from_file("demos/dropgrow.json")?;
//! let model = ParcelModel::from_config(&config)?;
//!
//! let grid = uniform_grid(config.integration.tend, config.integration.dt);
//! let trajectory = integrate(&model, &grid, &Tolerances::from(config.integration))?;
//!
//! if let Some(last) = trajectory.last() {
//!     println!("T = {:.2} K, S = {:.4}", last.temperature, last.saturation);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`config`]: JSON run configuration
//! - [`error`]: the crate error type
//! - [`physics`]: state containers and the model trait
//! - [`solver`]: Euler, RK4, Rosenbrock and root bracketing
//! - [`models`]: aerosol, Köhler and parcel physics
//! - [`thermo`]: saturation vapour pressure, latent heat, θe
//! - [`simulation`]: end-to-end runs and updraft sweeps
//! - [`output`]: CSV export

pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod physics;
pub mod simulation;
pub mod solver;
pub mod thermo;

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust
    //! use dropgrow_rs::prelude::*;
    //! ```
    pub use crate::config::{AerosolConfig, AerosolSpeciesConstants, DropGrowConfig, ParcelConstants};
    pub use crate::error::{MicrophysicsError, Result};
    pub use crate::models::{ParcelModel, ParcelState};
    pub use crate::physics::{PhysicalData, PhysicalModel, PhysicalQuantity, PhysicalState};
    pub use crate::simulation::{ParcelRecord, ParcelTrajectory, Tolerances, integrate, run};
    pub use crate::solver::{
        EulerSolver, RK4Solver, Rosenbrock23Solver, Scenario, SimulationResult, Solver, SolverConfiguration,
        SolverType,
    };
}
