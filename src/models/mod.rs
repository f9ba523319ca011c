//! Cloud microphysics models
//!
//! [`ParcelModel`] implements the [`PhysicalModel`](crate::physics::PhysicalModel)
//! trait. The solver calls `compute_physics` at each stage. The model owns the
//! physics (droplet growth, latent heating, hydrostatic lift) and the solver
//! owns the time integration.
//!
//! # Building blocks
//!
//! ## [`aerosol`]: the aerosol population
//!
//! A lognormal aerosol mass distribution cut into mass bins. Each bin holds
//! one droplet population growing on identical aerosol particles.
//!
//! ## [`koehler`]: equilibrium over a solution droplet
//!
//! The Köhler curve S(r, m) and the equilibrium radius search that sets the
//! initial droplet sizes.
//!
//! ## [`parcel`]: the rising parcel
//!
//! Droplet radii, temperature, pressure and height advanced together, with
//! the ambient humidity recovered from the conserved total water.

// =================================================================================================
// Module Declarations
// =================================================================================================

pub mod aerosol;
pub mod koehler;
pub mod parcel;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use aerosol::{MassBin, MassBinDistribution, build_lognormal_distribution, dry_radius, log_spaced_edges, lognormal};
pub use koehler::{Koehler, KoehlerCoefficients, find_equilibrium_radius, find_koehler_coeffs};
pub use parcel::{ParcelModel, ParcelState, environmental_saturation, total_liquid_water, vapor_mixing_ratio};
