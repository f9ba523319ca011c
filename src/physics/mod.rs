//! Physical models
//!
//! This module provides the traits and containers shared by every model in
//! the crate. A physical model supplies the equations of a system; it never
//! integrates them.
//!
//! # Core Concepts
//!
//! - **Physical Model**: computes dy/dt at a given state
//! - **Physical State**: container for all physical quantities (radii, temperature, ...)
//! - **Physical Quantity**: type-safe identifier for physical variables
//!
//! Physical models are **separate from numerical solvers**, so the same
//! parcel model can be integrated with Euler, RK4 or the Rosenbrock method.
//!
//! # Implementing a New Physical Model
//!
//! ```rust
//! use dropgrow_rs::physics::{PhysicalData, PhysicalModel, PhysicalQuantity, PhysicalState};
//!
//! /// Newtonian cooling towards 250 K
//! struct Cooling {
//!     rate: f64,
//! }
//!
//! impl PhysicalModel for Cooling {
//!     fn points(&self) -> usize {
//!         1
//!     }
//!
//!     fn compute_physics(&self, state: &PhysicalState) -> PhysicalState {
//!         let t = state.scalar(PhysicalQuantity::Temperature).unwrap_or(f64::NAN);
//!         PhysicalState::new(
//!             PhysicalQuantity::Temperature,
//!             PhysicalData::Scalar(-self.rate * (t - 250.0)),
//!         )
//!     }
//!
//!     fn setup_initial_state(&self) -> PhysicalState {
//!         PhysicalState::new(PhysicalQuantity::Temperature, PhysicalData::Scalar(280.0))
//!     }
//!
//!     fn name(&self) -> &str {
//!         "Cooling"
//!     }
//! }
//!
//! let model = Cooling { rate: 0.1 };
//! let rate = model.compute_physics(&model.setup_initial_state());
//! assert_eq!(rate.scalar(PhysicalQuantity::Temperature), Some(-3.0));
//! ```
//!
//! # Available Models
//!
//! - [`crate::models::parcel::ParcelModel`]: droplet growth in a rising parcel

pub mod data;
pub mod traits;

pub use data::PhysicalData;
pub use traits::{PhysicalModel, PhysicalQuantity, PhysicalState, StateLayout};
