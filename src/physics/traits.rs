//! The contract between models and integrators
//!
//! A model describes its unknowns as a [`PhysicalState`], a map from
//! [`PhysicalQuantity`] to values, and returns tendencies in the same shape
//! through [`PhysicalModel::compute_physics`]. Implicit solvers work on a flat
//! vector instead; [`StateLayout`] converts between the two.

use nalgebra::DVector;
use std::collections::BTreeMap;
use std::fmt;

use super::data::PhysicalData;

// =================================================================================================
// Physical quantities (Type-safe Identifiers)
// =================================================================================================

/// Known physical quantities
///
/// The declaration order is the order used when a state is flattened:
/// radii first, then temperature, pressure and height.
///
/// # Example
/// ```
/// use dropgrow_rs::physics::{PhysicalData, PhysicalQuantity, PhysicalState};
///
/// let supersaturation = PhysicalQuantity::Custom("Supersaturation");
/// let mut state = PhysicalState::empty();
/// state.set(supersaturation, PhysicalData::Scalar(0.002));
/// assert!(state.get(supersaturation).is_some());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PhysicalQuantity {
    /// Droplet radius per bin (m)
    Radius,

    /// Temperature (K)
    Temperature,

    /// Pressure (Pa)
    Pressure,

    /// Height above the reference level (m)
    Height,

    /// Custom quantity (for use extension)
    Custom(&'static str),
}

impl fmt::Display for PhysicalQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicalQuantity::Radius => write!(f, "radius"),
            PhysicalQuantity::Temperature => write!(f, "temperature"),
            PhysicalQuantity::Pressure => write!(f, "pressure"),
            PhysicalQuantity::Height => write!(f, "height"),
            PhysicalQuantity::Custom(name) => write!(f, "{name}"),
        }
    }
}

// =================================================================================================
// Physical State (Flexible State Container)
// =================================================================================================

/// Physical state of the system
///
/// All physical quantities at a given time, plus scalar metadata (solvers
/// record the current time under `"time"`). Quantities are kept in a sorted
/// map so iteration and flattening are deterministic.
///
/// # Example
/// ```
/// use dropgrow_rs::physics::{PhysicalData, PhysicalQuantity, PhysicalState};
///
/// let mut state = PhysicalState::new(
///     PhysicalQuantity::Radius,
///     PhysicalData::from_vec(vec![1.0e-7, 2.0e-7]),
/// );
/// state.set(PhysicalQuantity::Temperature, PhysicalData::Scalar(280.0));
/// assert_eq!(state.scalar(PhysicalQuantity::Temperature), Some(280.0));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhysicalState {
    pub(crate) quantities: BTreeMap<PhysicalQuantity, PhysicalData>,

    pub(crate) metadata: BTreeMap<String, f64>,
}

impl PhysicalState {
    /// Create a new state with primary quantity
    pub fn new(quantity: PhysicalQuantity, value: PhysicalData) -> Self {
        let mut state = Self::empty();
        state.set(quantity, value);
        state
    }

    /// Create an empty state
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get a quantity by type
    pub fn get(&self, quantity: PhysicalQuantity) -> Option<&PhysicalData> {
        self.quantities.get(&quantity)
    }

    /// Get mutable reference to a quantity
    pub fn get_mut(&mut self, quantity: PhysicalQuantity) -> Option<&mut PhysicalData> {
        self.quantities.get_mut(&quantity)
    }

    /// Scalar value of a quantity, if present and scalar
    pub fn scalar(&self, quantity: PhysicalQuantity) -> Option<f64> {
        self.get(quantity).and_then(PhysicalData::try_as_scalar)
    }

    /// Vector value of a quantity, if present and a vector
    pub fn vector(&self, quantity: PhysicalQuantity) -> Option<&DVector<f64>> {
        self.get(quantity).and_then(PhysicalData::try_as_vector)
    }

    /// Set a quantity
    pub fn set(&mut self, quantity: PhysicalQuantity, value: PhysicalData) {
        self.quantities.insert(quantity, value);
    }

    /// List of available physical state quantities, in flattening order
    pub fn available_quantities(&self) -> Vec<PhysicalQuantity> {
        self.quantities.keys().copied().collect()
    }

    /// Iterate over quantities in flattening order
    pub fn iter(&self) -> impl Iterator<Item = (&PhysicalQuantity, &PhysicalData)> {
        self.quantities.iter()
    }

    /// Get a metadata
    pub fn get_metadata(&self, key: &str) -> Option<f64> {
        self.metadata.get(key).copied()
    }

    /// Set a metadata
    pub fn set_metadata(&mut self, key: impl Into<String>, value: f64) {
        self.metadata.insert(key.into(), value);
    }

    /// Total number of stored values
    pub fn dimension(&self) -> usize {
        self.quantities.values().map(PhysicalData::len).sum()
    }

    /// Flatten into one dense vector, remembering how to undo it
    pub fn flatten(&self) -> (DVector<f64>, StateLayout) {
        let mut values = Vec::with_capacity(self.dimension());
        let mut entries = Vec::with_capacity(self.quantities.len());

        for (quantity, data) in &self.quantities {
            values.extend_from_slice(data.as_slice());
            entries.push((*quantity, data.is_scalar(), data.len()));
        }

        (DVector::from_vec(values), StateLayout { entries })
    }
}

// =================================================================================================
// Flat layout
// =================================================================================================

/// How a [`PhysicalState`] maps onto a flat vector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateLayout {
    /// (quantity, is scalar, length) in flattening order
    entries: Vec<(PhysicalQuantity, bool, usize)>,
}

impl StateLayout {
    /// Length of the flat vector
    pub fn dimension(&self) -> usize {
        self.entries.iter().map(|(_, _, len)| len).sum()
    }

    /// Rebuild a state from a flat vector laid out by [`PhysicalState::flatten`]
    ///
    /// # Panics
    ///
    /// Panics when `values` does not have [`StateLayout::dimension`] entries.
    pub fn unflatten(&self, values: &DVector<f64>) -> PhysicalState {
        assert_eq!(values.len(), self.dimension(), "flat vector does not match layout");

        let mut state = PhysicalState::empty();
        let mut offset = 0;
        for &(quantity, is_scalar, len) in &self.entries {
            let data = if is_scalar {
                PhysicalData::Scalar(values[offset])
            } else {
                PhysicalData::from_vector(values.rows(offset, len).into_owned())
            };
            state.set(quantity, data);
            offset += len;
        }
        state
    }
}

// Operator overloading for numerical operations

impl std::ops::Add for PhysicalState {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self::Output {
        for (quantity, value) in rhs.quantities {
            match self.quantities.remove(&quantity) {
                Some(existing) => {
                    self.quantities.insert(quantity, existing + value);
                }
                None => {
                    self.quantities.insert(quantity, value);
                }
            }
        }
        self
    }
}

impl std::ops::Mul<f64> for PhysicalState {
    type Output = Self;

    fn mul(mut self, scalar: f64) -> Self::Output {
        for data in self.quantities.values_mut() {
            data.apply(|x| x * scalar);
        }
        self
    }
}

// ==================================================================================================
// Physical Model Trait
// =================================================================================================

/// Trait for physical models
///
/// # Responsibility
/// Computes the right-hand side of dy/dt = f(y) at a given state.
/// Does NOT integrate it (that's the Solver's job).
pub trait PhysicalModel: Send + Sync {
    /// Number of bins (or spatial points)
    ///
    /// Used by the solver to allocate vectors
    fn points(&self) -> usize;

    /// Time derivative of every quantity at `state`
    ///
    /// The returned state has the same quantities and shapes as the input.
    fn compute_physics(&self, state: &PhysicalState) -> PhysicalState;

    /// Creates the initial state for this physical model
    fn setup_initial_state(&self) -> PhysicalState;

    /// Name of the model (used to display and logging)
    fn name(&self) -> &str;

    /// Description of the model (option)
    fn description(&self) -> Option<&String> {
        None
    }

    /// Project an integrated state back onto the admissible set
    ///
    /// Called by solvers after every accepted step. The default does nothing.
    fn enforce_constraints(&self, _state: &mut PhysicalState) {}
}
