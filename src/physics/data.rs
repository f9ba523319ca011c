//! Physical data types
//!
//! A parcel carries two shapes of data: one value per droplet bin (radii)
//! and single values for the bulk thermodynamic state (temperature,
//! pressure, height). [`PhysicalData`] covers both.

use nalgebra::DVector;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "parallel")]
use crate::solver::parallel_threshold;

/// Physical data container: scalar or vector
///
/// # Examples
///
/// ```rust
/// use dropgrow_rs::physics::PhysicalData;
///
/// let radii = PhysicalData::from_vec(vec![1.0e-7, 2.0e-7, 4.0e-7]);
/// let temperature = PhysicalData::Scalar(280.0);
///
/// assert_eq!(radii.len(), 3);
/// assert_eq!(temperature.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicalData {
    /// Single value, e.g. parcel temperature
    Scalar(f64),

    /// One value per bin
    Vector(DVector<f64>),
}

impl PhysicalData {
    // ======================================= constructors =======================================

    pub fn from_scalar(value: f64) -> Self {
        Self::Scalar(value)
    }

    pub fn from_vec(vector: Vec<f64>) -> Self {
        Self::Vector(DVector::from_vec(vector))
    }

    pub fn from_vector(vector: DVector<f64>) -> Self {
        Self::Vector(vector)
    }

    /// Create uniform vector
    pub fn uniform_vector(size: usize, value: f64) -> Self {
        Self::Vector(DVector::from_element(size, value))
    }

    // ========================================== Queries ==========================================

    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    /// Number of stored values (1 for a scalar)
    pub fn len(&self) -> usize {
        match self {
            PhysicalData::Scalar(_) => 1,
            PhysicalData::Vector(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values as a slice, scalar included
    pub fn as_slice(&self) -> &[f64] {
        match self {
            PhysicalData::Scalar(value) => std::slice::from_ref(value),
            PhysicalData::Vector(v) => v.as_slice(),
        }
    }

    /// Mutable values as a slice, scalar included
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        match self {
            PhysicalData::Scalar(value) => std::slice::from_mut(value),
            PhysicalData::Vector(v) => v.as_mut_slice(),
        }
    }

    /// True when every value is finite
    pub fn is_finite(&self) -> bool {
        self.as_slice().iter().all(|x| x.is_finite())
    }

    // ======================================== Extractions ========================================

    /// Try to extract as a scalar
    pub fn try_as_scalar(&self) -> Option<f64> {
        match self {
            PhysicalData::Scalar(value) => Some(*value),
            _ => None,
        }
    }

    /// Try to extract as a DVector
    pub fn try_as_vector(&self) -> Option<&DVector<f64>> {
        match self {
            PhysicalData::Vector(value) => Some(value),
            _ => None,
        }
    }

    // ====================================== Apply functions ======================================

    /// Apply a function f to every value
    ///
    /// Vectors longer than [`crate::solver::parallel_threshold`] are processed with rayon when
    /// the `parallel` feature is enabled.
    pub fn apply<F>(&mut self, f: F)
    where
        F: Fn(f64) -> f64 + Sync + Send,
    {
        match self {
            PhysicalData::Scalar(value) => *value = f(*value),

            PhysicalData::Vector(values) => {
                #[cfg(feature = "parallel")]
                if values.len() > parallel_threshold() {
                    values.as_mut_slice().par_iter_mut().for_each(|x| *x = f(*x));
                    return;
                }
                values.iter_mut().for_each(|x| *x = f(*x));
            }
        }
    }
}

// ================================== Simple arithmetic functions ==================================

impl std::ops::Add for PhysicalData {
    type Output = PhysicalData;
    fn add(self, rhs: Self) -> Self::Output {
        use PhysicalData::*;
        match (self, rhs) {
            (Scalar(x), Scalar(y)) => Scalar(x + y),
            (Scalar(x), Vector(y)) | (Vector(y), Scalar(x)) => Vector(y.map(|e| e + x)),
            (Vector(x), Vector(y)) => {
                assert_eq!(x.len(), y.len(), "Vector length must match");
                Vector(x + y)
            }
        }
    }
}

impl std::ops::Mul<f64> for PhysicalData {
    type Output = PhysicalData;
    fn mul(self, scalar: f64) -> Self::Output {
        match self {
            PhysicalData::Scalar(x) => PhysicalData::Scalar(x * scalar),
            PhysicalData::Vector(x) => PhysicalData::Vector(x * scalar),
        }
    }
}

// ============================================ Tests ============================================
