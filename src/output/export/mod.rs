//! Export of parcel trajectories
//!
//! # Architecture
//!
//! The [`Exporter`] trait abstracts the file format. Each format lives in its
//! own sub-module; adding one means adding a file.
//!
//! # Available formats
//!
//! | Format | Module  |
//! |--------|---------|
//! | CSV    | [`csv`] |
//!
//! # Usage example
//!
//! ```rust,ignore
//! use dropgrow_rs::output::export::{CsvExporter, Exporter};
//!
//! let exporter = CsvExporter::default();
//!
//! // every output time
//! exporter.export(&trajectory, None, Path::new("dropgrow.csv"))?;
//!
//! // 10 rows, first and last included
//! exporter.export(&trajectory, Some(10), Path::new("dropgrow_light.csv"))?;
//! ```

pub mod csv;

pub use csv::{CsvConfig, CsvError, CsvExporter, CsvMetadata, Notation};

use std::path::Path;

use crate::simulation::ParcelTrajectory;

/// Abstraction trait for all export formats
///
/// # Associated type `Error`
///
/// Each format reports its own errors, so callers can match on them without
/// downcasting a boxed error.
///
/// # Parameter `n_points`
///
/// - `None`: every record
/// - `Some(n)`: `n` records spread uniformly over the trajectory, always
///   including the first and the last
pub trait Exporter {
    /// Error type specific to this export format
    type Error: std::error::Error;

    /// Write `trajectory` to `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the trajectory is empty, the options are
    /// inconsistent or the file cannot be written.
    fn export(&self, trajectory: &ParcelTrajectory, n_points: Option<usize>, path: &Path) -> Result<(), Self::Error>;
}

/// Indices of `n_points` records spread over `len`, first and last included
pub(crate) fn downsample_indices(len: usize, n_points: Option<usize>) -> Vec<usize> {
    match n_points {
        Some(n) if n >= 2 && n < len => (0..n).map(|i| i * (len - 1) / (n - 1)).collect(),
        _ => (0..len).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downsample_keeps_ends() {
        assert_eq!(downsample_indices(31, Some(4)), vec![0, 10, 20, 30]);
        assert_eq!(downsample_indices(5, Some(3)), vec![0, 2, 4]);
    }

    #[test]
    fn test_downsample_without_reduction() {
        assert_eq!(downsample_indices(3, None), vec![0, 1, 2]);
        assert_eq!(downsample_indices(3, Some(10)), vec![0, 1, 2]);
        assert!(downsample_indices(0, None).is_empty());
    }
}
