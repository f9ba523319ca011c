//! CSV export of parcel trajectories
//!
//! One row per output time, readable by pandas, spreadsheets and most
//! analysis tools.
//!
//! # Layout
//!
//! ```csv
//! time,r0,r1,...,r29,temp,press,z,S
//! 0.000000e0,1.853441e-8,...,2.800000e2,9.000000e4,0.000000e0,9.500000e-1
//! ```
//!
//! Radii in m, temperature in K, pressure in Pa, height in m, `S` is the
//! ambient saturation ratio.
//!
//! ## With Metadata
//!
//! ```csv
//! # Droplet Growth Parcel Data
//! # Generated: 2026-10-18T09:30:00+00:00
//! # Model: Droplet Growth Parcel
//! # Solver: Rosenbrock (ode23s)
//! # Updraft: 1 m/s
//! # Bins: 30
//! #
//! time,r0,...
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use super::{Exporter, downsample_indices};
use crate::error::MicrophysicsError;
use crate::simulation::ParcelTrajectory;

// =============================================================================
// Errors
// =============================================================================

/// Errors of the CSV exporter
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("cannot write CSV file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid CSV configuration: {0}")]
    InvalidConfig(String),

    #[error("trajectory has no records")]
    EmptyTrajectory,
}

impl From<CsvError> for MicrophysicsError {
    fn from(error: CsvError) -> Self {
        match error {
            CsvError::Io(io) => MicrophysicsError::Io(io),
            other => MicrophysicsError::configuration("output", other.to_string()),
        }
    }
}

// =============================================================================
// Configuration Structures
// =============================================================================

/// How numbers are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Notation {
    /// `1.853441e-8`; radii stay readable at any precision
    #[default]
    Scientific,

    /// `0.000000`
    Fixed,
}

/// Configuration for CSV export
///
/// # Example
///
/// ```rust
/// use dropgrow_rs::output::export::CsvConfig;
///
/// let config = CsvConfig::european().precision(10);
/// assert_eq!(config.delimiter, ';');
/// ```
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// Column delimiter (default: ',')
    pub delimiter: char,

    /// Decimal separator (default: '.')
    pub decimal_separator: char,

    /// Digits after the decimal point (default: 6)
    pub precision: usize,

    pub notation: Notation,

    /// Include metadata header comments (default: false)
    pub include_metadata: bool,

    /// Metadata to include in header; built from the trajectory when `None`
    pub metadata: Option<CsvMetadata>,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            decimal_separator: '.',
            precision: 6,
            notation: Notation::Scientific,
            include_metadata: false,
            metadata: None,
        }
    }
}

impl CsvConfig {
    /// Semicolon delimiter, comma as decimal separator
    pub fn european() -> Self {
        Self {
            delimiter: ';',
            decimal_separator: ',',
            ..Default::default()
        }
    }

    /// Builder pattern: set delimiter
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Builder pattern: set precision
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn notation(mut self, notation: Notation) -> Self {
        self.notation = notation;
        self
    }

    /// Builder pattern: enable metadata
    pub fn with_metadata(mut self, metadata: CsvMetadata) -> Self {
        self.include_metadata = true;
        self.metadata = Some(metadata);
        self
    }

    fn validate(&self) -> Result<(), CsvError> {
        if self.delimiter == self.decimal_separator {
            return Err(CsvError::InvalidConfig(format!(
                "delimiter and decimal separator are both '{}'",
                self.delimiter
            )));
        }
        Ok(())
    }
}

/// Metadata for CSV header comments
///
/// Only fields that are set are written.
#[derive(Debug, Clone, Default)]
pub struct CsvMetadata {
    pub model_name: Option<String>,

    pub solver_name: Option<String>,

    /// Updraft velocity \[m/s\]
    pub updraft: Option<f64>,

    /// Number of droplet bins
    pub bins: Option<usize>,

    /// Additional key/value lines
    pub custom: Vec<(String, String)>,
}

impl CsvMetadata {
    /// Metadata recorded by the solver run
    pub fn from_trajectory(trajectory: &ParcelTrajectory) -> Self {
        let mut metadata = Self {
            model_name: trajectory.metadata.get("model").cloned(),
            solver_name: Some(trajectory.solver.clone()),
            updraft: trajectory.metadata.get("updraft").and_then(|w| w.parse().ok()),
            bins: Some(trajectory.bins()),
            custom: Vec::new(),
        };

        for key in ["accepted steps", "rejected steps", "function evaluations"] {
            if let Some(value) = trajectory.metadata.get(key) {
                metadata.add_custom(key, value);
            }
        }
        metadata
    }

    /// Add custom parameter
    pub fn add_custom(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.custom.push((key.into(), value.into()));
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn write_metadata_header(out: &mut impl Write, metadata: &CsvMetadata) -> std::io::Result<()> {
    writeln!(out, "# Droplet Growth Parcel Data")?;
    writeln!(out, "# Generated: {}", chrono::Utc::now().to_rfc3339())?;

    if let Some(model) = &metadata.model_name {
        writeln!(out, "# Model: {model}")?;
    }
    if let Some(solver) = &metadata.solver_name {
        writeln!(out, "# Solver: {solver}")?;
    }
    if let Some(w) = metadata.updraft {
        writeln!(out, "# Updraft: {w} m/s")?;
    }
    if let Some(bins) = metadata.bins {
        writeln!(out, "# Bins: {bins}")?;
    }
    for (key, value) in &metadata.custom {
        writeln!(out, "# {key}: {value}")?;
    }

    writeln!(out, "#")
}

/// Format number with configured precision, notation and decimal separator
fn format_number(value: f64, config: &CsvConfig) -> String {
    let formatted = match config.notation {
        Notation::Scientific => format!("{:.prec$e}", value, prec = config.precision),
        Notation::Fixed => format!("{:.prec$}", value, prec = config.precision),
    };

    if config.decimal_separator != '.' {
        formatted.replace('.', &config.decimal_separator.to_string())
    } else {
        formatted
    }
}

// =============================================================================
// Exporter
// =============================================================================

/// CSV writer for [`ParcelTrajectory`]
#[derive(Debug, Clone, Default)]
pub struct CsvExporter {
    pub config: CsvConfig,
}

impl CsvExporter {
    pub fn new(config: CsvConfig) -> Self {
        Self { config }
    }

    /// Column names: `time`, `r0`..`r{n-1}`, `temp`, `press`, `z`, `S`
    pub fn column_names(bins: usize) -> Vec<String> {
        let mut names = Vec::with_capacity(bins + 5);
        names.push("time".to_string());
        names.extend((0..bins).map(|i| format!("r{i}")));
        names.extend(["temp", "press", "z", "S"].map(String::from));
        names
    }

    /// Write to any sink; [`Exporter::export`] opens the file and calls this
    pub fn write_to(
        &self,
        out: &mut impl Write,
        trajectory: &ParcelTrajectory,
        n_points: Option<usize>,
    ) -> Result<(), CsvError> {
        // ============================= Validation =============================

        self.config.validate()?;
        if trajectory.is_empty() {
            return Err(CsvError::EmptyTrajectory);
        }
        if matches!(n_points, Some(n) if n < 2) {
            return Err(CsvError::InvalidConfig("n_points must be at least 2".to_string()));
        }

        let config = &self.config;
        let bins = trajectory.bins();
        let delimiter = config.delimiter.to_string();

        // ============================= Write Metadata =========================

        if config.include_metadata {
            let metadata = config
                .metadata
                .clone()
                .unwrap_or_else(|| CsvMetadata::from_trajectory(trajectory));
            write_metadata_header(out, &metadata)?;
        }

        // ============================= Write Header ===========================

        writeln!(out, "{}", Self::column_names(bins).join(&delimiter))?;

        // ============================= Write Data =============================

        for index in downsample_indices(trajectory.len(), n_points) {
            let record = &trajectory.records[index];
            if record.radii.len() != bins {
                return Err(CsvError::InvalidConfig(format!(
                    "record {index} has {} radii, expected {bins}",
                    record.radii.len()
                )));
            }

            let row: Vec<String> = std::iter::once(record.time)
                .chain(record.radii.iter().copied())
                .chain([record.temperature, record.pressure, record.height, record.saturation])
                .map(|v| format_number(v, config))
                .collect();
            writeln!(out, "{}", row.join(&delimiter))?;
        }

        out.flush()?;
        Ok(())
    }
}

impl Exporter for CsvExporter {
    type Error = CsvError;

    fn export(&self, trajectory: &ParcelTrajectory, n_points: Option<usize>, path: &Path) -> Result<(), CsvError> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_to(&mut out, trajectory, n_points)
    }
}

// =================================================================================================
// Tests
// =================================================================================================
