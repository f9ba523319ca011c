//! Output of parcel trajectories
//!
//! ```text
//! output/
//! ├── mod.rs
//! └── export/        ← data export
//!     ├── mod.rs     ← Exporter trait
//!     └── csv.rs
//! ```
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use dropgrow_rs::output::export::{CsvConfig, CsvExporter, Exporter};
//!
//! let exporter = CsvExporter::new(CsvConfig { include_metadata: true, ..Default::default() });
//! exporter.export(&trajectory, None, Path::new("dropgrow.csv"))?;
//! ```

pub mod export;
