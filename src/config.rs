//! Run configuration
//!
//! A run is described by one JSON document with the same field names as the
//! classic `dropgrow` input files:
//!
//! ```json
//! {
//!   "aerosol": {
//!     "themean": 9.2939e-19, "sd": 2.0, "totmass": 1.0e-10,
//!     "Sigma": 0.075, "vanHoff": 2.0, "Ms": 132.0, "Mw": 18.0, "rhoaero": 1775.0
//!   },
//!   "initial_conditions": {
//!     "Tinit": 280.0, "Pinit": 90000.0, "Sinit": 0.95, "Zinit": 0.0, "wvel": 1.0
//!   },
//!   "integration": { "dt": 10.0, "tend": 300.0 }
//! }
//! ```
//!
//! `bins`, `output` and the solver tolerances inside `integration` are
//! optional. Everything is checked by [`DropGrowConfig::validate`] before a
//! model is built.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MicrophysicsError, Result};

// =================================================================================================
// Physical constants of the run
// =================================================================================================

/// Physicochemical constants of the aerosol species
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AerosolSpeciesConstants {
    /// Surface tension of the solution droplet \[N/m\]
    #[serde(rename = "Sigma")]
    pub sigma: f64,

    /// Van't Hoff factor (ions per solute molecule)
    #[serde(rename = "vanHoff")]
    pub van_hoff: f64,

    /// Molar mass of the solute \[kg/kmol\]
    #[serde(rename = "Ms")]
    pub ms: f64,

    /// Molar mass of water \[kg/kmol\]
    #[serde(rename = "Mw")]
    pub mw: f64,

    /// Density of the dry solute \[kg/m³\]
    #[serde(rename = "rhoaero")]
    pub rho_aero: f64,
}

impl Default for AerosolSpeciesConstants {
    /// Ammonium sulphate
    fn default() -> Self {
        Self {
            sigma: 0.075,
            van_hoff: 2.0,
            ms: 132.0,
            mw: 18.0,
            rho_aero: 1775.0,
        }
    }
}

/// Initial thermodynamic state and updraft of the parcel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParcelConstants {
    /// Initial temperature \[K\]
    #[serde(rename = "Tinit")]
    pub t_init: f64,

    /// Initial pressure \[Pa\]
    #[serde(rename = "Pinit")]
    pub p_init: f64,

    /// Initial saturation ratio
    #[serde(rename = "Sinit")]
    pub s_init: f64,

    /// Initial height \[m\]
    #[serde(rename = "Zinit", default)]
    pub z_init: f64,

    /// Constant updraft velocity \[m/s\]
    #[serde(rename = "wvel")]
    pub wvel: f64,
}

impl Default for ParcelConstants {
    fn default() -> Self {
        Self {
            t_init: 280.0,
            p_init: 9.0e4,
            s_init: 0.95,
            z_init: 0.0,
            wvel: 1.0,
        }
    }
}

// =================================================================================================
// Sections
// =================================================================================================

/// Lognormal aerosol population plus its species constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AerosolConfig {
    /// Mean aerosol mass of the lognormal \[kg\]
    pub themean: f64,

    /// Geometric standard deviation; the log-standard deviation is `ln(sd)`
    pub sd: f64,

    /// Total aerosol mass \[kg per kg of air\]
    pub totmass: f64,

    #[serde(flatten)]
    pub species: AerosolSpeciesConstants,
}

impl AerosolConfig {
    /// Population described by its mean dry radius instead of its mean mass
    ///
    /// ```rust
    /// use dropgrow_rs::config::{AerosolConfig, AerosolSpeciesConstants};
    ///
    /// let aerosol = AerosolConfig::from_mean_radius(0.05e-6, 2.0, 1e-10, AerosolSpeciesConstants::default());
    /// assert!((aerosol.themean - 9.2939e-19).abs() < 1e-22);
    /// ```
    pub fn from_mean_radius(radius: f64, sd: f64, totmass: f64, species: AerosolSpeciesConstants) -> Self {
        let themean = 4.0 / 3.0 * std::f64::consts::PI * radius.powi(3) * species.rho_aero;
        Self {
            themean,
            sd,
            totmass,
            species,
        }
    }

    /// Log-standard deviation of the lognormal
    pub fn sigma_log(&self) -> f64 {
        self.sd.ln()
    }
}

fn default_rtol() -> f64 {
    1e-6
}

fn default_atol() -> f64 {
    1e-15
}

fn default_max_steps() -> usize {
    100_000
}

/// Output grid and solver controls
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegrationConfig {
    /// Output interval \[s\]
    pub dt: f64,

    /// Final time \[s\]
    pub tend: f64,

    #[serde(default = "default_rtol")]
    pub rtol: f64,

    #[serde(default = "default_atol")]
    pub atol: f64,

    /// Cap on internal solver steps for the whole run
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            dt: 10.0,
            tend: 300.0,
            rtol: default_rtol(),
            atol: default_atol(),
            max_steps: default_max_steps(),
        }
    }
}

/// Aerosol mass bins: `count` bins with log-spaced edges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinConfig {
    pub count: usize,
    pub log10_min_mass: f64,
    pub log10_max_mass: f64,
}

impl Default for BinConfig {
    fn default() -> Self {
        Self {
            count: 30,
            log10_min_mass: -20.0,
            log10_max_mass: -16.0,
        }
    }
}

/// Where the trajectory goes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dump_output: bool,
    pub output_file: Option<PathBuf>,
}

// =================================================================================================
// Whole run
// =================================================================================================

/// Complete description of one parcel run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropGrowConfig {
    pub aerosol: AerosolConfig,

    pub initial_conditions: ParcelConstants,

    pub integration: IntegrationConfig,

    #[serde(default)]
    pub bins: BinConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl DropGrowConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("read configuration from {}", path.as_ref().display());
        Self::from_json_str(&text)
    }

    /// Pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Range checks on every field
    pub fn validate(&self) -> Result<()> {
        let aerosol = &self.aerosol;
        let species = &aerosol.species;
        let parcel = &self.initial_conditions;
        let integration = &self.integration;
        let bins = &self.bins;

        positive("themean", aerosol.themean)?;
        positive("totmass", aerosol.totmass)?;
        if !(aerosol.sd > 1.0) || !aerosol.sd.is_finite() {
            return Err(MicrophysicsError::configuration("sd", format!("must be greater than 1, got {}", aerosol.sd)));
        }

        positive("Sigma", species.sigma)?;
        positive("vanHoff", species.van_hoff)?;
        positive("Ms", species.ms)?;
        positive("Mw", species.mw)?;
        positive("rhoaero", species.rho_aero)?;

        if !(200.0..=320.0).contains(&parcel.t_init) {
            return Err(MicrophysicsError::configuration(
                "Tinit",
                format!("must be between 200 and 320 K, got {}", parcel.t_init),
            ));
        }
        positive("Pinit", parcel.p_init)?;
        if !(parcel.s_init > 0.0 && parcel.s_init <= 1.05) {
            return Err(MicrophysicsError::configuration(
                "Sinit",
                format!("must be in (0, 1.05], got {}", parcel.s_init),
            ));
        }
        finite("Zinit", parcel.z_init)?;
        finite("wvel", parcel.wvel)?;

        positive("dt", integration.dt)?;
        if !(integration.tend >= integration.dt) || !integration.tend.is_finite() {
            return Err(MicrophysicsError::configuration(
                "tend",
                format!("must be at least dt = {}, got {}", integration.dt, integration.tend),
            ));
        }
        positive("rtol", integration.rtol)?;
        positive("atol", integration.atol)?;
        if integration.max_steps == 0 {
            return Err(MicrophysicsError::configuration("max_steps", "must be greater than 0"));
        }

        if bins.count < 2 {
            return Err(MicrophysicsError::configuration(
                "count",
                format!("need at least 2 bins, got {}", bins.count),
            ));
        }
        finite("log10_min_mass", bins.log10_min_mass)?;
        finite("log10_max_mass", bins.log10_max_mass)?;
        if bins.log10_max_mass <= bins.log10_min_mass {
            return Err(MicrophysicsError::configuration(
                "log10_max_mass",
                "must be greater than log10_min_mass",
            ));
        }

        if self.output.dump_output && self.output.output_file.is_none() {
            return Err(MicrophysicsError::configuration(
                "output_file",
                "required when dump_output is set",
            ));
        }

        Ok(())
    }
}

fn positive(field: &str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(MicrophysicsError::configuration(field, format!("must be positive, got {value}")))
    }
}

fn finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(MicrophysicsError::configuration(field, format!("must be finite, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "aerosol": {
            "themean": 1.0e-17, "sd": 1.7, "totmass": 1.5e-9,
            "Sigma": 0.075, "vanHoff": 2.0, "Ms": 132.0, "Mw": 18.0, "rhoaero": 1775.0
        },
        "initial_conditions": {
            "Tinit": 280.0, "Pinit": 90000.0, "Sinit": 0.95, "Zinit": 0.0, "wvel": 0.5
        },
        "integration": { "dt": 10.0, "tend": 300.0 }
    }"#;

    fn sample() -> DropGrowConfig {
        DropGrowConfig::from_json_str(SAMPLE).unwrap()
    }

    #[test]
    fn test_parse_uses_classic_names_and_defaults() {
        let config = sample();

        assert_eq!(config.aerosol.species.van_hoff, 2.0);
        assert_eq!(config.aerosol.species.rho_aero, 1775.0);
        assert_eq!(config.initial_conditions.wvel, 0.5);
        assert_eq!(config.integration.rtol, 1e-6);
        assert_eq!(config.integration.max_steps, 100_000);
        assert_eq!(config.bins, BinConfig::default());
        assert!(!config.output.dump_output);
    }

    #[test]
    fn test_json_round_trip_keeps_field_names() {
        let config = sample();
        let text = config.to_json_string().unwrap();

        assert!(text.contains("\"vanHoff\""));
        assert!(text.contains("\"Tinit\""));
        assert_eq!(DropGrowConfig::from_json_str(&text).unwrap(), config);
    }

    #[test]
    fn test_missing_field_is_an_error() {
        let text = SAMPLE.replace("\"Pinit\": 90000.0,", "");
        let err = DropGrowConfig::from_json_str(&text).unwrap_err();
        assert!(matches!(err, MicrophysicsError::Json(_)));
    }

    #[test]
    fn test_out_of_range_values_name_the_field() {
        let mut config = sample();
        config.initial_conditions.t_init = 350.0;
        assert!(config.validate().unwrap_err().to_string().contains("Tinit"));

        let mut config = sample();
        config.aerosol.sd = 1.0;
        assert!(config.validate().unwrap_err().to_string().contains("sd"));

        let mut config = sample();
        config.initial_conditions.s_init = 1.2;
        assert!(config.validate().unwrap_err().to_string().contains("Sinit"));

        let mut config = sample();
        config.integration.tend = 5.0;
        assert!(config.validate().unwrap_err().to_string().contains("tend"));

        let mut config = sample();
        config.bins.log10_max_mass = -21.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dump_output_requires_a_file() {
        let mut config = sample();
        config.output.dump_output = true;
        assert!(config.validate().is_err());

        config.output.output_file = Some(PathBuf::from("dropgrow.csv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = DropGrowConfig::from_file(file.path()).unwrap();
        assert_eq!(config.aerosol.sd, 1.7);

        let missing = DropGrowConfig::from_file("/nonexistent/dropgrow.json");
        assert!(matches!(missing, Err(MicrophysicsError::Io(_))));
    }

    #[test]
    fn test_mean_radius_conversion() {
        let aerosol = AerosolConfig::from_mean_radius(0.05e-6, 2.0, 1e-10, AerosolSpeciesConstants::default());
        assert!((aerosol.themean - 9.2939e-19).abs() / 9.2939e-19 < 1e-4);
        assert!((aerosol.sigma_log() - 2.0_f64.ln()).abs() < 1e-15);
    }
}
