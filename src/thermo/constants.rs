//! Physical constants for moist thermodynamics
//!
//! Values follow Emanuel (1994), appendix 2. All quantities are SI.

/// 0 °C in kelvin
pub const TC: f64 = 273.15;

/// Ratio of gas constants Rd/Rv
pub const EPS: f64 = 0.622;

/// Reference pressure for potential temperature (Pa)
pub const P0: f64 = 1.0e5;

/// Latent heat of vaporization at 0 °C (J/kg)
pub const LV0: f64 = 2.501e6;

/// Gas constant for water vapor (J/kg/K)
pub const RV: f64 = 461.50;

/// Gas constant for dry air (J/kg/K)
pub const RD: f64 = 287.04;

/// Heat capacity of water vapor (J/kg/K)
pub const CPV: f64 = 1870.0;

/// Heat capacity of liquid water (J/kg/K)
pub const CL: f64 = 4190.0;

/// Heat capacity of dry air (J/kg/K)
pub const CPD: f64 = 1005.7;

/// Gravitational acceleration (m/s²)
pub const G0: f64 = 9.8;

/// Diffusivity of water vapor in air (m²/s)
///
/// Strongly dependent on temperature and pressure; this is the value at
/// 100 kPa and 10 °C.
pub const D: f64 = 2.36e-5;

/// Density of liquid water (kg/m³)
pub const RHOL: f64 = 1000.0;

// Bolton (1980) fit for saturation vapor pressure
pub(crate) const BOLTON_E0: f64 = 611.2; // Pa
pub(crate) const BOLTON_A: f64 = 17.67;
pub(crate) const BOLTON_B: f64 = 243.5; // °C

/// Upper cap on θe used by the moist-adiabat inversions
pub const THETAE_CAP: f64 = 450.0;
