//! Moist thermodynamics primitives
//!
//! Saturation vapor pressure, latent heat and the usual derived quantities
//! (mixing ratios, potential temperatures, lifting condensation level) for
//! air parcels in the ~200–320 K range. Inversions that have no closed form
//! (moist adiabat temperature, θe inversion, temperature at a given
//! saturation mixing ratio) go through [`crate::solver::roots::find_root`].
//!
//! # Units
//!
//! Temperatures in K, pressures in Pa, mixing ratios in kg/kg.
//!
//! # Example
//!
//! ```rust
//! use dropgrow_rs::thermo::{esat, find_rsat};
//!
//! let e = esat(&[300.0, 310.0]);
//! assert!((e[0] - 3534.52).abs() < 0.01);
//!
//! let rs = find_rsat(300.0, 8.0e4);
//! assert!(rs > 0.02 && rs < 0.03);
//! ```

pub mod constants;

use crate::error::{MicrophysicsError, Result};
use crate::solver::roots::{RootOptions, find_root};
use constants::*;

// =================================================================================================
// Vapor pressure and latent heat
// =================================================================================================

#[inline]
pub(crate) fn esat_kelvin(temperature: f64) -> f64 {
    let celsius = temperature - TC;
    BOLTON_E0 * (BOLTON_A * celsius / (celsius + BOLTON_B)).exp()
}

/// Saturation vapor pressure over a flat water surface (Pa)
///
/// Bolton (1980) fit, Emanuel 4.4.14. Works over a slice so that scalar and
/// profile callers share one signature; a scalar caller passes `&[t]`.
pub fn esat(temperatures: &[f64]) -> Vec<f64> {
    temperatures.iter().map(|&t| esat_kelvin(t)).collect()
}

/// Latent heat of vaporization at `temperature` (J/kg)
pub fn find_lv(temperature: f64) -> f64 {
    LV0 - (CL - CPV) * (temperature - TC)
}

/// Saturation mixing ratio (kg/kg)
pub fn find_rsat(temperature: f64, pressure: f64) -> f64 {
    let e = esat_kelvin(temperature);
    EPS * e / (pressure - e)
}

/// Potential temperature, optionally corrected for vapor mixing ratio `rv`
pub fn find_theta(temperature: f64, pressure: f64, rv: f64) -> f64 {
    let power = RD / CPD * (1.0 - 0.24 * rv);
    temperature * (P0 / pressure).powf(power)
}

/// Dew point temperature for vapor mixing ratio `rv` at `pressure`
pub fn find_td(rv: f64, pressure: f64) -> f64 {
    let e = rv * pressure / (EPS + rv);
    let denom = BOLTON_A / (e / BOLTON_E0).ln() - 1.0;
    BOLTON_B / denom + TC
}

// =================================================================================================
// Lifting condensation level and equivalent potential temperatures
// =================================================================================================

/// Temperature and pressure at the lifting condensation level
///
/// Empirical Bolton (1980) fit for the LCL temperature, Emanuel 4.6.22/4.6.24
/// for the pressure. The parcel must be unsaturated (`dewpoint < temperature`).
pub fn find_lcl(dewpoint: f64, temperature: f64, pressure: f64) -> Result<(f64, f64)> {
    if dewpoint >= temperature {
        return Err(MicrophysicsError::configuration(
            "dewpoint",
            format!(
                "parcel is saturated at this pressure (Td = {dewpoint} K >= T = {temperature} K)"
            ),
        ));
    }

    let e = esat_kelvin(dewpoint);
    // Bolton's fit takes hPa
    let e_hpa = e * 0.01;
    let t_lcl = 2840.0 / (3.5 * temperature.ln() - e_hpa.ln() - 4.805) + 55.0;

    let r = EPS * e / (pressure - e);
    let cp = CPD + r * CPV;
    let log_plcl = pressure.ln() + cp / (RD * (1.0 + r / EPS)) * (t_lcl / temperature).ln();

    Ok((t_lcl, log_plcl.exp()))
}

fn thetae_from(temperature: f64, pressure: f64, rv: f64, t_lcl: f64) -> f64 {
    let theta = find_theta(temperature, pressure, rv);
    let thetae = theta * (rv * (1.0 + 0.81 * rv) * (3376.0 / t_lcl - 2.54)).exp();
    thetae.min(THETAE_CAP)
}

/// Pseudo equivalent potential temperature of a saturated parcel
///
/// Capped at [`THETAE_CAP`] so that rootfinding over very warm guesses
/// stays bounded.
pub fn find_thetaes(temperature: f64, pressure: f64) -> f64 {
    let rv = find_rsat(temperature, pressure);
    thetae_from(temperature, pressure, rv, temperature)
}

/// Pseudo equivalent potential temperature (Bolton θe′)
///
/// Unsaturated parcels (`dewpoint < temperature`) are lifted to their LCL;
/// otherwise the parcel is treated as exactly saturated.
pub fn find_thetaep(dewpoint: f64, temperature: f64, pressure: f64) -> f64 {
    if dewpoint < temperature {
        let t_lcl = find_lcl(dewpoint, temperature, pressure)
            .map(|(t, _)| t)
            .unwrap_or(temperature);
        let rv = find_rsat(dewpoint, pressure);
        thetae_from(temperature, pressure, rv, t_lcl)
    } else {
        find_thetaes(temperature, pressure)
    }
}

/// Split total water `rt` into vapor and liquid mixing ratios
pub fn find_rvrl(temperature: f64, rt: f64, pressure: f64) -> (f64, f64) {
    let rs = find_rsat(temperature, pressure);
    if rs > rt { (rt, 0.0) } else { (rs, rt - rs) }
}

// =================================================================================================
// Rootfinder-based inversions
// =================================================================================================

/// Temperature on the moist adiabat `thetae` at `pressure`
pub fn find_tmoist(thetae: f64, pressure: f64) -> Result<f64> {
    find_root(
        |t| find_thetaes(t, pressure) - thetae,
        TC,
        &RootOptions::default(),
    )
}

/// Temperature, vapor and liquid mixing ratio of a parcel with equivalent
/// potential temperature `thetae` and total water `rt` at `pressure`
pub fn tinvert_thetae(thetae: f64, rt: f64, pressure: f64) -> Result<(f64, f64, f64)> {
    if pressure > P0 {
        return Err(MicrophysicsError::configuration(
            "pressure",
            format!("expecting a pressure level below {P0} Pa, got {pressure} Pa"),
        ));
    }

    let residual = |t: f64| {
        let (rv, _) = find_rvrl(t, rt, pressure);
        let td = find_td(rv, pressure);
        thetae - find_thetaep(td, t, pressure)
    };

    let temperature = find_root(residual, TC, &RootOptions::default())?;
    let (rv, rl) = find_rvrl(temperature, rt, pressure);
    Ok((temperature, rv, rl))
}

/// Temperature at which the saturation mixing ratio equals `rsat`
///
/// The search starts from `t_start`.
pub fn find_temperature_for_rsat(t_start: f64, rsat: f64, pressure: f64) -> Result<f64> {
    find_root(
        |t| rsat - find_rsat(t, pressure),
        t_start,
        &RootOptions::default(),
    )
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_esat_reference_values() {
        let e = esat(&[300.0, 310.0]);
        assert_abs_diff_eq!(e[0], 3534.51966, epsilon = 1e-2);
        assert_abs_diff_eq!(e[1], 6235.53218, epsilon = 1e-2);
    }

    #[test]
    fn test_esat_empty_input() {
        assert!(esat(&[]).is_empty());
    }

    #[test]
    fn test_latent_heat_decreases_with_temperature() {
        assert_abs_diff_eq!(find_lv(TC), LV0, epsilon = 1e-9);
        assert!(find_lv(300.0) < find_lv(280.0));
    }

    #[test]
    fn test_theta() {
        assert_abs_diff_eq!(find_theta(300.0, 8.0e4, 0.0), 319.72798, epsilon = 1e-4);
        assert_abs_diff_eq!(find_theta(300.0, 8.0e4, 0.001), 319.72309, epsilon = 1e-4);
    }

    #[test]
    fn test_dewpoint() {
        assert_abs_diff_eq!(find_td(0.001, 8.0e4), 253.39429, epsilon = 1e-4);
    }

    #[test]
    fn test_lcl() {
        let (t_lcl, p_lcl) = find_lcl(280.0, 300.0, 8.0e4).unwrap();
        assert_abs_diff_eq!(t_lcl, 275.7625, epsilon = 1e-3);
        assert_abs_diff_eq!(p_lcl, 59518.928, epsilon = 1e-1);
    }

    #[test]
    fn test_lcl_rejects_saturated_parcel() {
        let err = find_lcl(300.0, 280.0, 8.0e4).unwrap_err();
        assert!(matches!(err, MicrophysicsError::Configuration { .. }));
    }

    #[test]
    fn test_thetaep() {
        // unsaturated
        assert_abs_diff_eq!(find_thetaep(280.0, 300.0, 8.0e4), 344.998307, epsilon = 1e-5);
        // saturated
        assert_abs_diff_eq!(find_thetaep(300.0, 280.0, 8.0e4), 321.53029, epsilon = 1e-5);
    }

    #[test]
    fn test_thetaes_and_cap() {
        assert_abs_diff_eq!(find_thetaes(300.0, 8.0e4), 412.9736, epsilon = 1e-4);
        assert_eq!(find_thetaes(320.0, 5.0e4), THETAE_CAP);
    }

    #[test]
    fn test_rvrl() {
        let (rv, rl) = find_rvrl(250.0, 0.01, 8.0e4);
        assert_abs_diff_eq!(rv * 1e3, 0.7433, epsilon = 1e-4);
        assert_abs_diff_eq!(rl * 1e3, 9.2567, epsilon = 1e-4);

        let (rv, rl) = find_rvrl(305.0, 0.01, 8.0e4);
        assert_eq!(rv, 0.01);
        assert_eq!(rl, 0.0);
    }

    #[test]
    fn test_tmoist() {
        assert_abs_diff_eq!(find_tmoist(300.0, 8.0e4).unwrap(), 270.59591, epsilon = 1e-4);
        assert_abs_diff_eq!(find_tmoist(330.0, 8.0e4).unwrap(), 282.92999, epsilon = 1e-4);
    }

    #[test]
    fn test_tinvert_thetae() {
        let (t, rv, rl) = tinvert_thetae(300.0, 0.001, 8.0e4).unwrap();
        assert_abs_diff_eq!(t, 278.40505, epsilon = 1e-4);
        assert_abs_diff_eq!(rv, 0.001, epsilon = 1e-12);
        assert_eq!(rl, 0.0);
    }

    #[test]
    fn test_tinvert_thetae_rejects_high_pressure() {
        assert!(tinvert_thetae(300.0, 0.001, 1.02e5).is_err());
    }

    #[test]
    fn test_temperature_for_rsat_inverts_rsat() {
        let rs = find_rsat(285.0, 9.0e4);
        let t = find_temperature_for_rsat(280.0, rs, 9.0e4).unwrap();
        assert_abs_diff_eq!(t, 285.0, epsilon = 1e-6);
    }
}
