//! Köhler equilibrium over a solution droplet
//!
//! ```text
//! a      = 2σ / (Rv · T · ρl)                 curvature (Kelvin) term [m]
//! n_s    = m · i / Ms                          solute moles
//! n_w    = (4/3) π r³ ρl / Mw                  water moles
//! S(r,m) = n_w / (n_s + n_w) · exp(a / r)
//! ```
//!
//! The approximate form `S ≈ 1 + a/r - b·m/r³`, with
//! `b = i·Mw / ((4/3) π ρl Ms)`, gives the critical point used as a sanity
//! check: `S* - 1 = sqrt(4a³ / (27 b m))` at `r* = sqrt(3 b m / a)`.

use std::f64::consts::PI;

use crate::config::{AerosolSpeciesConstants, ParcelConstants};
use crate::error::{MicrophysicsError, Result};
use crate::solver::roots::{RootOptions, find_root};
use crate::thermo::constants::{RHOL, RV};

/// Starting guess of the equilibrium search (0.1 µm)
pub const EQUILIBRIUM_GUESS_RADIUS: f64 = 0.1e-6;

/// Köhler curve of one aerosol species at the parcel's initial temperature
///
/// Plain data: copy it freely into parallel runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Koehler {
    van_hoff: f64,
    ms: f64,
    mw: f64,
    /// Curvature term \[m\]
    a: f64,
}

impl Koehler {
    pub fn new(aerosol: &AerosolSpeciesConstants, parcel: &ParcelConstants) -> Self {
        Self {
            van_hoff: aerosol.van_hoff,
            ms: aerosol.ms,
            mw: aerosol.mw,
            a: curvature(aerosol.sigma, parcel.t_init),
        }
    }

    /// Equilibrium saturation ratio over a droplet of radius `radius` \[m\]
    /// holding `mass` \[kg\] of dissolved aerosol
    ///
    /// # Errors
    ///
    /// [`MicrophysicsError::InvalidRadius`] when `radius` is not strictly
    /// positive and finite. Callers keep radii above the dry radius.
    pub fn saturation(&self, radius: f64, mass: f64) -> Result<f64> {
        if !(radius > 0.0) || !radius.is_finite() {
            return Err(MicrophysicsError::InvalidRadius { radius });
        }
        Ok(self.evaluate(radius, mass))
    }

    /// Curvature coefficient `a` \[m\]
    pub fn curvature(&self) -> f64 {
        self.a
    }

    /// S(r, m) for a radius already known to be positive
    pub(crate) fn evaluate(&self, radius: f64, mass: f64) -> f64 {
        let ns = mass * self.van_hoff / self.ms;
        let nw = 4.0 / 3.0 * PI * radius.powi(3) * RHOL / self.mw;
        nw / (ns + nw) * (self.a / radius).exp()
    }
}

fn curvature(sigma: f64, temperature: f64) -> f64 {
    2.0 * sigma / (RV * temperature * RHOL)
}

// =================================================================================================
// Approximate form
// =================================================================================================

/// Coefficients of `S ≈ 1 + a/r - b·m/r³`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KoehlerCoefficients {
    /// Curvature term \[m\]
    pub a: f64,

    /// Solute term \[m³/kg\]
    pub b: f64,
}

impl KoehlerCoefficients {
    /// Peak supersaturation `S* - 1` for aerosol mass `mass`
    pub fn critical_supersaturation(&self, mass: f64) -> f64 {
        (4.0 * self.a.powi(3) / (27.0 * self.b * mass)).sqrt()
    }

    /// Radius of the Köhler peak for aerosol mass `mass`
    pub fn critical_radius(&self, mass: f64) -> f64 {
        (3.0 * self.b * mass / self.a).sqrt()
    }

    /// Approximate saturation ratio
    pub fn approximate_saturation(&self, radius: f64, mass: f64) -> f64 {
        1.0 + self.a / radius - self.b * mass / radius.powi(3)
    }
}

/// `(a, b)` for the approximate Köhler curve
pub fn find_koehler_coeffs(aerosol: &AerosolSpeciesConstants, parcel: &ParcelConstants) -> KoehlerCoefficients {
    KoehlerCoefficients {
        a: curvature(aerosol.sigma, parcel.t_init),
        b: aerosol.van_hoff * aerosol.mw / (4.0 / 3.0 * PI * RHOL * aerosol.ms),
    }
}

// =================================================================================================
// Equilibrium radius
// =================================================================================================

/// Radius at which a droplet carrying `mass` is in equilibrium with `target_saturation`
///
/// Solves `target - S(exp(x), m) = 0` for `x = ln r`, bracketing around
/// `ln(0.1 µm)`. Below 100 % there is one root; between 100 % and the
/// critical saturation the search returns whichever branch it brackets first.
///
/// ```rust
/// use dropgrow_rs::config::{AerosolSpeciesConstants, ParcelConstants};
/// use dropgrow_rs::models::{Koehler, find_equilibrium_radius};
///
/// let koehler = Koehler::new(&AerosolSpeciesConstants::default(), &ParcelConstants::default());
/// let radius = find_equilibrium_radius(0.95, 1e-18, &koehler)?;
/// assert!((koehler.saturation(radius, 1e-18)? - 0.95).abs() < 1e-9);
/// # Ok::<(), dropgrow_rs::error::MicrophysicsError>(())
/// ```
pub fn find_equilibrium_radius(target_saturation: f64, mass: f64, koehler: &Koehler) -> Result<f64> {
    let residual = |log_radius: f64| target_saturation - koehler.evaluate(log_radius.exp(), mass);
    let log_radius = find_root(residual, EQUILIBRIUM_GUESS_RADIUS.ln(), &RootOptions::default())?;
    Ok(log_radius.exp())
}
