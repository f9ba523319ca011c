//! Scalar root isolation and refinement
//!
//! Two steps, used by every nonlinear inversion in the crate:
//!
//! 1. [`find_interval`] widens a symmetric interval around a starting guess
//!    until the function changes sign.
//! 2. [`fzero`] refines a root inside that interval with Brent's method
//!    using hyperbolic extrapolation.
//!
//! [`find_root`] chains the two.
//!
//! # Example
//!
//! ```rust
//! use dropgrow_rs::solver::roots::{find_interval, fzero, RootOptions};
//!
//! let bracket = find_interval(f64::sin, 12.0)?;
//! let root = fzero(f64::sin, bracket, &RootOptions::default())?;
//! assert!((root - 4.0 * std::f64::consts::PI).abs() < 1e-9);
//! # Ok::<(), dropgrow_rs::error::MicrophysicsError>(())
//! ```

use crate::error::{MicrophysicsError, Result};

/// Number of times the search interval is widened before giving up
pub const MAX_EXPANSIONS: usize = 40;

/// Tolerances and iteration budget for [`fzero`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootOptions {
    /// Absolute tolerance on the root
    pub xtol: f64,

    /// Relative tolerance on the root
    pub rtol: f64,

    /// Maximum number of refinement iterations
    pub max_iterations: usize,
}

impl Default for RootOptions {
    fn default() -> Self {
        Self {
            xtol: 2e-12,
            rtol: 4.0 * f64::EPSILON,
            max_iterations: 100,
        }
    }
}

impl RootOptions {
    /// Builder pattern: set absolute tolerance
    pub fn xtol(mut self, xtol: f64) -> Self {
        self.xtol = xtol;
        self
    }

    /// Builder pattern: set iteration budget
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Find an interval around `x0` over which `f` changes sign
///
/// The half-width starts at `x0 / 50` (`1 / 50` when `x0` is zero) and grows by
/// √2 before every evaluation. The returned pair is ordered `left < right`.
///
/// # Errors
///
/// [`MicrophysicsError::BracketNotFound`] after [`MAX_EXPANSIONS`] attempts.
pub fn find_interval<F>(mut f: F, x0: f64) -> Result<(f64, f64)>
where
    F: FnMut(f64) -> f64,
{
    let mut dx = if x0 == 0.0 { 1.0 / 50.0 } else { x0 / 50.0 };
    let (mut a, mut b) = (x0, x0);

    for _ in 0..MAX_EXPANSIONS {
        dx *= std::f64::consts::SQRT_2;
        a = x0 - dx;
        b = x0 + dx;
        if f(a) * f(b) < 0.0 {
            return Ok((a.min(b), a.max(b)));
        }
    }

    Err(MicrophysicsError::BracketNotFound {
        x0,
        left: a.min(b),
        right: a.max(b),
        iterations: MAX_EXPANSIONS,
    })
}

/// Refine a root of `f` inside `bracket`
///
/// Brent's method with hyperbolic extrapolation: each iteration tries an
/// interpolation step and falls back to bisection when the step would leave
/// the bracket or shrink too slowly.
///
/// # Errors
///
/// - [`MicrophysicsError::InvalidBracket`] when `f` has the same sign at both ends
/// - [`MicrophysicsError::RootDidNotConverge`] when the iteration budget runs out
pub fn fzero<F>(mut f: F, bracket: (f64, f64), options: &RootOptions) -> Result<f64>
where
    F: FnMut(f64) -> f64,
{
    let (mut xpre, mut xcur) = bracket;
    let mut fpre = f(xpre);
    let mut fcur = f(xcur);

    if fpre == 0.0 {
        return Ok(xpre);
    }
    if fcur == 0.0 {
        return Ok(xcur);
    }
    if fpre.signum() == fcur.signum() || fpre.is_nan() || fcur.is_nan() {
        return Err(MicrophysicsError::InvalidBracket {
            left: bracket.0,
            right: bracket.1,
            f_left: fpre,
            f_right: fcur,
        });
    }

    let (mut xblk, mut fblk) = (0.0_f64, 0.0_f64);
    let (mut spre, mut scur) = (0.0_f64, 0.0_f64);

    for _ in 0..options.max_iterations {
        if fpre != 0.0 && fcur != 0.0 && fpre.signum() != fcur.signum() {
            xblk = xpre;
            fblk = fpre;
            spre = xcur - xpre;
            scur = spre;
        }

        // keep the best estimate in xcur
        if fblk.abs() < fcur.abs() {
            xpre = xcur;
            xcur = xblk;
            xblk = xpre;
            fpre = fcur;
            fcur = fblk;
            fblk = fpre;
        }

        let delta = (options.xtol + options.rtol * xcur.abs()) / 2.0;
        let sbis = (xblk - xcur) / 2.0;

        if fcur == 0.0 || sbis.abs() < delta {
            return Ok(xcur);
        }

        if spre.abs() > delta && fcur.abs() < fpre.abs() {
            let stry = if xpre == xblk {
                // secant
                -fcur * (xcur - xpre) / (fcur - fpre)
            } else {
                let dpre = (fpre - fcur) / (xpre - xcur);
                let dblk = (fblk - fcur) / (xblk - xcur);
                -fcur * (fblk - fpre) / (fblk * dpre - fpre * dblk)
            };

            if 2.0 * stry.abs() < spre.abs().min(3.0 * sbis.abs() - delta) {
                spre = scur;
                scur = stry;
            } else {
                spre = sbis;
                scur = sbis;
            }
        } else {
            spre = sbis;
            scur = sbis;
        }

        xpre = xcur;
        fpre = fcur;
        if scur.abs() > delta {
            xcur += scur;
        } else {
            xcur += if sbis > 0.0 { delta } else { -delta };
        }
        fcur = f(xcur);
    }

    Err(MicrophysicsError::RootDidNotConverge {
        left: bracket.0,
        right: bracket.1,
        iterations: options.max_iterations,
    })
}

/// Bracket a root around `x0`, then refine it
pub fn find_root<F>(mut f: F, x0: f64, options: &RootOptions) -> Result<f64>
where
    F: FnMut(f64) -> f64,
{
    let bracket = find_interval(&mut f, x0)?;
    fzero(f, bracket, options)
}

// =================================================================================================
// Tests
// =================================================================================================
