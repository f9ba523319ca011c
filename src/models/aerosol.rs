//! Discretized lognormal aerosol population
//!
//! The aerosol mass distribution is split into mass bins with log-spaced
//! edges. Each bin carries its centre mass, the aerosol mass it holds and the
//! matching number of particles, all per unit mass of air.
//!
//! # Discretization
//!
//! ```text
//! pdf(x)   = 1/(x σ √(2π)) · exp(-(ln x - ln μ)² / (2σ²))
//! m_i      = (x_i + x_{i+1}) / 2
//! M_i      = total · pdf(m_i) · (x_{i+1} - x_i)       (midpoint rule)
//! n_i      = M_i / m_i
//! ```
//!
//! The sum of `M_i` only approaches `total` as the bins get finer and the
//! edges cover the bulk of the lognormal.

use std::f64::consts::PI;

use crate::error::{MicrophysicsError, Result};

/// Lognormal probability density of `x` for log-mean `mu` and log-standard deviation `sigma`
///
/// `mu` is the natural log of the median, as in the usual parameterisation.
pub fn lognormal(x: f64, mu: f64, sigma: f64) -> f64 {
    let z = x.ln() - mu;
    (-(z * z) / (2.0 * sigma * sigma)).exp() / (x * sigma * (2.0 * PI).sqrt())
}

/// `n + 1` edges `10^linspace(log10_min, log10_max, n + 1)`
///
/// ```rust
/// use dropgrow_rs::models::log_spaced_edges;
///
/// let edges = log_spaced_edges(-20.0, -16.0, 4);
/// assert_eq!(edges.len(), 5);
/// assert!((edges[1] - 1e-19).abs() < 1e-33);
/// ```
pub fn log_spaced_edges(log10_min: f64, log10_max: f64, n: usize) -> Vec<f64> {
    let step = (log10_max - log10_min) / n as f64;
    (0..=n)
        .map(|k| 10f64.powf(log10_min + step * k as f64))
        .collect()
}

/// Radius of a solid sphere of mass `mass` and density `density`
pub fn dry_radius(mass: f64, density: f64) -> f64 {
    (mass / (4.0 / 3.0 * PI * density)).cbrt()
}

/// One aerosol mass bin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassBin {
    /// Arithmetic centre of the bin edges \[kg\]
    pub center_mass: f64,

    /// Aerosol mass held by the bin \[kg per kg of air\]
    pub mass_density: f64,

    /// Particles in the bin \[per kg of air\]
    pub number_density: f64,
}

/// Frozen set of aerosol bins
#[derive(Debug, Clone, PartialEq)]
pub struct MassBinDistribution {
    bins: Vec<MassBin>,
    edges: Vec<f64>,
    total_mass: f64,
}

impl MassBinDistribution {
    pub fn bins(&self) -> &[MassBin] {
        &self.bins
    }

    /// Bin edges, one more than the number of bins
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Total mass the distribution was normalized to
    pub fn total_mass(&self) -> f64 {
        self.total_mass
    }

    pub fn center_masses(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.center_mass).collect()
    }

    pub fn number_densities(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.number_density).collect()
    }

    /// Sum of the per-bin mass densities
    pub fn discretized_mass(&self) -> f64 {
        self.bins.iter().map(|b| b.mass_density).sum()
    }

    /// Dry radius of every bin for a solute of density `density`
    pub fn dry_radii(&self, density: f64) -> Vec<f64> {
        self.bins
            .iter()
            .map(|b| dry_radius(b.center_mass, density))
            .collect()
    }
}

/// Discretize a lognormal aerosol mass distribution onto `edges`
///
/// # Arguments
///
/// * `edges` - strictly increasing, positive bin edges \[kg\]
/// * `mean_mass` - lognormal mean mass μ \[kg\]; the log-mean is `ln μ`
/// * `sigma_log` - log-standard deviation σ
/// * `total_mass` - mass to distribute \[kg per kg of air\]
///
/// # Errors
///
/// `Configuration` when any argument is out of range.
pub fn build_lognormal_distribution(
    edges: &[f64],
    mean_mass: f64,
    sigma_log: f64,
    total_mass: f64,
) -> Result<MassBinDistribution> {
    if edges.len() < 2 {
        return Err(MicrophysicsError::configuration(
            "edges",
            format!("need at least 2 bin edges, got {}", edges.len()),
        ));
    }
    if edges.iter().any(|e| !(*e > 0.0) || !e.is_finite()) {
        return Err(MicrophysicsError::configuration("edges", "bin edges must be positive and finite"));
    }
    if edges.windows(2).any(|w| w[1] <= w[0]) {
        return Err(MicrophysicsError::configuration("edges", "bin edges must be strictly increasing"));
    }
    if !(mean_mass > 0.0) {
        return Err(MicrophysicsError::configuration("themean", format!("must be positive, got {mean_mass}")));
    }
    if !(sigma_log > 0.0) {
        return Err(MicrophysicsError::configuration("sd", format!("log-standard deviation must be positive, got {sigma_log}")));
    }
    if !(total_mass >= 0.0) {
        return Err(MicrophysicsError::configuration("totmass", format!("must not be negative, got {total_mass}")));
    }

    let mu = mean_mass.ln();

    let bins: Vec<MassBin> = edges
        .windows(2)
        .map(|w| {
            let center_mass = 0.5 * (w[0] + w[1]);
            let mass_density = total_mass * lognormal(center_mass, mu, sigma_log) * (w[1] - w[0]);
            MassBin {
                center_mass,
                mass_density,
                number_density: mass_density / center_mass,
            }
        })
        .collect();

    let distribution = MassBinDistribution {
        bins,
        edges: edges.to_vec(),
        total_mass,
    };

    let captured = distribution.discretized_mass();
    log::info!(
        "aerosol distribution: {} bins, {:.4e} of {:.4e} kg/kg captured",
        distribution.len(),
        captured,
        total_mass
    );
    if total_mass > 0.0 && (captured - total_mass).abs() > 0.05 * total_mass {
        log::warn!(
            "bins capture {:.1}% of the aerosol mass; widen the edges or add bins",
            100.0 * captured / total_mass
        );
    }

    Ok(distribution)
}
