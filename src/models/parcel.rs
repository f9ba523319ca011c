//! Adiabatic parcel with bin-resolved droplet growth
//!
//! # Governing Equations
//!
//! For every aerosol bin i, with radius r_i floored at its dry radius:
//!
//! ```text
//! dr_i/dt = D / (r_i ρl) · (S - S_eq(r_i, m_i)) · esat(T) / (Rv T)
//! ```
//!
//! and for the parcel:
//!
//! ```text
//! dwl/dt = Σ n_i · 4π ρl r_i² · dr_i/dt
//! dT/dt  = Lv(T)/cpd · dwl/dt - g/cpd · w
//! dp/dt  = -p/(Rd T) · g · w
//! dz/dt  = w
//! ```
//!
//! The ambient saturation ratio S is not integrated. It follows from the
//! total water mixing ratio fixed at t = 0:
//!
//! ```text
//! wl = Σ n_i · (4/3)π ρl r_i³
//! wv = wt - wl
//! e  = wv · p / (ε + wv)
//! S  = e / esat(T)
//! ```
//!
//! Number densities are per kilogram of air, so wl and wv are mixing ratios.

use std::f64::consts::PI;

use nalgebra::DVector;

use crate::config::{AerosolSpeciesConstants, DropGrowConfig, ParcelConstants};
use crate::error::{MicrophysicsError, Result};
use crate::models::aerosol::{MassBinDistribution, build_lognormal_distribution, log_spaced_edges};
use crate::models::koehler::{Koehler, find_equilibrium_radius};
use crate::physics::{PhysicalData, PhysicalModel, PhysicalQuantity, PhysicalState};
use crate::thermo::constants::{CPD, D, EPS, G0, RD, RHOL, RV};
use crate::thermo::{esat_kelvin, find_lv};

// =================================================================================================
// Parcel state
// =================================================================================================

/// Typed view of the integrated state
#[derive(Debug, Clone, PartialEq)]
pub struct ParcelState {
    /// Droplet radius per bin \[m\]
    pub radii: DVector<f64>,

    /// \[K\]
    pub temperature: f64,

    /// \[Pa\]
    pub pressure: f64,

    /// \[m\]
    pub height: f64,
}

impl ParcelState {
    /// Read a parcel state out of a solver state
    ///
    /// `None` when a quantity is missing or has the wrong shape.
    pub fn from_physical(state: &PhysicalState) -> Option<Self> {
        Some(Self {
            radii: state.vector(PhysicalQuantity::Radius)?.clone(),
            temperature: state.scalar(PhysicalQuantity::Temperature)?,
            pressure: state.scalar(PhysicalQuantity::Pressure)?,
            height: state.scalar(PhysicalQuantity::Height)?,
        })
    }

    pub fn into_physical(self) -> PhysicalState {
        let mut state = PhysicalState::new(PhysicalQuantity::Radius, PhysicalData::from_vector(self.radii));
        state.set(PhysicalQuantity::Temperature, PhysicalData::Scalar(self.temperature));
        state.set(PhysicalQuantity::Pressure, PhysicalData::Scalar(self.pressure));
        state.set(PhysicalQuantity::Height, PhysicalData::Scalar(self.height));
        state
    }
}

// =================================================================================================
// Water budget
// =================================================================================================

/// Liquid water mixing ratio `Σ n_i (4/3)π ρl r_i³` \[kg/kg\]
pub fn total_liquid_water(radii: &[f64], number_densities: &[f64]) -> f64 {
    let sum: f64 = radii
        .iter()
        .zip(number_densities)
        .map(|(r, n)| n * r.powi(3))
        .sum();
    sum * 4.0 / 3.0 * PI * RHOL
}

/// Ambient saturation ratio from the conserved total water `total_water` \[kg/kg\]
pub fn environmental_saturation(state: &ParcelState, number_densities: &[f64], total_water: f64) -> f64 {
    let wl = total_liquid_water(state.radii.as_slice(), number_densities);
    let wv = total_water - wl;
    let e = wv * state.pressure / (EPS + wv);
    e / esat_kelvin(state.temperature)
}

/// Vapor mixing ratio at saturation ratio `saturation`
pub fn vapor_mixing_ratio(saturation: f64, temperature: f64, pressure: f64) -> f64 {
    let e = saturation * esat_kelvin(temperature);
    EPS * e / (pressure - e)
}

// =================================================================================================
// Parcel model
// =================================================================================================

/// Rising parcel carrying one droplet population per aerosol bin
///
/// Everything here is fixed at construction: the bins, the Köhler curve,
/// the dry radii and the total water. Only the updraft can be changed, with
/// [`ParcelModel::with_updraft`], which keeps the same initial state.
#[derive(Debug, Clone)]
pub struct ParcelModel {
    distribution: MassBinDistribution,
    species: AerosolSpeciesConstants,
    parcel: ParcelConstants,
    koehler: Koehler,

    masses: Vec<f64>,
    number_densities: Vec<f64>,
    dry_radii: DVector<f64>,
    initial_radii: DVector<f64>,

    /// Vapor plus liquid mixing ratio \[kg/kg\]
    total_water: f64,

    description: String,
}

impl ParcelModel {
    /// Build the model and its equilibrium initial state
    ///
    /// Every bin starts at its equilibrium radius for `parcel.s_init`.
    ///
    /// # Errors
    ///
    /// - `EquilibriumRadius` (with the bin and mass) when a search fails
    /// - `Configuration` for an empty distribution or an initial vapor
    ///   pressure not below the initial pressure
    pub fn new(
        distribution: MassBinDistribution,
        species: AerosolSpeciesConstants,
        parcel: ParcelConstants,
    ) -> Result<Self> {
        if distribution.is_empty() {
            return Err(MicrophysicsError::configuration("bins", "distribution has no bins"));
        }
        if !(parcel.s_init > 0.0) {
            return Err(MicrophysicsError::configuration("Sinit", "must be positive"));
        }

        let koehler = Koehler::new(&species, &parcel);
        let masses = distribution.center_masses();
        let number_densities = distribution.number_densities();
        let dry_radii = DVector::from_vec(distribution.dry_radii(species.rho_aero));

        let mut initial_radii = DVector::zeros(masses.len());
        for (bin, &mass) in masses.iter().enumerate() {
            let radius = find_equilibrium_radius(parcel.s_init, mass, &koehler).map_err(|source| {
                MicrophysicsError::EquilibriumRadius {
                    bin,
                    mass,
                    source: Box::new(source),
                }
            })?;
            log::debug!(
                "bin {bin}: mass {mass:.3e} kg, equilibrium radius {:.4} µm at S = {}",
                radius * 1e6,
                parcel.s_init
            );
            initial_radii[bin] = radius;
        }

        let e0 = parcel.s_init * esat_kelvin(parcel.t_init);
        if e0 >= parcel.p_init {
            return Err(MicrophysicsError::configuration(
                "Pinit",
                format!("initial vapor pressure {e0:.1} Pa is not below Pinit"),
            ));
        }
        let wv0 = EPS * e0 / (parcel.p_init - e0);
        let wl0 = total_liquid_water(initial_radii.as_slice(), &number_densities);
        let total_water = wv0 + wl0;

        log::info!(
            "parcel initialized: {} bins, radii {:.4e}..{:.4e} m, total water {:.6e} kg/kg",
            masses.len(),
            initial_radii.min(),
            initial_radii.max(),
            total_water
        );

        let description = describe(masses.len(), &parcel);

        Ok(Self {
            distribution,
            species,
            parcel,
            koehler,
            masses,
            number_densities,
            dry_radii,
            initial_radii,
            total_water,
            description,
        })
    }

    /// Build the distribution described by `config` and the model on top of it
    pub fn from_config(config: &DropGrowConfig) -> Result<Self> {
        config.validate()?;

        let edges = log_spaced_edges(config.bins.log10_min_mass, config.bins.log10_max_mass, config.bins.count);
        let distribution = build_lognormal_distribution(
            &edges,
            config.aerosol.themean,
            config.aerosol.sigma_log(),
            config.aerosol.totmass,
        )?;

        Self::new(distribution, config.aerosol.species, config.initial_conditions)
    }

    /// Same parcel and initial state with another updraft velocity
    pub fn with_updraft(&self, wvel: f64) -> Self {
        let mut model = self.clone();
        model.parcel.wvel = wvel;
        model.description = describe(model.masses.len(), &model.parcel);
        model
    }

    /// Initial state: equilibrium radii and the configured T, p, z
    pub fn initial_state(&self) -> ParcelState {
        ParcelState {
            radii: self.initial_radii.clone(),
            temperature: self.parcel.t_init,
            pressure: self.parcel.p_init,
            height: self.parcel.z_init,
        }
    }

    /// Radii raised to their dry radius where needed; NaN stays NaN
    fn floored(&self, radii: &DVector<f64>) -> DVector<f64> {
        radii.zip_map(&self.dry_radii, |r, dry| if r.is_nan() { r } else { r.max(dry) })
    }

    /// Time derivative of `state`
    ///
    /// Radii below their dry radius are raised to it first, and every term
    /// uses the raised radii.
    pub fn derivative(&self, state: &ParcelState) -> ParcelState {
        let w = self.parcel.wvel;
        let temperature = state.temperature;
        let pressure = state.pressure;

        let floored = ParcelState {
            radii: self.floored(&state.radii),
            ..state.clone()
        };

        let saturation = environmental_saturation(&floored, &self.number_densities, self.total_water);
        let es = esat_kelvin(temperature);
        let vapor_density = es / (RV * temperature);

        let growth: DVector<f64> = DVector::from_iterator(
            floored.radii.len(),
            floored.radii.iter().zip(&self.masses).map(|(&r, &m)| {
                let s_eq = self.koehler.evaluate(r, m);
                D / (r * RHOL) * (saturation - s_eq) * vapor_density
            }),
        );

        let dwl_dt: f64 = floored
            .radii
            .iter()
            .zip(growth.iter())
            .zip(&self.number_densities)
            .map(|((r, dr), n)| n * r * r * dr)
            .sum::<f64>()
            * 4.0
            * PI
            * RHOL;

        ParcelState {
            radii: growth,
            temperature: find_lv(temperature) / CPD * dwl_dt - G0 / CPD * w,
            pressure: -pressure / (RD * temperature) * G0 * w,
            height: w,
        }
    }

    // ====================================== Accessors ======================================

    pub fn distribution(&self) -> &MassBinDistribution {
        &self.distribution
    }

    pub fn species(&self) -> &AerosolSpeciesConstants {
        &self.species
    }

    pub fn parcel(&self) -> &ParcelConstants {
        &self.parcel
    }

    pub fn koehler(&self) -> &Koehler {
        &self.koehler
    }

    pub fn updraft(&self) -> f64 {
        self.parcel.wvel
    }

    /// Aerosol mass per bin \[kg\]
    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    pub fn number_densities(&self) -> &[f64] {
        &self.number_densities
    }

    pub fn dry_radii(&self) -> &DVector<f64> {
        &self.dry_radii
    }

    pub fn initial_radii(&self) -> &DVector<f64> {
        &self.initial_radii
    }

    /// Conserved vapor plus liquid mixing ratio \[kg/kg\]
    pub fn total_water(&self) -> f64 {
        self.total_water
    }

    /// Ambient saturation ratio of `state`
    pub fn environmental_saturation(&self, state: &ParcelState) -> f64 {
        environmental_saturation(state, &self.number_densities, self.total_water)
    }
}

fn describe(bins: usize, parcel: &ParcelConstants) -> String {
    format!(
        "Parcel with {bins} aerosol bins, T = {} K, p = {} Pa, S = {}, w = {} m/s",
        parcel.t_init, parcel.p_init, parcel.s_init, parcel.wvel
    )
}

impl PhysicalModel for ParcelModel {
    fn points(&self) -> usize {
        self.masses.len()
    }

    fn compute_physics(&self, state: &PhysicalState) -> PhysicalState {
        match ParcelState::from_physical(state) {
            Some(parcel) if parcel.radii.len() == self.masses.len() => self.derivative(&parcel).into_physical(),
            _ => {
                log::error!("parcel state is missing a quantity or has the wrong number of bins");
                // same shape, all NaN: the solver reports it
                state.clone() * f64::NAN
            }
        }
    }

    fn setup_initial_state(&self) -> PhysicalState {
        self.initial_state().into_physical()
    }

    fn name(&self) -> &str {
        "Droplet Growth Parcel"
    }

    fn description(&self) -> Option<&String> {
        Some(&self.description)
    }

    fn enforce_constraints(&self, state: &mut PhysicalState) {
        if let Some(radii) = state.get_mut(PhysicalQuantity::Radius) {
            for (r, dry) in radii.as_mut_slice().iter_mut().zip(self.dry_radii.iter()) {
                if r.is_nan() {
                    continue;
                }
                *r = r.max(*dry);
            }
        }
    }
}

// =================================================================================================
// Tests
// =================================================================================================
