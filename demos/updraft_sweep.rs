//! Example: how updraft speed controls droplet activation
//!
//! Runs the same aerosol population at several updraft velocities and
//! reports the peak supersaturation and the number of activated bins, i.e.
//! bins whose final radius exceeds their Köhler critical radius.
//!
//! ```bash
//! cargo run --release --example updraft_sweep --features parallel
//! ```

use dropgrow_rs::config::{AerosolConfig, AerosolSpeciesConstants, ParcelConstants};
use dropgrow_rs::models::{ParcelModel, build_lognormal_distribution, find_koehler_coeffs, log_spaced_edges};
use dropgrow_rs::simulation::{Tolerances, sweep_updrafts};
use dropgrow_rs::solver::uniform_grid;

use std::time::Instant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let species = AerosolSpeciesConstants::default();
    let aerosol = AerosolConfig::from_mean_radius(0.05e-6, 2.0, 1e-10, species);
    let parcel = ParcelConstants::default();

    let edges = log_spaced_edges(-20.0, -16.0, 30);
    let distribution = build_lognormal_distribution(&edges, aerosol.themean, aerosol.sigma_log(), aerosol.totmass)?;
    let model = ParcelModel::new(distribution, species, parcel)?;

    let coefficients = find_koehler_coeffs(&species, &parcel);
    let critical_radii: Vec<f64> = model.masses().iter().map(|&m| coefficients.critical_radius(m)).collect();

    let velocities = [0.25, 0.5, 1.0, 2.0, 4.0];
    let grid = uniform_grid(400.0, 20.0);

    println!("═══════════════════════════════════════════════════════");
    println!("  Updraft Sweep: {} velocities, {} bins", velocities.len(), model.masses().len());
    println!("═══════════════════════════════════════════════════════\n");

    let started = Instant::now();
    let runs = sweep_updrafts(&model, &velocities, &grid, &Tolerances::default())?;
    println!("Completed in {:.2?}\n", started.elapsed());

    println!("  w [m/s]   peak S-1 [%]   activated bins   activated drops [/kg]");
    for (w, trajectory) in velocities.iter().zip(&runs) {
        let peak = trajectory.max_saturation().unwrap_or(f64::NAN);
        let Some(last) = trajectory.last() else { continue };

        let activated: Vec<usize> = last
            .radii
            .iter()
            .zip(&critical_radii)
            .enumerate()
            .filter(|(_, (r, rc))| r > rc)
            .map(|(bin, _)| bin)
            .collect();
        let drops: f64 = activated.iter().map(|&bin| model.number_densities()[bin]).sum();

        println!(
            "  {:>7.2}   {:>12.4}   {:>14}   {:>21.3e}",
            w,
            (peak - 1.0) * 100.0,
            activated.len(),
            drops
        );
    }

    Ok(())
}
