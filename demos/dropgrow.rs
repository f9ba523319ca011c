//! Example: one parcel run from a JSON configuration
//!
//! Lifts an ammonium sulphate aerosol population at 1 m/s for five minutes
//! and prints the parcel state every output interval.
//!
//! ```bash
//! cargo run --example dropgrow                      # demos/dropgrow.json
//! cargo run --example dropgrow -- my_run.json
//! ```
//!
//! **Physical System**:
//! - 30 aerosol mass bins between 1e-20 and 1e-16 kg
//! - Lognormal population, mean radius 0.05 µm, geometric spread 2
//! - Start at 280 K, 900 hPa, 95 % relative humidity

use dropgrow_rs::config::DropGrowConfig;
use dropgrow_rs::output::export::{CsvConfig, CsvExporter, Exporter};
use dropgrow_rs::models::ParcelModel;
use dropgrow_rs::simulation::{Tolerances, integrate};
use dropgrow_rs::solver::uniform_grid;

use std::path::PathBuf;
use std::time::Instant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/dropgrow.json"));

    println!("═══════════════════════════════════════════════════════");
    println!("  Droplet Growth Parcel");
    println!("═══════════════════════════════════════════════════════\n");

    let config = DropGrowConfig::from_file(&path)?;
    let aerosol = &config.aerosol;
    let parcel = &config.initial_conditions;

    println!("Configuration: {}", path.display());
    println!("  mean mass     : {:e} kg", aerosol.themean);
    println!("  spread (sd)   : {}", aerosol.sd);
    println!("  total mass    : {:e} kg/kg", aerosol.totmass);
    println!("  bins          : {}", config.bins.count);
    println!("  T, p, S       : {} K, {} Pa, {}", parcel.t_init, parcel.p_init, parcel.s_init);
    println!("  updraft       : {} m/s\n", parcel.wvel);

    // ====== Equilibrium start ======

    let model = ParcelModel::from_config(&config)?;
    println!("Initial radii (S = {}):", parcel.s_init);
    for (bin, (r, dry)) in model.initial_radii().iter().zip(model.dry_radii().iter()).enumerate().step_by(5) {
        println!("  bin {bin:>2}: {:>9.4} µm (dry {:.4} µm)", r * 1e6, dry * 1e6);
    }

    // ====== Integration ======

    let grid = uniform_grid(config.integration.tend, config.integration.dt);
    let started = Instant::now();
    let trajectory = integrate(&model, &grid, &Tolerances::from(config.integration))?;
    let elapsed = started.elapsed();

    println!("\n   time      z        T          p         S      r_max");
    for record in &trajectory.records {
        let r_max = record.radii.iter().copied().fold(0.0, f64::max);
        println!(
            "{:>7.1} {:>7.1} {:>9.3} {:>10.1} {:>9.5} {:>8.3} µm",
            record.time,
            record.height,
            record.temperature,
            record.pressure,
            record.saturation,
            r_max * 1e6
        );
    }

    if let Some(peak) = trajectory.max_saturation() {
        println!("\nPeak supersaturation: {:.3} %", (peak - 1.0) * 100.0);
    }
    println!(
        "Solver: {} ({} accepted steps, {:.2?})",
        trajectory.solver,
        trajectory.metadata.get("accepted steps").map_or("?", String::as_str),
        elapsed
    );

    // ====== Export ======

    if config.output.dump_output {
        let output = config
            .output
            .output_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("dropgrow.csv"));
        let exporter = CsvExporter::new(CsvConfig {
            include_metadata: true,
            ..Default::default()
        });
        exporter.export(&trajectory, None, &output)?;
        println!("CSV written to {}", output.display());
    }

    Ok(())
}
