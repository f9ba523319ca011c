//! End-to-end parcel runs
//!
//! Ammonium sulphate aerosol with a 0.05 µm mean radius lifted at 1 m/s from
//! 280 K, 900 hPa and 95 % relative humidity.

use dropgrow_rs::models::ParcelModel;
use dropgrow_rs::simulation::{ParcelTrajectory, Tolerances, integrate, run, sweep_updrafts};
use dropgrow_rs::solver::uniform_grid;

mod common;
use common::{reference_config, relative_error};

fn reference_run() -> (ParcelModel, ParcelTrajectory) {
    let config = reference_config();
    let model = ParcelModel::from_config(&config).unwrap();
    let grid = uniform_grid(300.0, 10.0);
    let trajectory = integrate(&model, &grid, &Tolerances::default()).unwrap();
    (model, trajectory)
}

#[test]
fn test_reference_parcel_run() {
    let (model, trajectory) = reference_run();

    assert_eq!(trajectory.len(), 31);
    assert_eq!(trajectory.bins(), 30);
    assert_eq!(trajectory.solver, "Rosenbrock (ode23s)");

    // ====== Initial equilibrium ======

    let first = trajectory.first().unwrap();
    assert!((first.saturation - 0.95).abs() < 1e-9);
    for (r, dry) in first.radii.iter().zip(model.dry_radii().iter()) {
        assert!(r > dry, "wet radius {r} not above dry radius {dry}");
        assert!(*r < 5e-6);
    }
    assert!(relative_error(first.radii[0], 1.853e-8) < 1e-3);

    // ====== Parcel thermodynamics ======

    for pair in trajectory.records.windows(2) {
        assert!(pair[1].temperature < pair[0].temperature, "parcel warmed at t = {}", pair[1].time);
        assert!(pair[1].pressure < pair[0].pressure);
    }

    for record in &trajectory.records {
        assert!((record.height - record.time).abs() < 1e-6);
        for (r, dry) in record.radii.iter().zip(model.dry_radii().iter()) {
            assert!(r >= dry, "bin below dry radius at t = {}", record.time);
        }
    }

    let last = trajectory.last().unwrap();
    assert!(last.temperature > 277.5 && last.temperature < 278.5, "T = {}", last.temperature);
    assert!(last.pressure > 86_000.0 && last.pressure < 87_500.0, "p = {}", last.pressure);

    // ====== Activation ======

    let peak = trajectory.max_saturation().unwrap();
    assert!(peak > 1.0 && peak < 1.01, "peak saturation {peak}");
    assert!(last.saturation > 0.99);
    assert!(last.radii[29] > first.radii[29]);
}

#[test]
fn test_water_and_energy_budget() {
    let (model, trajectory) = reference_run();
    let number_densities = model.number_densities();

    for record in &trajectory.records {
        assert!(relative_error(record.total_water(number_densities), model.total_water()) < 1e-9);
    }

    // condensation heating balances the latent heat carried by the vapour
    let first = trajectory.first().unwrap().moist_static_energy();
    let last = trajectory.last().unwrap().moist_static_energy();
    assert!(relative_error(last, first) < 1e-3, "moist static energy {first} -> {last}");

    let liquid: Vec<f64> = trajectory.records.iter().map(|r| r.liquid_water(number_densities)).collect();
    assert!(liquid.last().unwrap() > liquid.first().unwrap());
}

#[test]
fn test_parcel_at_rest_stays_in_equilibrium() {
    let model = ParcelModel::from_config(&reference_config()).unwrap().with_updraft(0.0);
    let trajectory = integrate(&model, &uniform_grid(100.0, 50.0), &Tolerances::default()).unwrap();

    let first = trajectory.first().unwrap();
    let last = trajectory.last().unwrap();
    assert!((last.temperature - 280.0).abs() < 1e-6);
    assert!((last.saturation - 0.95).abs() < 1e-6);
    assert!(last.height.abs() < 1e-12);
    for (r_end, r_start) in last.radii.iter().zip(&first.radii) {
        assert!(relative_error(*r_end, *r_start) < 1e-3);
    }

    let number_densities = model.number_densities();
    for record in &trajectory.records {
        assert!(
            relative_error(record.total_water(number_densities), model.total_water()) < 1e-9,
            "water not conserved at t = {}",
            record.time
        );
    }
}

#[test]
fn test_stronger_updraft_reaches_higher_supersaturation() {
    let model = ParcelModel::from_config(&reference_config()).unwrap();
    let grid = uniform_grid(120.0, 20.0);
    let runs = sweep_updrafts(&model, &[0.5, 2.0], &grid, &Tolerances::default()).unwrap();

    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].metadata["updraft"], "0.5");
    assert_eq!(runs[1].metadata["updraft"], "2");

    let slow = runs[0].max_saturation().unwrap();
    let fast = runs[1].max_saturation().unwrap();
    assert!(fast > slow, "w = 2 peaked at {fast}, w = 0.5 at {slow}");
    assert!((runs[1].last().unwrap().height - 240.0).abs() < 1e-6);
}

#[test]
fn test_configured_run_writes_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dropgrow.csv");

    let mut config = reference_config();
    config.integration.tend = 60.0;
    config.integration.dt = 20.0;
    config.output.dump_output = true;
    config.output.output_file = Some(path.clone());

    let trajectory = run(&config).unwrap();
    assert_eq!(trajectory.len(), 4);

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 5);

    let header: Vec<&str> = lines[0].split(',').collect();
    assert_eq!(header.len(), 35);
    assert_eq!(header[0], "time");
    assert_eq!(header[1], "r0");
    assert_eq!(&header[31..], ["temp", "press", "z", "S"]);

    let last_time: f64 = lines[4].split(',').next().unwrap().parse().unwrap();
    assert_eq!(last_time, 60.0);
}

#[test]
fn test_json_configuration_run() {
    let json = r#"{
        "aerosol": {
            "themean": 9.2939e-19, "sd": 2.0, "totmass": 1e-10,
            "Sigma": 0.075, "vanHoff": 2.0, "Ms": 132.0, "Mw": 18.0, "rhoaero": 1775.0
        },
        "initial_conditions": { "Tinit": 280.0, "Pinit": 90000.0, "Sinit": 0.95, "wvel": 1.0 },
        "integration": { "dt": 10.0, "tend": 30.0 },
        "bins": { "count": 12 }
    }"#;

    let config = dropgrow_rs::config::DropGrowConfig::from_json_str(json).unwrap();
    let trajectory = run(&config).unwrap();

    assert_eq!(trajectory.bins(), 12);
    assert_eq!(trajectory.times(), vec![0.0, 10.0, 20.0, 30.0]);
}
