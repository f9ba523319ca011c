//! Convergence tests for the time integrators
//!
//! Halving the step must shrink the error by the order of the method, and
//! the adaptive Rosenbrock solver must meet its tolerance on a stiff decay.

use dropgrow_rs::physics::PhysicalQuantity;
use dropgrow_rs::solver::{
    EulerSolver, RK4Solver, Rosenbrock23Solver, Scenario, Solver, SolverConfiguration, uniform_grid,
};

mod common;
use common::{ConstantGrowth, ExponentialDecay, final_value, relative_error};

fn fixed_step_errors(solver: &dyn Solver, total_time: f64, steps_list: &[usize]) -> Vec<f64> {
    let decay_rate = 0.3;
    steps_list
        .iter()
        .map(|&steps| {
            let model = ExponentialDecay::new(5, decay_rate);
            let exact = model.analytical_solution(total_time);
            let scenario = Scenario::from_model(Box::new(model));

            let config = SolverConfiguration::time_evolution(total_time, steps);
            let result = solver.solve(&scenario, &config).unwrap();
            (final_value(&result, PhysicalQuantity::Radius) - exact).abs()
        })
        .collect()
}

#[test]
fn test_euler_first_order_convergence() {
    let errors = fixed_step_errors(&EulerSolver::new(), 10.0, &[100, 200, 400, 800]);

    for pair in errors.windows(2) {
        let ratio = pair[0] / pair[1];
        assert!(ratio > 1.8 && ratio < 2.2, "Convergence ratio {ratio} not first-order");
    }
}

#[test]
fn test_rk4_fourth_order_convergence() {
    let errors = fixed_step_errors(&RK4Solver::new(), 5.0, &[10, 20, 40, 80]);

    for pair in errors.windows(2) {
        let ratio = pair[0] / pair[1];
        assert!(ratio > 12.0 && ratio < 20.0, "Convergence ratio {ratio} not fourth-order");
    }
}

#[test]
fn test_all_methods_exact_for_constant_growth() {
    let solvers: [(Box<dyn Solver>, SolverConfiguration); 3] = [
        (Box::new(EulerSolver::new()), SolverConfiguration::time_evolution(50.0, 7)),
        (Box::new(RK4Solver::new()), SolverConfiguration::time_evolution(50.0, 7)),
        (
            Box::new(Rosenbrock23Solver::new()),
            SolverConfiguration::adaptive(uniform_grid(50.0, 10.0), 1e-6, 1e-9, 1000),
        ),
    ];

    for (solver, config) in &solvers {
        let scenario = Scenario::from_model(Box::new(ConstantGrowth { rate: -0.0065, start: 288.15 }));
        let result = solver.solve(&scenario, config).unwrap();
        let temperature = final_value(&result, PhysicalQuantity::Temperature);

        assert!(
            (temperature - (288.15 - 0.0065 * 50.0)).abs() < 1e-9,
            "{} drifted: {temperature}",
            solver.name()
        );
    }
}

#[test]
fn test_rosenbrock_stiff_decay_meets_tolerance() {
    // k = 2000 would need over 4000 RK4 steps for stability on [0, 5]
    let model = ExponentialDecay::new(3, 2000.0);
    let scenario = Scenario::from_model(Box::new(model));
    let config = SolverConfiguration::adaptive(vec![0.0, 1e-3, 5.0], 1e-4, 1e-10, 20_000);

    let result = Rosenbrock23Solver::new().solve(&scenario, &config).unwrap();

    assert_eq!(result.time_points, vec![0.0, 1e-3, 5.0]);
    let at_1ms = result.state_trajectory[1].get(PhysicalQuantity::Radius).unwrap().as_slice()[0];
    assert!(relative_error(at_1ms, (-2.0f64).exp()) < 1e-2, "r(1 ms) = {at_1ms}");
    assert!(final_value(&result, PhysicalQuantity::Radius).abs() < 1e-7);

    let accepted: usize = result.metadata["accepted steps"].parse().unwrap();
    assert!(accepted < 4000, "{accepted} steps for a stiff decay");
}

#[test]
fn test_rosenbrock_tolerance_reduces_error() {
    let errors: Vec<f64> = [1e-3, 1e-6]
        .iter()
        .map(|&rtol| {
            let model = ExponentialDecay::new(1, 0.3);
            let exact = model.analytical_solution(10.0);
            let scenario = Scenario::from_model(Box::new(model));
            let config = SolverConfiguration::adaptive(vec![0.0, 10.0], rtol, 1e-12, 100_000);
            let result = Rosenbrock23Solver::new().solve(&scenario, &config).unwrap();
            (final_value(&result, PhysicalQuantity::Radius) - exact).abs()
        })
        .collect();

    assert!(errors[1] < errors[0] / 10.0, "errors {errors:?}");
    assert!(errors[1] < 1e-4);
}
