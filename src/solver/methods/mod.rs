//! Numerical methods for solving differential equations
//!
//! Concrete implementations of the [`Solver`](crate::solver::Solver) trait.
//!
//! # Available Methods
//!
//! ## Fixed step, explicit
//!
//! - **[`EulerSolver`]**: forward Euler
//!   - Order: first-order O(dt)
//!   - Cost: 1 function evaluation per step
//!   - Use: reference runs and tests
//!
//! - **[`RK4Solver`]**: classical fourth-order Runge-Kutta
//!   - Order: fourth-order O(dt⁴)
//!   - Cost: 4 function evaluations per step
//!   - Use: non-stiff systems, convergence studies
//!
//! ## Adaptive, linearly implicit
//!
//! - **[`Rosenbrock23Solver`]**: ode23s Rosenbrock pair
//!   - Order: 2(3) with error control
//!   - Cost: 3 function evaluations and one LU factorisation per attempt,
//!     plus a finite-difference Jacobian per step
//!   - Use: **parcel runs**; the droplet equations are stiff
//!
//! # Example
//!
//! ```rust
//! use dropgrow_rs::solver::{RK4Solver, Rosenbrock23Solver, Scenario, Solver, SolverConfiguration};
//! use dropgrow_rs::physics::{PhysicalData, PhysicalModel, PhysicalQuantity, PhysicalState};
//!
//! struct Lift;
//!
//! impl PhysicalModel for Lift {
//!     fn points(&self) -> usize { 1 }
//!     fn compute_physics(&self, _state: &PhysicalState) -> PhysicalState {
//!         PhysicalState::new(PhysicalQuantity::Height, PhysicalData::Scalar(1.0))
//!     }
//!     fn setup_initial_state(&self) -> PhysicalState {
//!         PhysicalState::new(PhysicalQuantity::Height, PhysicalData::Scalar(0.0))
//!     }
//!     fn name(&self) -> &str { "Lift" }
//! }
//!
//! let scenario = Scenario::from_model(Box::new(Lift));
//!
//! let fixed = RK4Solver::new().solve(&scenario, &SolverConfiguration::time_evolution(60.0, 60))?;
//! let adaptive = Rosenbrock23Solver::new().solve(
//!     &scenario,
//!     &SolverConfiguration::adaptive(vec![0.0, 30.0, 60.0], 1e-6, 1e-12, 10_000),
//! )?;
//!
//! let z_fixed = fixed.final_state.scalar(PhysicalQuantity::Height).unwrap();
//! let z_adaptive = adaptive.final_state.scalar(PhysicalQuantity::Height).unwrap();
//! assert!((z_fixed - z_adaptive).abs() < 1e-9);
//! # Ok::<(), dropgrow_rs::error::MicrophysicsError>(())
//! ```
//!
//! Every solver is stateless and can be reused for any number of runs.

mod euler;
mod rk4;
mod rosenbrock;

pub use euler::EulerSolver;
pub use rk4::RK4Solver;
pub use rosenbrock::Rosenbrock23Solver;
