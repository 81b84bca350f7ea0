//! Optimization solvers for the Skein framework.
//!
//! # Modules
//!
//! - [`evaluation`]: the [`Evaluator`] that wraps an [`Objective`] with an
//!   exact-match cache, evaluation counters, and optional sampling history
//! - [`optimizer`]: the generic [`Optimizer`] run loop, best-sample tracking,
//!   and termination predicates shared by every strategy
//! - [`cmaes`]: the CMA-ES strategy
//!
//! # Example
//!
//! ```
//! use skein_core::Objective;
//! use skein_solvers::{cmaes, evaluation::{Evaluator, Policy}, optimizer::Optimizer};
//!
//! let objective = Objective::new(4, |x| x.iter().map(|v| v * v).sum()).unwrap();
//! let config = cmaes::Config::new(None, 1.0).unwrap().with_seed(7);
//! let strategy = cmaes::CmaEs::new(&objective, &[3.0; 4], &config).unwrap();
//!
//! let mut optimizer = Optimizer::new(Evaluator::new(objective, Policy::default()), strategy).unwrap();
//! optimizer.set_acceptable_objective_value(1e-8).unwrap();
//! optimizer.set_maximal_number_of_iterations(2_000);
//! optimizer.optimize();
//!
//! assert!(optimizer.best_objective_value() <= 1e-8);
//! ```
//!
//! [`Evaluator`]: evaluation::Evaluator
//! [`Objective`]: skein_core::Objective
//! [`Optimizer`]: optimizer::Optimizer

pub mod cmaes;
pub mod evaluation;
pub mod optimizer;
