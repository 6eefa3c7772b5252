//! Continuous nonlinear minimization.
//!
//! A problem is an objective, an initial point, optional bounds, and
//! optional inequality (`g(x) >= 0`) or equality (`h(x) = 0`)
//! constraints. [`minimize`] checks the chosen [`Method`] against the
//! problem before running anything.
//!
//! # Backends
//!
//! - [`Method::Cobyla`]: always built, through the pure-Rust `cobyla` crate
//! - [`Method::Slsqp`], [`Method::LBfgsB`], [`Method::NelderMead`]: NLopt,
//!   behind the `nlopt` feature
//!
//! The remaining methods are catalogued with their capabilities so that
//! a configuration naming them fails with a precise error.
//! [`Method::default_constrained`] picks SLSQP when it is built and
//! COBYLA otherwise.
//!
//! # References
//!
//! - Powell (1994), "A direct search optimization method that models the
//!   objective and constraint functions by linear interpolation"
//! - Kraft (1988), "A software package for sequential quadratic programming"
//! - Nocedal & Wright (2006), "Numerical Optimization", ch. 18

mod cobyla_backend;
mod config;
mod error;
mod method;
mod minimizer;
#[cfg(feature = "nlopt")]
mod nlopt_backend;
mod problem;

pub use config::NlpConfig;
pub use error::NlpError;
pub use method::{Capabilities, Method};
pub use minimizer::{minimize, NlpResult};
pub use problem::{ConstraintKind, NlpConstraint, NlpProblem, ScalarFn};
