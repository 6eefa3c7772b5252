//! Constraint Programming (CP) framework.
//!
//! Provides a small model for expressing feasibility problems over
//! bounded integer variables with all-different, equality, and linear
//! sum constraints.
//!
//! # Key Components
//!
//! - **Variables**: [`IntVar`] — bounded integer decision variables
//! - **Constraints**: [`Constraint`] — AllDifferent, Equal, LinearEq
//! - **Model**: [`CpModel`] — container for variables and constraints
//! - **Solver**: [`CpSolver`] trait — interface for solver implementations
//!
//! # Design
//!
//! Models never refer to a concrete engine. [`BacktrackingSolver`] is
//! the bundled implementation; anything implementing [`CpSolver`] can
//! replace it.
//!
//! # References
//!
//! Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming"

mod model;
mod solver;
mod variables;

pub use model::{Constraint, CpModel, ModelError};
pub use solver::{
    BacktrackingSolver, CpSolution, CpSolver, SolverConfig, SolverStatus, MAX_DOMAIN_SIZE,
};
pub use variables::IntVar;
