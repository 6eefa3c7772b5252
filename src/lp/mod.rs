//! Integer linear programming.
//!
//! [`MipModel`] collects integer variables, linear constraints, and a
//! linear objective. [`MipSolver`] is the seam to the solving engine;
//! [`MicrolpSolver`] hands the model to the `microlp` crate.

mod error;
mod model;
mod solver;

pub use error::MipError;
pub use model::{Cmp, IntVarDef, LinearConstraint, LinearExpr, MipModel, Sense, VarId};
pub use solver::{Assignment, MicrolpSolver, MipSolver};
