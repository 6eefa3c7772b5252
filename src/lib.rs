//! Formulate-solve-report pipelines over three optimization paradigms.
//!
//! - **NLP**: box of maximal volume under a surface-area budget, solved by
//!   COBYLA (`cobyla` crate) or, with the `nlopt` feature, SLSQP.
//! - **MIP**: a battery of small integer programs handed to `microlp`.
//! - **CP**: 9×9 Sudoku and the Suko/Sujiko sum puzzles as all-different
//!   and linear constraints, solved by backtracking with propagation.
//!
//! # Architecture
//!
//! Modeling layers ([`nlp`], [`lp`], [`cp`]) know nothing about the
//! problems. Each formulation in [`problems`] builds a model, calls a
//! solver through the module's trait or entry point, and receives an
//! [`Outcome`]. Rendering to text stays in [`problems`]; the binaries
//! only parse flags, set up logging, and print.

pub mod cp;
pub mod lp;
pub mod nlp;
pub mod problems;

mod outcome;

pub use outcome::Outcome;
