//! The fixed formulations: each builds a model, hands it to a solver,
//! and renders the outcome as text.

pub mod box_volume;
pub mod suko;
pub mod sudoku;
pub mod textbook;
