//! 9×9 Sudoku as a CP feasibility model.
//!
//! One integer variable per cell with domain [1, 9], an equality per
//! clue, and an all-different constraint per row, column, and 3×3
//! block. There is no objective: any satisfying grid is accepted.

use crate::cp::{CpModel, CpSolver, IntVar, ModelError, SolverConfig, SolverStatus};
use crate::Outcome;
use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

/// Grid side length.
pub const N: usize = 9;
/// Block side length.
pub const BLOCK: usize = 3;

/// Problems with a puzzle definition or its solve request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SudokuError {
    #[error("cell ({row}, {col}) holds {value}, expected 0..=9")]
    InvalidDigit { row: usize, col: usize, value: u8 },

    #[error("expected 81 cells, found {0}")]
    WrongCellCount(usize),

    #[error("unexpected character {0:?} in puzzle")]
    UnexpectedChar(char),

    #[error("invalid solver config: {0}")]
    InvalidConfig(String),

    #[error("invalid model: {0}")]
    InvalidModel(#[from] ModelError),

    #[error("solver rejected the model")]
    SolverRejected,
}

/// A 9×9 grid of digits; 0 marks an empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SudokuGrid {
    cells: [[u8; N]; N],
}

impl SudokuGrid {
    /// Wraps `cells`, rejecting values above 9.
    pub fn new(cells: [[u8; N]; N]) -> Result<Self, SudokuError> {
        for (row, line) in cells.iter().enumerate() {
            for (col, &value) in line.iter().enumerate() {
                if value > 9 {
                    return Err(SudokuError::InvalidDigit { row, col, value });
                }
            }
        }
        Ok(Self { cells })
    }

    /// The "very difficult" puzzle from 7sudoku.com used as the
    /// reference instance.
    pub fn very_difficult() -> Self {
        Self {
            cells: [
                [3, 0, 0, 0, 0, 5, 1, 0, 0],
                [0, 0, 0, 0, 7, 6, 0, 2, 0],
                [0, 4, 0, 2, 0, 0, 5, 0, 0],
                [0, 0, 0, 5, 0, 1, 0, 0, 8],
                [0, 1, 0, 0, 0, 0, 0, 5, 0],
                [2, 0, 0, 9, 0, 7, 0, 0, 0],
                [0, 0, 7, 0, 0, 2, 0, 3, 0],
                [0, 8, 0, 7, 1, 0, 0, 0, 0],
                [0, 0, 9, 3, 0, 0, 0, 0, 7],
            ],
        }
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row][col]
    }

    pub fn rows(&self) -> &[[u8; N]; N] {
        &self.cells
    }

    pub fn clue_count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&v| v != 0).count()
    }

    /// Whether every cell holds a digit.
    pub fn is_complete(&self) -> bool {
        self.cells.iter().flatten().all(|&v| v != 0)
    }
}

impl Default for SudokuGrid {
    fn default() -> Self {
        Self::very_difficult()
    }
}

/// Parses 81 cells from digits, with `0` or `.` for empty cells.
/// Whitespace and `|`, `-`, `+` separators are ignored.
impl FromStr for SudokuGrid {
    type Err = SudokuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut digits = Vec::with_capacity(N * N);
        for ch in s.chars() {
            match ch {
                '.' => digits.push(0),
                '0'..='9' => digits.push(ch as u8 - b'0'),
                c if c.is_whitespace() || matches!(c, '|' | '-' | '+') => {}
                other => return Err(SudokuError::UnexpectedChar(other)),
            }
        }
        if digits.len() != N * N {
            return Err(SudokuError::WrongCellCount(digits.len()));
        }
        let mut cells = [[0u8; N]; N];
        for (i, d) in digits.into_iter().enumerate() {
            cells[i / N][i % N] = d;
        }
        Self::new(cells)
    }
}

impl fmt::Display for SudokuGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            for v in row {
                write!(f, "{v} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

pub fn cell_name(row: usize, col: usize) -> String {
    format!("cell_{row}_{col}")
}

fn names<I: IntoIterator<Item = (usize, usize)>>(cells: I) -> Vec<String> {
    cells.into_iter().map(|(r, c)| cell_name(r, c)).collect()
}

/// Builds the CP model for `grid`.
pub fn build_model(grid: &SudokuGrid) -> CpModel {
    let mut model = CpModel::new("sudoku");

    for row in 0..N {
        for col in 0..N {
            model.add_int_var(IntVar::new(cell_name(row, col), 1, N as i64));
            let given = grid.get(row, col);
            if given > 0 {
                model.add_equal(cell_name(row, col), i64::from(given));
            }
        }
    }

    for i in 0..N {
        model.add_all_different(names((0..N).map(|j| (i, j))));
        model.add_all_different(names((0..N).map(|j| (j, i))));
    }

    for br in 0..BLOCK {
        for bc in 0..BLOCK {
            let cells = (0..BLOCK).flat_map(|i| {
                (0..BLOCK).map(move |j| (br * BLOCK + i, bc * BLOCK + j))
            });
            model.add_all_different(names(cells));
        }
    }

    model
}

/// Solves `grid` with `solver`.
///
/// The config and the model are checked first; a bad request is an
/// error rather than an outcome. `Unknown` means the search stopped
/// (time limit) without a verdict.
pub fn solve(
    grid: &SudokuGrid,
    solver: &dyn CpSolver,
    config: &SolverConfig,
) -> Result<Outcome<SudokuGrid>, SudokuError> {
    config.validate().map_err(SudokuError::InvalidConfig)?;
    let model = build_model(grid);
    model.validate()?;
    let solution = solver.solve(&model, config);

    let wrap: fn(SudokuGrid) -> Outcome<SudokuGrid> = match solution.status {
        SolverStatus::Optimal => Outcome::Optimal,
        SolverStatus::Feasible => Outcome::Feasible,
        SolverStatus::Infeasible => return Ok(Outcome::Infeasible),
        SolverStatus::ModelInvalid => return Err(SudokuError::SolverRejected),
        SolverStatus::Timeout | SolverStatus::Unknown => return Ok(Outcome::Unknown),
    };

    let mut cells = [[0u8; N]; N];
    for (row, line) in cells.iter_mut().enumerate() {
        for (col, cell) in line.iter_mut().enumerate() {
            match solution
                .value(&cell_name(row, col))
                .and_then(|v| u8::try_from(v).ok())
            {
                Some(v) => *cell = v,
                None => {
                    warn!(row, col, "solver reported a solution without this cell");
                    return Ok(Outcome::Unknown);
                }
            }
        }
    }
    Ok(wrap(SudokuGrid { cells }))
}

fn is_permutation(cells: impl Iterator<Item = u8>) -> bool {
    let mut seen = [false; N + 1];
    let mut count = 0;
    for v in cells {
        if v == 0 || v as usize > N || seen[v as usize] {
            return false;
        }
        seen[v as usize] = true;
        count += 1;
    }
    count == N
}

/// Every row, column, and block holds 1..=9 exactly once, and every clue
/// of `puzzle` is kept.
pub fn validate_solution(puzzle: &SudokuGrid, solution: &SudokuGrid) -> bool {
    let clues_kept = (0..N).all(|r| {
        (0..N).all(|c| puzzle.get(r, c) == 0 || puzzle.get(r, c) == solution.get(r, c))
    });

    clues_kept
        && (0..N).all(|i| {
            is_permutation((0..N).map(|j| solution.get(i, j)))
                && is_permutation((0..N).map(|j| solution.get(j, i)))
        })
        && (0..N).all(|b| {
            let (br, bc) = ((b / BLOCK) * BLOCK, (b % BLOCK) * BLOCK);
            is_permutation((0..N).map(|k| solution.get(br + k / BLOCK, bc + k % BLOCK)))
        })
}

/// Puzzle and solution side by side, or a notice when there is none.
pub fn render(puzzle: &SudokuGrid, outcome: &Outcome<SudokuGrid>) -> String {
    let mut out = String::new();
    match outcome.solution() {
        Some(solved) => {
            let _ = writeln!(out, "Problem            | Solution");
            for row in 0..N {
                for col in 0..N {
                    let _ = write!(out, "{} ", puzzle.get(row, col));
                }
                out.push_str(" | ");
                for col in 0..N {
                    let _ = write!(out, "{} ", solved.get(row, col));
                }
                out.push('\n');
            }
        }
        None => {
            let _ = writeln!(out, "The puzzle does not have a solution.");
        }
    }
    out
}
