//! Suko and Sujiko: place 1..=9 on a 3×3 grid under sum clues.
//!
//! Cells are numbered row by row:
//!
//! ```text
//! 1 2 3
//! 4 5 6
//! 7 8 9
//! ```
//!
//! Each of the four 2×2 quadrants around the centre has a target sum.
//! A Suko also colours every cell grey, yellow or pink and gives a sum
//! per colour; a Sujiko has no colours and pins a few cells instead.
//! The model is one CP variable per cell, an all-different, one linear
//! equality per sum, and an equality per pinned cell.

use crate::cp::{CpModel, CpSolver, IntVar, ModelError, SolverConfig, SolverStatus};
use crate::Outcome;
use std::fmt;
use std::fmt::Write as _;
use thiserror::Error;
use tracing::warn;

/// Number of cells.
pub const CELLS: usize = 9;

/// Cells of each quadrant: top-left, top-right, bottom-left, bottom-right.
pub const QUADRANTS: [[usize; 4]; 4] = [[1, 2, 4, 5], [2, 3, 5, 6], [4, 5, 7, 8], [5, 6, 8, 9]];

/// Width of the rule printed around each solve.
const RULE_WIDTH: usize = 43;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SukoError {
    #[error("cell {0} is outside 1..=9")]
    CellOutOfRange(usize),

    #[error("cell {cell} is pinned to {value}, expected 1..=9")]
    InvalidClue { cell: usize, value: u8 },

    #[error("invalid solver config: {0}")]
    InvalidConfig(String),

    #[error("invalid model: {0}")]
    InvalidModel(#[from] ModelError),

    #[error("solver rejected the model")]
    SolverRejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Colour {
    Grey,
    Yellow,
    Pink,
}

impl Colour {
    pub const ALL: [Colour; 3] = [Colour::Grey, Colour::Yellow, Colour::Pink];
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Colour::Grey => "grey",
            Colour::Yellow => "yellow",
            Colour::Pink => "pink",
        };
        f.write_str(name)
    }
}

/// Cell colours (cell 1 first) and the sum for each colour.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Colouring {
    pub cells: [Colour; CELLS],
    /// Sums in [`Colour::ALL`] order.
    pub sums: [i64; 3],
}

impl Colouring {
    /// Cells of `colour`, ascending.
    pub fn cells_of(&self, colour: Colour) -> Vec<usize> {
        (1..=CELLS).filter(|&c| self.cells[c - 1] == colour).collect()
    }

    pub fn sum_of(&self, colour: Colour) -> i64 {
        match colour {
            Colour::Grey => self.sums[0],
            Colour::Yellow => self.sums[1],
            Colour::Pink => self.sums[2],
        }
    }
}

/// A numbered puzzle.
///
/// # Examples
///
/// ```
/// use u_formulate::problems::suko::SukoPuzzle;
///
/// let puzzle = SukoPuzzle::number_4695();
/// assert!(puzzle.colouring.is_none());
/// assert_eq!(puzzle.clues, vec![(3, 9), (9, 7)]);
/// assert!(puzzle.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SukoPuzzle {
    pub number: u32,
    /// Sums in [`QUADRANTS`] order.
    pub quadrant_sums: [i64; 4],
    /// `None` switches the colour sums off.
    pub colouring: Option<Colouring>,
    /// `(cell, value)` pins.
    pub clues: Vec<(usize, u8)>,
}

impl SukoPuzzle {
    pub fn new(number: u32, quadrant_sums: [i64; 4]) -> Self {
        Self {
            number,
            quadrant_sums,
            colouring: None,
            clues: Vec::new(),
        }
    }

    pub fn with_colouring(mut self, cells: [Colour; CELLS], sums: [i64; 3]) -> Self {
        self.colouring = Some(Colouring { cells, sums });
        self
    }

    pub fn without_colours(mut self) -> Self {
        self.colouring = None;
        self
    }

    pub fn with_clue(mut self, cell: usize, value: u8) -> Self {
        self.clues.push((cell, value));
        self
    }

    /// Suko no. 875.
    pub fn number_875() -> Self {
        use Colour::{Grey as G, Pink as P, Yellow as Y};
        Self::new(875, [25, 26, 13, 14])
            .with_colouring([G, G, Y, P, G, Y, P, P, P], [21, 14, 10])
    }

    /// Suko no. 1392.
    pub fn number_1392() -> Self {
        use Colour::{Grey as G, Pink as P, Yellow as Y};
        Self::new(1392, [13, 18, 23, 18])
            .with_colouring([G, Y, Y, G, G, Y, G, P, P], [16, 17, 12])
    }

    /// Sujiko no. 4695: no colours, two pinned cells.
    pub fn number_4695() -> Self {
        Self::new(4695, [11, 18, 17, 23]).with_clue(3, 9).with_clue(9, 7)
    }

    /// The three reference puzzles in print order.
    pub fn reference_set() -> Vec<Self> {
        vec![Self::number_875(), Self::number_1392(), Self::number_4695()]
    }

    /// Checks clue cells and values.
    pub fn validate(&self) -> Result<(), SukoError> {
        for &(cell, value) in &self.clues {
            if !(1..=CELLS).contains(&cell) {
                return Err(SukoError::CellOutOfRange(cell));
            }
            if !(1..=9).contains(&value) {
                return Err(SukoError::InvalidClue { cell, value });
            }
        }
        Ok(())
    }

    /// Whether `values` (cell 1 first) meets every rule of the puzzle.
    pub fn is_solved_by(&self, values: &[u8; CELLS]) -> bool {
        let mut seen = [false; 10];
        for &v in values {
            if !(1..=9).contains(&v) || seen[v as usize] {
                return false;
            }
            seen[v as usize] = true;
        }
        let sum = |cells: &[usize]| cells.iter().map(|&c| i64::from(values[c - 1])).sum::<i64>();

        let quadrants_ok = QUADRANTS
            .iter()
            .zip(self.quadrant_sums)
            .all(|(cells, target)| sum(cells) == target);
        let colours_ok = self.colouring.as_ref().map_or(true, |col| {
            Colour::ALL
                .iter()
                .all(|&c| sum(&col.cells_of(c)) == col.sum_of(c))
        });
        let clues_ok = self
            .clues
            .iter()
            .all(|&(cell, value)| values.get(cell.wrapping_sub(1)) == Some(&value));

        quadrants_ok && colours_ok && clues_ok
    }
}

pub fn cell_name(cell: usize) -> String {
    format!("cell_{cell}")
}

fn names(cells: &[usize]) -> Vec<String> {
    cells.iter().map(|&c| cell_name(c)).collect()
}

/// Builds the CP model for `puzzle`.
pub fn build_model(puzzle: &SukoPuzzle) -> CpModel {
    let mut model = CpModel::new(format!("suko-{}", puzzle.number));
    let all: Vec<usize> = (1..=CELLS).collect();

    for &cell in &all {
        model.add_int_var(IntVar::new(cell_name(cell), 1, 9));
    }
    model.add_all_different(names(&all));

    for (cells, &target) in QUADRANTS.iter().zip(&puzzle.quadrant_sums) {
        model.add_sum_eq(names(cells), target);
    }

    if let Some(colouring) = &puzzle.colouring {
        for colour in Colour::ALL {
            let cells = colouring.cells_of(colour);
            // An unused colour must have sum 0; the empty sum is left out.
            if !cells.is_empty() {
                model.add_sum_eq(names(&cells), colouring.sum_of(colour));
            }
        }
    }

    for &(cell, value) in &puzzle.clues {
        model.add_equal(cell_name(cell), i64::from(value));
    }
    model
}

/// Solves `puzzle` with `solver`. Values come back in cell order.
pub fn solve(
    puzzle: &SukoPuzzle,
    solver: &dyn CpSolver,
    config: &SolverConfig,
) -> Result<Outcome<[u8; CELLS]>, SukoError> {
    puzzle.validate()?;
    config.validate().map_err(SukoError::InvalidConfig)?;
    if let Some(colouring) = &puzzle.colouring {
        if Colour::ALL
            .iter()
            .any(|&c| colouring.cells_of(c).is_empty() && colouring.sum_of(c) != 0)
        {
            return Ok(Outcome::Infeasible);
        }
    }
    let model = build_model(puzzle);
    model.validate()?;
    let solution = solver.solve(&model, config);

    let wrap: fn([u8; CELLS]) -> Outcome<[u8; CELLS]> = match solution.status {
        SolverStatus::Optimal => Outcome::Optimal,
        SolverStatus::Feasible => Outcome::Feasible,
        SolverStatus::Infeasible => return Ok(Outcome::Infeasible),
        SolverStatus::ModelInvalid => return Err(SukoError::SolverRejected),
        SolverStatus::Timeout | SolverStatus::Unknown => return Ok(Outcome::Unknown),
    };

    let mut values = [0u8; CELLS];
    for (i, slot) in values.iter_mut().enumerate() {
        match solution
            .value(&cell_name(i + 1))
            .and_then(|v| u8::try_from(v).ok())
        {
            Some(v) => *slot = v,
            None => {
                warn!(cell = i + 1, "solver reported a solution without this cell");
                return Ok(Outcome::Unknown);
            }
        }
    }
    Ok(wrap(values))
}

/// Header, one `cell = value` line per cell (or a notice), and a closing
/// rule followed by a blank line.
pub fn render(puzzle: &SukoPuzzle, outcome: &Outcome<[u8; CELLS]>) -> String {
    let rule = "═".repeat(RULE_WIDTH);
    let mut out = String::new();
    let _ = writeln!(out, "Solving problem {}", puzzle.number);
    let _ = writeln!(out, "{rule}");
    match outcome.solution() {
        Some(values) => {
            for (i, v) in values.iter().enumerate() {
                let _ = writeln!(out, "{} = {v}", i + 1);
            }
        }
        None => {
            let _ = writeln!(out, "No solution found");
        }
    }
    let _ = writeln!(out, "{rule}");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::BacktrackingSolver;
    use proptest::prelude::*;

    fn solve_default(puzzle: &SukoPuzzle) -> Outcome<[u8; CELLS]> {
        solve(puzzle, &BacktrackingSolver::new(), &SolverConfig::default()).unwrap()
    }

    /// Every arrangement of 1..=9 that solves `puzzle`.
    fn enumerate(puzzle: &SukoPuzzle) -> Vec<[u8; CELLS]> {
        fn go(
            puzzle: &SukoPuzzle,
            values: &mut [u8; CELLS],
            used: &mut [bool; 10],
            pos: usize,
            out: &mut Vec<[u8; CELLS]>,
        ) {
            if pos == CELLS {
                if puzzle.is_solved_by(values) {
                    out.push(*values);
                }
                return;
            }
            for v in 1..=9u8 {
                if !used[v as usize] {
                    used[v as usize] = true;
                    values[pos] = v;
                    go(puzzle, values, used, pos + 1, out);
                    used[v as usize] = false;
                }
            }
        }
        let mut out = Vec::new();
        go(puzzle, &mut [0; CELLS], &mut [false; 10], 0, &mut out);
        out
    }

    #[test]
    fn test_875() {
        let puzzle = SukoPuzzle::number_875();
        let outcome = solve_default(&puzzle);

        assert_eq!(outcome, Outcome::Feasible([9, 7, 8, 4, 5, 6, 3, 1, 2]));
        assert_eq!(enumerate(&puzzle), vec![[9, 7, 8, 4, 5, 6, 3, 1, 2]]);
    }

    #[test]
    fn test_1392() {
        let puzzle = SukoPuzzle::number_1392();
        let outcome = solve_default(&puzzle);

        assert_eq!(outcome, Outcome::Feasible([2, 4, 8, 6, 1, 5, 7, 9, 3]));
        assert_eq!(enumerate(&puzzle), vec![[2, 4, 8, 6, 1, 5, 7, 9, 3]]);
    }

    #[test]
    fn test_4695() {
        let puzzle = SukoPuzzle::number_4695();
        let outcome = solve_default(&puzzle);

        assert_eq!(outcome, Outcome::Feasible([5, 1, 9, 3, 2, 6, 4, 8, 7]));
        assert_eq!(enumerate(&puzzle), vec![[5, 1, 9, 3, 2, 6, 4, 8, 7]]);
    }

    #[test]
    fn test_colours_switch_off() {
        let puzzle = SukoPuzzle::number_875().without_colours();
        assert_eq!(enumerate(&puzzle).len(), 3);

        let solved = *solve_default(&puzzle).solution().unwrap();
        assert!(puzzle.is_solved_by(&solved));
    }

    #[test]
    fn test_model_shape() {
        let model = build_model(&SukoPuzzle::number_875());
        // all-different + 4 quadrants + 3 colours
        assert_eq!(model.var_count(), 9);
        assert_eq!(model.constraint_count(), 8);

        let model = build_model(&SukoPuzzle::number_4695());
        // all-different + 4 quadrants + 2 clues
        assert_eq!(model.constraint_count(), 7);
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_no_solution() {
        // Largest quadrant sum is 9 + 8 + 7 + 6 = 30.
        let puzzle = SukoPuzzle::new(1, [31, 10, 10, 10]);
        let outcome = solve_default(&puzzle);

        assert_eq!(outcome, Outcome::Infeasible);
        assert_eq!(
            render(&puzzle, &outcome),
            format!(
                "Solving problem 1\n{rule}\nNo solution found\n{rule}\n\n",
                rule = "═".repeat(43)
            )
        );
    }

    #[test]
    fn test_missing_colour_with_sum() {
        use Colour::{Grey as G, Yellow as Y};
        let puzzle = SukoPuzzle::new(2, [20, 20, 20, 20])
            .with_colouring([G, G, G, G, Y, Y, Y, Y, Y], [10, 35, 4]);
        assert_eq!(solve_default(&puzzle), Outcome::Infeasible);
    }

    #[test]
    fn test_render_lines() {
        let puzzle = SukoPuzzle::number_4695();
        let text = render(&puzzle, &solve_default(&puzzle));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Solving problem 4695");
        assert_eq!(lines[1].chars().count(), 43);
        assert_eq!(lines[2], "1 = 5");
        assert_eq!(lines[4], "3 = 9");
        assert_eq!(lines[10], "9 = 7");
        assert_eq!(lines[11], lines[1]);
        assert!(text.ends_with("\n\n"));
    }

    #[test]
    fn test_bad_clues() {
        let config = SolverConfig::default();
        let solver = BacktrackingSolver::new();

        let puzzle = SukoPuzzle::number_4695().with_clue(10, 1);
        assert_eq!(
            solve(&puzzle, &solver, &config),
            Err(SukoError::CellOutOfRange(10))
        );

        let puzzle = SukoPuzzle::number_4695().with_clue(1, 0);
        assert_eq!(
            solve(&puzzle, &solver, &config),
            Err(SukoError::InvalidClue { cell: 1, value: 0 })
        );
    }

    #[test]
    fn test_invalid_config() {
        let config = SolverConfig::default().with_time_limit_ms(-5);
        assert!(matches!(
            solve(&SukoPuzzle::number_875(), &BacktrackingSolver::new(), &config),
            Err(SukoError::InvalidConfig(_))
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        /// Sums read off any arrangement and colouring give a puzzle the
        /// solver can satisfy.
        #[test]
        fn prop_sums_of_an_arrangement_are_solvable(
            perm in Just((1..=9u8).collect::<Vec<u8>>()).prop_shuffle(),
            colour_ids in proptest::collection::vec(0usize..3, CELLS),
        ) {
            let mut values = [0u8; CELLS];
            values.copy_from_slice(&perm);
            let sum = |cells: &[usize]| cells.iter().map(|&c| i64::from(values[c - 1])).sum::<i64>();

            let mut quadrant_sums = [0i64; 4];
            for (q, cells) in QUADRANTS.iter().enumerate() {
                quadrant_sums[q] = sum(cells);
            }
            let mut colours = [Colour::Grey; CELLS];
            let mut sums = [0i64; 3];
            for (i, &id) in colour_ids.iter().enumerate() {
                colours[i] = Colour::ALL[id];
                sums[id] += i64::from(values[i]);
            }

            let puzzle = SukoPuzzle::new(0, quadrant_sums).with_colouring(colours, sums);
            prop_assert!(puzzle.is_solved_by(&values));
            let outcome = solve_default(&puzzle);
            let solved = outcome.solution();
            prop_assert!(solved.is_some());
            prop_assert!(puzzle.is_solved_by(solved.unwrap()));
        }
    }
}
