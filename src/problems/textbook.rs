//! Three small integer programs (Taha, Operations Research, problem 4-38).
//!
//! Every variable is an integer in `[0, +inf)`. The programs share
//! nothing; they are solved one after another in the order a, b, c.

use crate::lp::{Assignment, Cmp, LinearExpr, MipError, MipModel, MipSolver};
use crate::Outcome;
use std::fmt::Write as _;

/// One of the three textbook programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextbookProblem {
    /// max `2x3`
    /// s.t. `-x1 + 2x2 - 2x3 >= 8`, `-x1 + x2 + x3 <= 4`, `2x1 - x2 - 4x3 <= 10`
    A,
    /// max `x1 - 3x2`
    /// s.t. `x1 - x2 <= 20`, `x1 + x2 >= 40`, `2x1 - 2x2 >= 30`
    B,
    /// min `-x1 + x2`
    /// s.t. `x1 - 4x2 >= 5`, `x1 - 3x2 <= 1`, `2x1 - 5x2 >= 1`
    C,
}

impl TextbookProblem {
    /// Solve order.
    pub const ALL: [TextbookProblem; 3] =
        [TextbookProblem::A, TextbookProblem::B, TextbookProblem::C];

    pub fn label(self) -> char {
        match self {
            TextbookProblem::A => 'a',
            TextbookProblem::B => 'b',
            TextbookProblem::C => 'c',
        }
    }
}

/// Builds the model of one program.
pub fn build_model(problem: TextbookProblem) -> MipModel {
    let mut model = MipModel::new(format!("problem-{}", problem.label()));

    match problem {
        TextbookProblem::A => {
            let x1 = model.add_int_var("x1", 0, None);
            let x2 = model.add_int_var("x2", 0, None);
            let x3 = model.add_int_var("x3", 0, None);

            model.add_constraint(
                LinearExpr::new().term(x1, -1.0).term(x2, 2.0).term(x3, -2.0),
                Cmp::Ge,
                8.0,
            );
            model.add_constraint(
                LinearExpr::new().term(x1, -1.0).term(x2, 1.0).term(x3, 1.0),
                Cmp::Le,
                4.0,
            );
            model.add_constraint(
                LinearExpr::new().term(x1, 2.0).term(x2, -1.0).term(x3, -4.0),
                Cmp::Le,
                10.0,
            );
            model.maximize(LinearExpr::new().term(x3, 2.0));
        }
        TextbookProblem::B => {
            let x1 = model.add_int_var("x1", 0, None);
            let x2 = model.add_int_var("x2", 0, None);

            model.add_constraint(LinearExpr::new().term(x1, 1.0).term(x2, -1.0), Cmp::Le, 20.0);
            model.add_constraint(LinearExpr::new().term(x1, 1.0).term(x2, 1.0), Cmp::Ge, 40.0);
            model.add_constraint(LinearExpr::new().term(x1, 2.0).term(x2, -2.0), Cmp::Ge, 30.0);
            model.maximize(LinearExpr::new().term(x1, 1.0).term(x2, -3.0));
        }
        TextbookProblem::C => {
            let x1 = model.add_int_var("x1", 0, None);
            let x2 = model.add_int_var("x2", 0, None);

            model.add_constraint(LinearExpr::new().term(x1, 1.0).term(x2, -4.0), Cmp::Ge, 5.0);
            model.add_constraint(LinearExpr::new().term(x1, 1.0).term(x2, -3.0), Cmp::Le, 1.0);
            model.add_constraint(LinearExpr::new().term(x1, 2.0).term(x2, -5.0), Cmp::Ge, 1.0);
            model.minimize(LinearExpr::new().term(x1, -1.0).term(x2, 1.0));
        }
    }

    model
}

/// Outcome of one program, ready for printing.
#[derive(Debug, Clone, PartialEq)]
pub struct LpReport {
    pub problem: TextbookProblem,
    pub outcome: Outcome<Assignment>,
}

/// Prints floats the way the textbook answers are written: `28.0`, not `28`.
fn number(v: f64) -> String {
    // -0.0 prints as "-0.0"
    let v = if v == 0.0 { 0.0 } else { v };
    format!("{v:?}")
}

fn write_assignment(out: &mut String, heading: &str, a: &Assignment) {
    let _ = writeln!(out, "{heading}");
    let _ = writeln!(out, "Objective value = {}", number(a.objective));
    for (name, value) in &a.values {
        let _ = writeln!(out, "{name} = {}", number(*value));
    }
}

impl LpReport {
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Problem ({})", self.problem.label());

        match &self.outcome {
            Outcome::Optimal(a) => write_assignment(&mut out, "Solution:", a),
            Outcome::Feasible(a) => {
                write_assignment(&mut out, "Feasible solution (optimality not proven):", a)
            }
            Outcome::Infeasible => {
                let _ = writeln!(out, "The problem does not have an optimal solution.");
            }
            Outcome::Unknown => {
                let _ = writeln!(
                    out,
                    "The problem does not have an optimal solution (solver gave no verdict)."
                );
            }
        }
        out.push('\n');
        out
    }
}

/// Solves one program.
pub fn solve(problem: TextbookProblem, solver: &dyn MipSolver) -> Result<LpReport, MipError> {
    let model = build_model(problem);
    let outcome = solver.solve(&model)?;
    Ok(LpReport { problem, outcome })
}

/// Solves a, b, c in order.
pub fn solve_all(solver: &dyn MipSolver) -> Result<Vec<LpReport>, MipError> {
    TextbookProblem::ALL
        .into_iter()
        .map(|p| solve(p, solver))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lp::MicrolpSolver;

    /// Exhaustive search over `[0, limit]^n`; returns the best objective
    /// and every maximizer (or minimizer), or `None` when nothing is feasible.
    fn enumerate(model: &MipModel, limit: i64) -> Option<(f64, Vec<Vec<f64>>)> {
        let n = model.var_count();
        let (sense, objective) = model.objective().unwrap();
        let maximize = *sense == crate::lp::Sense::Maximize;

        let mut best: Option<(f64, Vec<Vec<f64>>)> = None;
        let mut point = vec![0i64; n];
        loop {
            let values: Vec<f64> = point.iter().map(|&v| v as f64).collect();
            if model.is_feasible(&values, 0.0) {
                let obj = objective.eval(&values);
                let better = match &best {
                    None => true,
                    Some((b, _)) => {
                        if maximize {
                            obj > *b
                        } else {
                            obj < *b
                        }
                    }
                };
                if better {
                    best = Some((obj, vec![values]));
                } else if let Some((b, pts)) = best.as_mut() {
                    if obj == *b {
                        pts.push(values);
                    }
                }
            }

            let mut i = 0;
            loop {
                if i == n {
                    return best;
                }
                point[i] += 1;
                if point[i] <= limit {
                    break;
                }
                point[i] = 0;
                i += 1;
            }
        }
    }

    #[test]
    fn test_problem_a_optimum() {
        let report = solve(TextbookProblem::A, &MicrolpSolver::new()).unwrap();
        let Outcome::Optimal(a) = &report.outcome else {
            panic!("expected optimal, got {:?}", report.outcome);
        };
        assert_eq!(a.objective, 28.0);
        assert_eq!(a.value("x1"), Some(56.0));
        assert_eq!(a.value("x2"), Some(46.0));
        assert_eq!(a.value("x3"), Some(14.0));
    }

    #[test]
    fn test_problem_a_matches_enumeration() {
        let model = build_model(TextbookProblem::A);
        let (best, points) = enumerate(&model, 60).unwrap();
        assert_eq!(best, 28.0);
        assert_eq!(points, vec![vec![56.0, 46.0, 14.0]]);
    }

    #[test]
    fn test_problem_b_optimum() {
        let report = solve(TextbookProblem::B, &MicrolpSolver::new()).unwrap();
        let Outcome::Optimal(a) = &report.outcome else {
            panic!("expected optimal, got {:?}", report.outcome);
        };
        assert_eq!(a.objective, 0.0);
        assert_eq!(a.value("x1"), Some(30.0));
        assert_eq!(a.value("x2"), Some(10.0));

        let (best, points) = enumerate(&build_model(TextbookProblem::B), 80).unwrap();
        assert_eq!(best, 0.0);
        assert_eq!(points, vec![vec![30.0, 10.0]]);
    }

    #[test]
    fn test_problem_c_infeasible() {
        let report = solve(TextbookProblem::C, &MicrolpSolver::new()).unwrap();
        assert_eq!(report.outcome, Outcome::Infeasible);
        assert!(enumerate(&build_model(TextbookProblem::C), 60).is_none());
    }

    #[test]
    fn test_render_optimal() {
        let report = solve(TextbookProblem::B, &MicrolpSolver::new()).unwrap();
        assert_eq!(
            report.render(),
            "Problem (b)\nSolution:\nObjective value = 0.0\nx1 = 30.0\nx2 = 10.0\n\n"
        );
    }

    #[test]
    fn test_render_infeasible() {
        let report = LpReport {
            problem: TextbookProblem::C,
            outcome: Outcome::Infeasible,
        };
        assert_eq!(
            report.render(),
            "Problem (c)\nThe problem does not have an optimal solution.\n\n"
        );
    }

    #[test]
    fn test_solve_all_order_and_repeatability() {
        let first = solve_all(&MicrolpSolver::new()).unwrap();
        let second = solve_all(&MicrolpSolver::new()).unwrap();

        let labels: Vec<char> = first.iter().map(|r| r.problem.label()).collect();
        assert_eq!(labels, vec!['a', 'b', 'c']);
        assert_eq!(first, second);
    }

    #[test]
    fn test_models_validate() {
        for p in TextbookProblem::ALL {
            assert!(build_model(p).validate().is_ok());
        }
    }
}
