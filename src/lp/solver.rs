//! MIP solver interface and the `microlp` backend.

use super::error::MipError;
use super::model::{Cmp, MipModel, Sense};
use crate::Outcome;
use microlp::{ComparisonOp, OptimizationDirection, Problem};
use tracing::{debug, info};

/// Distance from an integer below which a backend value is snapped.
const INTEGRALITY_TOL: f64 = 1e-6;

/// Variable values and objective of a solved program.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Assignment {
    /// Objective value evaluated at `values`.
    pub objective: f64,
    /// `(name, value)` in declaration order.
    pub values: Vec<(String, f64)>,
}

impl Assignment {
    /// Value of the named variable.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, v)| v)
    }
}

/// Trait for MIP solver implementations.
pub trait MipSolver {
    /// Solves the model once.
    ///
    /// Infeasibility is an [`Outcome`], not an error; errors are
    /// reserved for invalid models and backend failures.
    fn solve(&self, model: &MipModel) -> Result<Outcome<Assignment>, MipError>;
}

/// Adapter around [`microlp`]'s simplex with branch-and-bound.
#[derive(Debug, Default)]
pub struct MicrolpSolver;

impl MicrolpSolver {
    pub fn new() -> Self {
        Self
    }
}

fn to_backend_bound(name: &str, value: i64) -> Result<i32, MipError> {
    i32::try_from(value).map_err(|_| MipError::BoundOutOfRange {
        name: name.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relax {
    Integer,
    Continuous,
}

/// Translates `model` into a backend problem. Continuous variables keep
/// an infinite upper bound; integer ones use `i32::MAX` in its place.
fn build_problem(
    model: &MipModel,
    sense: Sense,
    obj_coeffs: &[f64],
    relax: Relax,
) -> Result<(Problem, Vec<microlp::Variable>), MipError> {
    let direction = match sense {
        Sense::Minimize => OptimizationDirection::Minimize,
        Sense::Maximize => OptimizationDirection::Maximize,
    };
    let mut problem = Problem::new(direction);

    let mut handles = Vec::with_capacity(model.var_count());
    for (def, &coeff) in model.vars().iter().zip(obj_coeffs) {
        let lower = to_backend_bound(&def.name, def.lower)?;
        let upper = def
            .upper
            .map(|u| to_backend_bound(&def.name, u))
            .transpose()?;
        let handle = match relax {
            Relax::Integer => problem.add_integer_var(coeff, (lower, upper.unwrap_or(i32::MAX))),
            Relax::Continuous => problem.add_var(
                coeff,
                (f64::from(lower), upper.map_or(f64::INFINITY, f64::from)),
            ),
        };
        handles.push(handle);
    }

    for c in model.constraints() {
        let terms: Vec<(microlp::Variable, f64)> = c
            .expr
            .merged()
            .into_iter()
            .map(|(var, coeff)| (handles[var.index()], coeff))
            .collect();
        let op = match c.cmp {
            Cmp::Le => ComparisonOp::Le,
            Cmp::Ge => ComparisonOp::Ge,
            Cmp::Eq => ComparisonOp::Eq,
        };
        problem.add_constraint(&terms[..], op, c.rhs);
    }

    Ok((problem, handles))
}

impl MipSolver for MicrolpSolver {
    fn solve(&self, model: &MipModel) -> Result<Outcome<Assignment>, MipError> {
        model.validate()?;
        let Some((sense, objective)) = model.objective() else {
            return Err(MipError::MissingObjective(model.name.clone()));
        };

        info!(
            model = %model.name,
            vars = model.var_count(),
            constraints = model.constraints().len(),
            "mip solve start"
        );

        let sense = *sense;
        let mut obj_coeffs = vec![0.0; model.var_count()];
        for (var, coeff) in objective.merged() {
            obj_coeffs[var.index()] += coeff;
        }

        // Integer variables need finite i32 bounds, so an open upper bound
        // would hide unboundedness. The continuous relaxation detects it.
        let open_ended = model.vars().iter().any(|d| d.upper.is_none());
        if open_ended {
            let (relaxed, _) = build_problem(model, sense, &obj_coeffs, Relax::Continuous)?;
            match relaxed.solve() {
                Ok(_) => {}
                Err(microlp::Error::Infeasible) => {
                    info!(model = %model.name, "mip relaxation infeasible");
                    return Ok(Outcome::Infeasible);
                }
                Err(microlp::Error::Unbounded) => {
                    info!(model = %model.name, "mip relaxation unbounded");
                    return Ok(Outcome::Unknown);
                }
                Err(other) => return Err(MipError::Backend(other.to_string())),
            }
        }

        let (problem, handles) = build_problem(model, sense, &obj_coeffs, Relax::Integer)?;
        let solution = match problem.solve() {
            Ok(solution) => solution,
            Err(microlp::Error::Infeasible) => {
                info!(model = %model.name, "mip infeasible");
                return Ok(Outcome::Infeasible);
            }
            Err(microlp::Error::Unbounded) => {
                info!(model = %model.name, "mip unbounded");
                return Ok(Outcome::Unknown);
            }
            Err(other) => return Err(MipError::Backend(other.to_string())),
        };

        let raw: Vec<f64> = handles.iter().map(|&h| *solution.var_value(h)).collect();
        let values: Vec<f64> = raw
            .iter()
            .map(|&v| {
                let r = v.round();
                if (v - r).abs() <= INTEGRALITY_TOL {
                    r
                } else {
                    v
                }
            })
            .collect();
        debug!(model = %model.name, ?raw, backend_objective = solution.objective(), "mip raw solution");

        let at_sentinel = model
            .vars()
            .iter()
            .zip(&raw)
            .any(|(def, &v)| def.upper.is_none() && v >= f64::from(i32::MAX) - 0.5);
        if at_sentinel {
            info!(model = %model.name, "mip solution sits on the open-bound sentinel");
            return Ok(Outcome::Unknown);
        }

        if !model.is_feasible(&values, INTEGRALITY_TOL) {
            return Err(MipError::Backend(format!(
                "backend returned a point violating model {}",
                model.name
            )));
        }

        let assignment = Assignment {
            objective: objective.eval(&values),
            values: model
                .vars()
                .iter()
                .zip(values)
                .map(|(def, v)| (def.name.clone(), v))
                .collect(),
        };
        info!(model = %model.name, objective = assignment.objective, "mip solve end");
        Ok(Outcome::Optimal(assignment))
    }
}
