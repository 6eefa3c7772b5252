//! COBYLA through the pure-Rust `cobyla` crate.

use super::config::NlpConfig;
use super::error::NlpError;
use super::minimizer::{BackendRun, Stop};
use super::problem::NlpProblem;
use cobyla::{RhoBeg, StopTols, SuccessStatus};
use std::cell::Cell;

/// Runs COBYLA on `problem`. Inequalities keep their `g(x) >= 0` sign,
/// which is the convention the crate expects.
pub(super) fn run(problem: &NlpProblem, config: &NlpConfig) -> Result<BackendRun, NlpError> {
    let evaluations = Cell::new(0usize);
    let objective = |x: &[f64], _: &mut ()| -> f64 {
        evaluations.set(evaluations.get() + 1);
        (problem.objective)(x)
    };
    let constraints: Vec<_> = problem
        .constraints
        .iter()
        .map(|c| move |x: &[f64], _: &mut ()| -> f64 { (c.fun)(x) })
        .collect();

    let mut x0 = problem.x0.clone();
    problem.project(&mut x0);

    let stop_tols = StopTols {
        ftol_rel: config.f_tol,
        xtol_rel: config.x_tol,
        ..StopTols::default()
    };

    match cobyla::minimize(
        objective,
        &x0,
        &problem.bounds,
        &constraints,
        (),
        config.max_evaluations,
        RhoBeg::All(config.rho_begin),
        Some(stop_tols),
    ) {
        Ok((status, x, fun)) => {
            let stop = match status {
                SuccessStatus::MaxEvalReached | SuccessStatus::MaxTimeReached => Stop::Budget,
                _ => Stop::Converged,
            };
            Ok(BackendRun {
                x,
                fun,
                evaluations: evaluations.get(),
                stop,
                detail: format!("{status:?}"),
            })
        }
        Err((status, _, _)) => Err(NlpError::Backend(format!("cobyla stopped with {status:?}"))),
    }
}
