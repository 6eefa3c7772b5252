//! SLSQP, L-BFGS-B and Nelder–Mead through NLopt.
//!
//! Gradients are central finite differences. NLopt expects
//! inequalities as `fc(x) <= 0`, so `g(x) >= 0` is passed negated.

use super::config::NlpConfig;
use super::error::NlpError;
use super::method::Method;
use super::minimizer::{BackendRun, Stop};
use super::problem::{ConstraintKind, NlpProblem};
use nlopt::{Algorithm, FailState, Nlopt, SuccessState, Target};
use std::cell::Cell;

fn central_difference<F>(f: &F, x: &[f64], rel_step: f64, grad: &mut [f64])
where
    F: Fn(&[f64]) -> f64 + ?Sized,
{
    let mut probe = x.to_vec();
    for (i, g) in grad.iter_mut().enumerate() {
        let h = rel_step.sqrt() * x[i].abs().max(1.0);
        probe[i] = x[i] + h;
        let up = f(&probe);
        probe[i] = x[i] - h;
        let down = f(&probe);
        probe[i] = x[i];
        *g = (up - down) / (2.0 * h);
    }
}

fn fail(state: FailState) -> NlpError {
    NlpError::Backend(format!("nlopt rejected the setup: {state:?}"))
}

pub(super) fn run(
    problem: &NlpProblem,
    method: Method,
    config: &NlpConfig,
) -> Result<BackendRun, NlpError> {
    let algorithm = match method {
        Method::Slsqp => Algorithm::Slsqp,
        Method::LBfgsB => Algorithm::Lbfgs,
        Method::NelderMead => Algorithm::Neldermead,
        other => return Err(NlpError::Unavailable(other)),
    };

    let step = config.gradient_step;
    let evaluations = Cell::new(0usize);
    let objective = |x: &[f64], grad: Option<&mut [f64]>, _: &mut ()| -> f64 {
        evaluations.set(evaluations.get() + 1);
        if let Some(g) = grad {
            central_difference(&*problem.objective, x, step, g);
        }
        (problem.objective)(x)
    };

    let mut opt = Nlopt::new(algorithm, problem.dim(), objective, Target::Minimize, ());
    let (lower, upper): (Vec<f64>, Vec<f64>) = problem.bounds.iter().copied().unzip();
    opt.set_lower_bounds(&lower).map_err(fail)?;
    opt.set_upper_bounds(&upper).map_err(fail)?;
    opt.set_ftol_rel(config.f_tol).map_err(fail)?;
    opt.set_xtol_rel(config.x_tol).map_err(fail)?;
    opt.set_maxeval(u32::try_from(config.max_evaluations).unwrap_or(u32::MAX))
        .map_err(fail)?;

    for c in &problem.constraints {
        let negated = move |z: &[f64]| -(c.fun)(z);
        let fc = move |x: &[f64], grad: Option<&mut [f64]>, _: &mut ()| -> f64 {
            if let Some(g) = grad {
                central_difference(&negated, x, step, g);
            }
            negated(x)
        };
        match c.kind {
            ConstraintKind::Inequality => {
                opt.add_inequality_constraint(fc, (), config.constraint_tol)
            }
            ConstraintKind::Equality => opt.add_equality_constraint(fc, (), config.constraint_tol),
        }
        .map_err(fail)?;
    }

    let mut x = problem.x0.clone();
    problem.project(&mut x);

    match opt.optimize(&mut x) {
        Ok((state, fun)) => {
            let stop = match state {
                SuccessState::MaxEvalReached | SuccessState::MaxTimeReached => Stop::Budget,
                _ => Stop::Converged,
            };
            Ok(BackendRun {
                x,
                fun,
                evaluations: evaluations.get(),
                stop,
                detail: format!("{state:?}"),
            })
        }
        Err((state, _)) => Err(NlpError::Backend(format!("nlopt stopped with {state:?}"))),
    }
}
