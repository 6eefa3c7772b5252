//! Method dispatch to the minimization backends.

use super::cobyla_backend;
use super::config::NlpConfig;
use super::error::NlpError;
use super::method::Method;
#[cfg(feature = "nlopt")]
use super::nlopt_backend;
use super::problem::NlpProblem;
use tracing::{debug, info};

/// Result of a minimization.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NlpResult {
    /// Final point.
    pub x: Vec<f64>,
    /// Objective value at `x`.
    pub fun: f64,
    /// Largest constraint violation at `x`.
    pub constraint_violation: f64,
    /// Objective evaluations.
    pub evaluations: usize,
    /// The backend met its tolerances and `x` is feasible within
    /// `constraint_tol`.
    pub converged: bool,
    pub message: String,
}

/// Why a backend returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Stop {
    Converged,
    Budget,
}

/// Raw output of one backend run.
#[derive(Debug, Clone)]
pub(super) struct BackendRun {
    pub x: Vec<f64>,
    pub fun: f64,
    pub evaluations: usize,
    pub stop: Stop,
    pub detail: String,
}

/// Minimizes `problem` with `method`.
///
/// The problem, the config, and the method/problem pairing are all
/// checked before any evaluation: a method that would silently ignore
/// the problem's constraints is an error here, not a quiet wrong answer.
///
/// # Examples
///
/// ```
/// use u_formulate::nlp::{minimize, Method, NlpConfig, NlpProblem};
///
/// // min (x - 2)^2 subject to x <= 1
/// let problem = NlpProblem::new(vec![0.0], |x: &[f64]| (x[0] - 2.0).powi(2))
///     .with_inequality("x <= 1", |x: &[f64]| 1.0 - x[0]);
/// let result = minimize(&problem, Method::Cobyla, &NlpConfig::default()).unwrap();
/// assert!((result.x[0] - 1.0).abs() < 1e-4);
/// ```
pub fn minimize(
    problem: &NlpProblem,
    method: Method,
    config: &NlpConfig,
) -> Result<NlpResult, NlpError> {
    problem.validate()?;
    config.validate().map_err(NlpError::InvalidConfig)?;
    problem.check_method(method)?;

    info!(
        method = %method,
        dim = problem.dim(),
        constraints = problem.constraints.len(),
        "nlp solve start"
    );

    let run = match method {
        Method::Cobyla => cobyla_backend::run(problem, config)?,
        #[cfg(feature = "nlopt")]
        Method::Slsqp | Method::LBfgsB | Method::NelderMead => {
            nlopt_backend::run(problem, method, config)?
        }
        other => return Err(NlpError::Unavailable(other)),
    };
    debug!(detail = %run.detail, "backend returned");

    let violation = problem.max_violation(&run.x);
    let feasible = violation <= config.constraint_tol;
    let converged = run.stop == Stop::Converged && feasible;
    let message = if !feasible {
        format!(
            "Constraint violation {violation:.3e} above tolerance {:.1e}",
            config.constraint_tol
        )
    } else if run.stop == Stop::Budget {
        "Maximum number of function evaluations has been exceeded".to_string()
    } else {
        "Optimization terminated successfully".to_string()
    };

    let result = NlpResult {
        x: run.x,
        fun: run.fun,
        constraint_violation: violation,
        evaluations: run.evaluations,
        converged,
        message,
    };

    info!(
        fun = result.fun,
        violation = result.constraint_violation,
        evaluations = result.evaluations,
        converged = result.converged,
        "nlp solve end"
    );
    Ok(result)
}
