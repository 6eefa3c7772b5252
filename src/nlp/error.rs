use super::method::Method;
use thiserror::Error;

/// Errors raised while checking or solving a nonlinear problem.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NlpError {
    #[error("unknown minimization method: {0}")]
    UnknownMethod(String),

    #[error("method {method} does not support {kind} constraints")]
    UnsupportedConstraints {
        method: Method,
        kind: &'static str,
    },

    #[error("method {0} does not support variable bounds")]
    UnsupportedBounds(Method),

    #[error("method {0} has no backend in this build")]
    Unavailable(Method),

    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("backend failure: {0}")]
    Backend(String),
}
