use thiserror::Error;

/// Errors raised while validating or solving an integer program.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MipError {
    #[error("variable #{0} is not declared in this model")]
    UndefinedVariable(usize),

    #[error("expression uses a variable declared by another model than {model}")]
    ForeignVariable { model: String },

    #[error("variable {name} has bounds [{lower}, {upper}]")]
    InvalidBounds { name: String, lower: i64, upper: i64 },

    #[error("bound of {name} does not fit the backend's integer range")]
    BoundOutOfRange { name: String },

    #[error("non-finite coefficient for {0}")]
    NonFiniteCoefficient(String),

    #[error("model {0} has no objective")]
    MissingObjective(String),

    #[error("backend failure: {0}")]
    Backend(String),
}
