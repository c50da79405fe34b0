//! Crate-wide error type.
//!
//! Engine failures are a closed taxonomy: every variant is a distinct,
//! recoverable input/configuration problem. None are retried: there are no
//! transient conditions at this layer, and a failed simulation never yields a
//! partial result.
//!
//! Exit-code convention for the `osim` binary:
//!
//! - 2: invalid usage/input (bad flags, bad case values, unreadable files)
//! - 3: invalid model/configuration (model file, variable table)
//! - 4: numeric failure (transform domain violations)

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// A variable id was used that is not in the registry.
    #[error("Unknown variable `{0}`.")]
    UnknownVariable(String),

    /// A transform was evaluated outside its numeric domain.
    #[error("Value {value} is outside the domain of variable `{var}`: {reason}")]
    Domain {
        var: String,
        value: f64,
        reason: &'static str,
    },

    /// Covariate vector and coefficient set disagree on shape or coverage.
    #[error("Covariate/coefficient mismatch: {0}")]
    DimensionMismatch(String),

    /// The fitted model carries no usable uncertainty representation.
    #[error("Fitted model has no usable uncertainty representation: {0}")]
    InsufficientUncertaintyData(String),

    /// Simulation draw count must be a positive integer.
    #[error("Invalid draw count {0} (must be >= 1).")]
    InvalidDrawCount(usize),

    /// The requested sweep variable is not flagged as an axis candidate.
    #[error("Variable `{0}` is not axis-eligible and cannot be swept.")]
    NonAxisVariable(String),

    /// A sweep grid needs at least two points to describe a range.
    #[error("Sweep grid has {0} point(s); at least 2 are required.")]
    EmptyGrid(usize),

    /// A variable spec failed construction-time validation.
    #[error("Invalid spec for variable `{var}`: {reason}")]
    InvalidVariableSpec { var: String, reason: String },

    /// The fitted-model description failed shape/consistency validation.
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    /// Malformed command-line input.
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },

    #[error("{context}: {source}")]
    Json {
        context: String,
        source: serde_json::Error,
    },

    #[error("{context}: {source}")]
    Csv { context: String, source: csv::Error },
}

impl SimError {
    /// Process exit code for the `osim` binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            SimError::UnknownVariable(_)
            | SimError::DimensionMismatch(_)
            | SimError::InvalidDrawCount(_)
            | SimError::NonAxisVariable(_)
            | SimError::EmptyGrid(_)
            | SimError::InvalidArgument(_)
            | SimError::Io { .. }
            | SimError::Json { .. }
            | SimError::Csv { .. } => 2,
            SimError::InsufficientUncertaintyData(_)
            | SimError::InvalidVariableSpec { .. }
            | SimError::InvalidModel(_) => 3,
            SimError::Domain { .. } => 4,
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        SimError::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        SimError::Json {
            context: context.into(),
            source,
        }
    }
}
