//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::{DomainError, EvaluationError, ValidationError};

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("unknown tree kind: {0}")]
    UnknownKind(String),

    #[error("tree kind already exists: {0}")]
    KindExists(String),

    #[error("no tree kinds defined")]
    NoKinds,

    #[error("no tree available for kind {kind}")]
    NoTreeAvailable { kind: String },

    #[error("version {version} not found for kind {kind}")]
    VersionNotFound { kind: String, version: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ValidationError> for ApplicationError {
    fn from(e: ValidationError) -> Self {
        Self::Domain(DomainError::Validation(e))
    }
}

impl From<EvaluationError> for ApplicationError {
    fn from(e: EvaluationError) -> Self {
        Self::Domain(DomainError::Evaluation(e))
    }
}

impl ApplicationError {
    /// The validation failure behind this error, if any.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Domain(DomainError::Validation(e)) => Some(e),
            _ => None,
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
