//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        Self::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Json { .. } => crate::exitcode::DATAERR,
                InfraError::Application(e) => match e {
                    ApplicationError::Domain(DomainError::Validation(_))
                    | ApplicationError::Domain(DomainError::Evaluation(_)) => {
                        crate::exitcode::DATAERR
                    }
                    ApplicationError::UnknownKind(_)
                    | ApplicationError::NoKinds
                    | ApplicationError::NoTreeAvailable { .. }
                    | ApplicationError::VersionNotFound { .. } => crate::exitcode::NOINPUT,
                    ApplicationError::KindExists(_) => crate::exitcode::CANTCREAT,
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
                },
            },
        }
    }

    /// Remediation text for errors the user can fix.
    pub fn hint(&self) -> Option<String> {
        match self {
            CliError::Infra(InfraError::Application(e)) => e.validation().map(|v| v.hint()),
            _ => None,
        }
    }
}
