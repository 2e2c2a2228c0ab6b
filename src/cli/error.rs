//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),

    #[error("order invariant violated: {0}")]
    Invariant(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Invariant(_) => crate::exitcode::INVARIANT,
            CliError::Infra(e) => infra_exit_code(e),
        }
    }
}

fn infra_exit_code(e: &InfraError) -> i32 {
    match e {
        InfraError::Io { .. } => crate::exitcode::IOERR,
        InfraError::Http { .. } => crate::exitcode::UNAVAILABLE,
        InfraError::Remote { status: 401 | 403, .. } => crate::exitcode::NOPERM,
        InfraError::Remote { .. } => crate::exitcode::UNAVAILABLE,
        InfraError::Decode { .. } => crate::exitcode::DATAERR,
        InfraError::Application(app) => match app {
            ApplicationError::Domain(_) => crate::exitcode::DATAERR,
            ApplicationError::Config { .. } => crate::exitcode::CONFIG,
            ApplicationError::SyncFailure { .. } => crate::exitcode::UNAVAILABLE,
            ApplicationError::OperationFailed { source, .. } => source
                .downcast_ref::<InfraError>()
                .map(infra_exit_code)
                .unwrap_or(crate::exitcode::SOFTWARE),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    #[test]
    fn given_wrapped_remote_auth_failure_when_mapping_then_noperm() {
        let err: CliError = ApplicationError::failed(
            "load categories",
            InfraError::Remote {
                status: 401,
                message: "Unauthenticated.".into(),
            },
        )
        .into();
        assert_eq!(err.exit_code(), crate::exitcode::NOPERM);
    }

    #[test]
    fn given_rejected_drag_when_mapping_then_dataerr() {
        let err: CliError = ApplicationError::from(DomainError::UnknownNode(9)).into();
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }
}
