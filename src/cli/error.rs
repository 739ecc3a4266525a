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
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Application(app) => match app {
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
                    ApplicationError::EmptyDocument(_) => crate::exitcode::NOINPUT,
                    ApplicationError::NoSuchNode(_) | ApplicationError::NoSelection => {
                        crate::exitcode::USAGE
                    }
                    ApplicationError::Domain(_) | ApplicationError::Rejected(_) => {
                        crate::exitcode::DATAERR
                    }
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_exit_codes() {
        let empty: CliError = ApplicationError::EmptyDocument(PathBuf::from("x.txt")).into();
        assert_eq!(empty.exit_code(), crate::exitcode::NOINPUT);
        let missing: CliError = ApplicationError::NoSuchNode("0/9".into()).into();
        assert_eq!(missing.exit_code(), crate::exitcode::USAGE);
        let rejected: CliError = ApplicationError::Rejected("move".into()).into();
        assert_eq!(rejected.exit_code(), crate::exitcode::DATAERR);
        assert_eq!(
            CliError::Usage("x".into()).exit_code(),
            crate::exitcode::USAGE
        );
    }
}
