use scanner_core::{ConfigError, HttpError, ReportError, ValidationError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("http client setup failed: {0}")]
    Http(#[from] HttpError),

    #[error("every upstream call failed ({failures} of {attempted}); check your network connection")]
    AllFetchesFailed { attempted: usize, failures: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Config(_) => 2,
            Self::Report(ReportError::Upstream { .. }) => 3,
            Self::Report(_) => 2,
            Self::Http(_) => 3,
            Self::AllFetchesFailed { .. } => 3,
            Self::Io(_) => 10,
        }
    }
}
