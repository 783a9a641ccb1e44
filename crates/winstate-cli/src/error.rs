//! Error types for winstate-cli

use winstate_core::ErrorObject;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from winstate-core
    #[error(transparent)]
    Core(#[from] winstate_core::Error),

    /// Error from winstate-fs
    #[error(transparent)]
    Fs(#[from] winstate_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// Structured form used in `--json` output
    pub fn to_error_object(&self) -> ErrorObject {
        match self {
            Self::Core(e) => ErrorObject::from_error(e),
            Self::Fs(_) | Self::Io(_) => ErrorObject::new("IO_ERROR", self.to_string()),
            Self::Json(_) => ErrorObject::new("SERIALIZATION_ERROR", self.to_string()),
            Self::User { message } => ErrorObject::new("INVALID_INPUT", message.clone()),
        }
    }
}
