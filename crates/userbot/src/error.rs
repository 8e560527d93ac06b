//! Application error types.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] chat_transport::TransportError),

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Duplicate command name: {0}")]
    DuplicateCommand(String),
}

/// Result type alias for application errors.
pub type AppResult<T> = Result<T, AppError>;

/// Classification attached to failed command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidArguments,
    UnknownCommand,
    ExecutionFailed,
    Timeout,
    DeliveryFailed,
    PermissionDenied,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArguments => "invalid_arguments",
            Self::UnknownCommand => "unknown_command",
            Self::ExecutionFailed => "execution_failed",
            Self::Timeout => "timeout",
            Self::DeliveryFailed => "delivery_failed",
            Self::PermissionDenied => "permission_denied",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors a command handler may return.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The user got the arguments wrong. `hint` is shown to them verbatim.
    #[error("Invalid arguments: {reason}")]
    InvalidArguments { reason: String, hint: String },

    /// The sender may not run this command.
    #[error("Permission denied")]
    PermissionDenied,

    /// Anything else. Never shown to the user.
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("State error: {0}")]
    State(#[from] agent_state::StateError),

    #[error("Transport error: {0}")]
    Transport(#[from] chat_transport::TransportError),
}

impl CommandError {
    pub fn invalid(reason: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::InvalidArguments {
            reason: reason.into(),
            hint: hint.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArguments { .. } => ErrorKind::InvalidArguments,
            Self::ExecutionFailed(_) | Self::State(_) => ErrorKind::ExecutionFailed,
            Self::Transport(_) => ErrorKind::DeliveryFailed,
            Self::PermissionDenied => ErrorKind::PermissionDenied,
        }
    }
}

pub type CommandOutcome<T> = Result<T, CommandError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chat_transport::TransportError;

    fn bind(port_in_use: bool) -> AppResult<()> {
        if port_in_use {
            Err(std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use"))?;
        }
        Ok(())
    }

    #[test]
    fn test_startup_failures_convert() {
        let err: AppError = TransportError::Unauthorized.into();
        assert!(matches!(err, AppError::Transport(TransportError::Unauthorized)));

        assert!(matches!(bind(true), Err(AppError::Server(_))));
        tokio_test::assert_ok!(bind(false));
    }

    #[test]
    fn test_command_error_kinds() {
        let cases = [
            (CommandError::invalid("x", "hint"), ErrorKind::InvalidArguments),
            (CommandError::PermissionDenied, ErrorKind::PermissionDenied),
            (CommandError::ExecutionFailed("x".into()), ErrorKind::ExecutionFailed),
            (
                CommandError::Transport(TransportError::SendFailed("x".into())),
                ErrorKind::DeliveryFailed,
            ),
        ];
        for (error, kind) in cases {
            assert_eq!(error.kind(), kind, "{}", error);
        }
        assert_eq!(ErrorKind::PermissionDenied.to_string(), "permission_denied");
    }
}
