use thiserror::Error;

/// Failures of a backend round trip.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("backend unavailable")]
    Unavailable,

    #[error("{command} rejected: {message}")]
    Rejected { command: String, message: String },

    #[error("backend process exited")]
    Disconnected,

    #[error("{command} timed out after {timeout_ms}ms")]
    Timeout { command: String, timeout_ms: u64 },

    #[error("malformed backend message: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("backend i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    pub fn rejected(command: &str, message: impl Into<String>) -> Self {
        Self::Rejected {
            command: command.to_string(),
            message: message.into(),
        }
    }

    /// Short text shown to the user in an alert or status line.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unavailable => "Backend unavailable (read-only mode)".to_string(),
            Self::Rejected { message, .. } => message.clone(),
            Self::Disconnected => "Lost connection to the backend".to_string(),
            Self::Timeout { .. } => "The backend did not answer in time".to_string(),
            Self::Protocol(_) => "The backend sent an unreadable reply".to_string(),
            Self::Io(e) => format!("Backend i/o error: {e}"),
        }
    }
}

/// Actions refused locally, before anything is sent to the backend.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GuardError {
    #[error("\"{0}\" is a reserved name")]
    ReservedName(String),

    #[error("\"{0}\" cannot be renamed or deleted")]
    ProtectedDirectory(String),

    #[error("Content cannot be empty")]
    EmptyContent,

    #[error("Nothing selected")]
    NoTarget,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Guard(#[from] GuardError),

    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

impl AppError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Bridge(e) => e.user_message(),
            Self::Guard(e) => e.to_string(),
            Self::Terminal(e) => e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_message_is_shown_verbatim() {
        let err = BridgeError::rejected("create_directory", "UNIQUE constraint failed");
        assert_eq!(err.user_message(), "UNIQUE constraint failed");
        assert_eq!(
            err.to_string(),
            "create_directory rejected: UNIQUE constraint failed"
        );
    }

    #[test]
    fn test_guard_error_wraps_into_app_error() {
        let err: AppError = GuardError::ProtectedDirectory("Clipboard".into()).into();
        assert_eq!(
            err.user_message(),
            "\"Clipboard\" cannot be renamed or deleted"
        );
    }
}
