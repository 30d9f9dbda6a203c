//! Error type shared by the engine and its view adapters.

/// Errors that can occur while exporting a board.
#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("Timed out after {waited_ms}ms waiting for {what}")]
    Timeout { what: String, waited_ms: u64 },

    #[error("Activation handle is stale: {0}")]
    StaleHandle(String),

    #[error("View error: {0}")]
    View(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    pub fn view(msg: impl Into<String>) -> Self {
        ExportError::View(msg.into())
    }

    /// Errors that abandon a single worklist entry without ending the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ExportError::Timeout { .. } | ExportError::StaleHandle(_) | ExportError::View(_)
        )
    }
}

/// Convenience result type.
pub type ExportResult<T> = Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_kinds() {
        let timeout = ExportError::Timeout {
            what: "task pane".to_string(),
            waited_ms: 12_000,
        };
        assert!(timeout.is_recoverable());
        assert!(ExportError::StaleHandle("h-3".to_string()).is_recoverable());
        assert!(ExportError::view("script threw").is_recoverable());

        let io = ExportError::Io(std::io::Error::other("disk full"));
        assert!(!io.is_recoverable());
    }

    #[test]
    fn test_timeout_message() {
        let e = ExportError::Timeout {
            what: "task pane".to_string(),
            waited_ms: 500,
        };
        assert_eq!(e.to_string(), "Timed out after 500ms waiting for task pane");
    }
}
