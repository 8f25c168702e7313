//! Pipeline Error Types

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid pipeline setup: {message}")]
    Construction { message: String },

    #[error("Source exhausted (all {size} items already handed out)")]
    Exhausted { size: usize },

    #[error("Blocking wait interrupted")]
    Interrupted,

    #[error("Synchronisation failure: {message}")]
    Synchronisation { message: String },

    #[error("Failed to spawn worker thread: {message}")]
    ThreadSpawn { message: String },
}

impl PipelineError {
    pub(crate) fn construction(message: impl Into<String>) -> Self {
        PipelineError::Construction {
            message: message.into(),
        }
    }

    pub(crate) fn synchronisation(message: String) -> Self {
        PipelineError::Synchronisation { message }
    }
}

impl crate::core::error_handling::ContextualError for PipelineError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, PipelineError::Construction { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            PipelineError::Construction { message } => Some(message),
            _ => None,
        }
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
