//! Generic error handling utilities
//!
//! Lets the CLI report any domain error the same way: user-actionable errors
//! (bad arguments, bad config values, missing collaborators) show their own
//! message, everything else shows the operation that failed and keeps the
//! detail at debug level.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some(message)`; otherwise it returns `None`.
pub trait ContextualError: std::error::Error {
    /// Returns true if the error message tells the user what to fix
    fn is_user_actionable(&self) -> bool;

    /// Returns the specific user message if this is a user-actionable error
    fn user_message(&self) -> Option<&str>;
}

/// Log errors with appropriate detail level based on error specificity
///
/// # Examples
/// ```rust,no_run
/// # use handoff::core::error_handling::log_error_with_context;
/// # use handoff::core::validation::ValidationError;
/// let err = ValidationError::new("'capacity' must be greater than 0");
/// log_error_with_context(&err, "Loading configuration");
/// // Logs: "FATAL: 'capacity' must be greater than 0"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    log::error!("FATAL: {}", fatal_line(error, operation_context));
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

/// The primary line shown to the user for `error`
fn fatal_line<'a, E: ContextualError>(error: &'a E, operation_context: &'a str) -> &'a str {
    if error.is_user_actionable() {
        error.user_message().unwrap_or(operation_context)
    } else {
        operation_context
    }
}
