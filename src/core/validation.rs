//! Validation utilities for configuration values
//!
//! Values arrive either as TOML values from the config file or as already
//! typed clap arguments; both paths funnel through the helpers here so the
//! error messages name the offending key the same way.

use std::fmt;

/// A user-facing validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

impl crate::core::error_handling::ContextualError for ValidationError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        Some(&self.message)
    }
}

/// Validate a value that must be at least 1
pub fn validate_positive(key: &str, value: usize) -> Result<usize, ValidationError> {
    if value == 0 {
        Err(ValidationError::new(&format!(
            "'{}' must be greater than 0",
            key
        )))
    } else {
        Ok(value)
    }
}

/// Validate a value against an upper bound
pub fn validate_at_most(key: &str, value: usize, max: usize) -> Result<usize, ValidationError> {
    if value > max {
        Err(ValidationError::new(&format!(
            "'{}' must be at most {} (got {})",
            key, max, value
        )))
    } else {
        Ok(value)
    }
}

/// Validate a positive integer given as text
pub fn validate_positive_int(key: &str, value: &str) -> Result<usize, ValidationError> {
    match value.trim().parse::<usize>() {
        Ok(n) => validate_positive(key, n),
        Err(_) => Err(ValidationError::new(&format!(
            "'{}' is not a valid positive integer for '{}'",
            value, key
        ))),
    }
}

/// Read a TOML integer that must be non-negative
pub fn toml_non_negative(key: &str, value: &toml::Value) -> Result<u64, ValidationError> {
    match value.as_integer() {
        Some(n) if n >= 0 => Ok(n as u64),
        Some(n) => Err(ValidationError::new(&format!(
            "'{}' must not be negative (got {})",
            key, n
        ))),
        None => Err(ValidationError::new(&format!(
            "'{}' must be an integer (got {})",
            key,
            value.type_str()
        ))),
    }
}

/// Read a TOML integer that must be at least 1
pub fn toml_positive(key: &str, value: &toml::Value) -> Result<usize, ValidationError> {
    let n = toml_non_negative(key, value)?;
    validate_positive(key, n as usize)
}

/// Read a TOML integer, or a non-empty array of integers, none negative
///
/// A single integer comes back as a one-element list.
pub fn toml_non_negative_list(key: &str, value: &toml::Value) -> Result<Vec<u64>, ValidationError> {
    match value.as_array() {
        Some(values) if values.is_empty() => Err(ValidationError::new(&format!(
            "'{}' must not be an empty list",
            key
        ))),
        Some(values) => values
            .iter()
            .map(|value| toml_non_negative(key, value))
            .collect(),
        None => toml_non_negative(key, value).map(|n| vec![n]),
    }
}

/// Read a TOML string
pub fn toml_string(key: &str, value: &toml::Value) -> Result<String, ValidationError> {
    value.as_str().map(str::to_string).ok_or_else(|| {
        ValidationError::new(&format!(
            "'{}' must be a string (got {})",
            key,
            value.type_str()
        ))
    })
}

/// Read a TOML boolean
pub fn toml_bool(key: &str, value: &toml::Value) -> Result<bool, ValidationError> {
    value.as_bool().ok_or_else(|| {
        ValidationError::new(&format!(
            "'{}' must be true or false (got {})",
            key,
            value.type_str()
        ))
    })
}

/// Check a string against a fixed set of accepted values
pub fn validate_choice(
    key: &str,
    value: &str,
    choices: &[&str],
) -> Result<String, ValidationError> {
    if choices.contains(&value) {
        Ok(value.to_string())
    } else {
        Err(ValidationError::new(&format!(
            "'{}' is not a valid value for '{}' (expected one of: {})",
            value,
            key,
            choices.join(", ")
        )))
    }
}
