//! TOML configuration file parsing and loading
//!
//! Handles discovery of the default configuration file and translation of
//! its kebab-case keys into [`Args`] values. Command line values are merged
//! on top afterwards (see [`Args::merge_file_values`]).

use crate::core::validation::{
    toml_bool, toml_non_negative, toml_non_negative_list, toml_positive, toml_string,
    ValidationError,
};
use std::path::{Path, PathBuf};

use super::args::Args;

/// Keys accepted at the top level of the configuration file
pub const CONFIG_KEYS: [&str; 13] = [
    "producers",
    "consumers",
    "capacity",
    "items",
    "producer-delay-ms",
    "consumer-delay-ms",
    "poll-timeout-ms",
    "log-level",
    "log-format",
    "log-file",
    "color",
    "no-color",
    "output",
];

impl Args {
    /// `<config dir>/Handoff/handoff.toml`, if the platform has a config dir
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("Handoff").join("handoff.toml"))
    }

    /// Pick the configuration file to load
    ///
    /// An explicitly requested file must exist; the default file is used only
    /// when present.
    pub fn config_path(config_file: Option<&Path>) -> Result<Option<PathBuf>, ValidationError> {
        match config_file {
            Some(path) if path.exists() => Ok(Some(path.to_path_buf())),
            Some(path) => Err(ValidationError::new(&format!(
                "The specified configuration file does not exist: {}",
                path.display()
            ))),
            None => Ok(Self::default_config_path().filter(|path| path.exists())),
        }
    }

    /// Load configuration file values, or an empty `Args` when there is no file
    pub async fn load_config_file(config_file: Option<&Path>) -> Result<Self, ValidationError> {
        let mut args = Self::new();
        let Some(path) = Self::config_path(config_file)? else {
            return Ok(args);
        };

        log::debug!("Loading configuration from {}", path.display());
        let contents = tokio::fs::read_to_string(&path).await.map_err(|e| {
            ValidationError::new(&format!(
                "Error reading configuration file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config = toml::from_str::<toml::Table>(&contents).map_err(|e| {
            ValidationError::new(&format!(
                "Error parsing configuration file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::apply_toml_values(&mut args, &config).map_err(|e| {
            ValidationError::new(&format!(
                "Error in configuration file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(args)
    }

    /// Apply TOML configuration values to Args
    pub fn apply_toml_values(args: &mut Self, config: &toml::Table) -> Result<(), ValidationError> {
        for key in config.keys().filter(|key| !CONFIG_KEYS.contains(&key.as_str())) {
            log::warn!("Ignoring unknown configuration key '{}'", key);
        }

        if let Some(value) = config.get("producers") {
            args.producers = Some(toml_positive("producers", value)?);
        }
        if let Some(value) = config.get("consumers") {
            args.consumers = Some(toml_positive("consumers", value)?);
        }
        if let Some(value) = config.get("capacity") {
            args.capacity = Some(toml_positive("capacity", value)?);
        }
        if let Some(value) = config.get("items") {
            args.items = Some(toml_non_negative("items", value)? as usize);
        }
        if let Some(value) = config.get("producer-delay-ms") {
            args.producer_delay_ms = Some(toml_non_negative_list("producer-delay-ms", value)?);
        }
        if let Some(value) = config.get("consumer-delay-ms") {
            args.consumer_delay_ms = Some(toml_non_negative_list("consumer-delay-ms", value)?);
        }
        if let Some(value) = config.get("poll-timeout-ms") {
            args.poll_timeout_ms = Some(toml_non_negative("poll-timeout-ms", value)?);
        }

        if let Some(value) = config.get("log-level") {
            args.log_level = Some(toml_string("log-level", value)?);
        }
        if let Some(value) = config.get("log-format") {
            args.log_format = Some(toml_string("log-format", value)?);
        }
        if let Some(value) = config.get("log-file") {
            args.log_file = Some(toml_string("log-file", value)?);
        }
        if let Some(value) = config.get("output") {
            args.output = Some(toml_string("output", value)?);
        }

        if let Some(value) = config.get("color") {
            args.color = toml_bool("color", value)?;
        }
        if let Some(value) = config.get("no-color") {
            // no-color = false means color on
            let no_color = toml_bool("no-color", value)?;
            args.no_color = no_color;
            if !no_color && config.get("color").is_none() {
                args.color = true;
            }
        }
        if args.color && args.no_color {
            return Err(ValidationError::new(
                "'color' and 'no-color' cannot both be enabled",
            ));
        }

        Ok(())
    }
}
