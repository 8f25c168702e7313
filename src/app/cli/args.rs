//! Command line arguments and their resolution into run settings
//!
//! Every option is optional at parse time so values from the configuration
//! file can fill the gaps; [`Args::resolve`] applies the defaults and
//! validates the merged result.

use crate::app::cli::display::OutputFormat;
use crate::core::logging::{LOG_FORMATS, LOG_LEVELS};
use crate::core::validation::{
    validate_at_most, validate_choice, validate_positive, ValidationError,
};
use crate::pipeline::api::PipelineConfig;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PRODUCERS: usize = 2;
pub const DEFAULT_CONSUMERS: usize = 2;
pub const DEFAULT_CAPACITY: usize = 10;
pub const DEFAULT_ITEMS: usize = 20;
/// Per-worker pauses: the second worker of each kind runs slower
pub const DEFAULT_PRODUCER_DELAYS_MS: [u64; 2] = [100, 150];
pub const DEFAULT_CONSUMER_DELAYS_MS: [u64; 2] = [120, 180];
pub const DEFAULT_POLL_TIMEOUT_MS: u64 = 5000;
/// Largest dataset the CLI will build
pub const MAX_ITEMS: usize = 1_000_000;

#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(name = "handoff")]
#[command(about = "Bounded producer/consumer handoff with graceful shutdown")]
#[command(version)]
#[command(after_help = "Items are the sequence 10, 20, ..., N*10. \
Delay lists give one value per worker; workers past the end reuse the last value. \
Command line values override the configuration file.")]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Number of producer threads [default: 2]
    #[arg(short = 'P', long = "producers", value_name = "N", value_parser = parse_positive)]
    pub producers: Option<usize>,

    /// Number of consumer threads [default: 2]
    #[arg(short = 'C', long = "consumers", value_name = "N", value_parser = parse_positive)]
    pub consumers: Option<usize>,

    /// Queue capacity [default: 10]
    #[arg(short = 'Q', long = "capacity", value_name = "N", value_parser = parse_positive)]
    pub capacity: Option<usize>,

    /// Number of items to move, at most 1000000 [default: 20]
    #[arg(short = 'n', long = "items", value_name = "N")]
    pub items: Option<usize>,

    /// Producer pause after each item in milliseconds, per worker [default: 100,150]
    #[arg(long = "producer-delay-ms", value_name = "MS[,MS...]", value_delimiter = ',')]
    pub producer_delay_ms: Option<Vec<u64>>,

    /// Consumer pause after each item in milliseconds, per worker [default: 120,180]
    #[arg(long = "consumer-delay-ms", value_name = "MS[,MS...]", value_delimiter = ',')]
    pub consumer_delay_ms: Option<Vec<u64>>,

    /// Consumer poll timeout in milliseconds, 0 blocks indefinitely [default: 5000]
    #[arg(long = "poll-timeout-ms", value_name = "MS")]
    pub poll_timeout_ms: Option<u64>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = LOG_LEVELS)]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = LOG_FORMATS)]
    pub log_format: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<String>,

    /// Force colored output
    #[arg(long = "color", action = ArgAction::SetTrue, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color", action = ArgAction::SetTrue)]
    pub no_color: bool,

    /// Report format
    #[arg(long = "output", value_name = "FORMAT", value_parser = ["text", "json"])]
    pub output: Option<String>,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub pipeline: PipelineConfig,
    pub items: usize,
    pub log_level: String,
    pub log_format: String,
    /// `None` logs to stderr only
    pub log_file: Option<PathBuf>,
    /// `None` means decide from the terminal
    pub color: Option<bool>,
    pub output: OutputFormat,
}

/// Per-worker delays plus the uniform fallback (the last entry)
fn worker_delays(list: Option<&[u64]>, default: &[u64]) -> (Duration, Vec<Duration>) {
    let list = list.unwrap_or(default);
    let delays: Vec<_> = list.iter().copied().map(Duration::from_millis).collect();
    let uniform = delays.last().copied().unwrap_or(Duration::ZERO);
    (uniform, delays)
}

fn parse_positive(value: &str) -> Result<usize, String> {
    crate::core::validation::validate_positive_int("value", value).map_err(|e| e.to_string())
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from an explicit argument list (first element is the program name)
    pub fn parse_from_args<I, S>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(args)
    }

    /// Explicit color choice: `Some(false)` for `--no-color`, `Some(true)` for
    /// `--color`, `None` when neither was given
    pub fn color_choice(&self) -> Option<bool> {
        match (self.color, self.no_color) {
            (_, true) => Some(false),
            (true, false) => Some(true),
            _ => None,
        }
    }

    /// Fill every option not given on the command line from `file`
    pub fn merge_file_values(mut self, file: Args) -> Self {
        self.producers = self.producers.or(file.producers);
        self.consumers = self.consumers.or(file.consumers);
        self.capacity = self.capacity.or(file.capacity);
        self.items = self.items.or(file.items);
        self.producer_delay_ms = self.producer_delay_ms.or(file.producer_delay_ms);
        self.consumer_delay_ms = self.consumer_delay_ms.or(file.consumer_delay_ms);
        self.poll_timeout_ms = self.poll_timeout_ms.or(file.poll_timeout_ms);
        self.log_level = self.log_level.or(file.log_level);
        self.log_format = self.log_format.or(file.log_format);
        self.log_file = self.log_file.or(file.log_file);
        self.output = self.output.or(file.output);
        if self.color_choice().is_none() {
            self.color = file.color;
            self.no_color = file.no_color;
        }
        self
    }

    /// Apply defaults and validate
    pub fn resolve(&self) -> Result<RunSettings, ValidationError> {
        let producers = self.producers.unwrap_or(DEFAULT_PRODUCERS);
        let producers = validate_positive("producers", producers)?;
        let consumers = self.consumers.unwrap_or(DEFAULT_CONSUMERS);
        let consumers = validate_positive("consumers", consumers)?;
        let capacity = self.capacity.unwrap_or(DEFAULT_CAPACITY);
        let capacity = validate_positive("capacity", capacity)?;
        let items = validate_at_most("items", self.items.unwrap_or(DEFAULT_ITEMS), MAX_ITEMS)?;

        let (producer_delay, producer_delays) = worker_delays(
            self.producer_delay_ms.as_deref(),
            &DEFAULT_PRODUCER_DELAYS_MS,
        );
        let (consumer_delay, consumer_delays) = worker_delays(
            self.consumer_delay_ms.as_deref(),
            &DEFAULT_CONSUMER_DELAYS_MS,
        );

        let poll_timeout_ms = self.poll_timeout_ms.unwrap_or(DEFAULT_POLL_TIMEOUT_MS);
        let pipeline = PipelineConfig {
            capacity,
            producers,
            consumers,
            producer_delay,
            consumer_delay,
            producer_delays,
            consumer_delays,
            poll_timeout: (poll_timeout_ms > 0).then(|| Duration::from_millis(poll_timeout_ms)),
        };

        let log_level = validate_choice(
            "log-level",
            self.log_level.as_deref().unwrap_or("info"),
            &LOG_LEVELS,
        )?;
        let log_format = validate_choice(
            "log-format",
            self.log_format.as_deref().unwrap_or("text"),
            &LOG_FORMATS,
        )?;
        let output = self
            .output
            .as_deref()
            .map(OutputFormat::parse)
            .transpose()?
            .unwrap_or_default();

        let log_file = self
            .log_file
            .as_deref()
            .filter(|file| !file.eq_ignore_ascii_case("none") && *file != "-")
            .map(PathBuf::from);

        Ok(RunSettings {
            pipeline,
            items,
            log_level,
            log_format,
            log_file,
            color: self.color_choice(),
            output,
        })
    }
}
