//! CLI module containing argument parsing, configuration loading and output

pub mod args;
pub mod config;
pub mod display;
