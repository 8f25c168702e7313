//! CLI argument parsing tests

use clap::Parser;
use handoff::app::cli::args::*;
use handoff::app::cli::display::OutputFormat;
use std::time::Duration;

fn parse(args: &[&str]) -> Args {
    let mut argv = vec!["handoff"];
    argv.extend_from_slice(args);
    Args::try_parse_from(argv).unwrap()
}

#[test]
fn test_long_flags_resolve() {
    let settings = parse(&[
        "--producers",
        "3",
        "--consumers",
        "1",
        "--capacity",
        "4",
        "--items",
        "12",
        "--producer-delay-ms",
        "0,40",
        "--consumer-delay-ms",
        "7",
        "--poll-timeout-ms",
        "250",
        "--output",
        "json",
    ])
    .resolve()
    .unwrap();

    assert_eq!(settings.pipeline.producers, 3);
    assert_eq!(settings.pipeline.consumers, 1);
    assert_eq!(settings.pipeline.capacity, 4);
    assert_eq!(settings.items, 12);
    assert_eq!(settings.pipeline.producer_delay_for(0), Duration::ZERO);
    assert_eq!(settings.pipeline.producer_delay_for(1), Duration::from_millis(40));
    assert_eq!(settings.pipeline.producer_delay_for(2), Duration::from_millis(40));
    assert_eq!(settings.pipeline.consumer_delay_for(0), Duration::from_millis(7));
    assert_eq!(settings.pipeline.poll_timeout, Some(Duration::from_millis(250)));
    assert_eq!(settings.output, OutputFormat::Json);
}

#[test]
fn test_default_delays_differ_per_worker() {
    let settings = parse(&[]).resolve().unwrap();
    let pipeline = &settings.pipeline;

    assert_eq!(pipeline.producer_delay_for(0), Duration::from_millis(100));
    assert_eq!(pipeline.producer_delay_for(1), Duration::from_millis(150));
    assert_eq!(pipeline.consumer_delay_for(0), Duration::from_millis(120));
    assert_eq!(pipeline.consumer_delay_for(1), Duration::from_millis(180));
}

#[test]
fn test_repeated_delay_flags_append() {
    let args = parse(&["--producer-delay-ms", "10", "--producer-delay-ms", "20,30"]);
    assert_eq!(args.producer_delay_ms, Some(vec![10, 20, 30]));
}

#[test]
fn test_equals_syntax() {
    let args = parse(&["--capacity=3", "-P2", "--log-level=warn"]);
    assert_eq!(args.capacity, Some(3));
    assert_eq!(args.producers, Some(2));
    assert_eq!(args.log_level.as_deref(), Some("warn"));
}

#[test]
fn test_rejected_values() {
    for argv in [
        vec!["handoff", "--capacity", "0"],
        vec!["handoff", "--producers", "-1"],
        vec!["handoff", "--items", "many"],
        vec!["handoff", "--log-level", "loud"],
        vec!["handoff", "--log-format", "xml"],
        vec!["handoff", "--output", "yaml"],
        vec!["handoff", "--poll-timeout-ms", "-5"],
        vec!["handoff", "--producer-delay-ms", "10,slow"],
    ] {
        assert!(Args::try_parse_from(&argv).is_err(), "{:?} should fail", argv);
    }
}

#[test]
fn test_config_file_flag() {
    let args = parse(&["-c", "/tmp/handoff.toml"]);
    assert_eq!(
        args.config_file.as_deref(),
        Some(std::path::Path::new("/tmp/handoff.toml"))
    );
}

#[test]
fn test_log_file_dash_disables() {
    let settings = parse(&["--log-file", "-"]).resolve().unwrap();
    assert_eq!(settings.log_file, None);
}
