//! CLI TOML configuration tests

use clap::Parser;
use handoff::app::cli::args::*;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use toml::Table;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_file_values_used_when_cli_silent() {
    let file = config_file("producers = 5\nconsumers = 3\npoll-timeout-ms = 0\n");
    let cli = Args::try_parse_from(["handoff"]).unwrap();

    let file_args = Args::load_config_file(Some(file.path())).await.unwrap();
    let settings = cli.merge_file_values(file_args).resolve().unwrap();

    assert_eq!(settings.pipeline.producers, 5);
    assert_eq!(settings.pipeline.consumers, 3);
    assert_eq!(settings.pipeline.poll_timeout, None);
    assert_eq!(settings.pipeline.capacity, DEFAULT_CAPACITY);
}

#[tokio::test]
async fn test_cli_overrides_file() {
    let file = config_file("capacity = 2\nitems = 9\nlog-format = \"json\"\n");
    let cli = Args::try_parse_from(["handoff", "--capacity", "8"]).unwrap();

    let file_args = Args::load_config_file(Some(file.path())).await.unwrap();
    let settings = cli.merge_file_values(file_args).resolve().unwrap();

    assert_eq!(settings.pipeline.capacity, 8);
    assert_eq!(settings.items, 9);
    assert_eq!(settings.log_format, "json");
}

#[tokio::test]
async fn test_invalid_file_value_is_reported_with_key() {
    let file = config_file("producer-delay-ms = -10\n");

    let err = Args::load_config_file(Some(file.path())).await.unwrap_err();

    assert!(err.message().contains("producer-delay-ms"));
    assert!(err.message().contains(&file.path().display().to_string()));
}

#[tokio::test]
async fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    let err = Args::load_config_file(Some(&missing)).await.unwrap_err();
    assert!(err.message().contains("does not exist"));
}

#[test]
fn test_unsupported_log_level_in_file_fails_at_resolve() {
    let mut args = Args::default();
    let mut config = Table::new();
    config.insert("log-level".to_string(), toml::Value::String("chatty".to_string()));

    Args::apply_toml_values(&mut args, &config).unwrap();
    let err = args.resolve().unwrap_err();
    assert!(err.message().contains("log-level"));
}

#[test]
fn test_delay_values_from_table() {
    let mut args = Args::default();
    let mut config = Table::new();
    config.insert("consumer-delay-ms".to_string(), toml::Value::Integer(25));

    Args::apply_toml_values(&mut args, &config).unwrap();
    assert_eq!(
        args.resolve().unwrap().pipeline.consumer_delay_for(3),
        Duration::from_millis(25)
    );
}

#[tokio::test]
async fn test_delay_lists_from_file() {
    let file = config_file("producer-delay-ms = [100, 150]\nconsumer-delay-ms = [120, 180]\n");
    let cli = Args::try_parse_from(["handoff", "--consumer-delay-ms", "5"]).unwrap();

    let file_args = Args::load_config_file(Some(file.path())).await.unwrap();
    let settings = cli.merge_file_values(file_args).resolve().unwrap();

    assert_eq!(
        settings.pipeline.producer_delays,
        vec![Duration::from_millis(100), Duration::from_millis(150)]
    );
    assert_eq!(settings.pipeline.consumer_delays, vec![Duration::from_millis(5)]);
}

#[tokio::test]
async fn test_too_many_items_in_file() {
    let file = config_file("items = 5000000\n");
    let cli = Args::try_parse_from(["handoff"]).unwrap();

    let file_args = Args::load_config_file(Some(file.path())).await.unwrap();
    let err = cli.merge_file_values(file_args).resolve().unwrap_err();

    assert!(err.message().contains("items"));
}
