//! SyncConfig resolution order (CLI → ENV → TOML → default)
//!
//! Every test touching EITS_* variables is #[serial] and clears them again.

use eits_common::config::{FetchConfig, OutputConfig, SourceConfig, TomlConfig, ROOT_FOLDER_ENV};
use eits_sync::config::*;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const ALL_ENV: &[&str] = &[
    ROOT_FOLDER_ENV,
    URL_ENV,
    VERSION_ENV,
    HTML_ENV,
    JSON_OUTPUT_ENV,
    CSV_OUTPUT_ENV,
    RISK_TABLE_DIR_ENV,
    CONCURRENCY_ENV,
    RATE_MS_ENV,
    TIMEOUT_SECS_ENV,
    VERIFY_TLS_ENV,
];

fn clear_env() {
    for name in ALL_ENV {
        env::remove_var(name);
    }
}

fn cli_root(root: &str) -> CliOverrides {
    CliOverrides {
        root_folder: Some(PathBuf::from(root)),
        ..Default::default()
    }
}

fn toml() -> TomlConfig {
    TomlConfig {
        source: SourceConfig {
            url: Some("https://toml.example".to_string()),
            version: Some(2022),
            verify_tls: Some(false),
        },
        fetch: FetchConfig {
            concurrency: Some(8),
            rate_ms: Some(250),
            timeout_secs: Some(15),
        },
        output: OutputConfig {
            html: Some(false),
            json: Some(PathBuf::from("toml.json")),
            csv: Some(PathBuf::from("/abs/measures.csv")),
            risks: None,
            diff: Some(PathBuf::from("diff.json")),
        },
        ..Default::default()
    }
}

#[test]
#[serial]
fn test_defaults() {
    clear_env();

    let config = SyncConfig::resolve(&cli_root("/out"), &TomlConfig::default()).unwrap();

    assert_eq!(config.url, DEFAULT_URL);
    assert_eq!(config.version, DEFAULT_VERSION);
    assert!(!config.html);
    assert!(config.verify_tls);
    assert_eq!(config.root_folder, PathBuf::from("/out"));
    assert_eq!(config.risk_table_dir, PathBuf::from("/out"));
    assert_eq!(config.json_output, PathBuf::from("/out").join(DEFAULT_JSON_OUTPUT));
    assert_eq!(config.risks_output, PathBuf::from("/out").join(DEFAULT_RISKS_OUTPUT));
    assert_eq!(config.csv_output, None);
    assert_eq!(config.diff_output, None);
    assert_eq!(config.fetch.concurrency, 100);
}

#[test]
#[serial]
fn test_toml_values_apply() {
    clear_env();

    let config = SyncConfig::resolve(&cli_root("/out"), &toml()).unwrap();

    assert_eq!(config.url, "https://toml.example");
    assert_eq!(config.version, 2022);
    assert!(!config.verify_tls);
    assert_eq!(config.json_output, PathBuf::from("/out/toml.json"));
    assert_eq!(config.csv_output, Some(PathBuf::from("/abs/measures.csv")));
    assert_eq!(config.diff_output, Some(PathBuf::from("/out/diff.json")));
    assert_eq!(config.fetch.concurrency, 8);
    assert_eq!(config.fetch.rate, Duration::from_millis(250));
    assert_eq!(config.fetch.timeout, Duration::from_secs(15));
}

#[test]
#[serial]
fn test_env_overrides_toml() {
    clear_env();
    env::set_var(URL_ENV, "https://env.example");
    env::set_var(VERSION_ENV, "2021");
    env::set_var(HTML_ENV, "TRUE");
    env::set_var(CSV_OUTPUT_ENV, "env.csv");
    env::set_var(CONCURRENCY_ENV, "2");
    env::set_var(VERIFY_TLS_ENV, "true");

    let result = SyncConfig::resolve(&cli_root("/out"), &toml());
    clear_env();
    let config = result.unwrap();

    assert_eq!(config.url, "https://env.example");
    assert_eq!(config.version, 2021);
    assert!(config.html);
    assert!(config.verify_tls);
    assert_eq!(config.csv_output, Some(PathBuf::from("/out/env.csv")));
    assert_eq!(config.fetch.concurrency, 2);
    assert_eq!(config.fetch.rate, Duration::from_millis(250));
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    env::set_var(VERSION_ENV, "2021");
    env::set_var(ROOT_FOLDER_ENV, "/from-env");

    let cli = CliOverrides {
        root_folder: Some(PathBuf::from("/from-cli")),
        version: Some(2024),
        html: true,
    };
    let result = SyncConfig::resolve(&cli, &toml());
    clear_env();
    let config = result.unwrap();

    assert_eq!(config.version, 2024);
    assert!(config.html);
    assert_eq!(config.root_folder, PathBuf::from("/from-cli"));
    assert_eq!(config.previous_version(), Some(2023));
    assert_eq!(config.version_string(), "2024");
}

#[test]
#[serial]
fn test_empty_env_is_ignored() {
    clear_env();
    env::set_var(URL_ENV, "  ");
    env::set_var(CONCURRENCY_ENV, "");

    let result = SyncConfig::resolve(&cli_root("/out"), &toml());
    clear_env();
    let config = result.unwrap();

    assert_eq!(config.url, "https://toml.example");
    assert_eq!(config.fetch.concurrency, 8);
}

#[test]
#[serial]
fn test_invalid_numeric_env_is_rejected() {
    clear_env();
    env::set_var(RATE_MS_ENV, "fast");

    let result = SyncConfig::resolve(&cli_root("/out"), &TomlConfig::default());
    clear_env();

    let err = result.unwrap_err();
    assert_eq!(err.code(), "COMMON_ERROR");
    assert!(err.to_string().contains(RATE_MS_ENV));
}
