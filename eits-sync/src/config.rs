//! Runtime configuration for eits-sync
//!
//! Each setting resolves CLI → environment → TOML → compiled default.
//! Relative output paths are placed under the resolved root folder.

use crate::error::{SyncError, SyncResult};
use crate::services::FetchOptions;
use eits_common::config::{parse_bool_flag, RootFolderResolver, TomlConfig};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_URL: &str = "https://eits.ria.ee";
pub const DEFAULT_VERSION: u32 = 2023;
pub const DEFAULT_JSON_OUTPUT: &str = "modules_and_measures.json";
pub const DEFAULT_RISKS_OUTPUT: &str = "risks.json";

pub const URL_ENV: &str = "EITS_URL";
pub const VERSION_ENV: &str = "EITS_VERSION";
pub const HTML_ENV: &str = "EITS_OUTPUT_FORMAT_HTML";
pub const JSON_OUTPUT_ENV: &str = "EITS_OUTPUT_JSON";
pub const CSV_OUTPUT_ENV: &str = "EITS_OUTPUT_CSV";
pub const RISK_TABLE_DIR_ENV: &str = "EITS_RISK_TABLE_DIR";
pub const CONCURRENCY_ENV: &str = "EITS_FETCH_CONCURRENCY";
pub const RATE_MS_ENV: &str = "EITS_FETCH_RATE_MS";
pub const TIMEOUT_SECS_ENV: &str = "EITS_FETCH_TIMEOUT_SECS";
pub const VERIFY_TLS_ENV: &str = "EITS_VERIFY_TLS";

/// Settings given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub root_folder: Option<PathBuf>,
    pub version: Option<u32>,
    /// `--html` flag; absent means "not forced"
    pub html: bool,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    pub url: String,
    pub version: u32,
    pub html: bool,
    pub verify_tls: bool,
    pub root_folder: PathBuf,
    pub risk_table_dir: PathBuf,
    pub json_output: PathBuf,
    pub csv_output: Option<PathBuf>,
    pub risks_output: PathBuf,
    pub diff_output: Option<PathBuf>,
    pub fetch: FetchOptions,
}

impl SyncConfig {
    pub fn resolve(cli: &CliOverrides, toml: &TomlConfig) -> SyncResult<Self> {
        let root_folder = RootFolderResolver::new()
            .with_cli_arg(cli.root_folder.as_deref())
            .with_toml(toml)
            .resolve();

        let url = env_var(URL_ENV)
            .or_else(|| toml.source.url.clone())
            .unwrap_or_else(|| DEFAULT_URL.to_string());

        let version = match cli.version {
            Some(version) => version,
            None => env_parse(VERSION_ENV)?
                .or(toml.source.version)
                .unwrap_or(DEFAULT_VERSION),
        };

        let html = cli.html
            || env_var(HTML_ENV)
                .map(|v| parse_bool_flag(&v))
                .or(toml.output.html)
                .unwrap_or(false);

        let verify_tls = env_var(VERIFY_TLS_ENV)
            .map(|v| parse_bool_flag(&v))
            .or(toml.source.verify_tls)
            .unwrap_or(true);

        let risk_table_dir = env_var(RISK_TABLE_DIR_ENV)
            .map(PathBuf::from)
            .or_else(|| toml.risk_table_dir.clone())
            .unwrap_or_else(|| root_folder.clone());

        let json_output = env_var(JSON_OUTPUT_ENV)
            .map(PathBuf::from)
            .or_else(|| toml.output.json.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_JSON_OUTPUT));

        let csv_output = env_var(CSV_OUTPUT_ENV)
            .map(PathBuf::from)
            .or_else(|| toml.output.csv.clone());

        let risks_output = toml
            .output
            .risks
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RISKS_OUTPUT));

        let defaults = FetchOptions::default();
        let fetch = FetchOptions {
            concurrency: env_parse(CONCURRENCY_ENV)?
                .or(toml.fetch.concurrency)
                .unwrap_or(defaults.concurrency),
            rate: env_parse(RATE_MS_ENV)?
                .or(toml.fetch.rate_ms)
                .map(Duration::from_millis)
                .unwrap_or(defaults.rate),
            timeout: env_parse(TIMEOUT_SECS_ENV)?
                .or(toml.fetch.timeout_secs)
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        };

        let config = SyncConfig {
            url,
            version,
            html,
            verify_tls,
            json_output: under(&root_folder, json_output),
            csv_output: csv_output.map(|p| under(&root_folder, p)),
            risks_output: under(&root_folder, risks_output),
            diff_output: toml.output.diff.clone().map(|p| under(&root_folder, p)),
            risk_table_dir,
            root_folder,
            fetch,
        };

        tracing::debug!(?config, "Resolved configuration");
        Ok(config)
    }

    pub fn version_string(&self) -> String {
        self.version.to_string()
    }

    /// Version the diff is computed against
    pub fn previous_version(&self) -> Option<u32> {
        self.version.checked_sub(1)
    }
}

fn under(root: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(name: &str) -> SyncResult<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match env_var(name) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|e| {
            SyncError::Common(eits_common::Error::Config(format!(
                "{}='{}' is invalid: {}",
                name, raw, e
            )))
        }),
    }
}
