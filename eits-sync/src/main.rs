//! eits-sync - E-ITS catalog synchronizer
//!
//! `sync` fetches a catalog version with all of its modules and writes the
//! normalized modules (JSON, optionally CSV), the threat catalog and, when
//! configured, the measure diff against the previous version.
//! `diff` reconciles the remote diff document for two versions.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eits_common::config::{default_config_path, load_toml_config, TomlConfig};
use eits_sync::config::{CliOverrides, SyncConfig};
use eits_sync::export::{measure_rows, write_csv, write_json};
use eits_sync::services::{
    DiffOutcome, DiffReconciler, FetchOrchestrator, HttpCatalogSource, RiskLinker, RiskTable,
    TextNormalizer,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Command-line arguments for eits-sync
#[derive(Parser, Debug)]
#[command(name = "eits-sync")]
#[command(about = "Synchronize the E-ITS security catalog")]
#[command(version)]
struct Args {
    /// TOML config file (default: <config dir>/eits/eits-sync.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Folder receiving output files
    #[arg(long, global = true)]
    root_folder: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch and normalize a catalog version
    #[command(disable_version_flag = true)]
    Sync {
        /// Catalog version, e.g. 2023
        #[arg(long = "version", value_name = "VERSION")]
        catalog_version: Option<u32>,

        /// Keep HTML markup in text fields
        #[arg(long)]
        html: bool,
    },
    /// Reconcile the measure diff between two versions
    Diff {
        #[arg(long)]
        old: u32,

        #[arg(long)]
        new: u32,

        /// Write the combined view here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(|| default_config_path("eits-sync"));
    let toml_config = match &config_path {
        Some(path) => load_toml_config(path).context("Failed to load configuration")?,
        None => TomlConfig::default(),
    };
    eits_common::logging::init_tracing(&toml_config.logging)
        .context("Failed to initialize logging")?;

    info!(
        "Starting eits-sync {} (git {}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    if let Some(path) = &config_path {
        info!("Config: {}", path.display());
    }

    let started = Instant::now();
    let (cli, command) = match args.command {
        Command::Sync { catalog_version, html } => (
            CliOverrides {
                root_folder: args.root_folder,
                version: catalog_version,
                html,
            },
            None,
        ),
        Command::Diff { old, new, output } => (
            CliOverrides {
                root_folder: args.root_folder,
                ..Default::default()
            },
            Some((old, new, output)),
        ),
    };
    let config = SyncConfig::resolve(&cli, &toml_config)?;
    info!("Root folder: {}", config.root_folder.display());

    match command {
        None => run_sync(&config).await?,
        Some((old, new, output)) => run_diff(&config, old, new, output).await?,
    }

    info!("Total time: {:.2} seconds.", started.elapsed().as_secs_f64());
    Ok(())
}

async fn run_sync(config: &SyncConfig) -> Result<()> {
    let version = config.version_string();
    let source = Arc::new(HttpCatalogSource::new(
        &config.url,
        config.verify_tls,
        config.fetch.timeout,
    )?);

    let risk_table = RiskTable::load_for_version(&config.risk_table_dir, &version)?;
    let normalizer = TextNormalizer::new(config.html, RiskLinker::new(risk_table));

    let orchestrator = FetchOrchestrator::new(source.clone(), normalizer.clone(), config.fetch.clone());
    let report = orchestrator
        .run(&version)
        .await
        .with_context(|| format!("Failed to fetch catalog {} from {}", version, config.url))?;

    for failure in &report.failures {
        warn!(
            "Module '{}' ({}) in group '{}' missing from output: {}",
            failure.module_title, failure.module_id, failure.root_group, failure.error_message
        );
    }

    write_json(&config.json_output, &report.modules)?;

    if let Some(csv_path) = &config.csv_output {
        let rows = measure_rows(&report.modules);
        if rows.is_empty() {
            warn!("No measures to write, skipping {}", csv_path.display());
        } else {
            write_csv(csv_path, &rows)?;
        }
    }

    match source.fetch_risk_definitions().await {
        Ok(definitions) => write_json(&config.risks_output, &definitions)?,
        Err(e) => warn!("Threat catalog not saved: {}", e),
    }

    if let Some(diff_path) = &config.diff_output {
        match config.previous_version() {
            Some(previous) => {
                let reconciler = DiffReconciler::new(normalizer);
                let outcome = reconciler
                    .reconcile_from_source(source.as_ref(), &previous.to_string(), &version)
                    .await?;
                write_diff(outcome, Some(diff_path.clone()))?;
            }
            None => warn!("Catalog version {} has no predecessor, skipping diff", version),
        }
    }

    Ok(())
}

async fn run_diff(config: &SyncConfig, old: u32, new: u32, output: Option<PathBuf>) -> Result<()> {
    let source = HttpCatalogSource::new(&config.url, config.verify_tls, config.fetch.timeout)?;
    let risk_table = RiskTable::load_for_version(&config.risk_table_dir, &new.to_string())?;
    let reconciler = DiffReconciler::new(TextNormalizer::new(config.html, RiskLinker::new(risk_table)));

    let outcome = reconciler
        .reconcile_from_source(&source, &old.to_string(), &new.to_string())
        .await?;
    write_diff(outcome, output)
}

fn write_diff(outcome: DiffOutcome, output: Option<PathBuf>) -> Result<()> {
    match outcome {
        DiffOutcome::Available(report) => {
            let combined = report.combined();
            match output {
                Some(path) => write_json(&path, &combined)?,
                None => println!("{}", serde_json::to_string_pretty(&combined)?),
            }
        }
        DiffOutcome::Unavailable {
            old_version,
            new_version,
            reason,
        } => warn!(
            "No diff between {} and {}: {}",
            old_version, new_version, reason
        ),
    }
    Ok(())
}
