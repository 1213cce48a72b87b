//! Bounded-concurrency module retrieval
//!
//! Every module of the catalog is fetched as its own task. A shared semaphore
//! caps in-flight fetches; each task holds its permit through the fetch and a
//! fixed post-fetch delay, so the delay throttles permit release rather than
//! request start.
//!
//! Root groups are dispatched one after another. Within a root group all
//! modules are spawned at once and their results collected positionally, so
//! the output follows flatten order no matter which fetch finishes first.
//!
//! A module that fails (transport, decode, timeout, panic, normalization) is
//! logged, recorded as a `ModuleFailure` and left out; the batch itself only
//! fails when the catalog tree is malformed.

use super::catalog_client::CatalogSource;
use super::text_normalizer::TextNormalizer;
use crate::catalog::flatten;
use crate::error::{SyncError, SyncResult};
use crate::models::{Catalog, FetchReport, ModuleContent, ModuleFailure};
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Default number of simultaneous module fetches
pub const DEFAULT_CONCURRENCY: usize = 100;
/// Default delay after each fetch before its permit is released
pub const DEFAULT_RATE: Duration = Duration::from_millis(100);
/// Default per-fetch time budget
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Admission and throttling settings for the fetch phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Maximum in-flight fetches
    pub concurrency: usize,
    /// Minimum interval a task waits after its fetch settles
    pub rate: Duration,
    /// Time budget of a single fetch
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            rate: DEFAULT_RATE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Retrieves and normalizes every module of a catalog
pub struct FetchOrchestrator {
    source: Arc<dyn CatalogSource>,
    normalizer: TextNormalizer,
    options: FetchOptions,
    permits: Arc<Semaphore>,
}

impl FetchOrchestrator {
    pub fn new(source: Arc<dyn CatalogSource>, normalizer: TextNormalizer, options: FetchOptions) -> Self {
        let concurrency = if options.concurrency == 0 {
            tracing::warn!("Fetch concurrency of 0 requested, using 1");
            1
        } else {
            options.concurrency
        };

        Self {
            source,
            normalizer,
            permits: Arc::new(Semaphore::new(concurrency)),
            options: FetchOptions {
                concurrency,
                ..options
            },
        }
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Fetch the catalog for `version`, then all of its modules
    ///
    /// A catalog that cannot be fetched fails the run.
    pub async fn run(&self, version: &str) -> SyncResult<FetchReport> {
        tracing::info!("Requesting catalog version {}", version);
        let catalog = self.source.fetch_catalog(version).await?;
        self.fetch_modules(&catalog).await
    }

    /// Fetch and normalize every module of an already loaded catalog
    pub async fn fetch_modules(&self, catalog: &Catalog) -> SyncResult<FetchReport> {
        // Flatten everything up front so a malformed tree fails before any request
        let mut plan = Vec::with_capacity(catalog.root_groups.len());
        for root in &catalog.root_groups {
            plan.push((root, flatten(root)?));
        }

        let mut report = FetchReport::new(catalog.version.clone());
        let total: usize = plan.iter().map(|(_, modules)| modules.len()).sum();
        tracing::info!(
            modules = total,
            concurrency = self.options.concurrency,
            rate_ms = self.options.rate.as_millis() as u64,
            timeout_secs = self.options.timeout.as_secs(),
            "Fetching modules of catalog version {}",
            catalog.version
        );

        for (root, modules) in plan {
            let root_title = root.display_title();
            tracing::info!(
                "Requesting {} modules in module group {}",
                modules.len(),
                root_title
            );

            let handles: Vec<_> = modules
                .iter()
                .map(|module| {
                    tracing::debug!("Creating fetch task for '{}'", module.display_title());
                    tokio::spawn(fetch_one(
                        Arc::clone(&self.source),
                        Arc::clone(&self.permits),
                        catalog.version.clone(),
                        module.id.clone(),
                        self.options.clone(),
                    ))
                })
                .collect();

            let joined = join_all(handles).await;
            for (module, joined) in modules.iter().zip(joined) {
                let title = module.display_title();
                let outcome = match joined {
                    Ok(fetched) => fetched.and_then(|content| self.normalizer.normalize_module(&content)),
                    Err(join_error) => {
                        tracing::error!(
                            module_id = %module.id,
                            "Fetch task for '{}' did not complete: {}",
                            title,
                            join_error
                        );
                        report.failures.push(ModuleFailure {
                            module_id: module.id.clone(),
                            module_title: title.to_string(),
                            root_group: root_title.to_string(),
                            error_code: "TASK_PANIC".to_string(),
                            error_message: join_error.to_string(),
                            occurred_at: Utc::now(),
                        });
                        continue;
                    }
                };

                match outcome {
                    Ok(normalized) => report.modules.push(normalized),
                    Err(e) => {
                        tracing::warn!(
                            module_id = %module.id,
                            error_code = e.code(),
                            "Excluding module '{}' from output: {}",
                            title,
                            e
                        );
                        report
                            .failures
                            .push(ModuleFailure::new(&module.id, title, root_title, &e));
                    }
                }
            }
        }

        report.finished_at = Utc::now();
        tracing::info!(
            fetched = report.modules.len(),
            excluded = report.failures.len(),
            "Fetched {} of {} modules in {}s",
            report.modules.len(),
            report.attempted(),
            report.duration_seconds()
        );
        Ok(report)
    }
}

/// One permit-guarded fetch
///
/// The permit is an owned guard: it is released when this future completes or
/// is dropped, including when the task panics.
async fn fetch_one(
    source: Arc<dyn CatalogSource>,
    permits: Arc<Semaphore>,
    version: String,
    module_id: String,
    options: FetchOptions,
) -> SyncResult<ModuleContent> {
    let _permit = permits
        .acquire_owned()
        .await
        .map_err(|e| SyncError::transport(format!("module {}", module_id), e))?;

    let result = match tokio::time::timeout(options.timeout, source.fetch_module(&version, &module_id)).await {
        Ok(fetched) => fetched,
        Err(_) => Err(SyncError::Timeout {
            target: format!("module {}", module_id),
            after: options.timeout,
        }),
    };

    tokio::time::sleep(options.rate).await;
    result
}
