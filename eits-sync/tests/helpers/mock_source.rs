//! In-memory `CatalogSource`

use async_trait::async_trait;
use eits_sync::models::{Catalog, DiffCatalog, ModuleContent};
use eits_sync::services::CatalogSource;
use eits_sync::{SyncError, SyncResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// How the mock answers a module request
#[derive(Debug, Clone)]
pub enum MockBehavior {
    Respond { content: ModuleContent, delay: Duration },
    TransportError(String),
    /// Never completes
    Hang,
}

#[derive(Default)]
pub struct MockSource {
    catalog: Option<Catalog>,
    diff: Option<DiffCatalog>,
    modules: HashMap<String, MockBehavior>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_diff(mut self, diff: DiffCatalog) -> Self {
        self.diff = Some(diff);
        self
    }

    pub fn with_module(mut self, content: ModuleContent, delay: Duration) -> Self {
        self.modules
            .insert(content.id.clone(), MockBehavior::Respond { content, delay });
        self
    }

    pub fn with_behavior(mut self, module_id: &str, behavior: MockBehavior) -> Self {
        self.modules.insert(module_id.to_string(), behavior);
        self
    }

    /// Highest number of module requests observed running at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Module ids in the order their requests started
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CatalogSource for MockSource {
    async fn fetch_catalog(&self, version: &str) -> SyncResult<Catalog> {
        self.catalog
            .clone()
            .ok_or_else(|| SyncError::transport(format!("catalog {}", version), "HTTP 404: not found"))
    }

    async fn fetch_diff(&self, old_version: &str, new_version: &str) -> SyncResult<DiffCatalog> {
        self.diff.clone().ok_or_else(|| {
            SyncError::transport(
                format!("diff {} -> {}", old_version, new_version),
                "HTTP 404: not found",
            )
        })
    }

    async fn fetch_module(&self, _version: &str, module_id: &str) -> SyncResult<ModuleContent> {
        self.requested.lock().unwrap().push(module_id.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        match self.modules.get(module_id).cloned() {
            Some(MockBehavior::Respond { content, delay }) => {
                tokio::time::sleep(delay).await;
                Ok(content)
            }
            Some(MockBehavior::TransportError(message)) => {
                Err(SyncError::transport(format!("module {}", module_id), message))
            }
            Some(MockBehavior::Hang) => std::future::pending().await,
            None => Err(SyncError::transport(
                format!("module {}", module_id),
                "HTTP 404: unknown module",
            )),
        }
    }
}
