//! Remote catalog access
//!
//! `CatalogSource` is the seam between the engine and the remote catalog.
//! `HttpCatalogSource` talks to the public E-ITS API; tests substitute
//! in-memory sources.

use super::risk_catalog::{find_threat_catalog, parse_risk_definitions};
use crate::error::{SyncError, SyncResult};
use crate::models::{Catalog, DiffCatalog, ModuleContent, RiskDefinition};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

const USER_AGENT: &str = concat!("eits-sync/", env!("CARGO_PKG_VERSION"));

/// Source of catalog documents
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Full catalog tree for one version
    async fn fetch_catalog(&self, version: &str) -> SyncResult<Catalog>;

    /// Precomputed difference between two versions
    async fn fetch_diff(&self, old_version: &str, new_version: &str) -> SyncResult<DiffCatalog>;

    /// Content of a single module
    async fn fetch_module(&self, version: &str, module_id: &str) -> SyncResult<ModuleContent>;
}

/// E-ITS REST API client
pub struct HttpCatalogSource {
    http_client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpCatalogSource {
    /// `verify_tls = false` accepts any server certificate
    pub fn new(base_url: &str, verify_tls: bool, timeout: Duration) -> SyncResult<Self> {
        if !verify_tls {
            tracing::warn!(base_url, "TLS certificate verification is disabled");
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .danger_accept_invalid_certs(!verify_tls)
            .build()
            .map_err(|e| SyncError::transport(base_url, e))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn catalog_url(&self, version: &str) -> String {
        format!("{}/api/2/catalog/{}", self.base_url, version)
    }

    pub fn diff_url(&self, old_version: &str, new_version: &str) -> String {
        format!(
            "{}/api/2/catalog/measures-diff/{}/{}",
            self.base_url, old_version, new_version
        )
    }

    pub fn module_url(&self, version: &str, module_id: &str) -> String {
        format!("{}/{}", self.catalog_url(version), module_id)
    }

    pub fn materials_url(&self) -> String {
        format!("{}/api/2/materials", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> SyncResult<T> {
        tracing::debug!(url, "Requesting");

        let response = self
            .http_client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(url, status = status.as_u16(), "Request failed");
            return Err(SyncError::transport(
                url,
                format!("HTTP {}: {}", status.as_u16(), body.trim()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.request_error(url, e))?;
        let document = serde_json::from_str(&body).map_err(|e| SyncError::decode(url, e))?;

        tracing::debug!(url, "Successful");
        Ok(document)
    }

    fn request_error(&self, url: &str, e: reqwest::Error) -> SyncError {
        if e.is_timeout() {
            SyncError::Timeout {
                target: url.to_string(),
                after: self.timeout,
            }
        } else {
            SyncError::transport(url, e)
        }
    }

    /// Raw materials document
    pub async fn fetch_materials(&self) -> SyncResult<Value> {
        self.get_json(&self.materials_url()).await
    }

    /// Threat catalog from the materials endpoint
    pub async fn fetch_risk_definitions(&self) -> SyncResult<Vec<RiskDefinition>> {
        let materials = self.fetch_materials().await?;
        let html = find_threat_catalog(&materials)?;
        Ok(parse_risk_definitions(html))
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_catalog(&self, version: &str) -> SyncResult<Catalog> {
        self.get_json(&self.catalog_url(version)).await
    }

    async fn fetch_diff(&self, old_version: &str, new_version: &str) -> SyncResult<DiffCatalog> {
        self.get_json(&self.diff_url(old_version, new_version)).await
    }

    async fn fetch_module(&self, version: &str, module_id: &str) -> SyncResult<ModuleContent> {
        self.get_json(&self.module_url(version, module_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(base: &str) -> HttpCatalogSource {
        HttpCatalogSource::new(base, true, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_urls() {
        let source = source("https://eits.ria.ee/");
        assert_eq!(source.base_url(), "https://eits.ria.ee");
        assert_eq!(source.catalog_url("2023"), "https://eits.ria.ee/api/2/catalog/2023");
        assert_eq!(
            source.diff_url("2022", "2023"),
            "https://eits.ria.ee/api/2/catalog/measures-diff/2022/2023"
        );
        assert_eq!(
            source.module_url("2023", "abc-123"),
            "https://eits.ria.ee/api/2/catalog/2023/abc-123"
        );
        assert_eq!(source.materials_url(), "https://eits.ria.ee/api/2/materials");
    }

    #[test]
    fn test_tls_verification_can_be_disabled() {
        assert!(HttpCatalogSource::new("https://localhost", false, Duration::from_secs(1)).is_ok());
    }
}
