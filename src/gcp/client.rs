//! GCP Client
//!
//! Compute API client combining a token source, the HTTP client and the
//! project/endpoint used to build resource URLs. Every request runs inside
//! the caller's call scope.

use super::auth::{GcpCredentials, TokenSource};
use super::http::GcpHttpClient;
use crate::cloud::{ApiVersion, Key, KeyScope, ScopeHandle};
use crate::error::{Error, Result};
use anyhow::Context;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

/// Production compute API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://compute.googleapis.com";

/// Main compute API client
#[derive(Clone)]
pub struct GcpClient {
    pub http: GcpHttpClient,
    tokens: Arc<dyn TokenSource>,
    pub project_id: String,
    endpoint: String,
}

impl GcpClient {
    /// Create a client authenticated with Application Default Credentials
    pub async fn new(project_id: &str, endpoint: &str) -> anyhow::Result<Self> {
        let credentials = GcpCredentials::new()
            .await
            .context("Failed to initialize GCP credentials")?;

        Self::with_token_source(project_id, endpoint, Arc::new(credentials))
    }

    /// Create a client with an explicit token source
    pub fn with_token_source(
        project_id: &str,
        endpoint: &str,
        tokens: Arc<dyn TokenSource>,
    ) -> anyhow::Result<Self> {
        let parsed = Url::parse(endpoint).with_context(|| format!("Invalid endpoint: {}", endpoint))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("Endpoint must be http or https: {}", endpoint);
        }

        let http = GcpHttpClient::new().context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            tokens,
            project_id: project_id.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn token(&self) -> Result<String> {
        self.tokens.token().await.map_err(Error::Auth)
    }

    pub async fn get(&self, scope: &ScopeHandle, url: &str) -> Result<Value> {
        scope
            .run(async {
                let token = self.token().await?;
                self.http.get(url, &token).await
            })
            .await
    }

    pub async fn post(&self, scope: &ScopeHandle, url: &str, body: &Value) -> Result<Value> {
        scope
            .run(async {
                let token = self.token().await?;
                self.http.post(url, &token, Some(body)).await
            })
            .await
    }

    pub async fn put(&self, scope: &ScopeHandle, url: &str, body: &Value) -> Result<Value> {
        scope
            .run(async {
                let token = self.token().await?;
                self.http.put(url, &token, body).await
            })
            .await
    }

    pub async fn patch(&self, scope: &ScopeHandle, url: &str, body: &Value) -> Result<Value> {
        scope
            .run(async {
                let token = self.token().await?;
                self.http.patch(url, &token, body).await
            })
            .await
    }

    pub async fn delete(&self, scope: &ScopeHandle, url: &str) -> Result<Value> {
        scope
            .run(async {
                let token = self.token().await?;
                self.http.delete(url, &token).await
            })
            .await
    }

    // =========================================================================
    // Compute Engine URL helpers
    // =========================================================================

    /// Build a compute API URL for `version`
    pub fn compute_url(&self, version: ApiVersion, path: &str) -> String {
        format!(
            "{}/compute/{}/projects/{}/{}",
            self.endpoint,
            version.path_segment(),
            self.project_id,
            path
        )
    }

    /// URL of a collection in `location`, e.g. `.../global/backendBuckets`
    pub fn collection_url(&self, version: ApiVersion, collection: &str, location: &KeyScope) -> String {
        self.compute_url(version, &format!("{}/{}", location.path_prefix(), collection))
    }

    /// URL of the resource addressed by `key`
    pub fn key_url(&self, version: ApiVersion, collection: &str, key: &Key) -> String {
        format!(
            "{}/{}",
            self.collection_url(version, collection, key.scope()),
            urlencoding::encode(key.name())
        )
    }

    /// URL of a long-running operation started in `location`
    pub fn operation_url(&self, version: ApiVersion, location: &KeyScope, name: &str) -> String {
        self.collection_url(version, &format!("operations/{}", urlencoding::encode(name)), location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcp::auth::StaticToken;

    fn client() -> GcpClient {
        GcpClient::with_token_source("my-project", "https://compute.googleapis.com/", Arc::new(StaticToken::new("t")))
            .unwrap()
    }

    #[test]
    fn test_compute_url_per_version() {
        let c = client();
        assert_eq!(
            c.compute_url(ApiVersion::Stable, "global/backendBuckets"),
            "https://compute.googleapis.com/compute/v1/projects/my-project/global/backendBuckets"
        );
        assert_eq!(
            c.compute_url(ApiVersion::Alpha, "global/backendBuckets"),
            "https://compute.googleapis.com/compute/alpha/projects/my-project/global/backendBuckets"
        );
    }

    #[test]
    fn test_key_urls() {
        let c = client();
        let global = Key::global("assets").unwrap();
        assert!(c
            .key_url(ApiVersion::Beta, "backendBuckets", &global)
            .ends_with("/compute/beta/projects/my-project/global/backendBuckets/assets"));

        let zonal = Key::zonal("vm-1", "us-central1-a").unwrap();
        assert!(c
            .key_url(ApiVersion::Stable, "instances", &zonal)
            .ends_with("/projects/my-project/zones/us-central1-a/instances/vm-1"));

        let regional = Key::regional("ip", "us-east1").unwrap();
        assert!(c
            .key_url(ApiVersion::Stable, "addresses", &regional)
            .ends_with("/projects/my-project/regions/us-east1/addresses/ip"));
    }

    #[test]
    fn test_operation_url() {
        let c = client();
        assert!(c
            .operation_url(ApiVersion::Stable, &KeyScope::Global, "operation-1")
            .ends_with("/projects/my-project/global/operations/operation-1"));
    }

    #[test]
    fn test_rejects_bad_endpoint() {
        let result = GcpClient::with_token_source("p-123456", "ftp://example.com", Arc::new(StaticToken::new("t")));
        assert!(result.is_err());
        let result = GcpClient::with_token_source("p-123456", "not a url", Arc::new(StaticToken::new("t")));
        assert!(result.is_err());
    }
}
