//! REST transport for resource services
//!
//! [`RestService`] implements [`ResourceService`] for one resource kind on
//! one API version. Mutating calls return a compute operation which is
//! polled until it is `DONE`.

use super::client::GcpClient;
use crate::cloud::{
    ApiVersion, Filter, Key, KeyScope, Resource, ResourceService, ScopeHandle, VersionedClients,
};
use crate::error::{Error, Result};
use crate::resource::{ResourceKind, UpdateMethod};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// Default delay between operation status polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Compute long-running operation, as far as waiting on it is concerned
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComputeOperation {
    name: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    error: Option<OperationErrors>,
    #[serde(default)]
    http_error_status_code: Option<u16>,
    #[serde(default)]
    http_error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OperationErrors {
    #[serde(default)]
    errors: Vec<OperationError>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ComputeOperation {
    fn is_done(&self) -> bool {
        self.status == "DONE"
    }

    /// Result of a finished operation
    fn into_result(self) -> Result<()> {
        let Some(errors) = self.error else {
            return Ok(());
        };
        let first = errors.errors.into_iter().next();
        let message = first
            .as_ref()
            .and_then(|e| e.message.clone())
            .or(self.http_error_message)
            .unwrap_or_else(|| format!("operation {} failed", self.name));
        Err(Error::Api {
            status: self.http_error_status_code.unwrap_or(500),
            message,
            reason: first.and_then(|e| e.code),
        })
    }
}

/// [`ResourceService`] over the compute REST API
pub struct RestService<R> {
    client: GcpClient,
    version: ApiVersion,
    collection: String,
    update_method: UpdateMethod,
    poll_interval: Duration,
    _payload: PhantomData<fn() -> R>,
}

impl<R: Resource> RestService<R> {
    pub fn new(client: GcpClient, version: ApiVersion, kind: &ResourceKind) -> Self {
        Self {
            client,
            version,
            collection: kind.collection.clone(),
            update_method: kind.update_method,
            poll_interval: DEFAULT_POLL_INTERVAL,
            _payload: PhantomData,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Wait for the operation in `response` to finish
    async fn wait(&self, scope: &ScopeHandle, location: &KeyScope, response: Value) -> Result<()> {
        let mut op: ComputeOperation = serde_json::from_value(response)?;
        let url = self.client.operation_url(self.version, location, &op.name);

        while !op.is_done() {
            tracing::debug!(operation = %op.name, status = %op.status, "waiting for operation");
            scope.sleep(self.poll_interval).await?;
            op = serde_json::from_value(self.client.get(scope, &url).await?)?;
        }

        op.into_result()
    }
}

#[async_trait]
impl<R: Resource> ResourceService<R> for RestService<R> {
    async fn get(&self, scope: &ScopeHandle, key: &Key) -> Result<R> {
        let url = self.client.key_url(self.version, &self.collection, key);
        let value = self.client.get(scope, &url).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn list(&self, scope: &ScopeHandle, location: &KeyScope, filter: &Filter) -> Result<Vec<R>> {
        let base = self.client.collection_url(self.version, &self.collection, location);
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let url = list_url(&base, filter, page_token.as_deref());
            let mut response = self.client.get(scope, &url).await?;

            if let Some(Value::Array(page)) = response.get_mut("items").map(Value::take) {
                for item in page {
                    items.push(serde_json::from_value(item)?);
                }
            }

            page_token = response
                .get("nextPageToken")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            if page_token.is_none() {
                break;
            }
        }

        Ok(items)
    }

    async fn insert(&self, scope: &ScopeHandle, key: &Key, obj: &R) -> Result<()> {
        let url = self.client.collection_url(self.version, &self.collection, key.scope());
        let body = serde_json::to_value(obj)?;
        let op = self.client.post(scope, &url, &body).await?;
        self.wait(scope, key.scope(), op).await
    }

    async fn update(&self, scope: &ScopeHandle, key: &Key, obj: &R) -> Result<()> {
        let url = self.client.key_url(self.version, &self.collection, key);
        let body = serde_json::to_value(obj)?;
        let op = match self.update_method {
            UpdateMethod::Put => self.client.put(scope, &url, &body).await?,
            UpdateMethod::Patch => self.client.patch(scope, &url, &body).await?,
        };
        self.wait(scope, key.scope(), op).await
    }

    async fn delete(&self, scope: &ScopeHandle, key: &Key) -> Result<()> {
        let url = self.client.key_url(self.version, &self.collection, key);
        let op = self.client.delete(scope, &url).await?;
        self.wait(scope, key.scope(), op).await
    }
}

/// List URL with the filter and page token query parameters
fn list_url(base: &str, filter: &Filter, page_token: Option<&str>) -> String {
    let mut query_parts = Vec::new();
    if let Some(expr) = filter.to_query() {
        query_parts.push(format!("filter={}", urlencoding::encode(&expr)));
    }
    if let Some(token) = page_token {
        query_parts.push(format!("pageToken={}", urlencoding::encode(token)));
    }

    if query_parts.is_empty() {
        base.to_string()
    } else {
        format!("{}?{}", base, query_parts.join("&"))
    }
}

impl<R: Resource> VersionedClients<R> {
    /// REST services for every version `kind` is available on
    pub fn rest(client: &GcpClient, kind: &ResourceKind, poll_interval: Duration) -> Self {
        kind.versions.iter().fold(Self::new(), |clients, version| {
            let service = RestService::<R>::new(client.clone(), *version, kind).with_poll_interval(poll_interval);
            clients.with(*version, Arc::new(service))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_list_url_without_query() {
        assert_eq!(list_url("https://x/global/urlMaps", &Filter::None, None), "https://x/global/urlMaps");
    }

    #[test]
    fn test_list_url_encodes_filter_and_token() {
        let filter = Filter::regexp("name", "web-.*").unwrap();
        let url = list_url("https://x/c", &filter, Some("tok/2"));
        assert_eq!(url, "https://x/c?filter=name%20eq%20%22web-.%2A%22&pageToken=tok%2F2");
    }

    #[test]
    fn test_operation_error_maps_status() {
        let op: ComputeOperation = serde_json::from_value(json!({
            "name": "operation-1",
            "status": "DONE",
            "httpErrorStatusCode": 409,
            "error": {"errors": [{"code": "RESOURCE_ALREADY_EXISTS", "message": "exists"}]}
        }))
        .unwrap();
        let err = op.into_result().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(err.to_string().contains("exists"));
    }

    #[test]
    fn test_successful_operation() {
        let op: ComputeOperation =
            serde_json::from_value(json!({"name": "operation-2", "status": "DONE"})).unwrap();
        assert!(op.is_done());
        assert!(op.into_result().is_ok());
    }
}
