//! Backend buckets
//!
//! A backend bucket points a load balancer at a Cloud Storage bucket. It is a
//! global resource available on the `v1`, `beta` and `alpha` surfaces.

use crate::cloud::{Resource, ResourceAccessor, ScopeType};
use super::registry::ResourceKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metric name of the backend bucket kind
pub const BACKEND_BUCKET: &str = "backendbucket";

/// Accessor for backend buckets on every API version
pub type BackendBuckets = ResourceAccessor<BackendBucket>;

/// Backend bucket payload.
///
/// Only the commonly used fields are typed; everything else, including
/// fields that exist only on the beta and alpha surfaces, is kept in
/// `extra` and sent back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendBucket {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Cloud Storage bucket served by this backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_cdn: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdn_policy: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BackendBucket {
    pub fn new(name: &str, bucket_name: &str) -> Self {
        Self {
            name: name.to_string(),
            bucket_name: Some(bucket_name.to_string()),
            ..Default::default()
        }
    }
}

impl Resource for BackendBucket {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Kind configuration for backend buckets
pub fn backend_bucket_kind() -> ResourceKind {
    let mut kind = ResourceKind::new(BACKEND_BUCKET, "backendBuckets", ScopeType::Global);
    kind.display_name = "Backend Buckets".to_string();
    kind
}
