//! Remote resource operations
//!
//! [`ResourceService`] is the operation surface one API version exposes for
//! one resource kind. Accessors only ever talk to the remote API through it;
//! [`crate::gcp::RestService`] is the HTTP implementation and tests plug in
//! their own.

use super::filter::Filter;
use super::key::{Key, KeyScope};
use super::scope::ScopeHandle;
use crate::error::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Payload of a resource kind
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Resource name, used to build the key for create and update
    fn name(&self) -> &str;
}

impl Resource for Value {
    fn name(&self) -> &str {
        self.get("name").and_then(Value::as_str).unwrap_or_default()
    }
}

/// Operations of one resource kind on one API version.
///
/// Implementations must do their remote work inside `scope` (see
/// [`ScopeHandle::run`]) so a cancelled or expired call returns promptly.
#[async_trait]
pub trait ResourceService<R: Resource>: Send + Sync {
    async fn get(&self, scope: &ScopeHandle, key: &Key) -> Result<R>;

    /// List the resources in `location` that match `filter`
    async fn list(&self, scope: &ScopeHandle, location: &KeyScope, filter: &Filter) -> Result<Vec<R>>;

    async fn insert(&self, scope: &ScopeHandle, key: &Key, obj: &R) -> Result<()>;

    async fn update(&self, scope: &ScopeHandle, key: &Key, obj: &R) -> Result<()>;

    async fn delete(&self, scope: &ScopeHandle, key: &Key) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_resource_name() {
        assert_eq!(Resource::name(&json!({"name": "b1"})), "b1");
        assert_eq!(Resource::name(&json!({"id": 3})), "");
    }
}
