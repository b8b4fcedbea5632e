//! Resource Registry - Load resource kind definitions from JSON
//!
//! Every compute resource kind the accessors know about is described in an
//! embedded JSON file: its metric name, REST collection, addressing scope and
//! the API versions it is available on.

use crate::cloud::{ApiVersion, ScopeType};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Embedded resource JSON files (compiled into the binary)
const RESOURCE_FILES: &[&str] = &[include_str!("../resources/compute.json")];

/// HTTP method used for the Update operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMethod {
    #[default]
    Put,
    Patch,
}

/// Configuration of one resource kind
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceKind {
    /// Metric name of the kind, e.g. `backendbucket`
    #[serde(skip)]
    pub name: String,
    pub display_name: String,
    /// REST collection, e.g. `backendBuckets`
    pub collection: String,
    pub scope: ScopeType,
    #[serde(default = "all_versions")]
    pub versions: Vec<ApiVersion>,
    #[serde(default)]
    pub update_method: UpdateMethod,
}

fn all_versions() -> Vec<ApiVersion> {
    ApiVersion::ALL.to_vec()
}

impl ResourceKind {
    /// Kind available on every API version, updated with PUT
    pub fn new(name: &str, collection: &str, scope: ScopeType) -> Self {
        Self {
            name: name.to_string(),
            display_name: collection.to_string(),
            collection: collection.to_string(),
            scope,
            versions: all_versions(),
            update_method: UpdateMethod::Put,
        }
    }

    pub fn supports(&self, version: ApiVersion) -> bool {
        self.versions.contains(&version)
    }
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize)]
struct ResourceConfig {
    #[serde(default)]
    resources: BTreeMap<String, ResourceKind>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<BTreeMap<String, ResourceKind>> = OnceLock::new();

/// Get the resource registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static BTreeMap<String, ResourceKind> {
    REGISTRY.get_or_init(|| {
        let mut kinds = BTreeMap::new();

        for content in RESOURCE_FILES {
            let partial: ResourceConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded resource JSON: {}", e));
            for (name, mut kind) in partial.resources {
                kind.name = name.clone();
                kinds.insert(name, kind);
            }
        }

        kinds
    })
}

/// Get a resource kind by name
pub fn get_kind(name: &str) -> Option<&'static ResourceKind> {
    get_registry().get(name)
}

/// All resource kind names, sorted
pub fn get_all_kind_names() -> Vec<&'static str> {
    get_registry().keys().map(|s| s.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_loads_successfully() {
        assert!(!get_registry().is_empty(), "Registry should have kinds");
    }

    #[test]
    fn test_backend_bucket_kind() {
        let kind = get_kind("backendbucket").expect("backendbucket should exist");
        assert_eq!(kind.name, "backendbucket");
        assert_eq!(kind.collection, "backendBuckets");
        assert_eq!(kind.scope, ScopeType::Global);
        assert_eq!(kind.versions, ApiVersion::ALL.to_vec());
        assert_eq!(kind.update_method, UpdateMethod::Put);
    }

    #[test]
    fn test_every_kind_has_a_version() {
        for (name, kind) in get_registry() {
            assert!(!kind.versions.is_empty(), "{} has no versions", name);
            assert_eq!(&kind.name, name);
        }
    }

    #[test]
    fn test_scoped_kinds() {
        assert_eq!(get_kind("subnetwork").unwrap().scope, ScopeType::Regional);
        assert_eq!(get_kind("instance").unwrap().scope, ScopeType::Zonal);
        assert_eq!(get_kind("network").unwrap().update_method, UpdateMethod::Patch);
        assert!(!get_kind("targetpool").unwrap().supports(ApiVersion::Beta));
    }

    #[test]
    fn test_kind_names_sorted() {
        let names = get_all_kind_names();
        assert!(names.contains(&"backendbucket"));
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
