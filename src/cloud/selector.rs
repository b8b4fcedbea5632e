//! Versioned client selection

use super::service::{Resource, ResourceService};
use super::version::ApiVersion;
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// The per-version services of one resource kind.
///
/// Lookup is a pure mapping: no I/O, and the registered services are the
/// only instances ever handed out.
pub struct VersionedClients<R: Resource> {
    clients: BTreeMap<ApiVersion, Arc<dyn ResourceService<R>>>,
}

impl<R: Resource> VersionedClients<R> {
    pub fn new() -> Self {
        Self {
            clients: BTreeMap::new(),
        }
    }

    /// Register `service` for `version`, replacing any previous one
    pub fn register(&mut self, version: ApiVersion, service: Arc<dyn ResourceService<R>>) {
        self.clients.insert(version, service);
    }

    /// Builder form of [`register`](Self::register)
    pub fn with(mut self, version: ApiVersion, service: Arc<dyn ResourceService<R>>) -> Self {
        self.register(version, service);
        self
    }

    /// Service bound to `version`
    pub fn client(&self, version: ApiVersion) -> Result<Arc<dyn ResourceService<R>>> {
        self.clients
            .get(&version)
            .cloned()
            .ok_or_else(|| Error::UnsupportedVersion(version.to_string()))
    }

    /// Versions with a registered service, stable first
    pub fn versions(&self) -> Vec<ApiVersion> {
        self.clients.keys().copied().collect()
    }
}

impl<R: Resource> Default for VersionedClients<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> Clone for VersionedClients<R> {
    fn clone(&self) -> Self {
        Self {
            clients: self.clients.clone(),
        }
    }
}

impl<R: Resource> fmt::Debug for VersionedClients<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionedClients")
            .field("versions", &self.versions())
            .finish()
    }
}
