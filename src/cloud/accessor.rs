//! Resource accessors
//!
//! [`ResourceAccessor`] is the single implementation of Get, List, Create,
//! Update and Delete for every resource kind and API version. Each call:
//!
//! 1. acquires a [`CallScope`](super::CallScope), released when the call returns
//! 2. starts a [`MetricContext`] tagged with kind, operation, region and version
//! 3. resolves the service registered for the version
//! 4. builds the resource key
//! 5. runs the remote operation inside the call scope
//! 6. records the outcome and returns the result unchanged
//!
//! No call is retried here; retries belong to the transport.

use super::filter::Filter;
use super::key::{Key, KeyScope, ScopeType};
use super::scope::{CallScopeProvider, FixedTimeout, ScopeHandle};
use super::selector::VersionedClients;
use super::service::{Resource, ResourceService};
use super::version::ApiVersion;
use super::Operation;
use crate::error::{Error, Result};
use crate::metrics::{MetricContext, MetricSink, UNUSED_LABEL};
use crate::resource::ResourceKind;
use std::future::Future;
use std::sync::Arc;

/// Versioned accessor for one resource kind
#[derive(Clone)]
pub struct ResourceAccessor<R: Resource> {
    kind: ResourceKind,
    clients: VersionedClients<R>,
    scopes: Arc<dyn CallScopeProvider>,
    metrics: Arc<dyn MetricSink>,
    default_filter: Filter,
}

impl<R: Resource> ResourceAccessor<R> {
    /// Accessor using the default call timeout and a match-all list filter
    pub fn new(kind: ResourceKind, clients: VersionedClients<R>, metrics: Arc<dyn MetricSink>) -> Self {
        Self {
            kind,
            clients,
            scopes: Arc::new(FixedTimeout::default()),
            metrics,
            default_filter: Filter::None,
        }
    }

    /// Replace the source of call scopes
    pub fn with_scopes(mut self, scopes: Arc<dyn CallScopeProvider>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Filter applied by [`list`](Self::list)
    pub fn with_default_filter(mut self, filter: Filter) -> Self {
        self.default_filter = filter;
        self
    }

    pub fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    pub fn versions(&self) -> Vec<ApiVersion> {
        self.clients.versions()
    }

    /// Get a global resource by name
    pub async fn get(&self, version: ApiVersion, name: &str) -> Result<R> {
        self.execute(Operation::Get, version, &KeyScope::Global, |service, scope| async move {
            let key = self.global_key(name)?;
            service.get(&scope, &key).await
        })
        .await
    }

    pub async fn get_key(&self, version: ApiVersion, key: &Key) -> Result<R> {
        self.execute(Operation::Get, version, key.scope(), |service, scope| async move {
            self.check_scope(key.scope_type())?;
            service.get(&scope, key).await
        })
        .await
    }

    /// List global resources matching the accessor's default filter
    pub async fn list(&self, version: ApiVersion) -> Result<Vec<R>> {
        self.list_at(version, &KeyScope::Global, &self.default_filter)
            .await
    }

    /// List global resources matching `filter`
    pub async fn list_filtered(&self, version: ApiVersion, filter: &Filter) -> Result<Vec<R>> {
        self.list_at(version, &KeyScope::Global, filter).await
    }

    /// List resources in `location` matching `filter`
    pub async fn list_at(
        &self,
        version: ApiVersion,
        location: &KeyScope,
        filter: &Filter,
    ) -> Result<Vec<R>> {
        self.execute(Operation::List, version, location, |service, scope| async move {
            self.check_scope(location.scope_type())?;
            service.list(&scope, location, filter).await
        })
        .await
    }

    /// Create a global resource, keyed by the object's name
    pub async fn create(&self, version: ApiVersion, obj: &R) -> Result<()> {
        self.execute(Operation::Create, version, &KeyScope::Global, |service, scope| async move {
            let key = self.global_key(obj.name())?;
            service.insert(&scope, &key, obj).await
        })
        .await
    }

    pub async fn create_key(&self, version: ApiVersion, key: &Key, obj: &R) -> Result<()> {
        self.execute(Operation::Create, version, key.scope(), |service, scope| async move {
            self.check_scope(key.scope_type())?;
            service.insert(&scope, key, obj).await
        })
        .await
    }

    /// Apply `obj` as an update of the global resource with the same name
    pub async fn update(&self, version: ApiVersion, obj: &R) -> Result<()> {
        self.execute(Operation::Update, version, &KeyScope::Global, |service, scope| async move {
            let key = self.global_key(obj.name())?;
            service.update(&scope, &key, obj).await
        })
        .await
    }

    pub async fn update_key(&self, version: ApiVersion, key: &Key, obj: &R) -> Result<()> {
        self.execute(Operation::Update, version, key.scope(), |service, scope| async move {
            self.check_scope(key.scope_type())?;
            service.update(&scope, key, obj).await
        })
        .await
    }

    /// Delete a global resource by name
    pub async fn delete(&self, version: ApiVersion, name: &str) -> Result<()> {
        self.execute(Operation::Delete, version, &KeyScope::Global, |service, scope| async move {
            let key = self.global_key(name)?;
            service.delete(&scope, &key).await
        })
        .await
    }

    pub async fn delete_key(&self, version: ApiVersion, key: &Key) -> Result<()> {
        self.execute(Operation::Delete, version, key.scope(), |service, scope| async move {
            self.check_scope(key.scope_type())?;
            service.delete(&scope, key).await
        })
        .await
    }

    async fn execute<T, F, Fut>(
        &self,
        operation: Operation,
        version: ApiVersion,
        location: &KeyScope,
        invoke: F,
    ) -> Result<T>
    where
        F: FnOnce(Arc<dyn ResourceService<R>>, ScopeHandle) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let scope = self.scopes.acquire();
        let mc = MetricContext::with_zone(
            Arc::clone(&self.metrics),
            &self.kind.name,
            operation,
            location.region_label(),
            location.zone_label().unwrap_or(UNUSED_LABEL),
            version,
        );
        tracing::debug!(
            kind = %self.kind.name,
            %operation,
            %version,
            remaining_ms = scope.remaining().as_millis() as u64,
            "compute API call"
        );

        let result = match self.clients.client(version) {
            Ok(service) => scope.run(invoke(service, scope.handle())).await,
            Err(err) => Err(err),
        };
        mc.observe(result)
    }

    fn global_key(&self, name: &str) -> Result<Key> {
        self.check_scope(ScopeType::Global)?;
        Key::global(name)
    }

    fn check_scope(&self, scope: ScopeType) -> Result<()> {
        if scope != self.kind.scope {
            return Err(Error::InvalidArgument(format!(
                "{} is a {} resource, got a {} key",
                self.kind.name, self.kind.scope, scope
            )));
        }
        Ok(())
    }
}
