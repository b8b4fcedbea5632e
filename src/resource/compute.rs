//! Compute cloud handle
//!
//! [`ComputeCloud`] wires the REST transport, the call timeout and the
//! metric sink into resource accessors.

use super::backend_bucket::{backend_bucket_kind, BackendBuckets};
use super::registry::{get_all_kind_names, get_kind, ResourceKind};
use crate::cloud::{CallScopeProvider, FixedTimeout, Resource, ResourceAccessor, VersionedClients};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::gcp::{GcpClient, DEFAULT_POLL_INTERVAL};
use crate::metrics::MetricSink;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Entry point to the compute resource accessors of one project
#[derive(Clone)]
pub struct ComputeCloud {
    client: GcpClient,
    metrics: Arc<dyn MetricSink>,
    scopes: Arc<dyn CallScopeProvider>,
    poll_interval: Duration,
}

impl ComputeCloud {
    pub fn new(client: GcpClient, metrics: Arc<dyn MetricSink>) -> Self {
        Self {
            client,
            metrics,
            scopes: Arc::new(FixedTimeout::default()),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Apply the call timeout and poll interval from `config`
    pub fn from_config(client: GcpClient, metrics: Arc<dyn MetricSink>, config: &Config) -> Self {
        Self::new(client, metrics)
            .with_call_timeout(config.call_timeout())
            .with_poll_interval(config.operation_poll_interval())
    }

    pub fn with_call_timeout(self, timeout: Duration) -> Self {
        self.with_scopes(Arc::new(FixedTimeout::new(timeout)))
    }

    pub fn with_scopes(mut self, scopes: Arc<dyn CallScopeProvider>) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Accessor for `kind` with payload type `R`
    pub fn accessor<R: Resource>(&self, kind: &ResourceKind) -> ResourceAccessor<R> {
        let clients = VersionedClients::rest(&self.client, kind, self.poll_interval);
        ResourceAccessor::new(kind.clone(), clients, Arc::clone(&self.metrics))
            .with_scopes(Arc::clone(&self.scopes))
    }

    pub fn backend_buckets(&self) -> BackendBuckets {
        self.accessor(&backend_bucket_kind())
    }

    /// JSON accessor for a registered kind
    pub fn resource(&self, name: &str) -> Result<ResourceAccessor<Value>> {
        let kind = get_kind(name).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "unknown resource kind {:?}, expected one of: {}",
                name,
                get_all_kind_names().join(", ")
            ))
        })?;
        Ok(self.accessor(kind))
    }
}
