//! Per-call metric context

use super::sink::{MetricLabels, MetricSink, Observation, Outcome, UNUSED_LABEL};
use crate::cloud::{ApiVersion, Operation};
use crate::error::{ErrorKind, Result};
use std::sync::Arc;
use std::time::Instant;

/// Metric bookkeeping for one accessor call.
///
/// Created when the call starts and consumed by [`observe`](Self::observe)
/// when it ends, which records exactly one observation. A context dropped
/// without being observed (the caller abandoned the call future) records a
/// [`ErrorKind::Cancelled`] failure instead, so every call is counted once.
pub struct MetricContext {
    sink: Arc<dyn MetricSink>,
    labels: MetricLabels,
    start: Instant,
    observed: bool,
}

impl MetricContext {
    pub fn new(
        sink: Arc<dyn MetricSink>,
        resource: &str,
        operation: Operation,
        region: &str,
        version: ApiVersion,
    ) -> Self {
        Self::with_zone(sink, resource, operation, region, UNUSED_LABEL, version)
    }

    pub fn with_zone(
        sink: Arc<dyn MetricSink>,
        resource: &str,
        operation: Operation,
        region: &str,
        zone: &str,
        version: ApiVersion,
    ) -> Self {
        Self {
            sink,
            labels: MetricLabels {
                resource: resource.to_string(),
                operation,
                region: region.to_string(),
                zone: zone.to_string(),
                version,
            },
            start: Instant::now(),
            observed: false,
        }
    }

    /// Record the outcome of `result` and hand it back unchanged
    pub fn observe<T>(mut self, result: Result<T>) -> Result<T> {
        let outcome = match &result {
            Ok(_) => Outcome::Success,
            Err(err) => {
                tracing::warn!(
                    request = %self.labels.request(),
                    version = %self.labels.version,
                    kind = %err.kind(),
                    "compute API call failed: {}",
                    err
                );
                Outcome::Failure(err.kind())
            }
        };
        self.emit(outcome);
        result
    }

    fn emit(&mut self, outcome: Outcome) {
        self.observed = true;
        let observation = Observation {
            labels: self.labels.clone(),
            outcome,
            duration: self.start.elapsed(),
        };
        tracing::debug!(
            request = %observation.labels.request(),
            version = %observation.labels.version,
            elapsed_ms = observation.duration.as_millis() as u64,
            success = outcome.is_success(),
            "compute API call finished"
        );
        self.sink.record(&observation);
    }
}

impl Drop for MetricContext {
    fn drop(&mut self) {
        if !self.observed {
            self.emit(Outcome::Failure(ErrorKind::Cancelled));
        }
    }
}
