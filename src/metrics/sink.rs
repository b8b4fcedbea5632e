//! Metric sinks
//!
//! A [`MetricSink`] receives one [`Observation`] per accessor call. Sinks are
//! shared by every call in flight and must tolerate concurrent recording.

use crate::cloud::{ApiVersion, Operation};
use crate::error::ErrorKind;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// Label value for dimensions a resource kind does not use
pub const UNUSED_LABEL: &str = "<n/a>";

/// Upper bounds (seconds) of the latency histogram buckets
pub const LATENCY_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Tag set of an observation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetricLabels {
    pub resource: String,
    pub operation: Operation,
    pub region: String,
    pub zone: String,
    pub version: ApiVersion,
}

impl MetricLabels {
    /// Request label in `<resource>_<operation>` form
    pub fn request(&self) -> String {
        format!("{}_{}", self.resource, self.operation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(ErrorKind),
}

impl Outcome {
    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// One finished call
#[derive(Debug, Clone)]
pub struct Observation {
    pub labels: MetricLabels,
    pub outcome: Outcome,
    pub duration: Duration,
}

/// Destination of call observations
pub trait MetricSink: Send + Sync {
    fn record(&self, observation: &Observation);
}

struct Series {
    successes: AtomicU64,
    failures: [AtomicU64; ErrorKind::ALL.len()],
    // one slot per bucket plus the overflow bucket
    buckets: [AtomicU64; LATENCY_BUCKETS.len() + 1],
    latency_micros: AtomicU64,
}

impl Series {
    fn new() -> Self {
        Self {
            successes: AtomicU64::new(0),
            failures: std::array::from_fn(|_| AtomicU64::new(0)),
            buckets: std::array::from_fn(|_| AtomicU64::new(0)),
            latency_micros: AtomicU64::new(0),
        }
    }

    fn record(&self, outcome: Outcome, duration: Duration) {
        match outcome {
            Outcome::Success => self.successes.fetch_add(1, Ordering::Relaxed),
            Outcome::Failure(kind) => self.failures[kind.index()].fetch_add(1, Ordering::Relaxed),
        };

        let secs = duration.as_secs_f64();
        let slot = LATENCY_BUCKETS
            .iter()
            .position(|bound| secs <= *bound)
            .unwrap_or(LATENCY_BUCKETS.len());
        self.buckets[slot].fetch_add(1, Ordering::Relaxed);

        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        self.latency_micros.fetch_add(micros, Ordering::Relaxed);
    }

    fn snapshot(&self, labels: &MetricLabels) -> SeriesSnapshot {
        let failures = ErrorKind::ALL
            .iter()
            .filter_map(|kind| {
                let n = self.failures[kind.index()].load(Ordering::Relaxed);
                (n > 0).then_some((*kind, n))
            })
            .collect();

        let mut cumulative = 0;
        let buckets = self
            .buckets
            .iter()
            .enumerate()
            .map(|(i, count)| {
                cumulative += count.load(Ordering::Relaxed);
                let bound = LATENCY_BUCKETS.get(i).copied().unwrap_or(f64::INFINITY);
                (bound, cumulative)
            })
            .collect();

        SeriesSnapshot {
            labels: labels.clone(),
            successes: self.successes.load(Ordering::Relaxed),
            failures,
            latency_sum: Duration::from_micros(self.latency_micros.load(Ordering::Relaxed)),
            buckets,
        }
    }
}

/// Point-in-time copy of one label set's aggregates
#[derive(Debug, Clone)]
pub struct SeriesSnapshot {
    pub labels: MetricLabels,
    pub successes: u64,
    pub failures: BTreeMap<ErrorKind, u64>,
    pub latency_sum: Duration,
    /// Cumulative `(upper bound seconds, count)` pairs, last bound is +Inf
    pub buckets: Vec<(f64, u64)>,
}

impl SeriesSnapshot {
    pub fn failure_count(&self) -> u64 {
        self.failures.values().sum()
    }

    pub fn count(&self) -> u64 {
        self.successes + self.failure_count()
    }
}

/// Process-local sink aggregating counters and latency histograms per label
/// set. Counters are only ever incremented atomically; the series map is
/// write-locked only to add a label set seen for the first time.
#[derive(Default)]
pub struct InMemoryMetrics {
    series: RwLock<HashMap<MetricLabels, Arc<Series>>>,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn series_for(&self, labels: &MetricLabels) -> Arc<Series> {
        if let Some(series) = self
            .series
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(labels)
        {
            return Arc::clone(series);
        }

        let mut map = self.series.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            map.entry(labels.clone())
                .or_insert_with(|| Arc::new(Series::new())),
        )
    }

    /// Snapshot of every series, ordered by labels
    pub fn snapshot(&self) -> Vec<SeriesSnapshot> {
        let map = self.series.read().unwrap_or_else(PoisonError::into_inner);
        let mut out: Vec<_> = map.iter().map(|(labels, s)| s.snapshot(labels)).collect();
        out.sort_by(|a, b| a.labels.cmp(&b.labels));
        out
    }

    /// Total number of observations recorded across all series
    pub fn observation_count(&self) -> u64 {
        self.snapshot().iter().map(SeriesSnapshot::count).sum()
    }

    /// Snapshots for `resource`/`operation`/`version`, one per region and
    /// zone label
    pub fn find(
        &self,
        resource: &str,
        operation: Operation,
        version: ApiVersion,
    ) -> Vec<SeriesSnapshot> {
        self.snapshot()
            .into_iter()
            .filter(|s| {
                s.labels.resource == resource
                    && s.labels.operation == operation
                    && s.labels.version == version
            })
            .collect()
    }
}

impl MetricSink for InMemoryMetrics {
    fn record(&self, observation: &Observation) {
        tracing::trace!(
            request = %observation.labels.request(),
            version = %observation.labels.version,
            outcome = ?observation.outcome,
            "recording observation"
        );
        self.series_for(&observation.labels)
            .record(observation.outcome, observation.duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(op: Operation) -> MetricLabels {
        MetricLabels {
            resource: "backendbucket".to_string(),
            operation: op,
            region: String::new(),
            zone: UNUSED_LABEL.to_string(),
            version: ApiVersion::Stable,
        }
    }

    #[test]
    fn test_request_label() {
        assert_eq!(labels(Operation::Get).request(), "backendbucket_get");
    }

    #[test]
    fn test_counts_success_and_failure() {
        let sink = InMemoryMetrics::new();
        sink.record(&Observation {
            labels: labels(Operation::Get),
            outcome: Outcome::Success,
            duration: Duration::from_millis(3),
        });
        sink.record(&Observation {
            labels: labels(Operation::Get),
            outcome: Outcome::Failure(ErrorKind::NotFound),
            duration: Duration::from_millis(20),
        });

        let found = sink.find("backendbucket", Operation::Get, ApiVersion::Stable);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].successes, 1);
        assert_eq!(found[0].failures.get(&ErrorKind::NotFound), Some(&1));
        assert_eq!(sink.observation_count(), 2);
    }

    #[test]
    fn test_histogram_is_cumulative() {
        let sink = InMemoryMetrics::new();
        for ms in [1, 30, 20_000] {
            sink.record(&Observation {
                labels: labels(Operation::List),
                outcome: Outcome::Success,
                duration: Duration::from_millis(ms),
            });
        }
        let snap = &sink.snapshot()[0];
        assert_eq!(snap.buckets.first().unwrap(), &(0.005, 1));
        let (last_bound, last_count) = *snap.buckets.last().unwrap();
        assert!(last_bound.is_infinite());
        assert_eq!(last_count, 3);
        assert_eq!(snap.latency_sum, Duration::from_millis(20_031));
    }

    #[test]
    fn test_separate_series_per_version() {
        let sink = InMemoryMetrics::new();
        let mut beta = labels(Operation::Get);
        beta.version = ApiVersion::Beta;
        sink.record(&Observation {
            labels: labels(Operation::Get),
            outcome: Outcome::Success,
            duration: Duration::ZERO,
        });
        sink.record(&Observation {
            labels: beta,
            outcome: Outcome::Success,
            duration: Duration::ZERO,
        });
        assert_eq!(sink.snapshot().len(), 2);
        assert_eq!(sink.find("backendbucket", Operation::Get, ApiVersion::Beta).len(), 1);
    }
}
