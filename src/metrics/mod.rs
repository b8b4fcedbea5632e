//! Call metrics
//!
//! Every accessor call creates a [`MetricContext`] on entry and finalizes it
//! on exit. The resulting observation (outcome, latency, and the
//! resource/operation/region/version tags) goes to an injected
//! [`MetricSink`].
//!
//! - [`context`] - per-call context with exactly-once observation
//! - [`sink`] - sink trait and the in-memory aggregating sink

pub mod context;
pub mod sink;

pub use context::MetricContext;
pub use sink::{
    InMemoryMetrics, MetricLabels, MetricSink, Observation, Outcome, SeriesSnapshot,
    LATENCY_BUCKETS, UNUSED_LABEL,
};
