//! Versioned Compute Engine resource accessors
//!
//! The compute API ships stable, beta and alpha surfaces for the same
//! resources. `gcecloud` gives every resource kind one accessor that picks
//! the surface, bounds each call with a timeout, builds the resource key and
//! records one metric observation per call.
//!
//! - [`cloud`] - The versioned-client abstraction (keys, scopes, selector, façade)
//! - [`metrics`] - Per-call metric contexts and sinks
//! - [`resource`] - Resource kind registry and typed kinds
//! - [`gcp`] - REST transport
//! - [`config`] - Persistent configuration

pub mod cloud;
pub mod config;
pub mod error;
pub mod gcp;
pub mod metrics;
pub mod resource;

pub use cloud::{ApiVersion, Filter, Key, KeyScope, ResourceAccessor};
pub use error::{Error, ErrorKind, Result};
pub use resource::{BackendBucket, BackendBuckets, ComputeCloud};
