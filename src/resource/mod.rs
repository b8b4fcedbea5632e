//! Resource kinds
//!
//! Resource kinds are data: each one is a [`ResourceKind`] naming its REST
//! collection, addressing scope and available API versions. Kinds are loaded
//! from JSON files at compile time, so adding one needs no code.
//!
//! # Architecture
//!
//! - [`registry`] - Loads and caches kind definitions from embedded JSON
//! - [`backend_bucket`] - Typed payload and accessor for backend buckets
//! - [`compute`] - Builds accessors for a project
//!
//! # Example
//!
//! ```ignore
//! use gcecloud::cloud::{ApiVersion, Key};
//!
//! async fn list_disks(cloud: &gcecloud::ComputeCloud) -> gcecloud::Result<()> {
//!     let disks = cloud.resource("disk")?;
//!     let zone = gcecloud::cloud::KeyScope::Zonal("us-central1-a".into());
//!     let items = disks.list_at(ApiVersion::Stable, &zone, &Default::default()).await?;
//!     println!("{} disks", items.len());
//!     Ok(())
//! }
//! ```

pub mod backend_bucket;
pub mod compute;
mod registry;

pub use backend_bucket::{BackendBucket, BackendBuckets, BACKEND_BUCKET};
pub use compute::ComputeCloud;
pub use registry::*;
