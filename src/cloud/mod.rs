//! Versioned resource client abstraction
//!
//! The compute API exposes the same resources on three surfaces (`v1`,
//! `beta`, `alpha`). This module provides the pieces every resource kind
//! shares so call sites never branch on version themselves.
//!
//! # Module Structure
//!
//! - [`accessor`] - Get/List/Create/Update/Delete façade over all versions
//! - [`filter`] - List filters
//! - [`key`] - Global, regional and zonal resource keys
//! - [`scope`] - Deadline-bounded, cancellable call scopes
//! - [`selector`] - Version to service mapping
//! - [`service`] - The remote operation surface of one version
//! - [`version`] - API versions
//!
//! # Example
//!
//! ```ignore
//! use gcecloud::cloud::ApiVersion;
//!
//! async fn example(cloud: &gcecloud::ComputeCloud) -> gcecloud::Result<()> {
//!     let buckets = cloud.backend_buckets();
//!     let bucket = buckets.get(ApiVersion::Beta, "static-assets").await?;
//!     println!("{}", bucket.name);
//!     Ok(())
//! }
//! ```

pub mod accessor;
pub mod filter;
pub mod key;
pub mod scope;
pub mod selector;
pub mod service;
pub mod version;

pub use accessor::ResourceAccessor;
pub use filter::Filter;
pub use key::{Key, KeyScope, ScopeType};
pub use scope::{CallScope, CallScopeProvider, FixedTimeout, ScopeHandle, DEFAULT_CALL_TIMEOUT};
pub use selector::VersionedClients;
pub use service::{Resource, ResourceService};
pub use version::ApiVersion;

use std::fmt;

/// Operation performed by an accessor call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    Get,
    List,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Get => "get",
            Operation::List => "list",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
