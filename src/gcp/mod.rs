//! GCP API interaction module
//!
//! The REST transport behind resource accessors: authentication, the HTTP
//! client, compute URL building and the [`RestService`] implementation of
//! [`ResourceService`](crate::cloud::ResourceService).
//!
//! # Module Structure
//!
//! - [`auth`] - Token sources (Application Default Credentials, static tokens)
//! - [`client`] - Compute API client and URL helpers
//! - [`http`] - HTTP utilities for REST API calls
//! - [`rest`] - Per-version resource service over REST
//!
//! # Example
//!
//! ```ignore
//! use gcecloud::cloud::ApiVersion;
//! use gcecloud::gcp::client::GcpClient;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = GcpClient::new("my-project", gcecloud::gcp::DEFAULT_ENDPOINT).await?;
//!     println!("{}", client.compute_url(ApiVersion::Beta, "global/backendBuckets"));
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
pub mod rest;

pub use auth::{GcpCredentials, StaticToken, TokenSource};
pub use client::{GcpClient, DEFAULT_ENDPOINT};
pub use rest::{RestService, DEFAULT_POLL_INTERVAL};
