//! Compute API versions

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the parallel compute API surfaces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ApiVersion {
    #[default]
    #[serde(rename = "v1", alias = "stable", alias = "ga")]
    Stable,
    #[serde(rename = "beta")]
    Beta,
    #[serde(rename = "alpha")]
    Alpha,
}

impl ApiVersion {
    pub const ALL: [ApiVersion; 3] = [ApiVersion::Stable, ApiVersion::Beta, ApiVersion::Alpha];

    /// Path segment used in compute API URLs (`compute/{segment}/projects/...`)
    pub fn path_segment(self) -> &'static str {
        match self {
            ApiVersion::Stable => "v1",
            ApiVersion::Beta => "beta",
            ApiVersion::Alpha => "alpha",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for ApiVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" | "stable" | "ga" => Ok(ApiVersion::Stable),
            "beta" => Ok(ApiVersion::Beta),
            "alpha" => Ok(ApiVersion::Alpha),
            _ => Err(Error::UnsupportedVersion(s.to_string())),
        }
    }
}
