//! Resource keys
//!
//! A [`Key`] names a resource together with the location it lives in. Keys
//! are plain values: identical inputs always build equal keys, so they are
//! safe to use as map keys.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;

/// Addressing scheme of a resource kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeType {
    Global,
    Regional,
    Zonal,
}

impl fmt::Display for ScopeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScopeType::Global => "global",
            ScopeType::Regional => "regional",
            ScopeType::Zonal => "zonal",
        };
        f.write_str(s)
    }
}

/// Location part of a key, also used on its own to address a collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyScope {
    Global,
    Regional(String),
    Zonal(String),
}

impl KeyScope {
    pub fn scope_type(&self) -> ScopeType {
        match self {
            KeyScope::Global => ScopeType::Global,
            KeyScope::Regional(_) => ScopeType::Regional,
            KeyScope::Zonal(_) => ScopeType::Zonal,
        }
    }

    /// Region used for metric labels; empty for global and zonal scopes
    pub fn region_label(&self) -> &str {
        match self {
            KeyScope::Regional(region) => region,
            _ => "",
        }
    }

    /// Zone used for metric labels, `None` unless zonal
    pub fn zone_label(&self) -> Option<&str> {
        match self {
            KeyScope::Zonal(zone) => Some(zone),
            _ => None,
        }
    }

    /// Relative collection path below `projects/{project}/`
    pub fn path_prefix(&self) -> String {
        match self {
            KeyScope::Global => "global".to_string(),
            KeyScope::Regional(region) => format!("regions/{}", region),
            KeyScope::Zonal(zone) => format!("zones/{}", zone),
        }
    }
}

/// Canonical identifier of a compute resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key {
    scope: KeyScope,
    name: String,
}

impl Key {
    /// Key of a global resource
    pub fn global(name: impl Into<String>) -> Result<Self> {
        Self::build(name.into(), KeyScope::Global)
    }

    /// Key of a resource in `region`
    pub fn regional(name: impl Into<String>, region: impl Into<String>) -> Result<Self> {
        let region = non_empty("region", region.into())?;
        Self::build(name.into(), KeyScope::Regional(region))
    }

    /// Key of a resource in `zone`
    pub fn zonal(name: impl Into<String>, zone: impl Into<String>) -> Result<Self> {
        let zone = non_empty("zone", zone.into())?;
        Self::build(name.into(), KeyScope::Zonal(zone))
    }

    /// Key for `name` in an already validated scope
    pub fn in_scope(name: impl Into<String>, scope: KeyScope) -> Result<Self> {
        match scope {
            KeyScope::Global => Self::global(name),
            KeyScope::Regional(region) => Self::regional(name, region),
            KeyScope::Zonal(zone) => Self::zonal(name, zone),
        }
    }

    fn build(name: String, scope: KeyScope) -> Result<Self> {
        let name = non_empty("name", name)?;
        Ok(Self { scope, name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> &KeyScope {
        &self.scope
    }

    pub fn scope_type(&self) -> ScopeType {
        self.scope.scope_type()
    }

    pub fn region_label(&self) -> &str {
        self.scope.region_label()
    }
}

fn non_empty(field: &str, value: String) -> Result<String> {
    if value.is_empty() {
        return Err(Error::InvalidArgument(format!("{} must not be empty", field)));
    }
    Ok(value)
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            KeyScope::Global => write!(f, "Key{{{:?}}}", self.name),
            KeyScope::Regional(region) => write!(f, "Key{{{:?}, region: {:?}}}", self.name, region),
            KeyScope::Zonal(zone) => write!(f, "Key{{{:?}, zone: {:?}}}", self.name, zone),
        }
    }
}
