//! Tenant Domain
//!
//! Every configuration resource is owned by exactly one tenant. Requests name
//! their tenant by domain; a missing domain resolves to the deployment default.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

/// Tenant used when a request does not name one.
pub const DEFAULT_TENANT_DOMAIN: &str = "default";

const MAX_DOMAIN_LEN: usize = 253;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TenantError {
    #[error("Tenant domain cannot be empty")]
    Empty,

    #[error("Tenant domain exceeds {MAX_DOMAIN_LEN} characters")]
    TooLong,

    #[error("Tenant domain '{0}' contains invalid characters")]
    InvalidCharacters(String),

    #[error("Tenant domain '{0}' cannot start or end with '.' or '-'")]
    InvalidBoundary(String),
}

/// Validated, lower-cased tenant domain (e.g. `acme.io`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(transparent)]
pub struct TenantDomain(String);

impl TenantDomain {
    pub fn parse(value: &str) -> Result<Self, TenantError> {
        let domain = value.trim().to_ascii_lowercase();

        if domain.is_empty() {
            return Err(TenantError::Empty);
        }
        if domain.len() > MAX_DOMAIN_LEN {
            return Err(TenantError::TooLong);
        }
        if !domain
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-')
        {
            return Err(TenantError::InvalidCharacters(domain));
        }
        if domain.starts_with(['.', '-']) || domain.ends_with(['.', '-']) {
            return Err(TenantError::InvalidBoundary(domain));
        }

        Ok(Self(domain))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_TENANT_DOMAIN
    }
}

impl Default for TenantDomain {
    fn default() -> Self {
        Self(DEFAULT_TENANT_DOMAIN.to_string())
    }
}

impl FromStr for TenantDomain {
    type Err = TenantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TenantDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TenantDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for TenantDomain {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
