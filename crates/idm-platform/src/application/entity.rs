//! Application Entity
//!
//! A registered application (service provider) owned by one tenant.
//! The inbound-authentication settings live in a nested [`AuthConfig`],
//! which in turn owns the externalized [`ConsentPageConfig`]. Both nested
//! objects are created on first write through the `*_mut` accessors.

use chrono::{DateTime, Utc};
use idm_common::TenantDomain;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Application entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,

    pub tenant_domain: TenantDomain,

    /// Unique within the tenant
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_url: Option<String>,

    /// Shared with users of every tenant
    pub saas_app: bool,

    /// Listed in the end-user application portal
    pub discoverable: bool,

    /// PEM certificate; never set together with `jwks_uri`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_content: Option<String>,

    /// JWKS endpoint; never set together with `certificate_content`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwks_uri: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_config: Option<AuthConfig>,

    /// Optimistic lock, bumped by the repository on every update
    pub version: u64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inbound authentication settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    pub skip_consent: bool,
    pub skip_logout_consent: bool,
    pub always_send_back_authenticated_idps: bool,
    pub enable_authorization: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consent_page: Option<ConsentPageConfig>,
}

/// Externally hosted consent page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentPageConfig {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consent_page_url: Option<String>,
}

impl Application {
    pub fn new(tenant_domain: TenantDomain, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tenant_domain,
            name: name.into(),
            description: None,
            image_url: None,
            access_url: None,
            saas_app: false,
            discoverable: false,
            certificate_content: None,
            jwks_uri: None,
            auth_config: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_access_url(mut self, url: impl Into<String>) -> Self {
        self.access_url = Some(url.into());
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Auth config, created empty on first access.
    pub fn auth_config_mut(&mut self) -> &mut AuthConfig {
        self.auth_config.get_or_insert_with(AuthConfig::default)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl AuthConfig {
    /// Consent page config, created empty on first access.
    pub fn consent_page_mut(&mut self) -> &mut ConsentPageConfig {
        self.consent_page.get_or_insert_with(ConsentPageConfig::default)
    }
}
