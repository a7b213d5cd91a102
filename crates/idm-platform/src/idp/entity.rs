//! Identity Provider Entity
//!
//! A federated identity provider registered for a tenant, together with its
//! just-in-time (JIT) provisioning settings.

use chrono::{DateTime, Utc};
use idm_common::TenantDomain;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// User store that receives JIT provisioned users unless configured otherwise.
pub const PRIMARY_USERSTORE: &str = "PRIMARY";

/// How a federated user is provisioned on first login
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProvisioningScheme {
    PromptUsernamePasswordConsent,
    PromptPasswordConsent,
    PromptConsent,
    #[default]
    ProvisionSilently,
}

/// Which attributes are synced from the IdP on subsequent logins
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncAttribute {
    #[default]
    All,
    None,
    PreserveLocal,
}

/// Just-in-time provisioning configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JustInTimeProvisioning {
    /// Required in requests
    pub is_enabled: bool,

    #[serde(default)]
    pub scheme: ProvisioningScheme,

    #[serde(default = "default_userstore")]
    #[schema(example = "PRIMARY")]
    pub userstore: String,

    #[serde(default)]
    pub associate_local_user: bool,

    #[serde(default)]
    pub sync_attribute: SyncAttribute,
}

fn default_userstore() -> String {
    PRIMARY_USERSTORE.to_string()
}

impl Default for JustInTimeProvisioning {
    fn default() -> Self {
        Self {
            is_enabled: false,
            scheme: ProvisioningScheme::default(),
            userstore: default_userstore(),
            associate_local_user: false,
            sync_attribute: SyncAttribute::default(),
        }
    }
}

/// Identity provider entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProvider {
    pub id: Uuid,
    pub tenant_domain: TenantDomain,

    /// Unique within the tenant
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// At most one primary IdP per tenant
    pub is_primary: bool,

    pub is_enabled: bool,

    /// Matched against the `fidp` request parameter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_realm_identifier: Option<String>,

    /// Audience alias used when validating tokens issued by this IdP
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    pub jit: JustInTimeProvisioning,

    /// Optimistic lock, bumped by the repository on every write
    pub version: u64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IdentityProvider {
    pub fn new(tenant_domain: TenantDomain, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tenant_domain,
            name: name.into(),
            description: None,
            image_url: None,
            is_primary: false,
            is_enabled: true,
            home_realm_identifier: None,
            alias: None,
            jit: JustInTimeProvisioning::default(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
