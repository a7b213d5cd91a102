//! Identity Provider Repository

use async_trait::async_trait;
use idm_common::TenantDomain;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::shared::api_common::Page;
use crate::shared::error::{PlatformError, Result};
use crate::IdentityProvider;

/// Error code for a second identity provider with the same name in a tenant.
pub const IDP_NAME_EXISTS: &str = "IDP_NAME_EXISTS";

/// Storage for identity providers, partitioned by tenant.
#[async_trait]
pub trait IdentityProviderRepository: Send + Sync {
    /// Fails with `PlatformError::Duplicate` when the id or the name is
    /// already used in the tenant. Inserting a primary IdP clears the flag
    /// on every other IdP of the tenant in the same write; returns how many
    /// were cleared.
    async fn insert(&self, idp: &IdentityProvider) -> Result<usize>;

    async fn find_by_id(&self, tenant: &TenantDomain, id: Uuid) -> Result<Option<IdentityProvider>>;

    async fn find_by_name(&self, tenant: &TenantDomain, name: &str) -> Result<Option<IdentityProvider>>;

    /// Identity providers ordered by name.
    async fn list(&self, tenant: &TenantDomain, offset: usize, limit: usize) -> Result<Page<IdentityProvider>>;

    /// Store `idp` if the stored version equals `idp.version`.
    /// Returns the stored copy with its version bumped.
    async fn update(&self, idp: &IdentityProvider) -> Result<IdentityProvider>;

    async fn delete(&self, tenant: &TenantDomain, id: Uuid) -> Result<bool>;
}

/// In-memory identity provider store.
#[derive(Default)]
pub struct InMemoryIdentityProviderRepository {
    tenants: RwLock<HashMap<TenantDomain, HashMap<Uuid, IdentityProvider>>>,
}

impl InMemoryIdentityProviderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityProviderRepository for InMemoryIdentityProviderRepository {
    async fn insert(&self, idp: &IdentityProvider) -> Result<usize> {
        let mut tenants = self.tenants.write();
        let idps = tenants.entry(idp.tenant_domain.clone()).or_default();

        if idps.contains_key(&idp.id) {
            return Err(PlatformError::duplicate("IdentityProvider", "id", idp.id.to_string()));
        }
        if idps.values().any(|i| i.name == idp.name) {
            return Err(PlatformError::name_taken(IDP_NAME_EXISTS, "IdentityProvider", &idp.name));
        }

        let mut cleared = 0;
        if idp.is_primary {
            for other in idps.values_mut().filter(|i| i.is_primary) {
                other.is_primary = false;
                other.version += 1;
                other.touch();
                cleared += 1;
            }
        }

        idps.insert(idp.id, idp.clone());
        Ok(cleared)
    }

    async fn find_by_id(&self, tenant: &TenantDomain, id: Uuid) -> Result<Option<IdentityProvider>> {
        Ok(self
            .tenants
            .read()
            .get(tenant)
            .and_then(|idps| idps.get(&id))
            .cloned())
    }

    async fn find_by_name(&self, tenant: &TenantDomain, name: &str) -> Result<Option<IdentityProvider>> {
        Ok(self
            .tenants
            .read()
            .get(tenant)
            .and_then(|idps| idps.values().find(|i| i.name == name))
            .cloned())
    }

    async fn list(&self, tenant: &TenantDomain, offset: usize, limit: usize) -> Result<Page<IdentityProvider>> {
        let mut all: Vec<IdentityProvider> = self
            .tenants
            .read()
            .get(tenant)
            .map(|idps| idps.values().cloned().collect())
            .unwrap_or_default();

        all.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Page::slice(all, offset, limit))
    }

    async fn update(&self, idp: &IdentityProvider) -> Result<IdentityProvider> {
        let mut tenants = self.tenants.write();
        let stored = tenants
            .get_mut(&idp.tenant_domain)
            .and_then(|idps| idps.get_mut(&idp.id))
            .ok_or_else(|| PlatformError::not_found("IdentityProvider", idp.id.to_string()))?;

        if stored.version != idp.version {
            return Err(PlatformError::ConcurrentModification {
                entity_type: "IdentityProvider".to_string(),
                id: idp.id.to_string(),
            });
        }

        let mut next = idp.clone();
        next.version += 1;
        *stored = next.clone();
        Ok(next)
    }

    async fn delete(&self, tenant: &TenantDomain, id: Uuid) -> Result<bool> {
        Ok(self
            .tenants
            .write()
            .get_mut(tenant)
            .map(|idps| idps.remove(&id).is_some())
            .unwrap_or(false))
    }
}
