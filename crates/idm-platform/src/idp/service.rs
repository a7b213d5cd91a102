//! Identity Provider Service
//!
//! Registration, lookup and JIT provisioning management for federated
//! identity providers. Every call is scoped to the tenant of its context.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::details;
use crate::idp::entity::{IdentityProvider, JustInTimeProvisioning};
use crate::idp::repository::{IdentityProviderRepository, IDP_NAME_EXISTS};
use crate::shared::api_common::Page;
use crate::shared::validation::validate_absolute_url;
use crate::usecase::error::repository_error;
use crate::usecase::{ExecutionContext, UseCaseError};

/// Command for registering an identity provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIdentityProviderCommand {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_primary: Option<bool>,
    pub is_enabled: Option<bool>,
    pub home_realm_identifier: Option<String>,
    pub alias: Option<String>,
    pub jit: Option<JustInTimeProvisioning>,
}

pub struct IdentityProviderService {
    idp_repo: Arc<dyn IdentityProviderRepository>,
}

impl IdentityProviderService {
    pub fn new(idp_repo: Arc<dyn IdentityProviderRepository>) -> Self {
        Self { idp_repo }
    }

    pub async fn create(
        &self,
        command: CreateIdentityProviderCommand,
        ctx: &ExecutionContext,
    ) -> Result<IdentityProvider, UseCaseError> {
        let name = command.name.trim();
        if name.is_empty() {
            return Err(UseCaseError::validation(
                "NAME_REQUIRED",
                "Identity provider name is required",
            ));
        }

        if let Some(url) = command.image_url.as_deref() {
            validate_absolute_url("imageUrl", url)?;
        }

        let existing = self
            .idp_repo
            .find_by_name(ctx.tenant(), name)
            .await
            .map_err(repository_error)?;
        if existing.is_some() {
            return Err(UseCaseError::business_rule(
                IDP_NAME_EXISTS,
                format!("An identity provider with name '{}' already exists", name),
            ));
        }

        let mut idp = IdentityProvider::new(ctx.tenant_domain.clone(), name);
        idp.description = command.description;
        idp.image_url = command.image_url;
        idp.is_primary = command.is_primary.unwrap_or(false);
        idp.is_enabled = command.is_enabled.unwrap_or(true);
        idp.home_realm_identifier = command.home_realm_identifier;
        idp.alias = command.alias;
        if let Some(jit) = command.jit {
            idp.jit = normalize_jit(jit)?;
        }

        let cleared = self.idp_repo.insert(&idp).await.map_err(repository_error)?;
        if cleared > 0 {
            info!(tenant = %ctx.tenant_domain, idp_id = %idp.id, cleared, "Primary identity provider replaced");
        }

        info!(
            tenant = %ctx.tenant_domain,
            execution_id = %ctx.execution_id,
            idp_id = %idp.id,
            name = %idp.name,
            "Identity provider created"
        );

        Ok(idp)
    }

    pub async fn list(
        &self,
        ctx: &ExecutionContext,
        offset: usize,
        limit: usize,
    ) -> Result<Page<IdentityProvider>, UseCaseError> {
        self.idp_repo
            .list(ctx.tenant(), offset, limit)
            .await
            .map_err(repository_error)
    }

    pub async fn get(&self, ctx: &ExecutionContext, id: Uuid) -> Result<IdentityProvider, UseCaseError> {
        self.idp_repo
            .find_by_id(ctx.tenant(), id)
            .await
            .map_err(repository_error)?
            .ok_or_else(|| idp_not_found(id))
    }

    pub async fn delete(&self, ctx: &ExecutionContext, id: Uuid) -> Result<(), UseCaseError> {
        let deleted = self
            .idp_repo
            .delete(ctx.tenant(), id)
            .await
            .map_err(repository_error)?;
        if !deleted {
            return Err(idp_not_found(id));
        }

        info!(tenant = %ctx.tenant_domain, idp_id = %id, "Identity provider deleted");
        Ok(())
    }

    pub async fn get_jit(
        &self,
        ctx: &ExecutionContext,
        id: Uuid,
    ) -> Result<JustInTimeProvisioning, UseCaseError> {
        Ok(self.get(ctx, id).await?.jit)
    }

    /// Replace the JIT provisioning configuration. Fails with
    /// `CONCURRENT_MODIFICATION` when the IdP changed after it was read.
    pub async fn update_jit(
        &self,
        ctx: &ExecutionContext,
        id: Uuid,
        jit: JustInTimeProvisioning,
    ) -> Result<JustInTimeProvisioning, UseCaseError> {
        let mut idp = self.get(ctx, id).await?;
        idp.jit = normalize_jit(jit)?;
        idp.touch();

        let updated = self.idp_repo.update(&idp).await.map_err(repository_error)?;

        info!(
            tenant = %ctx.tenant_domain,
            idp_id = %id,
            version = updated.version,
            enabled = updated.jit.is_enabled,
            scheme = ?updated.jit.scheme,
            "JIT provisioning updated"
        );

        Ok(updated.jit)
    }
}

fn normalize_jit(mut jit: JustInTimeProvisioning) -> Result<JustInTimeProvisioning, UseCaseError> {
    let userstore = jit.userstore.trim();
    if userstore.is_empty() {
        return Err(UseCaseError::validation(
            "INVALID_USERSTORE",
            "JIT provisioning userstore cannot be empty",
        ));
    }
    jit.userstore = userstore.to_string();
    Ok(jit)
}

fn idp_not_found(id: Uuid) -> UseCaseError {
    UseCaseError::NotFoundError {
        code: "IDENTITY_PROVIDER_NOT_FOUND".to_string(),
        message: format!("Identity provider with ID '{}' not found", id),
        details: details! { "entityType" => "IdentityProvider", "id" => id.to_string() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idp::entity::{ProvisioningScheme, SyncAttribute, PRIMARY_USERSTORE};
    use crate::idp::repository::InMemoryIdentityProviderRepository;
    use crate::shared::error::Result as PlatformResult;
    use async_trait::async_trait;
    use idm_common::TenantDomain;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn service() -> IdentityProviderService {
        IdentityProviderService::new(Arc::new(InMemoryIdentityProviderRepository::new()))
    }

    fn ctx() -> ExecutionContext {
        ExecutionContext::for_tenant(TenantDomain::default())
    }

    fn command(name: &str) -> CreateIdentityProviderCommand {
        CreateIdentityProviderCommand {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Registers a new primary IdP right after the first `find_by_id`,
    /// between the read and the write of a JIT update.
    struct PrimaryTakeoverRepository {
        inner: InMemoryIdentityProviderRepository,
        fired: AtomicBool,
    }

    #[async_trait]
    impl IdentityProviderRepository for PrimaryTakeoverRepository {
        async fn insert(&self, idp: &IdentityProvider) -> PlatformResult<usize> {
            self.inner.insert(idp).await
        }

        async fn find_by_id(&self, tenant: &TenantDomain, id: Uuid) -> PlatformResult<Option<IdentityProvider>> {
            let found = self.inner.find_by_id(tenant, id).await?;
            if !self.fired.swap(true, Ordering::SeqCst) {
                let mut takeover = IdentityProvider::new(tenant.clone(), "Okta");
                takeover.is_primary = true;
                self.inner.insert(&takeover).await?;
            }
            Ok(found)
        }

        async fn find_by_name(&self, tenant: &TenantDomain, name: &str) -> PlatformResult<Option<IdentityProvider>> {
            self.inner.find_by_name(tenant, name).await
        }

        async fn list(&self, tenant: &TenantDomain, offset: usize, limit: usize) -> PlatformResult<Page<IdentityProvider>> {
            self.inner.list(tenant, offset, limit).await
        }

        async fn update(&self, idp: &IdentityProvider) -> PlatformResult<IdentityProvider> {
            self.inner.update(idp).await
        }

        async fn delete(&self, tenant: &TenantDomain, id: Uuid) -> PlatformResult<bool> {
            self.inner.delete(tenant, id).await
        }
    }

    #[tokio::test]
    async fn test_create_with_defaults() {
        let svc = service();
        let idp = svc.create(command(" Google "), &ctx()).await.unwrap();

        assert_eq!(idp.name, "Google");
        assert!(idp.is_enabled);
        assert_eq!(idp.jit.userstore, PRIMARY_USERSTORE);
        assert_eq!(svc.get(&ctx(), idp.id).await.unwrap(), idp);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let svc = service();
        svc.create(command("Google"), &ctx()).await.unwrap();
        let err = svc.create(command("Google"), &ctx()).await.unwrap_err();
        assert_eq!(err.code(), IDP_NAME_EXISTS);
        assert_eq!(err.http_status_code(), 409);
    }

    #[tokio::test]
    async fn test_name_required() {
        let err = service().create(command(""), &ctx()).await.unwrap_err();
        assert_eq!(err.code(), "NAME_REQUIRED");
    }

    #[tokio::test]
    async fn test_single_primary_per_tenant() {
        let svc = service();
        let primary = |name: &str| CreateIdentityProviderCommand {
            is_primary: Some(true),
            ..command(name)
        };

        let first = svc.create(primary("Google"), &ctx()).await.unwrap();
        let second = svc.create(primary("Okta"), &ctx()).await.unwrap();

        assert!(!svc.get(&ctx(), first.id).await.unwrap().is_primary);
        assert!(svc.get(&ctx(), second.id).await.unwrap().is_primary);
    }

    #[tokio::test]
    async fn test_update_jit() {
        let svc = service();
        let idp = svc.create(command("Google"), &ctx()).await.unwrap();

        let jit = JustInTimeProvisioning {
            is_enabled: true,
            scheme: ProvisioningScheme::PromptConsent,
            userstore: "  SECONDARY ".to_string(),
            associate_local_user: true,
            sync_attribute: SyncAttribute::None,
        };
        let updated = svc.update_jit(&ctx(), idp.id, jit).await.unwrap();
        assert_eq!(updated.userstore, "SECONDARY");

        let fetched = svc.get_jit(&ctx(), idp.id).await.unwrap();
        assert_eq!(fetched, updated);
        assert_eq!(fetched.sync_attribute, SyncAttribute::None);
    }

    #[tokio::test]
    async fn test_update_jit_does_not_restore_stale_primary() {
        let repo = Arc::new(PrimaryTakeoverRepository {
            inner: InMemoryIdentityProviderRepository::new(),
            fired: AtomicBool::new(false),
        });
        let mut google = IdentityProvider::new(TenantDomain::default(), "Google");
        google.is_primary = true;
        repo.inner.insert(&google).await.unwrap();
        let svc = IdentityProviderService::new(repo.clone());

        let jit = JustInTimeProvisioning {
            is_enabled: true,
            ..JustInTimeProvisioning::default()
        };
        let err = svc.update_jit(&ctx(), google.id, jit.clone()).await.unwrap_err();
        assert_eq!(err.code(), "CONCURRENT_MODIFICATION");
        assert_eq!(err.http_status_code(), 409);

        let primaries = |page: Page<IdentityProvider>| page.items.iter().filter(|i| i.is_primary).count();
        assert_eq!(primaries(svc.list(&ctx(), 0, 10).await.unwrap()), 1);
        assert!(!svc.get(&ctx(), google.id).await.unwrap().is_primary);

        // A retry on fresh data goes through and keeps Okta primary
        let stored = svc.update_jit(&ctx(), google.id, jit).await.unwrap();
        assert!(stored.is_enabled);
        assert_eq!(primaries(svc.list(&ctx(), 0, 10).await.unwrap()), 1);
        assert!(!svc.get(&ctx(), google.id).await.unwrap().is_primary);
    }

    #[tokio::test]
    async fn test_blank_userstore_rejected() {
        let svc = service();
        let idp = svc.create(command("Google"), &ctx()).await.unwrap();

        let jit = JustInTimeProvisioning {
            userstore: " ".to_string(),
            ..JustInTimeProvisioning::default()
        };
        let err = svc.update_jit(&ctx(), idp.id, jit).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_USERSTORE");
    }

    #[tokio::test]
    async fn test_delete_and_not_found() {
        let svc = service();
        let idp = svc.create(command("Google"), &ctx()).await.unwrap();

        svc.delete(&ctx(), idp.id).await.unwrap();
        let err = svc.get_jit(&ctx(), idp.id).await.unwrap_err();
        assert_eq!(err.code(), "IDENTITY_PROVIDER_NOT_FOUND");
        assert_eq!(svc.delete(&ctx(), idp.id).await.unwrap_err().http_status_code(), 404);
    }
}
