//! Create Application Use Case

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::{repository_error, UpdateAdvancedConfigurations};
use crate::application::advanced_config::AdvancedApplicationConfiguration;
use crate::shared::patch::UpdateFunction;
use crate::shared::validation::validate_absolute_url;
use crate::usecase::{ExecutionContext, UseCaseError};
use crate::application::repository::APPLICATION_NAME_EXISTS;
use crate::{Application, ApplicationRepository};

/// Command for registering a new application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationCommand {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub advanced_configurations: Option<AdvancedApplicationConfiguration>,
}

/// Use case for registering a new application.
pub struct CreateApplicationUseCase {
    application_repo: Arc<dyn ApplicationRepository>,
    merger: UpdateAdvancedConfigurations,
}

impl CreateApplicationUseCase {
    pub fn new(application_repo: Arc<dyn ApplicationRepository>) -> Self {
        Self {
            application_repo,
            merger: UpdateAdvancedConfigurations,
        }
    }

    pub async fn execute(
        &self,
        command: CreateApplicationCommand,
        ctx: ExecutionContext,
    ) -> Result<Application, UseCaseError> {
        let name = command.name.trim();
        if name.is_empty() {
            return Err(UseCaseError::validation(
                "NAME_REQUIRED",
                "Application name is required",
            ));
        }

        if let Some(url) = command.access_url.as_deref() {
            validate_absolute_url("accessUrl", url)?;
        }
        if let Some(url) = command.image_url.as_deref() {
            validate_absolute_url("imageUrl", url)?;
        }

        let existing = self
            .application_repo
            .find_by_name(ctx.tenant(), name)
            .await
            .map_err(repository_error)?;
        if existing.is_some() {
            return Err(UseCaseError::business_rule(
                APPLICATION_NAME_EXISTS,
                format!("An application with name '{}' already exists", name),
            ));
        }

        let mut application = Application::new(ctx.tenant_domain.clone(), name);
        application.description = command.description;
        application.image_url = command.image_url;
        application.access_url = command.access_url;

        self.merger
            .apply(&mut application, command.advanced_configurations.as_ref())?;

        self.application_repo
            .insert(&application)
            .await
            .map_err(repository_error)?;

        info!(
            tenant = %ctx.tenant_domain,
            execution_id = %ctx.execution_id,
            application_id = %application.id,
            name = %application.name,
            "Application created"
        );

        Ok(application)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::advanced_config::{Certificate, ExternalizedConsentPageConfiguration};
    use crate::shared::api_common::Page;
    use crate::shared::error::Result as PlatformResult;
    use crate::InMemoryApplicationRepository;
    use async_trait::async_trait;
    use idm_common::TenantDomain;
    use uuid::Uuid;

    /// Yields after every name lookup so two creates interleave between
    /// the lookup and the insert.
    struct InterleavingRepository(InMemoryApplicationRepository);

    #[async_trait]
    impl ApplicationRepository for InterleavingRepository {
        async fn insert(&self, application: &Application) -> PlatformResult<()> {
            self.0.insert(application).await
        }

        async fn find_by_id(&self, tenant: &TenantDomain, id: Uuid) -> PlatformResult<Option<Application>> {
            self.0.find_by_id(tenant, id).await
        }

        async fn find_by_name(&self, tenant: &TenantDomain, name: &str) -> PlatformResult<Option<Application>> {
            let found = self.0.find_by_name(tenant, name).await;
            tokio::task::yield_now().await;
            found
        }

        async fn list(&self, tenant: &TenantDomain, offset: usize, limit: usize) -> PlatformResult<Page<Application>> {
            self.0.list(tenant, offset, limit).await
        }

        async fn update(&self, application: &Application) -> PlatformResult<Application> {
            self.0.update(application).await
        }

        async fn delete(&self, tenant: &TenantDomain, id: Uuid) -> PlatformResult<bool> {
            self.0.delete(tenant, id).await
        }
    }

    fn use_case() -> (CreateApplicationUseCase, Arc<InMemoryApplicationRepository>) {
        let repo = Arc::new(InMemoryApplicationRepository::new());
        (CreateApplicationUseCase::new(repo.clone()), repo)
    }

    fn ctx() -> ExecutionContext {
        ExecutionContext::for_tenant(TenantDomain::default())
    }

    fn command(name: &str) -> CreateApplicationCommand {
        CreateApplicationCommand {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_creates_with_trimmed_name() {
        let (use_case, repo) = use_case();
        let app = use_case.execute(command("  portal "), ctx()).await.unwrap();

        assert_eq!(app.name, "portal");
        assert!(repo.find_by_id(&app.tenant_domain, app.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_name_required() {
        let (use_case, _) = use_case();
        let err = use_case.execute(command("   "), ctx()).await.unwrap_err();
        assert_eq!(err.code(), "NAME_REQUIRED");
    }

    #[tokio::test]
    async fn test_duplicate_name_per_tenant() {
        let (use_case, _) = use_case();
        use_case.execute(command("portal"), ctx()).await.unwrap();

        let err = use_case.execute(command("portal"), ctx()).await.unwrap_err();
        assert_eq!(err.code(), "APPLICATION_NAME_EXISTS");
        assert_eq!(err.http_status_code(), 409);

        // Same name in another tenant is fine
        let other = ExecutionContext::for_tenant(TenantDomain::parse("acme.io").unwrap());
        use_case.execute(command("portal"), other).await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_creates_store_one_application() {
        let repo = Arc::new(InterleavingRepository(InMemoryApplicationRepository::new()));
        let use_case = CreateApplicationUseCase::new(repo.clone());

        let (first, second) = tokio::join!(
            use_case.execute(command("portal"), ctx()),
            use_case.execute(command("portal"), ctx()),
        );

        let failures: Vec<_> = [first, second].into_iter().filter_map(|r| r.err()).collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].code(), APPLICATION_NAME_EXISTS);
        assert_eq!(failures[0].http_status_code(), 409);

        let page = repo.list(&TenantDomain::default(), 0, 10).await.unwrap();
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn test_relative_access_url_rejected() {
        let (use_case, _) = use_case();
        let cmd = CreateApplicationCommand {
            access_url: Some("/portal".to_string()),
            ..command("portal")
        };
        let err = use_case.execute(cmd, ctx()).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_URL");
    }

    #[tokio::test]
    async fn test_applies_advanced_configurations() {
        let (use_case, _) = use_case();
        let cmd = CreateApplicationCommand {
            advanced_configurations: Some(AdvancedApplicationConfiguration {
                discoverable_by_end_users: Some(true),
                certificate: Some(Certificate::pem("CERT")),
                ..Default::default()
            }),
            ..command("portal")
        };
        let app = use_case.execute(cmd, ctx()).await.unwrap();

        assert!(app.discoverable);
        assert_eq!(app.certificate_content.as_deref(), Some("CERT"));
    }

    #[tokio::test]
    async fn test_invalid_advanced_configuration_stores_nothing() {
        let (use_case, repo) = use_case();
        let cmd = CreateApplicationCommand {
            advanced_configurations: Some(AdvancedApplicationConfiguration {
                externalized_consent_page: Some(ExternalizedConsentPageConfiguration {
                    enabled: Some(true),
                    consent_page_url: Some("http://consent.example".to_string()),
                }),
                ..Default::default()
            }),
            ..command("portal")
        };
        let err = use_case.execute(cmd, ctx()).await.unwrap_err();

        assert_eq!(err.code(), "INVALID_CONSENT_PAGE_URL");
        let page = repo.list(&TenantDomain::default(), 0, 10).await.unwrap();
        assert_eq!(page.total, 0);
    }
}
