//! Development Data Seeder
//!
//! Seeds a sample application and identity provider into the default
//! tenant when the server runs in dev mode. Existing records are kept.

use std::sync::Arc;
use tracing::info;

use crate::application::advanced_config::{
    AdvancedApplicationConfiguration, Certificate, ExternalizedConsentPageConfiguration,
};
use crate::application::operations::{CreateApplicationCommand, CreateApplicationUseCase};
use crate::idp::entity::{JustInTimeProvisioning, ProvisioningScheme};
use crate::idp::service::{CreateIdentityProviderCommand, IdentityProviderService};
use crate::usecase::error::repository_error;
use crate::usecase::{ExecutionContext, UseCaseError};
use crate::{ApplicationRepository, IdentityProviderRepository};
use idm_common::TenantDomain;

const SAMPLE_APPLICATION: &str = "Sample Portal";
const SAMPLE_IDP: &str = "Sample Federation";

/// Development data seeder
pub struct DevDataSeeder {
    application_repo: Arc<dyn ApplicationRepository>,
    idp_repo: Arc<dyn IdentityProviderRepository>,
}

impl DevDataSeeder {
    pub fn new(
        application_repo: Arc<dyn ApplicationRepository>,
        idp_repo: Arc<dyn IdentityProviderRepository>,
    ) -> Self {
        Self { application_repo, idp_repo }
    }

    /// Seed all development data into `tenant`
    pub async fn seed(&self, tenant: &TenantDomain) -> Result<(), UseCaseError> {
        info!(tenant = %tenant, "Seeding development data");

        self.seed_application(tenant).await?;
        self.seed_identity_provider(tenant).await?;

        info!(tenant = %tenant, "Development data seeded");
        Ok(())
    }

    async fn seed_application(&self, tenant: &TenantDomain) -> Result<(), UseCaseError> {
        let existing = self
            .application_repo
            .find_by_name(tenant, SAMPLE_APPLICATION)
            .await
            .map_err(repository_error)?;
        if existing.is_some() {
            return Ok(());
        }

        let command = CreateApplicationCommand {
            name: SAMPLE_APPLICATION.to_string(),
            description: Some("Seeded for local development".to_string()),
            access_url: Some("https://localhost:9443/portal".to_string()),
            advanced_configurations: Some(AdvancedApplicationConfiguration {
                discoverable_by_end_users: Some(true),
                certificate: Some(Certificate::jwks("https://localhost:9443/oauth2/jwks")),
                externalized_consent_page: Some(ExternalizedConsentPageConfiguration {
                    enabled: Some(false),
                    consent_page_url: Some("https://localhost:9443/consent".to_string()),
                }),
                ..Default::default()
            }),
            ..Default::default()
        };

        let app = CreateApplicationUseCase::new(self.application_repo.clone())
            .execute(command, ExecutionContext::for_tenant(tenant.clone()))
            .await?;
        info!(application_id = %app.id, "Created application: {}", SAMPLE_APPLICATION);
        Ok(())
    }

    async fn seed_identity_provider(&self, tenant: &TenantDomain) -> Result<(), UseCaseError> {
        let existing = self
            .idp_repo
            .find_by_name(tenant, SAMPLE_IDP)
            .await
            .map_err(repository_error)?;
        if existing.is_some() {
            return Ok(());
        }

        let command = CreateIdentityProviderCommand {
            name: SAMPLE_IDP.to_string(),
            is_primary: Some(true),
            jit: Some(JustInTimeProvisioning {
                is_enabled: true,
                scheme: ProvisioningScheme::PromptConsent,
                ..Default::default()
            }),
            ..Default::default()
        };

        let idp = IdentityProviderService::new(self.idp_repo.clone())
            .create(command, &ExecutionContext::for_tenant(tenant.clone()))
            .await?;
        info!(idp_id = %idp.id, "Created identity provider: {}", SAMPLE_IDP);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InMemoryApplicationRepository, InMemoryIdentityProviderRepository};

    #[tokio::test]
    async fn test_seed_is_repeatable() {
        let apps = Arc::new(InMemoryApplicationRepository::new());
        let idps = Arc::new(InMemoryIdentityProviderRepository::new());
        let seeder = DevDataSeeder::new(apps.clone(), idps.clone());
        let tenant = TenantDomain::default();

        seeder.seed(&tenant).await.unwrap();
        seeder.seed(&tenant).await.unwrap();

        assert_eq!(apps.list(&tenant, 0, 10).await.unwrap().total, 1);
        assert_eq!(idps.list(&tenant, 0, 10).await.unwrap().total, 1);

        let app = apps.find_by_name(&tenant, SAMPLE_APPLICATION).await.unwrap().unwrap();
        assert!(app.discoverable);
        assert!(app.jwks_uri.is_some());
    }
}
