//! Delete Application Use Case

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::{application_not_found, repository_error};
use crate::usecase::{ExecutionContext, UseCaseError};
use crate::ApplicationRepository;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteApplicationCommand {
    pub id: Uuid,
}

/// Use case for removing an application.
pub struct DeleteApplicationUseCase {
    application_repo: Arc<dyn ApplicationRepository>,
}

impl DeleteApplicationUseCase {
    pub fn new(application_repo: Arc<dyn ApplicationRepository>) -> Self {
        Self { application_repo }
    }

    pub async fn execute(
        &self,
        command: DeleteApplicationCommand,
        ctx: ExecutionContext,
    ) -> Result<(), UseCaseError> {
        let deleted = self
            .application_repo
            .delete(ctx.tenant(), command.id)
            .await
            .map_err(repository_error)?;

        if !deleted {
            return Err(application_not_found(command.id));
        }

        info!(
            tenant = %ctx.tenant_domain,
            execution_id = %ctx.execution_id,
            application_id = %command.id,
            "Application deleted"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Application, InMemoryApplicationRepository};
    use idm_common::TenantDomain;

    #[tokio::test]
    async fn test_delete_then_missing() {
        let repo = Arc::new(InMemoryApplicationRepository::new());
        let app = Application::new(TenantDomain::default(), "portal");
        repo.insert(&app).await.unwrap();

        let use_case = DeleteApplicationUseCase::new(repo.clone());
        let ctx = || ExecutionContext::for_tenant(TenantDomain::default());

        use_case
            .execute(DeleteApplicationCommand { id: app.id }, ctx())
            .await
            .unwrap();

        let err = use_case
            .execute(DeleteApplicationCommand { id: app.id }, ctx())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "APPLICATION_NOT_FOUND");
        assert_eq!(err.http_status_code(), 404);
    }
}
