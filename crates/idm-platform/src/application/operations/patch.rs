//! Patch Application Use Case
//!
//! Applies basic field changes and an optional advanced configuration patch.
//! All changes are made on a copy of the stored application, which is only
//! written back once every field has been accepted.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::{application_not_found, repository_error, UpdateAdvancedConfigurations};
use crate::application::advanced_config::AdvancedApplicationConfiguration;
use crate::shared::patch::UpdateFunction;
use crate::shared::validation::validate_absolute_url;
use crate::usecase::{ExecutionContext, UseCaseError};
use crate::application::repository::APPLICATION_NAME_EXISTS;
use crate::{Application, ApplicationRepository};

/// Command for partially updating an application.
///
/// For the URL and description fields an empty string clears the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchApplicationCommand {
    pub id: Uuid,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub advanced_configurations: Option<AdvancedApplicationConfiguration>,
}

impl PatchApplicationCommand {
    /// Command that only carries an advanced configuration patch.
    pub fn advanced(id: Uuid, patch: AdvancedApplicationConfiguration) -> Self {
        Self {
            id,
            advanced_configurations: Some(patch),
            ..Default::default()
        }
    }
}

/// Use case for partially updating an application.
pub struct PatchApplicationUseCase {
    application_repo: Arc<dyn ApplicationRepository>,
    merger: UpdateAdvancedConfigurations,
}

impl PatchApplicationUseCase {
    pub fn new(application_repo: Arc<dyn ApplicationRepository>) -> Self {
        Self {
            application_repo,
            merger: UpdateAdvancedConfigurations,
        }
    }

    pub async fn execute(
        &self,
        command: PatchApplicationCommand,
        ctx: ExecutionContext,
    ) -> Result<Application, UseCaseError> {
        let stored = self
            .application_repo
            .find_by_id(ctx.tenant(), command.id)
            .await
            .map_err(repository_error)?
            .ok_or_else(|| application_not_found(command.id))?;

        let mut application = stored.clone();

        if let Some(name) = command.name.as_deref() {
            let name = name.trim();
            if name.is_empty() {
                return Err(UseCaseError::validation(
                    "INVALID_NAME",
                    "Application name cannot be empty",
                ));
            }
            if name != application.name {
                let clash = self
                    .application_repo
                    .find_by_name(ctx.tenant(), name)
                    .await
                    .map_err(repository_error)?;
                if clash.is_some_and(|other| other.id != application.id) {
                    return Err(UseCaseError::business_rule(
                        APPLICATION_NAME_EXISTS,
                        format!("An application with name '{}' already exists", name),
                    ));
                }
                application.name = name.to_string();
            }
        }

        if let Some(description) = command.description {
            application.description = non_empty(description);
        }

        if let Some(url) = command.image_url {
            if !url.is_empty() {
                validate_absolute_url("imageUrl", &url)?;
            }
            application.image_url = non_empty(url);
        }

        if let Some(url) = command.access_url {
            if !url.is_empty() {
                validate_absolute_url("accessUrl", &url)?;
            }
            application.access_url = non_empty(url);
        }

        if let Err(err) = self
            .merger
            .apply(&mut application, command.advanced_configurations.as_ref())
        {
            warn!(
                tenant = %ctx.tenant_domain,
                application_id = %command.id,
                code = err.code(),
                "Advanced configuration rejected"
            );
            return Err(err);
        }

        if application == stored {
            return Ok(stored);
        }

        application.touch();
        let updated = self
            .application_repo
            .update(&application)
            .await
            .map_err(repository_error)?;

        info!(
            tenant = %ctx.tenant_domain,
            execution_id = %ctx.execution_id,
            application_id = %updated.id,
            version = updated.version,
            "Application updated"
        );

        Ok(updated)
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
