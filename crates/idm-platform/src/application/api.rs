//! Applications API
//!
//! REST endpoints for application management, scoped to the caller's tenant.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};
use uuid::Uuid;

use crate::application::advanced_config::AdvancedApplicationConfiguration;
use crate::application::operations::{
    CreateApplicationCommand, CreateApplicationUseCase, DeleteApplicationCommand,
    DeleteApplicationUseCase, PatchApplicationCommand, PatchApplicationUseCase,
};
use crate::shared::api_common::{location, ListParams};
use crate::shared::error::{ErrorResponse, PlatformError};
use crate::shared::middleware::TenantContext;
use crate::{Application, ApplicationRepository};

/// Register application request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    /// Unique within the tenant
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub access_url: Option<String>,
    pub advanced_configurations: Option<AdvancedApplicationConfiguration>,
}

/// Partial application update; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatchApplicationRequest {
    pub name: Option<String>,
    /// Empty string clears the description
    pub description: Option<String>,
    /// Empty string clears the image URL
    pub image_url: Option<String>,
    /// Empty string clears the access URL
    pub access_url: Option<String>,
    pub advanced_configurations: Option<AdvancedApplicationConfiguration>,
}

/// Application response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub access_url: Option<String>,
    pub advanced_configurations: AdvancedApplicationConfiguration,
    pub version: u64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Application> for ApplicationResponse {
    fn from(app: Application) -> Self {
        Self {
            advanced_configurations: AdvancedApplicationConfiguration::from(&app),
            id: app.id,
            name: app.name,
            description: app.description,
            image_url: app.image_url,
            access_url: app.access_url,
            version: app.version,
            created_at: app.created_at.to_rfc3339(),
            updated_at: app.updated_at.to_rfc3339(),
        }
    }
}

/// Application summary used in listings
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationListItem {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub access_url: Option<String>,
}

impl From<Application> for ApplicationListItem {
    fn from(app: Application) -> Self {
        Self {
            id: app.id,
            name: app.name,
            description: app.description,
            image_url: app.image_url,
            access_url: app.access_url,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationListResponse {
    pub total_results: usize,
    pub start_index: usize,
    pub count: usize,
    pub applications: Vec<ApplicationListItem>,
}

/// Applications service state
#[derive(Clone)]
pub struct ApplicationsState {
    pub application_repo: Arc<dyn ApplicationRepository>,
    pub create_use_case: Arc<CreateApplicationUseCase>,
    pub patch_use_case: Arc<PatchApplicationUseCase>,
    pub delete_use_case: Arc<DeleteApplicationUseCase>,
    /// Public path of this router, used for `Location` headers
    pub resource_path: Arc<str>,
}

impl ApplicationsState {
    pub fn new(application_repo: Arc<dyn ApplicationRepository>, resource_path: &str) -> Self {
        Self {
            create_use_case: Arc::new(CreateApplicationUseCase::new(application_repo.clone())),
            patch_use_case: Arc::new(PatchApplicationUseCase::new(application_repo.clone())),
            delete_use_case: Arc::new(DeleteApplicationUseCase::new(application_repo.clone())),
            application_repo,
            resource_path: Arc::from(resource_path),
        }
    }
}

fn parse_id(id: &str) -> Result<Uuid, PlatformError> {
    Uuid::parse_str(id).map_err(|_| PlatformError::not_found("Application", id))
}

/// Register a new application
#[utoipa::path(
    post,
    path = "",
    tag = "applications",
    request_body = CreateApplicationRequest,
    responses(
        (status = 201, description = "Application created", body = ApplicationResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Duplicate name", body = ErrorResponse)
    )
)]
pub async fn create_application(
    State(state): State<ApplicationsState>,
    ctx: TenantContext,
    Json(req): Json<CreateApplicationRequest>,
) -> Result<impl IntoResponse, PlatformError> {
    let command = CreateApplicationCommand {
        name: req.name,
        description: req.description,
        image_url: req.image_url,
        access_url: req.access_url,
        advanced_configurations: req.advanced_configurations,
    };

    let app = state.create_use_case.execute(command, ctx.into_inner()).await?;
    let location = location(&state.resource_path, app.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(ApplicationResponse::from(app)),
    ))
}

/// List applications
#[utoipa::path(
    get,
    path = "",
    tag = "applications",
    params(ListParams),
    responses(
        (status = 200, description = "Page of applications", body = ApplicationListResponse)
    )
)]
pub async fn list_applications(
    State(state): State<ApplicationsState>,
    ctx: TenantContext,
    Query(params): Query<ListParams>,
) -> Result<Json<ApplicationListResponse>, PlatformError> {
    let page = state
        .application_repo
        .list(ctx.tenant(), params.offset(), params.limit())
        .await?
        .map(ApplicationListItem::from);

    Ok(Json(ApplicationListResponse {
        total_results: page.total,
        start_index: page.offset,
        count: page.items.len(),
        applications: page.items,
    }))
}

/// Get application by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "applications",
    params(
        ("id" = String, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Application found", body = ApplicationResponse),
        (status = 404, description = "Application not found", body = ErrorResponse)
    )
)]
pub async fn get_application(
    State(state): State<ApplicationsState>,
    ctx: TenantContext,
    Path(id): Path<String>,
) -> Result<Json<ApplicationResponse>, PlatformError> {
    let app = find(&state, &ctx, &id).await?;
    Ok(Json(app.into()))
}

/// Partially update an application
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "applications",
    params(
        ("id" = String, Path, description = "Application ID")
    ),
    request_body = PatchApplicationRequest,
    responses(
        (status = 200, description = "Application updated", body = ApplicationResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Application not found", body = ErrorResponse),
        (status = 409, description = "Duplicate name or concurrent update", body = ErrorResponse)
    )
)]
pub async fn patch_application(
    State(state): State<ApplicationsState>,
    ctx: TenantContext,
    Path(id): Path<String>,
    Json(req): Json<PatchApplicationRequest>,
) -> Result<Json<ApplicationResponse>, PlatformError> {
    let command = PatchApplicationCommand {
        id: parse_id(&id)?,
        name: req.name,
        description: req.description,
        image_url: req.image_url,
        access_url: req.access_url,
        advanced_configurations: req.advanced_configurations,
    };

    let app = state.patch_use_case.execute(command, ctx.into_inner()).await?;
    Ok(Json(app.into()))
}

/// Delete an application
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "applications",
    params(
        ("id" = String, Path, description = "Application ID")
    ),
    responses(
        (status = 204, description = "Application deleted"),
        (status = 404, description = "Application not found", body = ErrorResponse)
    )
)]
pub async fn delete_application(
    State(state): State<ApplicationsState>,
    ctx: TenantContext,
    Path(id): Path<String>,
) -> Result<StatusCode, PlatformError> {
    let command = DeleteApplicationCommand { id: parse_id(&id)? };
    state.delete_use_case.execute(command, ctx.into_inner()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get advanced configurations of an application
#[utoipa::path(
    get,
    path = "/{id}/advanced-configs",
    tag = "applications",
    params(
        ("id" = String, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Advanced configurations", body = AdvancedApplicationConfiguration),
        (status = 404, description = "Application not found", body = ErrorResponse)
    )
)]
pub async fn get_advanced_configurations(
    State(state): State<ApplicationsState>,
    ctx: TenantContext,
    Path(id): Path<String>,
) -> Result<Json<AdvancedApplicationConfiguration>, PlatformError> {
    let app = find(&state, &ctx, &id).await?;
    Ok(Json(AdvancedApplicationConfiguration::from(&app)))
}

/// Update advanced configurations of an application
#[utoipa::path(
    patch,
    path = "/{id}/advanced-configs",
    tag = "applications",
    params(
        ("id" = String, Path, description = "Application ID")
    ),
    request_body = AdvancedApplicationConfiguration,
    responses(
        (status = 200, description = "Advanced configurations updated", body = AdvancedApplicationConfiguration),
        (status = 400, description = "Unsupported property or invalid consent page URL", body = ErrorResponse),
        (status = 404, description = "Application not found", body = ErrorResponse)
    )
)]
pub async fn patch_advanced_configurations(
    State(state): State<ApplicationsState>,
    ctx: TenantContext,
    Path(id): Path<String>,
    Json(patch): Json<AdvancedApplicationConfiguration>,
) -> Result<Json<AdvancedApplicationConfiguration>, PlatformError> {
    let command = PatchApplicationCommand::advanced(parse_id(&id)?, patch);
    let app = state.patch_use_case.execute(command, ctx.into_inner()).await?;
    Ok(Json(AdvancedApplicationConfiguration::from(&app)))
}

async fn find(
    state: &ApplicationsState,
    ctx: &TenantContext,
    id: &str,
) -> Result<Application, PlatformError> {
    let uuid = parse_id(id)?;
    state
        .application_repo
        .find_by_id(ctx.tenant(), uuid)
        .await?
        .ok_or_else(|| PlatformError::not_found("Application", id))
}

/// Create applications router
pub fn applications_router(state: ApplicationsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(create_application, list_applications))
        .routes(routes!(get_application, patch_application, delete_application))
        .routes(routes!(get_advanced_configurations, patch_advanced_configurations))
        .with_state(state)
}
