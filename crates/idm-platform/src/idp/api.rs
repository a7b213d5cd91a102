//! Identity Providers API

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

use crate::idp::entity::{IdentityProvider, JustInTimeProvisioning};
use crate::idp::service::{CreateIdentityProviderCommand, IdentityProviderService};
use crate::shared::api_common::{location, ListParams};
use crate::shared::error::{ErrorResponse, PlatformError};
use crate::shared::middleware::TenantContext;

/// Register identity provider request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIdentityProviderRequest {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_primary: Option<bool>,
    pub is_enabled: Option<bool>,
    pub home_realm_identifier: Option<String>,
    pub alias: Option<String>,
    /// Defaults to disabled JIT provisioning
    pub jit: Option<JustInTimeProvisioning>,
}

/// Identity provider response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProviderResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_primary: bool,
    pub is_enabled: bool,
    pub home_realm_identifier: Option<String>,
    pub alias: Option<String>,
    pub jit: JustInTimeProvisioning,
    pub version: u64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<IdentityProvider> for IdentityProviderResponse {
    fn from(idp: IdentityProvider) -> Self {
        Self {
            id: idp.id,
            name: idp.name,
            description: idp.description,
            image_url: idp.image_url,
            is_primary: idp.is_primary,
            is_enabled: idp.is_enabled,
            home_realm_identifier: idp.home_realm_identifier,
            alias: idp.alias,
            jit: idp.jit,
            version: idp.version,
            created_at: idp.created_at.to_rfc3339(),
            updated_at: idp.updated_at.to_rfc3339(),
        }
    }
}

/// Identity provider summary used in listings
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProviderListItem {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_enabled: bool,
}

impl From<IdentityProvider> for IdentityProviderListItem {
    fn from(idp: IdentityProvider) -> Self {
        Self {
            id: idp.id,
            name: idp.name,
            description: idp.description,
            image_url: idp.image_url,
            is_enabled: idp.is_enabled,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProviderListResponse {
    pub total_results: usize,
    pub start_index: usize,
    pub count: usize,
    pub identity_providers: Vec<IdentityProviderListItem>,
}

/// Identity providers service state
#[derive(Clone)]
pub struct IdentityProvidersState {
    pub idp_service: Arc<IdentityProviderService>,
    /// Public path of this router, used for `Location` headers
    pub resource_path: Arc<str>,
}

impl IdentityProvidersState {
    pub fn new(idp_service: Arc<IdentityProviderService>, resource_path: &str) -> Self {
        Self {
            idp_service,
            resource_path: Arc::from(resource_path),
        }
    }
}

fn parse_id(id: &str) -> Result<Uuid, PlatformError> {
    Uuid::parse_str(id).map_err(|_| PlatformError::not_found("IdentityProvider", id))
}

/// Register an identity provider
#[utoipa::path(
    post,
    path = "",
    tag = "identity-providers",
    request_body = CreateIdentityProviderRequest,
    responses(
        (status = 201, description = "Identity provider created", body = IdentityProviderResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Duplicate name", body = ErrorResponse)
    )
)]
pub async fn create_identity_provider(
    State(state): State<IdentityProvidersState>,
    ctx: TenantContext,
    Json(req): Json<CreateIdentityProviderRequest>,
) -> Result<impl IntoResponse, PlatformError> {
    let command = CreateIdentityProviderCommand {
        name: req.name,
        description: req.description,
        image_url: req.image_url,
        is_primary: req.is_primary,
        is_enabled: req.is_enabled,
        home_realm_identifier: req.home_realm_identifier,
        alias: req.alias,
        jit: req.jit,
    };

    let idp = state.idp_service.create(command, &ctx).await?;
    let location = location(&state.resource_path, idp.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(IdentityProviderResponse::from(idp)),
    ))
}

/// List identity providers
#[utoipa::path(
    get,
    path = "",
    tag = "identity-providers",
    params(ListParams),
    responses(
        (status = 200, description = "Page of identity providers", body = IdentityProviderListResponse)
    )
)]
pub async fn list_identity_providers(
    State(state): State<IdentityProvidersState>,
    ctx: TenantContext,
    Query(params): Query<ListParams>,
) -> Result<Json<IdentityProviderListResponse>, PlatformError> {
    let page = state
        .idp_service
        .list(&ctx, params.offset(), params.limit())
        .await?
        .map(IdentityProviderListItem::from);

    Ok(Json(IdentityProviderListResponse {
        total_results: page.total,
        start_index: page.offset,
        count: page.items.len(),
        identity_providers: page.items,
    }))
}

/// Get identity provider by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "identity-providers",
    params(
        ("id" = String, Path, description = "Identity provider ID")
    ),
    responses(
        (status = 200, description = "Identity provider found", body = IdentityProviderResponse),
        (status = 404, description = "Identity provider not found", body = ErrorResponse)
    )
)]
pub async fn get_identity_provider(
    State(state): State<IdentityProvidersState>,
    ctx: TenantContext,
    Path(id): Path<String>,
) -> Result<Json<IdentityProviderResponse>, PlatformError> {
    let idp = state.idp_service.get(&ctx, parse_id(&id)?).await?;
    Ok(Json(idp.into()))
}

/// Delete an identity provider
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "identity-providers",
    params(
        ("id" = String, Path, description = "Identity provider ID")
    ),
    responses(
        (status = 204, description = "Identity provider deleted"),
        (status = 404, description = "Identity provider not found", body = ErrorResponse)
    )
)]
pub async fn delete_identity_provider(
    State(state): State<IdentityProvidersState>,
    ctx: TenantContext,
    Path(id): Path<String>,
) -> Result<StatusCode, PlatformError> {
    state.idp_service.delete(&ctx, parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get JIT provisioning configuration
#[utoipa::path(
    get,
    path = "/{id}/provisioning/jit",
    tag = "identity-providers",
    params(
        ("id" = String, Path, description = "Identity provider ID")
    ),
    responses(
        (status = 200, description = "JIT provisioning configuration", body = JustInTimeProvisioning),
        (status = 404, description = "Identity provider not found", body = ErrorResponse)
    )
)]
pub async fn get_jit_provisioning(
    State(state): State<IdentityProvidersState>,
    ctx: TenantContext,
    Path(id): Path<String>,
) -> Result<Json<JustInTimeProvisioning>, PlatformError> {
    let jit = state.idp_service.get_jit(&ctx, parse_id(&id)?).await?;
    Ok(Json(jit))
}

/// Replace JIT provisioning configuration
#[utoipa::path(
    put,
    path = "/{id}/provisioning/jit",
    tag = "identity-providers",
    params(
        ("id" = String, Path, description = "Identity provider ID")
    ),
    request_body = JustInTimeProvisioning,
    responses(
        (status = 200, description = "JIT provisioning updated", body = JustInTimeProvisioning),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Identity provider not found", body = ErrorResponse)
    )
)]
pub async fn update_jit_provisioning(
    State(state): State<IdentityProvidersState>,
    ctx: TenantContext,
    Path(id): Path<String>,
    Json(jit): Json<JustInTimeProvisioning>,
) -> Result<Json<JustInTimeProvisioning>, PlatformError> {
    let jit = state.idp_service.update_jit(&ctx, parse_id(&id)?, jit).await?;
    Ok(Json(jit))
}

/// Create identity providers router
pub fn identity_providers_router(state: IdentityProvidersState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(create_identity_provider, list_identity_providers))
        .routes(routes!(get_identity_provider, delete_identity_provider))
        .routes(routes!(get_jit_provisioning, update_jit_provisioning))
        .with_state(state)
}
