//! Validation Rules API

use axum::{extract::State, Json};
use std::sync::Arc;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::input_validation::model::{ValidationConfigModel, ValidatorModel};
use crate::input_validation::service::ValidationRulesManagementService;
use crate::shared::error::{ErrorResponse, PlatformError};
use crate::shared::middleware::TenantContext;

#[derive(Clone)]
pub struct ValidationRulesState {
    pub rules_service: Arc<dyn ValidationRulesManagementService>,
}

impl ValidationRulesState {
    pub fn new(rules_service: Arc<dyn ValidationRulesManagementService>) -> Self {
        Self { rules_service }
    }
}

/// Get the tenant's input validation configuration
#[utoipa::path(
    get,
    path = "",
    tag = "validation-rules",
    responses(
        (status = 200, description = "Validation configuration per field", body = Vec<ValidationConfigModel>)
    )
)]
pub async fn get_validation_configuration(
    State(state): State<ValidationRulesState>,
    ctx: TenantContext,
) -> Result<Json<Vec<ValidationConfigModel>>, PlatformError> {
    let configs = state
        .rules_service
        .get_validation_configuration(ctx.tenant())
        .await?;
    Ok(Json(configs))
}

/// Update input validation configuration
#[utoipa::path(
    put,
    path = "",
    tag = "validation-rules",
    request_body = Vec<ValidationConfigModel>,
    responses(
        (status = 200, description = "Updated configuration", body = Vec<ValidationConfigModel>),
        (status = 400, description = "Invalid configuration", body = ErrorResponse)
    )
)]
pub async fn update_validation_configuration(
    State(state): State<ValidationRulesState>,
    ctx: TenantContext,
    Json(configs): Json<Vec<ValidationConfigModel>>,
) -> Result<Json<Vec<ValidationConfigModel>>, PlatformError> {
    let configs = state
        .rules_service
        .update_input_validation_configuration(configs, ctx.tenant())
        .await?;
    Ok(Json(configs))
}

/// List available validators
#[utoipa::path(
    get,
    path = "/validators",
    tag = "validation-rules",
    responses(
        (status = 200, description = "Validator catalogue", body = Vec<ValidatorModel>)
    )
)]
pub async fn get_validators(
    State(state): State<ValidationRulesState>,
    ctx: TenantContext,
) -> Result<Json<Vec<ValidatorModel>>, PlatformError> {
    let validators = state.rules_service.get_validators(ctx.tenant()).await?;
    Ok(Json(validators))
}

/// Create validation rules router
pub fn validation_rules_router(state: ValidationRulesState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(get_validation_configuration, update_validation_configuration))
        .routes(routes!(get_validators))
        .with_state(state)
}
