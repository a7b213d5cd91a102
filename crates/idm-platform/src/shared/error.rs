//! Platform Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use idm_common::TenantError;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::usecase::UseCaseError;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        code: String,
        entity_type: String,
        id: String,
    },

    #[error("Duplicate {entity_type}: {field}={value}")]
    Duplicate {
        code: String,
        entity_type: String,
        field: String,
        value: String,
    },

    #[error("{message}")]
    Validation {
        code: String,
        message: String,
        description: Option<String>,
    },

    #[error("{message}")]
    Conflict { code: String, message: String },

    #[error("{entity_type} {id} was modified concurrently")]
    ConcurrentModification { entity_type: String, id: String },

    #[error("Invalid tenant: {0}")]
    InvalidTenant(#[from] TenantError),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PlatformError {
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        let entity_type = entity_type.into();
        Self::NotFound {
            code: format!("{}_NOT_FOUND", screaming(&entity_type)),
            entity_type,
            id: id.into(),
        }
    }

    pub fn duplicate(
        entity_type: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::Duplicate {
            code: "DUPLICATE".to_string(),
            entity_type: entity_type.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    /// Unique-name clash, reported with the aggregate's own error code.
    pub fn name_taken(
        code: impl Into<String>,
        entity_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self::Duplicate {
            code: code.into(),
            entity_type: entity_type.into(),
            field: "name".to_string(),
            value: name.into(),
        }
    }

    pub fn validation(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            code: code.into(),
            message: message.into(),
            description: None,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Duplicate { .. } | Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::ConcurrentModification { .. } => StatusCode::CONFLICT,
            Self::Validation { .. } | Self::InvalidTenant(_) | Self::Json(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Configuration { .. } | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::NotFound { code, .. }
            | Self::Duplicate { code, .. }
            | Self::Validation { code, .. }
            | Self::Conflict { code, .. } => code,
            Self::ConcurrentModification { .. } => "CONCURRENT_MODIFICATION",
            Self::InvalidTenant(_) => "INVALID_TENANT",
            Self::Json(_) => "INVALID_REQUEST_BODY",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

fn screaming(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    for (i, c) in value.chars().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            out.push('_');
        }
        out.push(c.to_ascii_uppercase());
    }
    out
}

pub type Result<T> = std::result::Result<T, PlatformError>;

/// Error response body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Stable machine-readable error code
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl IntoResponse for PlatformError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let description = match &self {
            Self::Validation { description, .. } => description.clone(),
            _ => None,
        };

        let body = ErrorResponse {
            code: self.code().to_string(),
            message: self.to_string(),
            description,
        };

        (status, Json(body)).into_response()
    }
}

impl From<UseCaseError> for PlatformError {
    fn from(err: UseCaseError) -> Self {
        match err {
            UseCaseError::ValidationError { code, message, details } => {
                let description = details
                    .get("description")
                    .and_then(|v| v.as_str())
                    .map(String::from);
                PlatformError::Validation { code, message, description }
            }
            UseCaseError::BusinessRuleViolation { code, message, .. } => {
                PlatformError::Conflict { code, message }
            }
            UseCaseError::NotFoundError { code, message, details } => {
                let entity_type = details
                    .get("entityType")
                    .and_then(|v| v.as_str())
                    .unwrap_or("Resource")
                    .to_string();
                let id = details
                    .get("id")
                    .and_then(|v| v.as_str())
                    .map(String::from)
                    .unwrap_or(message);
                PlatformError::NotFound { code, entity_type, id }
            }
            UseCaseError::ConcurrencyError { code, message, .. } => {
                PlatformError::Conflict { code, message }
            }
            UseCaseError::CommitError { message, .. } => PlatformError::Internal { message },
        }
    }
}
