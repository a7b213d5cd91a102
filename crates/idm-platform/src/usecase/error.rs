//! Use Case Errors
//!
//! Categorized failures returned by use cases and update functions. The
//! category decides the HTTP status; the `code` is stable and machine-readable.
//!
//! ```ignore
//! use idm_platform::details;
//! use idm_platform::usecase::UseCaseError;
//!
//! UseCaseError::validation("NAME_REQUIRED", "Application name is required");
//!
//! UseCaseError::validation_with_details(
//!     "INVALID_URL",
//!     "accessUrl must be an absolute URL",
//!     details! { "accessUrl" => url },
//! );
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::shared::error::PlatformError;

/// Build a detail map for [`UseCaseError`].
#[macro_export]
macro_rules! details {
    () => {
        std::collections::HashMap::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = std::collections::HashMap::new();
        $(
            map.insert($key.to_string(), serde_json::json!($value));
        )+
        map
    }};
}

/// Categorized use case failure.
///
/// | Variant | Status |
/// |---------|--------|
/// | `ValidationError` | 400 |
/// | `BusinessRuleViolation` | 409 |
/// | `NotFoundError` | 404 |
/// | `ConcurrencyError` | 409 |
/// | `CommitError` | 500 |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UseCaseError {
    /// Malformed or unsupported input.
    ValidationError {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    /// Input is well-formed but conflicts with existing state (duplicate names etc).
    BusinessRuleViolation {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    NotFoundError {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    /// The stored aggregate changed between read and write.
    ConcurrencyError {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    /// The repository could not store the change.
    CommitError {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },
}

impl UseCaseError {
    pub fn validation(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn validation_with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self::ValidationError {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    pub fn business_rule(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BusinessRuleViolation {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFoundError {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn concurrency(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConcurrencyError {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn commit(message: impl Into<String>) -> Self {
        Self::CommitError {
            code: "COMMIT_FAILED".to_string(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::ValidationError { code, .. }
            | Self::BusinessRuleViolation { code, .. }
            | Self::NotFoundError { code, .. }
            | Self::ConcurrencyError { code, .. }
            | Self::CommitError { code, .. } => code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::ValidationError { message, .. }
            | Self::BusinessRuleViolation { message, .. }
            | Self::NotFoundError { message, .. }
            | Self::ConcurrencyError { message, .. }
            | Self::CommitError { message, .. } => message,
        }
    }

    pub fn details(&self) -> &HashMap<String, serde_json::Value> {
        match self {
            Self::ValidationError { details, .. }
            | Self::BusinessRuleViolation { details, .. }
            | Self::NotFoundError { details, .. }
            | Self::ConcurrencyError { details, .. }
            | Self::CommitError { details, .. } => details,
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::ValidationError { .. } => 400,
            Self::BusinessRuleViolation { .. } => 409,
            Self::NotFoundError { .. } => 404,
            Self::ConcurrencyError { .. } => 409,
            Self::CommitError { .. } => 500,
        }
    }
}

impl std::fmt::Display for UseCaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message())
    }
}

impl std::error::Error for UseCaseError {}

/// Translate a repository failure into the use case taxonomy.
pub(crate) fn repository_error(err: PlatformError) -> UseCaseError {
    match err {
        PlatformError::ConcurrentModification { entity_type, id } => UseCaseError::concurrency(
            "CONCURRENT_MODIFICATION",
            format!(
                "{} '{}' was modified by another request, retry with fresh data",
                entity_type, id
            ),
        ),
        PlatformError::NotFound { code, entity_type, id } => UseCaseError::NotFoundError {
            message: format!("{} with ID '{}' not found", entity_type, id),
            details: details! { "entityType" => entity_type, "id" => id },
            code,
        },
        PlatformError::Duplicate { code, entity_type, field, value } => {
            UseCaseError::BusinessRuleViolation {
                message: format!("{} with {} '{}' already exists", entity_type, field, value),
                details: details! { "entityType" => entity_type, field => value },
                code,
            }
        }
        other => UseCaseError::commit(format!("Repository failure: {}", other)),
    }
}
