//! Application Operations
//!
//! Use cases for application management. Each use case validates its
//! command, applies it to the aggregate and stores the result through the
//! [`ApplicationRepository`](crate::ApplicationRepository).

pub mod create;
pub mod delete;
pub mod patch;
pub mod update_advanced;

pub use create::{CreateApplicationCommand, CreateApplicationUseCase};
pub use delete::{DeleteApplicationCommand, DeleteApplicationUseCase};
pub use patch::{PatchApplicationCommand, PatchApplicationUseCase};
pub use update_advanced::UpdateAdvancedConfigurations;

pub(crate) use crate::usecase::error::repository_error;

use uuid::Uuid;

use crate::details;
use crate::usecase::UseCaseError;

pub(crate) fn application_not_found(id: Uuid) -> UseCaseError {
    UseCaseError::NotFoundError {
        code: "APPLICATION_NOT_FOUND".to_string(),
        message: format!("Application with ID '{}' not found", id),
        details: details! { "entityType" => "Application", "id" => id.to_string() },
    }
}
