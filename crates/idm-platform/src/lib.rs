//! IDM Platform
//!
//! Configuration management for an identity server:
//! - Applications, including advanced configuration merging
//! - Federated identity providers and JIT provisioning
//! - Input validation rules for usernames and passwords
//!
//! ## Module Organization (Aggregate-based)
//!
//! Each aggregate contains:
//! - `entity` - Domain entities
//! - `repository` - Data access
//! - `api` - REST endpoints
//! - `operations` / `service` - Use cases

// Aggregates
pub mod application;
pub mod idp;
pub mod input_validation;

// Shared infrastructure
pub mod shared;

// Cross-cutting concerns
pub mod usecase;
pub mod seed;

// Re-export common types from shared
pub use shared::error::{PlatformError, Result};
pub use shared::middleware::{TenantContext, TenantLayer, TenantSettings};

// Re-export use case infrastructure
pub use usecase::{ExecutionContext, UseCaseError};
// Note: details! macro is automatically exported at crate root via #[macro_export]

// Re-export main entity types for convenience
pub use application::advanced_config::AdvancedApplicationConfiguration;
pub use application::entity::{Application, AuthConfig, ConsentPageConfig};
pub use idp::entity::{IdentityProvider, JustInTimeProvisioning};

// Re-export repositories
pub use application::repository::{ApplicationRepository, InMemoryApplicationRepository};
pub use idp::repository::{IdentityProviderRepository, InMemoryIdentityProviderRepository};
pub use input_validation::service::{InMemoryValidationRulesService, ValidationRulesManagementService};

// Re-export routers
pub use application::api::{applications_router, ApplicationsState};
pub use idp::api::{identity_providers_router, IdentityProvidersState};
pub use input_validation::api::{validation_rules_router, ValidationRulesState};
pub use shared::health_api::{health_router, HealthState};
