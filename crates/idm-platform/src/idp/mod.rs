//! Identity provider aggregate

pub mod api;
pub mod entity;
pub mod repository;
pub mod service;

pub use api::{identity_providers_router, IdentityProvidersState};
pub use entity::{
    IdentityProvider, JustInTimeProvisioning, ProvisioningScheme, SyncAttribute, PRIMARY_USERSTORE,
};
pub use repository::{IdentityProviderRepository, InMemoryIdentityProviderRepository};
pub use service::{CreateIdentityProviderCommand, IdentityProviderService};
