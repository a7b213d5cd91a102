//! Application aggregate

pub mod advanced_config;
pub mod api;
pub mod entity;
pub mod operations;
pub mod repository;

pub use advanced_config::{
    AdditionalSpProperty, AdvancedApplicationConfiguration, Certificate, CertificateType,
    ExternalizedConsentPageConfiguration,
};
pub use api::{applications_router, ApplicationsState};
pub use entity::{Application, AuthConfig, ConsentPageConfig};
pub use repository::{ApplicationRepository, InMemoryApplicationRepository, APPLICATION_NAME_EXISTS};
