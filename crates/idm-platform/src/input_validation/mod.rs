//! Input validation rules

pub mod api;
pub mod model;
pub mod service;
pub mod validators;

pub use api::{validation_rules_router, ValidationRulesState};
pub use model::{
    MappingModel, PropertyModel, RuleModel, ValidationConfigModel, ValidatorModel, ValidatorType,
};
pub use service::{InMemoryValidationRulesService, ValidationRulesManagementService};
