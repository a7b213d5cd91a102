//! Validation Rules Management
//!
//! Per-tenant input validation configuration for the `password` and
//! `username` fields. Tenants without their own configuration for a field
//! get the built-in defaults.

use async_trait::async_trait;
use idm_common::TenantDomain;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

use crate::details;
use crate::input_validation::model::{
    MappingModel, RuleModel, ValidationConfigModel, ValidatorModel, ValidatorType,
};
use crate::input_validation::validators::{self, *};
use crate::usecase::UseCaseError;

pub const PASSWORD_FIELD: &str = "password";
pub const USERNAME_FIELD: &str = "username";

/// Configurable fields, in response order.
pub const FIELDS: [&str; 2] = [PASSWORD_FIELD, USERNAME_FIELD];

#[async_trait]
pub trait ValidationRulesManagementService: Send + Sync {
    async fn get_validation_configuration(
        &self,
        tenant: &TenantDomain,
    ) -> Result<Vec<ValidationConfigModel>, UseCaseError>;

    async fn get_validators(&self, tenant: &TenantDomain) -> Result<Vec<ValidatorModel>, UseCaseError>;

    /// Replace the configuration of the given fields and return the full
    /// tenant configuration.
    async fn update_input_validation_configuration(
        &self,
        configs: Vec<ValidationConfigModel>,
        tenant: &TenantDomain,
    ) -> Result<Vec<ValidationConfigModel>, UseCaseError>;
}

/// Built-in configuration for a field.
pub fn default_configuration(field: &str) -> Option<ValidationConfigModel> {
    let config = match field {
        PASSWORD_FIELD => ValidationConfigModel::with_rules(
            PASSWORD_FIELD,
            vec![
                RuleModel::new(
                    LENGTH_VALIDATOR,
                    vec![MappingModel::new(MIN_LENGTH, "8"), MappingModel::new(MAX_LENGTH, "30")],
                ),
                RuleModel::new(NUMERAL_VALIDATOR, vec![MappingModel::new(MIN_LENGTH, "1")]),
                RuleModel::new(UPPER_CASE_VALIDATOR, vec![MappingModel::new(MIN_LENGTH, "1")]),
                RuleModel::new(LOWER_CASE_VALIDATOR, vec![MappingModel::new(MIN_LENGTH, "1")]),
                RuleModel::new(
                    SPECIAL_CHARACTER_VALIDATOR,
                    vec![MappingModel::new(MIN_LENGTH, "1")],
                ),
            ],
        ),
        USERNAME_FIELD => ValidationConfigModel::with_rules(
            USERNAME_FIELD,
            vec![RuleModel::new(
                LENGTH_VALIDATOR,
                vec![MappingModel::new(MIN_LENGTH, "3"), MappingModel::new(MAX_LENGTH, "255")],
            )],
        ),
        _ => return None,
    };
    Some(config)
}

/// Validate one field configuration against the validator catalogue.
pub fn validate_configuration(config: &ValidationConfigModel) -> Result<(), UseCaseError> {
    let field = config.field.as_str();
    if !FIELDS.contains(&field) {
        return Err(UseCaseError::validation_with_details(
            "INVALID_FIELD",
            format!("Validation cannot be configured for field '{}'", field),
            details! { "field" => field, "supported" => FIELDS },
        ));
    }

    let rules = config.rules.as_deref().unwrap_or_default();
    let reg_ex = config.reg_ex.as_deref().unwrap_or_default();
    let (list, expected) = match (rules.is_empty(), reg_ex.is_empty()) {
        (false, true) => (rules, ValidatorType::Rule),
        (true, false) => (reg_ex, ValidatorType::Regex),
        _ => {
            return Err(UseCaseError::validation_with_details(
                "INVALID_CONFIGURATION",
                "Exactly one of 'rules' or 'regEx' must be configured",
                details! { "field" => field },
            ))
        }
    };

    for rule in list {
        let validator = validators::find(&rule.validator)
            .filter(|v| v.validator_type == expected)
            .ok_or_else(|| {
                UseCaseError::validation_with_details(
                    "UNSUPPORTED_VALIDATOR",
                    format!("Validator '{}' is not supported here", rule.validator),
                    details! { "field" => field, "validator" => &rule.validator },
                )
            })?;
        validator.check(field, rule)?;
    }

    Ok(())
}

/// Validation rules kept in process memory, partitioned by tenant.
#[derive(Default)]
pub struct InMemoryValidationRulesService {
    configs: RwLock<HashMap<TenantDomain, HashMap<String, ValidationConfigModel>>>,
}

impl InMemoryValidationRulesService {
    pub fn new() -> Self {
        Self::default()
    }

    fn resolve(&self, tenant: &TenantDomain) -> Vec<ValidationConfigModel> {
        let configs = self.configs.read();
        let stored = configs.get(tenant);
        FIELDS
            .iter()
            .filter_map(|field| {
                stored
                    .and_then(|fields| fields.get(*field).cloned())
                    .or_else(|| default_configuration(field))
            })
            .collect()
    }
}

#[async_trait]
impl ValidationRulesManagementService for InMemoryValidationRulesService {
    async fn get_validation_configuration(
        &self,
        tenant: &TenantDomain,
    ) -> Result<Vec<ValidationConfigModel>, UseCaseError> {
        Ok(self.resolve(tenant))
    }

    async fn get_validators(&self, _tenant: &TenantDomain) -> Result<Vec<ValidatorModel>, UseCaseError> {
        Ok(validators::catalogue().iter().map(|v| v.to_model()).collect())
    }

    async fn update_input_validation_configuration(
        &self,
        configs: Vec<ValidationConfigModel>,
        tenant: &TenantDomain,
    ) -> Result<Vec<ValidationConfigModel>, UseCaseError> {
        let mut seen = HashSet::new();
        for config in &configs {
            if !seen.insert(config.field.as_str()) {
                return Err(UseCaseError::validation_with_details(
                    "DUPLICATE_FIELD",
                    format!("Field '{}' is configured more than once", config.field),
                    details! { "field" => &config.field },
                ));
            }
            if let Err(err) = validate_configuration(config) {
                warn!(tenant = %tenant, field = %config.field, code = err.code(), "Validation configuration rejected");
                return Err(err);
            }
        }

        let fields: Vec<String> = configs.iter().map(|c| c.field.clone()).collect();
        {
            let mut all = self.configs.write();
            let stored = all.entry(tenant.clone()).or_default();
            for config in configs {
                stored.insert(config.field.clone(), config);
            }
        }

        info!(tenant = %tenant, fields = ?fields, "Input validation configuration updated");
        Ok(self.resolve(tenant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenant() -> TenantDomain {
        TenantDomain::default()
    }

    fn rule(validator: &str, props: &[(&str, &str)]) -> RuleModel {
        RuleModel::new(
            validator,
            props.iter().map(|(k, v)| MappingModel::new(*k, *v)).collect(),
        )
    }

    #[test]
    fn test_defaults_are_valid() {
        for field in FIELDS {
            let config = default_configuration(field).unwrap();
            validate_configuration(&config).unwrap();
        }
        assert!(default_configuration("email").is_none());
    }

    #[tokio::test]
    async fn test_get_returns_defaults() {
        let svc = InMemoryValidationRulesService::new();
        let configs = svc.get_validation_configuration(&tenant()).await.unwrap();

        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].field, PASSWORD_FIELD);
        let length = &configs[0].rules.as_ref().unwrap()[0];
        assert_eq!(length.property(MIN_LENGTH), Some("8"));
        assert_eq!(length.property(MAX_LENGTH), Some("30"));
        assert_eq!(configs[1].field, USERNAME_FIELD);
    }

    #[tokio::test]
    async fn test_update_replaces_only_given_field() {
        let svc = InMemoryValidationRulesService::new();
        let username = ValidationConfigModel::with_reg_ex(
            USERNAME_FIELD,
            vec![rule(JS_REGEX_VALIDATOR, &[(PATTERN, "^[a-z0-9._-]{3,30}$")])],
        );

        let configs = svc
            .update_input_validation_configuration(vec![username.clone()], &tenant())
            .await
            .unwrap();

        assert_eq!(configs[0], default_configuration(PASSWORD_FIELD).unwrap());
        assert_eq!(configs[1], username);
    }

    #[tokio::test]
    async fn test_update_is_tenant_scoped() {
        let svc = InMemoryValidationRulesService::new();
        let other = TenantDomain::parse("acme.io").unwrap();
        let password = ValidationConfigModel::with_rules(
            PASSWORD_FIELD,
            vec![rule(LENGTH_VALIDATOR, &[(MIN_LENGTH, "12"), (MAX_LENGTH, "64")])],
        );
        svc.update_input_validation_configuration(vec![password.clone()], &other)
            .await
            .unwrap();

        assert_eq!(svc.get_validation_configuration(&other).await.unwrap()[0], password);
        assert_eq!(
            svc.get_validation_configuration(&tenant()).await.unwrap()[0],
            default_configuration(PASSWORD_FIELD).unwrap()
        );
    }

    #[tokio::test]
    async fn test_update_rejections() {
        let svc = InMemoryValidationRulesService::new();
        let length = || rule(LENGTH_VALIDATOR, &[(MIN_LENGTH, "3")]);

        let cases = vec![
            (
                vec![ValidationConfigModel::with_rules("email", vec![length()])],
                "INVALID_FIELD",
            ),
            (
                vec![
                    ValidationConfigModel::with_rules(USERNAME_FIELD, vec![length()]),
                    ValidationConfigModel::with_rules(USERNAME_FIELD, vec![length()]),
                ],
                "DUPLICATE_FIELD",
            ),
            (
                vec![ValidationConfigModel {
                    field: USERNAME_FIELD.to_string(),
                    rules: Some(vec![length()]),
                    reg_ex: Some(vec![rule(JS_REGEX_VALIDATOR, &[(PATTERN, ".*")])]),
                }],
                "INVALID_CONFIGURATION",
            ),
            (
                vec![ValidationConfigModel::with_rules(USERNAME_FIELD, vec![])],
                "INVALID_CONFIGURATION",
            ),
            (
                vec![ValidationConfigModel::with_rules(
                    USERNAME_FIELD,
                    vec![rule("PalindromeValidator", &[])],
                )],
                "UNSUPPORTED_VALIDATOR",
            ),
            (
                vec![ValidationConfigModel::with_reg_ex(USERNAME_FIELD, vec![length()])],
                "UNSUPPORTED_VALIDATOR",
            ),
            (
                vec![ValidationConfigModel::with_rules(
                    PASSWORD_FIELD,
                    vec![rule(LENGTH_VALIDATOR, &[("min.size", "3")])],
                )],
                "UNSUPPORTED_PROPERTY",
            ),
            (
                vec![ValidationConfigModel::with_rules(
                    PASSWORD_FIELD,
                    vec![rule(LENGTH_VALIDATOR, &[(MIN_LENGTH, "40"), (MAX_LENGTH, "30")])],
                )],
                "INVALID_PROPERTY_VALUE",
            ),
            (
                vec![ValidationConfigModel::with_reg_ex(
                    USERNAME_FIELD,
                    vec![rule(JS_REGEX_VALIDATOR, &[])],
                )],
                "MISSING_PROPERTY",
            ),
        ];

        for (configs, code) in cases {
            let err = svc
                .update_input_validation_configuration(configs, &tenant())
                .await
                .unwrap_err();
            assert_eq!(err.code(), code);
            assert_eq!(err.http_status_code(), 400);
        }

        // Nothing was stored by the rejected requests
        assert_eq!(
            svc.get_validation_configuration(&tenant()).await.unwrap(),
            vec![
                default_configuration(PASSWORD_FIELD).unwrap(),
                default_configuration(USERNAME_FIELD).unwrap()
            ]
        );
    }

    #[tokio::test]
    async fn test_validators_listed() {
        let svc = InMemoryValidationRulesService::new();
        let validators = svc.get_validators(&tenant()).await.unwrap();
        assert_eq!(validators.len(), validators::catalogue().len());
        assert!(validators.iter().any(|v| v.name == JS_REGEX_VALIDATOR
            && v.validator_type == ValidatorType::Regex));
    }
}
