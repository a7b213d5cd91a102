//! Input validation wire models

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single `key = value` validator property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MappingModel {
    #[schema(example = "min.length")]
    pub key: String,
    #[schema(example = "8")]
    pub value: String,
}

impl MappingModel {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A validator applied to a field, with its configured properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RuleModel {
    #[schema(example = "LengthValidator")]
    pub validator: String,
    #[serde(default)]
    pub properties: Vec<MappingModel>,
}

impl RuleModel {
    pub fn new(validator: impl Into<String>, properties: Vec<MappingModel>) -> Self {
        Self {
            validator: validator.into(),
            properties,
        }
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }
}

/// Validation configuration of one field.
///
/// A field is validated either by a set of rule validators or by regex
/// validators, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationConfigModel {
    #[schema(example = "password")]
    pub field: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<RuleModel>>,

    #[serde(default, rename = "regEx", skip_serializing_if = "Option::is_none")]
    pub reg_ex: Option<Vec<RuleModel>>,
}

impl ValidationConfigModel {
    pub fn with_rules(field: impl Into<String>, rules: Vec<RuleModel>) -> Self {
        Self {
            field: field.into(),
            rules: Some(rules),
            reg_ex: None,
        }
    }

    pub fn with_reg_ex(field: impl Into<String>, reg_ex: Vec<RuleModel>) -> Self {
        Self {
            field: field.into(),
            rules: None,
            reg_ex: Some(reg_ex),
        }
    }
}

/// Kind of validator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidatorType {
    Rule,
    Regex,
}

/// Description of a configurable validator property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyModel {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<u32>,
}

/// A validator available for field configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidatorModel {
    pub name: String,
    #[serde(rename = "type")]
    pub validator_type: ValidatorType,
    pub properties: Vec<PropertyModel>,
}
