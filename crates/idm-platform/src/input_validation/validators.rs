//! Validator catalogue
//!
//! The fixed set of validators a field can be configured with, and the
//! checks applied to their property values.

use fancy_regex::Regex;

use crate::details;
use crate::input_validation::model::{PropertyModel, RuleModel, ValidatorModel, ValidatorType};
use crate::usecase::UseCaseError;

pub const MIN_LENGTH: &str = "min.length";
pub const MAX_LENGTH: &str = "max.length";
pub const MIN_UNIQUE_CHARACTER: &str = "min.unique.character";
pub const MAX_CONSECUTIVE_CHARACTER: &str = "max.consecutive.character";
pub const ENABLE_VALIDATOR: &str = "enable.validator";
pub const PATTERN: &str = "regex";

pub const LENGTH_VALIDATOR: &str = "LengthValidator";
pub const NUMERAL_VALIDATOR: &str = "NumeralValidator";
pub const UPPER_CASE_VALIDATOR: &str = "UpperCaseValidator";
pub const LOWER_CASE_VALIDATOR: &str = "LowerCaseValidator";
pub const SPECIAL_CHARACTER_VALIDATOR: &str = "SpecialCharacterValidator";
pub const UNIQUE_CHARACTER_VALIDATOR: &str = "UniqueCharacterValidator";
pub const REPEATED_CHARACTER_VALIDATOR: &str = "RepeatedCharacterValidator";
pub const ALPHANUMERIC_VALIDATOR: &str = "AlphanumericValidator";
pub const EMAIL_FORMAT_VALIDATOR: &str = "EmailFormatValidator";
pub const JS_REGEX_VALIDATOR: &str = "JsRegExValidator";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Integer,
    Boolean,
    Pattern,
}

impl PropertyKind {
    fn type_name(self) -> &'static str {
        match self {
            PropertyKind::Integer => "int",
            PropertyKind::Boolean => "boolean",
            PropertyKind::Pattern => "string",
        }
    }
}

#[derive(Debug)]
pub struct PropertyDef {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub kind: PropertyKind,
}

#[derive(Debug)]
pub struct ValidatorDef {
    pub name: &'static str,
    pub validator_type: ValidatorType,
    pub properties: &'static [PropertyDef],
}

const fn min_length(description: &'static str) -> PropertyDef {
    PropertyDef {
        name: MIN_LENGTH,
        display_name: "Minimum length",
        description,
        kind: PropertyKind::Integer,
    }
}

const ENABLE: PropertyDef = PropertyDef {
    name: ENABLE_VALIDATOR,
    display_name: "Enable validator",
    description: "Whether the validator is applied",
    kind: PropertyKind::Boolean,
};

static CATALOGUE: &[ValidatorDef] = &[
    ValidatorDef {
        name: LENGTH_VALIDATOR,
        validator_type: ValidatorType::Rule,
        properties: &[
            min_length("Minimum number of characters"),
            PropertyDef {
                name: MAX_LENGTH,
                display_name: "Maximum length",
                description: "Maximum number of characters",
                kind: PropertyKind::Integer,
            },
        ],
    },
    ValidatorDef {
        name: NUMERAL_VALIDATOR,
        validator_type: ValidatorType::Rule,
        properties: &[min_length("Minimum number of numeric characters")],
    },
    ValidatorDef {
        name: UPPER_CASE_VALIDATOR,
        validator_type: ValidatorType::Rule,
        properties: &[min_length("Minimum number of upper case characters")],
    },
    ValidatorDef {
        name: LOWER_CASE_VALIDATOR,
        validator_type: ValidatorType::Rule,
        properties: &[min_length("Minimum number of lower case characters")],
    },
    ValidatorDef {
        name: SPECIAL_CHARACTER_VALIDATOR,
        validator_type: ValidatorType::Rule,
        properties: &[min_length("Minimum number of special characters")],
    },
    ValidatorDef {
        name: UNIQUE_CHARACTER_VALIDATOR,
        validator_type: ValidatorType::Rule,
        properties: &[PropertyDef {
            name: MIN_UNIQUE_CHARACTER,
            display_name: "Minimum unique characters",
            description: "Minimum number of distinct characters",
            kind: PropertyKind::Integer,
        }],
    },
    ValidatorDef {
        name: REPEATED_CHARACTER_VALIDATOR,
        validator_type: ValidatorType::Rule,
        properties: &[PropertyDef {
            name: MAX_CONSECUTIVE_CHARACTER,
            display_name: "Maximum consecutive characters",
            description: "Maximum run of the same character",
            kind: PropertyKind::Integer,
        }],
    },
    ValidatorDef {
        name: ALPHANUMERIC_VALIDATOR,
        validator_type: ValidatorType::Rule,
        properties: &[ENABLE],
    },
    ValidatorDef {
        name: EMAIL_FORMAT_VALIDATOR,
        validator_type: ValidatorType::Rule,
        properties: &[ENABLE],
    },
    ValidatorDef {
        name: JS_REGEX_VALIDATOR,
        validator_type: ValidatorType::Regex,
        properties: &[PropertyDef {
            name: PATTERN,
            display_name: "Regex pattern",
            description: "ECMAScript-style pattern the whole value must match, look-around and backreferences included",
            kind: PropertyKind::Pattern,
        }],
    },
];

pub fn catalogue() -> &'static [ValidatorDef] {
    CATALOGUE
}

pub fn find(name: &str) -> Option<&'static ValidatorDef> {
    CATALOGUE.iter().find(|v| v.name == name)
}

impl ValidatorDef {
    pub fn to_model(&self) -> ValidatorModel {
        ValidatorModel {
            name: self.name.to_string(),
            validator_type: self.validator_type,
            properties: self
                .properties
                .iter()
                .zip(1u32..)
                .map(|(p, order)| PropertyModel {
                    name: p.name.to_string(),
                    description: Some(p.description.to_string()),
                    display_name: Some(p.display_name.to_string()),
                    property_type: Some(p.kind.type_name().to_string()),
                    display_order: Some(order),
                })
                .collect(),
        }
    }

    fn property(&self, key: &str) -> Option<&PropertyDef> {
        self.properties.iter().find(|p| p.name == key)
    }

    /// Check a configured rule against this validator's property schema.
    /// A rule must set at least one property.
    pub fn check(&self, field: &str, rule: &RuleModel) -> Result<(), UseCaseError> {
        if rule.properties.is_empty() {
            let expected: Vec<&str> = self.properties.iter().map(|p| p.name).collect();
            return Err(UseCaseError::validation_with_details(
                "MISSING_PROPERTY",
                format!("{} requires one of: {}", self.name, expected.join(", ")),
                details! { "field" => field, "validator" => self.name, "properties" => expected },
            ));
        }

        for mapping in &rule.properties {
            let def = self.property(&mapping.key).ok_or_else(|| {
                UseCaseError::validation_with_details(
                    "UNSUPPORTED_PROPERTY",
                    format!(
                        "Property '{}' is not supported by {}",
                        mapping.key, self.name
                    ),
                    details! { "field" => field, "validator" => self.name, "property" => &mapping.key },
                )
            })?;
            check_value(field, self.name, def, &mapping.value)?;
        }

        if let (Some(min), Some(max)) = (rule.property(MIN_LENGTH), rule.property(MAX_LENGTH)) {
            let (min, max) = (min.trim().parse::<u32>(), max.trim().parse::<u32>());
            if let (Ok(min), Ok(max)) = (min, max) {
                if min > max {
                    return Err(UseCaseError::validation_with_details(
                        "INVALID_PROPERTY_VALUE",
                        format!("{} cannot be greater than {}", MIN_LENGTH, MAX_LENGTH),
                        details! { "field" => field, "validator" => self.name },
                    ));
                }
            }
        }

        Ok(())
    }
}

fn check_value(
    field: &str,
    validator: &str,
    def: &PropertyDef,
    value: &str,
) -> Result<(), UseCaseError> {
    let problem = match def.kind {
        PropertyKind::Integer => value
            .trim()
            .parse::<u32>()
            .err()
            .map(|_| "must be a non-negative integer".to_string()),
        PropertyKind::Boolean => match value.trim() {
            "true" | "false" => None,
            _ => Some("must be 'true' or 'false'".to_string()),
        },
        PropertyKind::Pattern => Regex::new(value)
            .err()
            .map(|e| format!("is not a valid pattern: {}", e)),
    };

    match problem {
        None => Ok(()),
        Some(problem) => Err(UseCaseError::validation_with_details(
            "INVALID_PROPERTY_VALUE",
            format!("Property '{}' of {} {}", def.name, validator, problem),
            details! { "field" => field, "validator" => validator, "property" => def.name, "value" => value },
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input_validation::model::MappingModel;

    fn rule(validator: &str, props: &[(&str, &str)]) -> RuleModel {
        RuleModel::new(
            validator,
            props.iter().map(|(k, v)| MappingModel::new(*k, *v)).collect(),
        )
    }

    #[test]
    fn test_catalogue_names_are_unique() {
        let mut names: Vec<_> = catalogue().iter().map(|v| v.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), catalogue().len());
    }

    #[test]
    fn test_only_regex_validator_is_regex_type() {
        let regex: Vec<_> = catalogue()
            .iter()
            .filter(|v| v.validator_type == ValidatorType::Regex)
            .map(|v| v.name)
            .collect();
        assert_eq!(regex, vec![JS_REGEX_VALIDATOR]);
    }

    #[test]
    fn test_to_model_orders_properties() {
        let model = find(LENGTH_VALIDATOR).unwrap().to_model();
        assert_eq!(model.properties[0].name, MIN_LENGTH);
        assert_eq!(model.properties[0].display_order, Some(1));
        assert_eq!(model.properties[1].name, MAX_LENGTH);
        assert_eq!(model.properties[1].property_type.as_deref(), Some("int"));
    }

    #[test]
    fn test_length_bounds() {
        let length = find(LENGTH_VALIDATOR).unwrap();
        assert!(length
            .check("password", &rule(LENGTH_VALIDATOR, &[(MIN_LENGTH, "8"), (MAX_LENGTH, "8")]))
            .is_ok());

        let err = length
            .check("password", &rule(LENGTH_VALIDATOR, &[(MIN_LENGTH, "9"), (MAX_LENGTH, "8")]))
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_PROPERTY_VALUE");
    }

    #[test]
    fn test_property_values() {
        let numeral = find(NUMERAL_VALIDATOR).unwrap();
        let err = numeral
            .check("password", &rule(NUMERAL_VALIDATOR, &[(MIN_LENGTH, "-1")]))
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_PROPERTY_VALUE");

        let email = find(EMAIL_FORMAT_VALIDATOR).unwrap();
        assert!(email
            .check("username", &rule(EMAIL_FORMAT_VALIDATOR, &[(ENABLE_VALIDATOR, "true")]))
            .is_ok());
        assert!(email
            .check("username", &rule(EMAIL_FORMAT_VALIDATOR, &[(ENABLE_VALIDATOR, "yes")]))
            .is_err());
    }

    #[test]
    fn test_unknown_property() {
        let err = find(UPPER_CASE_VALIDATOR)
            .unwrap()
            .check("password", &rule(UPPER_CASE_VALIDATOR, &[(MAX_LENGTH, "3")]))
            .unwrap_err();
        assert_eq!(err.code(), "UNSUPPORTED_PROPERTY");
    }

    #[test]
    fn test_regex_must_compile() {
        let js = find(JS_REGEX_VALIDATOR).unwrap();
        assert!(js.check("username", &rule(JS_REGEX_VALIDATOR, &[(PATTERN, "^[a-z0-9]{3,}$")])).is_ok());

        let err = js
            .check("username", &rule(JS_REGEX_VALIDATOR, &[(PATTERN, "([a-z")]))
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_PROPERTY_VALUE");
    }

    #[test]
    fn test_regex_accepts_look_around() {
        let js = find(JS_REGEX_VALIDATOR).unwrap();
        for pattern in [r"^(?=.*[A-Z])(?=.*\d).{8,}$", r"^(?!admin$)[a-z]+$", r"^(\w)\1*$"] {
            assert!(
                js.check("password", &rule(JS_REGEX_VALIDATOR, &[(PATTERN, pattern)])).is_ok(),
                "{}",
                pattern
            );
        }
    }

    #[test]
    fn test_rule_without_properties_rejected() {
        let err = find(JS_REGEX_VALIDATOR)
            .unwrap()
            .check("username", &rule(JS_REGEX_VALIDATOR, &[]))
            .unwrap_err();
        assert_eq!(err.code(), "MISSING_PROPERTY");
        assert_eq!(err.http_status_code(), 400);

        let err = find(LENGTH_VALIDATOR)
            .unwrap()
            .check("password", &rule(LENGTH_VALIDATOR, &[]))
            .unwrap_err();
        assert_eq!(err.code(), "MISSING_PROPERTY");
        assert_eq!(
            err.details().get("properties"),
            Some(&serde_json::json!([MIN_LENGTH, MAX_LENGTH]))
        );

        // One bound is enough
        assert!(find(LENGTH_VALIDATOR)
            .unwrap()
            .check("password", &rule(LENGTH_VALIDATOR, &[(MAX_LENGTH, "30")]))
            .is_ok());
    }
}
