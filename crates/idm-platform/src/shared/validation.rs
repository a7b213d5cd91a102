//! Field validation shared by the aggregates

use crate::details;
use crate::usecase::UseCaseError;

/// URL fields such as `accessUrl` and `imageUrl` must be absolute URLs.
pub fn validate_absolute_url(field: &str, value: &str) -> Result<(), UseCaseError> {
    match url::Url::parse(value) {
        Ok(parsed) if !parsed.cannot_be_a_base() => Ok(()),
        _ => Err(UseCaseError::validation_with_details(
            "INVALID_URL",
            format!("{} must be an absolute URL", field),
            details! { "field" => field, "value" => value },
        )),
    }
}
