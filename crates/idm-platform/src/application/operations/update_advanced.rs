//! Advanced configuration merge
//!
//! Applies an [`AdvancedApplicationConfiguration`] patch onto an
//! [`Application`] in place. Field order:
//!
//! 1. reject non-empty `additionalSpProperties` before touching anything
//! 2. `saas`, `discoverableByEndUsers`
//! 3. auth config flags (auth config created on demand)
//! 4. externalized consent page (https only)
//! 5. certificate (`PEM` and `JWKS` are mutually exclusive)
//!
//! The merge stops at the first rejected field; fields applied before it
//! stay applied. Callers that need all-or-nothing semantics merge into a
//! clone and keep it only on success (see `PatchApplicationUseCase`).

use crate::details;
use crate::shared::patch::{set_if_present, UpdateFunction};
use crate::usecase::UseCaseError;

use crate::application::advanced_config::{
    AdditionalSpProperty, AdvancedApplicationConfiguration, Certificate, CertificateType,
    ExternalizedConsentPageConfiguration,
};
use crate::application::entity::{Application, AuthConfig};

pub const ADDITIONAL_SP_PROP_NOT_SUPPORTED: &str = "ADDITIONAL_SP_PROP_NOT_SUPPORTED";
pub const INVALID_CONSENT_PAGE_URL: &str = "INVALID_CONSENT_PAGE_URL";

const ADDITIONAL_SP_PROP_DESCRIPTION: &str = "Additional SP properties are not supported.";
const INVALID_CONSENT_PAGE_URL_MESSAGE: &str =
    "Invalid External Consent Page URL is found. Only https urls are allowed.";

/// Merges advanced configuration patches into applications.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateAdvancedConfigurations;

impl UpdateFunction<Application, AdvancedApplicationConfiguration> for UpdateAdvancedConfigurations {
    fn apply(
        &self,
        application: &mut Application,
        patch: Option<&AdvancedApplicationConfiguration>,
    ) -> Result<(), UseCaseError> {
        let Some(patch) = patch else {
            return Ok(());
        };

        reject_additional_sp_properties(patch.additional_sp_properties.as_deref())?;

        set_if_present(patch.saas, |v| application.saas_app = v);
        set_if_present(patch.discoverable_by_end_users, |v| application.discoverable = v);

        let auth = application.auth_config_mut();
        set_if_present(patch.skip_login_consent, |v| auth.skip_consent = v);
        set_if_present(patch.skip_logout_consent, |v| auth.skip_logout_consent = v);
        set_if_present(patch.return_authenticated_idp_list, |v| {
            auth.always_send_back_authenticated_idps = v
        });
        set_if_present(patch.enable_authorization, |v| auth.enable_authorization = v);

        update_consent_page(patch.externalized_consent_page.as_ref(), auth)?;
        update_certificate(patch.certificate.as_ref(), application);

        Ok(())
    }
}

fn reject_additional_sp_properties(
    properties: Option<&[AdditionalSpProperty]>,
) -> Result<(), UseCaseError> {
    match properties {
        Some(props) if !props.is_empty() => {
            tracing::warn!(count = props.len(), "Rejected additional SP properties");
            Err(UseCaseError::validation_with_details(
                ADDITIONAL_SP_PROP_NOT_SUPPORTED,
                "Unsupported feature.",
                details! { "description" => ADDITIONAL_SP_PROP_DESCRIPTION },
            ))
        }
        _ => Ok(()),
    }
}

fn update_consent_page(
    patch: Option<&ExternalizedConsentPageConfiguration>,
    auth: &mut AuthConfig,
) -> Result<(), UseCaseError> {
    // Created even when the patch has no consent section
    let consent = auth.consent_page_mut();

    let Some(patch) = patch else {
        return Ok(());
    };

    if let Some(url) = patch.consent_page_url.as_deref().filter(|u| !u.is_empty()) {
        validate_consent_page_url(url)?;
    }

    set_if_present(patch.enabled, |v| consent.enabled = v);
    set_if_present(patch.consent_page_url.clone(), |v| consent.consent_page_url = Some(v));

    Ok(())
}

fn validate_consent_page_url(candidate: &str) -> Result<(), UseCaseError> {
    match url::Url::parse(candidate) {
        Ok(parsed) if parsed.scheme() == "https" => Ok(()),
        _ => {
            tracing::warn!(url = candidate, "Rejected consent page URL");
            Err(UseCaseError::validation_with_details(
                INVALID_CONSENT_PAGE_URL,
                INVALID_CONSENT_PAGE_URL_MESSAGE,
                details! { "consentPageUrl" => candidate },
            ))
        }
    }
}

fn update_certificate(certificate: Option<&Certificate>, application: &mut Application) {
    let Some(certificate) = certificate else {
        return;
    };

    match certificate.certificate_type {
        Some(CertificateType::Pem) => {
            set_if_present(certificate.value.clone(), |v| {
                application.certificate_content = Some(v)
            });
            application.jwks_uri = None;
        }
        Some(CertificateType::Jwks) => {
            set_if_present(certificate.value.clone(), |v| application.jwks_uri = Some(v));
            application.certificate_content = None;
        }
        Some(CertificateType::Unsupported) | None => {}
    }
}
