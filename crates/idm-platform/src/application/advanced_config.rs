//! Advanced application configuration documents
//!
//! The same shape is used as a patch (every field optional, absent = keep)
//! and as the read model returned by `GET /applications/{id}/advanced-configs`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::entity::Application;

/// Advanced configuration of an application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedApplicationConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saas: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discoverable_by_end_users: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<Certificate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_login_consent: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_logout_consent: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_authenticated_idp_list: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_authorization: Option<bool>,

    /// Not supported; a non-empty list is rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_sp_properties: Option<Vec<AdditionalSpProperty>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub externalized_consent_page: Option<ExternalizedConsentPageConfiguration>,
}

/// Certificate used to verify requests signed by the application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "PEM")]
    pub certificate_type: Option<CertificateType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CertificateType {
    #[serde(rename = "PEM")]
    Pem,
    #[serde(rename = "JWKS")]
    Jwks,
    /// Any other tag; accepted and ignored by the merge
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AdditionalSpProperty {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExternalizedConsentPageConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_page_url: Option<String>,
}

impl Certificate {
    pub fn pem(value: impl Into<String>) -> Self {
        Self {
            certificate_type: Some(CertificateType::Pem),
            value: Some(value.into()),
        }
    }

    pub fn jwks(uri: impl Into<String>) -> Self {
        Self {
            certificate_type: Some(CertificateType::Jwks),
            value: Some(uri.into()),
        }
    }
}

impl From<&Application> for AdvancedApplicationConfiguration {
    fn from(app: &Application) -> Self {
        let certificate = match (&app.certificate_content, &app.jwks_uri) {
            (Some(content), _) => Some(Certificate::pem(content.clone())),
            (None, Some(uri)) => Some(Certificate::jwks(uri.clone())),
            (None, None) => None,
        };

        let auth = app.auth_config.clone().unwrap_or_default();
        let consent = auth.consent_page.unwrap_or_default();

        Self {
            saas: Some(app.saas_app),
            discoverable_by_end_users: Some(app.discoverable),
            certificate,
            skip_login_consent: Some(auth.skip_consent),
            skip_logout_consent: Some(auth.skip_logout_consent),
            return_authenticated_idp_list: Some(auth.always_send_back_authenticated_idps),
            enable_authorization: Some(auth.enable_authorization),
            additional_sp_properties: Some(Vec::new()),
            externalized_consent_page: Some(ExternalizedConsentPageConfiguration {
                enabled: Some(consent.enabled),
                consent_page_url: consent.consent_page_url,
            }),
        }
    }
}
