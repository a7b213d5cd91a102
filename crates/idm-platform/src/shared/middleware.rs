//! Tenant Resolution Middleware
//!
//! `TenantLayer` places the deployment's tenant settings into every request;
//! the `TenantContext` extractor turns the request's tenant header (or the
//! default tenant when the header is absent) into an [`ExecutionContext`].

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderName},
    response::Response,
};
use idm_common::TenantDomain;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::shared::error::PlatformError;
use crate::usecase::ExecutionContext;

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// How requests name their tenant.
#[derive(Debug, Clone)]
pub struct TenantSettings {
    pub default_domain: TenantDomain,
    pub header: HeaderName,
}

impl TenantSettings {
    pub fn new(default_domain: TenantDomain, header: &str) -> Result<Self, PlatformError> {
        let header = HeaderName::from_bytes(header.trim().as_bytes()).map_err(|e| {
            PlatformError::configuration(format!("invalid tenant header '{}': {}", header, e))
        })?;
        Ok(Self { default_domain, header })
    }
}

impl Default for TenantSettings {
    fn default() -> Self {
        Self {
            default_domain: TenantDomain::default(),
            header: HeaderName::from_static("x-tenant-domain"),
        }
    }
}

/// Resolved tenant plus tracing IDs for the current request.
pub struct TenantContext(pub ExecutionContext);

impl std::ops::Deref for TenantContext {
    type Target = ExecutionContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TenantContext {
    pub fn into_inner(self) -> ExecutionContext {
        self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = PlatformError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let settings = parts
            .extensions
            .get::<TenantSettings>()
            .ok_or_else(|| PlatformError::configuration("Tenant resolution not configured"))?;

        let tenant = match parts.headers.get(&settings.header) {
            Some(value) => {
                let raw = value.to_str().map_err(|_| {
                    PlatformError::validation("INVALID_TENANT", "Tenant header is not valid text")
                })?;
                TenantDomain::parse(raw)?
            }
            None => settings.default_domain.clone(),
        };

        let correlation_id = parts
            .headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let ctx = match correlation_id {
            Some(id) => ExecutionContext::with_correlation(tenant, id),
            None => ExecutionContext::for_tenant(tenant),
        };

        Ok(TenantContext(ctx))
    }
}

/// Middleware layer that injects [`TenantSettings`] into request extensions
#[derive(Clone)]
pub struct TenantLayer {
    settings: TenantSettings,
}

impl TenantLayer {
    pub fn new(settings: TenantSettings) -> Self {
        Self { settings }
    }
}

impl<S> Layer<S> for TenantLayer {
    type Service = TenantMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TenantMiddleware {
            inner,
            settings: self.settings.clone(),
        }
    }
}

#[derive(Clone)]
pub struct TenantMiddleware<S> {
    inner: S,
    settings: TenantSettings,
}

impl<S, B> Service<axum::http::Request<B>> for TenantMiddleware<S>
where
    S: Service<axum::http::Request<B>, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        req.extensions_mut().insert(self.settings.clone());

        let future = self.inner.call(req);
        Box::pin(future)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn resolve(req: Request<()>) -> Result<TenantContext, PlatformError> {
        let (mut parts, _) = req.into_parts();
        TenantContext::from_request_parts(&mut parts, &()).await
    }

    fn with_settings(builder: axum::http::request::Builder) -> axum::http::request::Builder {
        builder.extension(TenantSettings::default())
    }

    #[tokio::test]
    async fn test_missing_header_uses_default_tenant() {
        let req = with_settings(Request::builder()).body(()).unwrap();
        let ctx = resolve(req).await.unwrap();
        assert!(ctx.tenant_domain.is_default());
        assert_eq!(ctx.execution_id, ctx.correlation_id);
    }

    #[tokio::test]
    async fn test_header_selects_tenant_and_correlation() {
        let req = with_settings(Request::builder())
            .header("X-Tenant-Domain", "Acme.IO")
            .header("X-Correlation-ID", "corr-1")
            .body(())
            .unwrap();
        let ctx = resolve(req).await.unwrap();
        assert_eq!(ctx.tenant_domain.as_str(), "acme.io");
        assert_eq!(ctx.correlation_id, "corr-1");
    }

    #[tokio::test]
    async fn test_invalid_tenant_is_rejected() {
        let req = with_settings(Request::builder())
            .header("X-Tenant-Domain", "not a tenant")
            .body(())
            .unwrap();
        let err = resolve(req).await.err().unwrap();
        assert_eq!(err.code(), "INVALID_TENANT");
    }

    #[tokio::test]
    async fn test_missing_settings_is_server_error() {
        let req = Request::builder().body(()).unwrap();
        let err = resolve(req).await.err().unwrap();
        assert!(err.status().is_server_error());
    }

    #[test]
    fn test_settings_reject_bad_header_name() {
        assert!(TenantSettings::new(TenantDomain::default(), "bad header").is_err());
        let settings = TenantSettings::new(TenantDomain::default(), "X-Org").unwrap();
        assert_eq!(settings.header.as_str(), "x-org");
    }
}
