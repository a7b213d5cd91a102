//! Execution Context
//!
//! Context for a use case execution. Carries the tenant and tracing IDs
//! through the execution of a use case so that log lines emitted by the
//! use case can be joined with the request that triggered it.

use chrono::{DateTime, Utc};
use idm_common::TenantDomain;
use uuid::Uuid;

/// Context for a use case execution.
///
/// - `execution_id` is unique per use case invocation
/// - `correlation_id` is taken from the caller (`X-Correlation-ID`) when
///   present, otherwise it starts out equal to the execution ID
/// - `tenant_domain` scopes every repository access
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub execution_id: String,
    pub correlation_id: String,
    pub tenant_domain: TenantDomain,
    pub initiated_at: DateTime<Utc>,
}

impl ExecutionContext {
    /// Fresh context for a tenant; correlation starts as the execution ID.
    pub fn for_tenant(tenant_domain: TenantDomain) -> Self {
        let exec_id = new_execution_id();
        Self {
            execution_id: exec_id.clone(),
            correlation_id: exec_id,
            tenant_domain,
            initiated_at: Utc::now(),
        }
    }

    /// Context that keeps a correlation ID handed over by an upstream system.
    pub fn with_correlation(
        tenant_domain: TenantDomain,
        correlation_id: impl Into<String>,
    ) -> Self {
        Self {
            execution_id: new_execution_id(),
            correlation_id: correlation_id.into(),
            tenant_domain,
            initiated_at: Utc::now(),
        }
    }

    pub fn tenant(&self) -> &TenantDomain {
        &self.tenant_domain
    }
}

fn new_execution_id() -> String {
    format!("exec-{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_tenant_correlates_to_itself() {
        let ctx = ExecutionContext::for_tenant(TenantDomain::default());
        assert!(ctx.execution_id.starts_with("exec-"));
        assert_eq!(ctx.execution_id, ctx.correlation_id);
        assert!(ctx.tenant().is_default());
    }

    #[test]
    fn test_with_correlation_keeps_upstream_id() {
        let tenant = TenantDomain::parse("acme.io").unwrap();
        let ctx = ExecutionContext::with_correlation(tenant.clone(), "req-42");
        assert_eq!(ctx.correlation_id, "req-42");
        assert_ne!(ctx.execution_id, ctx.correlation_id);
        assert_eq!(ctx.tenant_domain, tenant);
    }

    #[test]
    fn test_execution_ids_are_unique() {
        let a = ExecutionContext::for_tenant(TenantDomain::default());
        let b = ExecutionContext::for_tenant(TenantDomain::default());
        assert_ne!(a.execution_id, b.execution_id);
    }
}
