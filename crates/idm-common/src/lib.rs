//! IDM Common
//!
//! Types shared by every IDM service crate:
//! - [`TenantDomain`] - validated tenant identifier used to partition configuration
//! - [`logging`] - structured `tracing` subscriber setup

pub mod logging;
pub mod tenant;

pub use logging::{init_logging, LogFormat};
pub use tenant::{TenantDomain, TenantError, DEFAULT_TENANT_DOMAIN};
