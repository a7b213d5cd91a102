//! Shared infrastructure used by every aggregate's API

pub mod api_common;
pub mod error;
pub mod health_api;
pub mod middleware;
pub mod patch;
pub mod validation;
