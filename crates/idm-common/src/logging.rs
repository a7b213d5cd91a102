//! Structured Logging Configuration
//!
//! Two output modes:
//! - JSON for production log aggregation (`LogFormat::Json`)
//! - Human-readable text for development (`LogFormat::Text`, default)
//!
//! `RUST_LOG` always wins over the configured level, so a single deployment
//! can be turned up to `debug` without touching the config file.
//!
//! # Usage
//!
//! ```rust,ignore
//! use idm_common::logging::{init_logging, LogFormat};
//!
//! fn main() {
//!     init_logging("idm-server", LogFormat::parse("json"), "info");
//!     tracing::info!(tenant = "acme.io", "Application created");
//! }
//! ```

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// "json" (any case) selects JSON output, anything else falls back to text.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Build the level filter: `RUST_LOG` if set and valid, otherwise `default_level`.
pub fn build_env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber.
///
/// Safe to call more than once (later calls are ignored), which keeps
/// integration tests that boot several servers from panicking.
pub fn init_logging(service_name: &str, format: LogFormat, default_level: &str) {
    let env_filter = build_env_filter(default_level);

    let installed = match format {
        LogFormat::Json => init_json_logging(env_filter),
        LogFormat::Text => init_text_logging(env_filter),
    };

    if installed {
        tracing::debug!(service = service_name, ?format, "Logging initialized");
    }
}

fn init_json_logging(env_filter: EnvFilter) -> bool {
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(false)
                .with_target(true)
                .flatten_event(true)
                .with_span_events(FmtSpan::CLOSE),
        )
        .try_init()
        .is_ok()
}

fn init_text_logging(env_filter: EnvFilter) -> bool {
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(true),
        )
        .try_init()
        .is_ok()
}
