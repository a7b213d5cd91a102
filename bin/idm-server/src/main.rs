//! IDM Server
//!
//! REST APIs for identity server configuration:
//! - Applications, including advanced configurations
//! - Identity providers and JIT provisioning
//! - Input validation rules
//!
//! ## Configuration
//!
//! Settings come from a TOML file (first CLI argument, `IDM_CONFIG`, or one
//! of the standard paths) with environment overrides:
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `IDM_HTTP_HOST` | `0.0.0.0` | Bind address |
//! | `IDM_HTTP_PORT` | `8080` | HTTP port |
//! | `IDM_CORS_ORIGINS` | - | Comma separated allowed origins (any when unset) |
//! | `IDM_API_BASE_PATH` | `/api/server/v1` | Prefix of every API route |
//! | `IDM_SWAGGER_ENABLED` | `true` | Serve Swagger UI at `/swagger-ui` |
//! | `IDM_DEFAULT_TENANT` | `default` | Tenant used when the request names none |
//! | `IDM_TENANT_HEADER` | `X-Tenant-Domain` | Header carrying the tenant domain |
//! | `LOG_FORMAT` | `text` | `text` or `json` |
//! | `IDM_LOG_LEVEL` | `info` | Log level when `RUST_LOG` is unset |
//! | `IDM_DEV_MODE` | `false` | Seed sample data on startup |

use std::sync::Arc;

use anyhow::Result;
use axum::http::HeaderValue;
use axum::Router;
use tokio::{net::TcpListener, signal};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use idm_config::{AppConfig, ConfigLoader};
use idm_platform::idp::IdentityProviderService;
use idm_platform::seed::DevDataSeeder;
use idm_platform::{
    applications_router, health_router, identity_providers_router, validation_rules_router,
    ApplicationRepository, ApplicationsState, HealthState, IdentityProviderRepository,
    IdentityProvidersState, InMemoryApplicationRepository, InMemoryIdentityProviderRepository,
    InMemoryValidationRulesService, TenantLayer, TenantSettings, ValidationRulesState,
};

#[tokio::main]
async fn main() -> Result<()> {
    let loader = match std::env::args().nth(1) {
        Some(path) => ConfigLoader::with_path(path),
        None => ConfigLoader::new(),
    };
    let config = loader.load()?;
    config.validate()?;

    idm_common::init_logging(
        "idm-server",
        config.logging.log_format(),
        &config.logging.level,
    );

    info!("Starting IDM Server");

    let default_tenant = config.tenant.default_tenant()?;
    let tenant_settings = TenantSettings::new(default_tenant.clone(), &config.tenant.header)?;

    // Repositories and services
    let application_repo: Arc<dyn ApplicationRepository> =
        Arc::new(InMemoryApplicationRepository::new());
    let idp_repo: Arc<dyn IdentityProviderRepository> =
        Arc::new(InMemoryIdentityProviderRepository::new());
    let idp_service = Arc::new(IdentityProviderService::new(idp_repo.clone()));
    let rules_service = Arc::new(InMemoryValidationRulesService::new());

    if config.dev_mode {
        let seeder = DevDataSeeder::new(application_repo.clone(), idp_repo.clone());
        if let Err(e) = seeder.seed(&default_tenant).await {
            warn!("Dev data seeding skipped: {}", e);
        }
    }

    let base = config.api.base_path.trim_end_matches('/');
    let applications_path = format!("{}/applications", base);
    let idps_path = format!("{}/identity-providers", base);
    let rules_path = format!("{}/validation-rules", base);

    let applications_state = ApplicationsState::new(application_repo, &applications_path);
    let idps_state = IdentityProvidersState::new(idp_service, &idps_path);
    let rules_state = ValidationRulesState::new(rules_service);

    // Build API router using OpenApiRouter for auto-collected OpenAPI paths
    let (router, mut openapi) = OpenApiRouter::new()
        .nest(&applications_path, applications_router(applications_state))
        .nest(&idps_path, identity_providers_router(idps_state))
        .nest(&rules_path, validation_rules_router(rules_state))
        .split_for_parts();

    openapi.info.title = "IDM Configuration API".to_string();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    openapi.info.description =
        Some("Application, identity provider and input validation management".to_string());

    let health_state = HealthState::new(Some(env!("CARGO_PKG_VERSION").to_string()));

    let mut app = Router::new()
        .merge(router)
        .layer(TenantLayer::new(tenant_settings))
        .nest("/health", health_router(health_state.clone()));

    if config.api.swagger_enabled {
        app = app.merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", openapi));
        info!("Swagger UI available at /swagger-ui");
    }

    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config)?);

    let addr = format!("{}:{}", config.http.host, config.http.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("API server listening on http://{}{}", addr, base);

    health_state.set_ready();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("IDM Server shutdown complete");
    Ok(())
}

fn cors_layer(config: &AppConfig) -> Result<CorsLayer> {
    let origins = &config.http.cors_origins;
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = origins
        .iter()
        .map(|origin| HeaderValue::from_str(origin))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received...");
}
