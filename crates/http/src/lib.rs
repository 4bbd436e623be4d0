//! HTTP server facade with Axum, error handling, and OpenAPI support.

use std::future::Future;

use anyhow::Context;
use axum::{http::HeaderValue, routing::get, Json, Router};
use serde_json::json;
use tower_http::cors::AllowOrigin;

use shelf_kernel::{settings::Settings, ModuleRegistry};

pub mod error;
pub mod router;

use router::RouterBuilder;

/// Start the HTTP server and serve until `shutdown` resolves
pub async fn start_server<F>(
    registry: &ModuleRegistry,
    settings: &Settings,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tracing::info!(
        "starting HTTP server on {}:{}",
        settings.server.host,
        settings.server.port
    );

    let app = build_router(registry, settings).context("failed to build HTTP router")?;

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", settings.server.host, settings.server.port))
            .await
            .context("failed to bind to address")?;

    tracing::info!(
        "HTTP server listening on http://{}",
        listener.local_addr().context("listener has no local address")?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    Ok(())
}

/// Build the main HTTP router with all module routes mounted
pub fn build_router(registry: &ModuleRegistry, settings: &Settings) -> anyhow::Result<Router> {
    let mut router_builder = RouterBuilder::new().route("/health", get(health_check));

    for module in registry.modules() {
        let mount_path = module.mount_path();
        tracing::info!(
            module = module.name(),
            "mounting module routes under {}",
            mount_path
        );
        router_builder = router_builder.mount_module(&mount_path, module.routes());
    }

    let cors_origin = parse_cors_origin(&settings.server.cors_origin)?;

    // Middleware last so it wraps every route above
    Ok(router_builder
        .with_openapi(registry)
        .with_fallback()
        .with_security_headers()
        .with_compression()
        .with_cors(cors_origin)
        .with_timeout(settings.server.request_timeout_ms)
        .with_request_id()
        .with_tracing()
        .build())
}

/// `*` allows any origin; otherwise a comma-separated list of exact origins.
pub fn parse_cors_origin(value: &str) -> anyhow::Result<AllowOrigin> {
    let value = value.trim();
    if value.is_empty() || value == "*" {
        return Ok(AllowOrigin::any());
    }

    let origins = value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin)
                .with_context(|| format!("invalid CORS origin '{}'", origin))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(AllowOrigin::list(origins))
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}
