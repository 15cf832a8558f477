//! Subledger Server
//!
//! Production server for the subscriptions REST API.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SUBLEDGER_CONFIG` | - | Path to a TOML config file |
//! | `SUBLEDGER_HTTP_PORT` | `8080` | HTTP API port |
//! | `SUBLEDGER_HTTP_HOST` | `0.0.0.0` | Bind address |
//! | `SUBLEDGER_DATABASE_URL` | `postgres://localhost:5432/subledger` | PostgreSQL DSN |
//! | `RUST_LOG` | `info` | Log level |
//! | `LOG_FORMAT` | text | Set to `json` for JSON logs |

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{http::HeaderValue, response::Json, routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use sl_config::AppConfig;
use sl_platform::subscription::{
    subscriptions_router, PostgresSubscriptionStore, SubscriptionService, SubscriptionsState,
};

#[tokio::main]
async fn main() -> Result<()> {
    sl_common::logging::init_logging("sl-server");

    info!("Starting Subledger Server");

    let config = AppConfig::load()?;

    info!(url = %config.database.url, "Connecting to PostgreSQL");
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.database.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.database.max_lifetime_secs))
        .connect(&config.database.url)
        .await?;

    let store = PostgresSubscriptionStore::new(pool);
    store.init_schema().await?;

    let service = Arc::new(SubscriptionService::new(Arc::new(store)));
    let state = SubscriptionsState { service };

    let (router, mut openapi) = OpenApiRouter::new()
        .nest("/subscriptions", subscriptions_router(state))
        .split_for_parts();

    openapi.info.title = "Subledger API".to_string();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    openapi.info.description =
        Some("REST service for aggregating per-user online subscriptions".to_string());

    let app = Router::new()
        .merge(router)
        .route("/health", get(health_handler))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.http.cors_origins));

    let addr = format!("{}:{}", config.http.host, config.http.port);
    info!("API server listening on http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Subledger Server shutdown complete");
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        layer.allow_origin(parsed)
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "UP",
        "version": env!("CARGO_PKG_VERSION")
    }))
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
}
