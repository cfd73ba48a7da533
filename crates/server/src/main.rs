mod api;
mod bootstrap;
mod health;

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::http::HeaderValue;
use axum::Router;
use leadbot_core::config::{AppConfig, LoadOptions, ServerConfig};
use tokio::sync::Notify;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

fn init_logging(config: &AppConfig) {
    use leadbot_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Logging has to be up before bootstrap emits its events.
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;
    let router = app_router(&app);

    let address = app.config.server.socket_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        "leadbot-server listening"
    );

    let shutdown = Arc::new(Notify::new());
    let server = {
        let shutdown = shutdown.clone();
        tokio::spawn(
            axum::serve(listener, router)
                .with_graceful_shutdown(async move { shutdown.notified().await })
                .into_future(),
        )
    };

    wait_for_shutdown().await?;
    info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "leadbot-server draining in-flight requests"
    );
    shutdown.notify_one();

    let grace = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    match tokio::time::timeout(grace, server).await {
        Ok(joined) => joined??,
        Err(_) => warn!(
            event_name = "system.server.drain_timeout",
            correlation_id = "shutdown",
            grace_secs = grace.as_secs(),
            "requests still running after the shutdown grace period"
        ),
    }

    app.db_pool.close().await;
    info!(
        event_name = "system.server.stopped",
        correlation_id = "shutdown",
        "leadbot-server stopped"
    );
    Ok(())
}

fn app_router(app: &bootstrap::Application) -> Router {
    api::router(app.api_state())
        .merge(health::router(app.db_pool.clone()))
        .layer(cors_layer(&app.config.server))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if server.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins = server
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(
                    event_name = "system.server.cors_origin_ignored",
                    correlation_id = "bootstrap",
                    origin = %origin,
                    "ignoring CORS origin that is not a valid header value"
                );
                None
            }
        })
        .collect::<Vec<_>>();
    layer.allow_origin(AllowOrigin::list(origins))
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
