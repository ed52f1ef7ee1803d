//! Commerce Bridge server binary.
//!
//! Boot sequence: tracing, configuration load + validation, provider
//! selection, then the axum server with the webhook and health routes.

use std::time::Duration;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commerce_bridge::adapters::http::{health, webhook_routes, HealthAppState, WebhookAppState};
use commerce_bridge::config::AppConfig;
use commerce_bridge::providers::select_providers;

#[tokio::main]
async fn main() {
    let config = AppConfig::load().expect("Failed to load configuration");

    init_tracing(&config);

    config.validate().expect("Invalid configuration");

    let providers = select_providers(&config)
        .await
        .expect("Provider initialization failed");

    let webhook_state = WebhookAppState {
        payment_gateway: providers.payment.clone(),
        fulfillment_provider: providers.fulfillment.clone(),
    };
    let health_state = HealthAppState {
        provider_modes: providers.modes,
    };

    let app = Router::new()
        .route("/health", get(health))
        .with_state(health_state)
        .nest(
            "/api/v1/webhooks",
            webhook_routes().with_state(webhook_state),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.server.request_timeout_secs,
                )))
                .layer(cors_layer(&config)),
        );

    let addr = config
        .server
        .socket_addr()
        .expect("Invalid server bind address");
    tracing::info!(%addr, "commerce-bridge listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Initialize the tracing subscriber.
///
/// Honors `RUST_LOG` when set, falling back to the configured level.
/// Production emits JSON lines; development keeps the human-readable format.
fn init_tracing(config: &AppConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.server.log_level.clone().into());

    if config.is_production() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Build the CORS layer from configured origins; permissive when none are
/// set (development default).
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = config.server.cors_origins_list();
    if origins.is_empty() {
        return CorsLayer::new().allow_origin(Any).allow_methods(Any);
    }

    let parsed: Vec<axum::http::HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new().allow_origin(parsed).allow_methods(Any)
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
