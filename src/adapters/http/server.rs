//! HTTP server bootstrap.
//!
//! Wraps the API router in the tower-http layers and serves it until
//! Ctrl+C. Every response carries an `x-request-id`, generated when the
//! caller did not send one.

use std::net::SocketAddr;

use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

use super::{api_router, AppState};

/// The full application: API routes, health check and middleware layers.
pub fn build_app(state: AppState, config: &ServerConfig) -> Router {
    api_router(state)
        .route("/health", get(health_check))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(cors_layer(config))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins_list()
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-user-id"),
            HeaderName::from_static("x-user-role"),
            HeaderName::from_static("x-request-id"),
        ])
        .allow_origin(allow_origin)
}

/// Binds `addr` and serves `app` until shutdown.
pub async fn serve(app: Router, addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received Ctrl+C, shutting down"),
        Err(err) => {
            tracing::error!(error = %err, "failed to listen for shutdown signal");
            std::future::pending::<()>().await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    use crate::adapters::memory::{
        InMemoryAssistantDirectory, InMemoryModuleRepository, InMemoryPrescriptionWidget,
        InMemorySubscriptionRepository,
    };
    use crate::adapters::stripe::MockCheckoutProvider;
    use crate::application::handlers::subscription::CheckoutUrls;
    use crate::application::SubscriptionStateCache;
    use crate::domain::subscription::PlanCatalog;

    fn state() -> AppState {
        AppState {
            subscriptions: Arc::new(InMemorySubscriptionRepository::new()),
            modules: Arc::new(InMemoryModuleRepository::new()),
            checkout: Arc::new(MockCheckoutProvider::new()),
            assistants: Arc::new(InMemoryAssistantDirectory::new()),
            prescriptions: Arc::new(InMemoryPrescriptionWidget::new()),
            catalog: Arc::new(PlanCatalog::standard()),
            cache: SubscriptionStateCache::new(),
            checkout_urls: CheckoutUrls {
                success_url: "http://localhost/ok".to_string(),
                cancel_url: "http://localhost/cancel".to_string(),
            },
            fetch_timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn health_check_is_public_and_tagged_with_request_id() {
        let app = build_app(state(), &ServerConfig::default());

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn caller_request_id_is_echoed() {
        let app = build_app(state(), &ServerConfig::default());

        let response = app
            .oneshot(
                Request::get("/health")
                    .header("x-request-id", "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["x-request-id"], "req-42");
    }

    #[test]
    fn cors_accepts_configured_origins() {
        let config = ServerConfig {
            cors_origins: Some("https://app.preskriptor.com".to_string()),
            ..Default::default()
        };
        let _ = cors_layer(&config);
        let _ = cors_layer(&ServerConfig::default());
    }
}
