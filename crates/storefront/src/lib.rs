//! Teslix Parts Storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn,
    routing::get,
};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::{SessionManagerLayer, SessionStore};
use tracing::Span;

use crate::middleware::{request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// Build the storefront router over any session store.
///
/// Production passes the `PostgreSQL` session layer; tests use an in-memory
/// store.
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    let uploads = ServeDir::new(&state.config().uploads_dir);
    let work = ServeDir::new(&state.config().work_dir);

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/uploads", uploads)
        .nest_service("/work", work)
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};
    use std::path::Path;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use secrecy::SecretString;
    use serde_json::{Value, json};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    use teslix_core::cart::MAX_CART_ITEMS;

    use super::*;
    use crate::config::{StorefrontConfig, TelegramConfig};
    use crate::middleware::session_layer;

    fn config(work_dir: &Path, telegram: Option<TelegramConfig>) -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/teslix_test"),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            telegram,
            work_dir: work_dir.to_path_buf(),
            uploads_dir: work_dir.join("uploads"),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    fn telegram() -> TelegramConfig {
        TelegramConfig {
            bot_token: SecretString::from("123456:test-token"),
            chat_id: "-100123".to_string(),
        }
    }

    /// Router with a lazy pool; only handlers that never reach the database
    /// are exercised.
    fn test_app(config: StorefrontConfig) -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/teslix_test")
            .unwrap();
        app(
            AppState::new(config, pool),
            session_layer(MemoryStore::default(), false),
        )
    }

    fn request(method: &str, uri: &str, body: Option<Value>, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-real-ip", "203.0.113.9");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn session_cookie(response: &axum::response::Response) -> String {
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let response = test_app(config(dir.path(), None))
            .oneshot(request("GET", "/health", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_order_without_telegram_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let response = test_app(config(dir.path(), None))
            .oneshot(request("POST", "/api/order", Some(json!({ "message": "" })), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["error"], "Server configuration error");
    }

    #[tokio::test]
    async fn test_order_with_blank_message_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let response = test_app(config(dir.path(), Some(telegram())))
            .oneshot(request(
                "POST",
                "/api/order",
                Some(json!({ "message": "   ", "productIds": ["AMF303"] })),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Missing message");
    }

    #[tokio::test]
    async fn test_work_photos_listing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("1.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("3.png"), b"x").unwrap();

        let response = test_app(config(dir.path(), None))
            .oneshot(request("GET", "/api/work-photos", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "photos": ["/work/1.jpg", "/work/3.png"] })
        );
    }

    #[tokio::test]
    async fn test_cart_survives_between_requests() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(config(dir.path(), None));

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/cart/add",
                Some(json!({ "productId": "AM3F-001" })),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = session_cookie(&response);
        let view = json_body(response).await;
        assert_eq!(view["totalCount"], 1);
        assert_eq!(view["total"], 4500);

        // Adding again does not increment.
        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/cart/add",
                Some(json!({ "productId": "AM3F-001" })),
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["items"][0]["quantity"], 1);

        let response = app
            .oneshot(request("GET", "/cart/count", None, Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(json_body(response).await, json!({ "count": 1 }));
    }

    #[tokio::test]
    async fn test_checkout_requires_contact_name() {
        let dir = tempfile::tempdir().unwrap();
        let response = test_app(config(dir.path(), Some(telegram())))
            .oneshot(request(
                "POST",
                "/cart/checkout",
                Some(json!({ "name": " ", "phone": "+380671234567" })),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_checkout_with_empty_cart() {
        let dir = tempfile::tempdir().unwrap();
        let response = test_app(config(dir.path(), Some(telegram())))
            .oneshot(request(
                "POST",
                "/cart/checkout",
                Some(json!({ "name": "Олег", "phone": "+380671234567" })),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Cart is empty");
    }

    #[tokio::test]
    async fn test_language_preference() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(config(dir.path(), None));

        let response = app
            .clone()
            .oneshot(request("POST", "/prefs/lang", Some(json!({ "lang": "uk" })), None))
            .await
            .unwrap();
        let cookie = session_cookie(&response);
        assert_eq!(json_body(response).await, json!({ "lang": "uk" }));

        let response = app
            .clone()
            .oneshot(request("POST", "/prefs/lang", Some(json!({ "lang": "en" })), Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(json_body(response).await, json!({ "lang": "uk" }));

        let response = app
            .oneshot(request("GET", "/prefs/lang", None, Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(json_body(response).await, json!({ "lang": "uk" }));
    }

    #[tokio::test]
    async fn test_welcome_once_per_browser_session() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(config(dir.path(), None));

        let response = app
            .clone()
            .oneshot(request("GET", "/prefs/welcome", None, None))
            .await
            .unwrap();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(!set_cookie.contains("Max-Age"));
        assert!(!set_cookie.contains("Expires"));
        let cookie = session_cookie(&response);
        assert_eq!(json_body(response).await, json!({ "show": true }));

        let response = app
            .clone()
            .oneshot(request("GET", "/prefs/welcome", None, Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(json_body(response).await, json!({ "show": false }));

        // A new browser session keeps the long-lived session cookie but not
        // the welcome cookie.
        let response = app
            .clone()
            .oneshot(request("POST", "/prefs/lang", Some(json!({ "lang": "uk" })), None))
            .await
            .unwrap();
        let session = session_cookie(&response);
        let response = app
            .oneshot(request("GET", "/prefs/welcome", None, Some(&session)))
            .await
            .unwrap();
        assert_eq!(json_body(response).await, json!({ "show": true }));
    }

    #[tokio::test]
    async fn test_cart_sync_rejects_oversized_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let items: Vec<Value> = (0..=MAX_CART_ITEMS)
            .map(|i| json!({ "productId": format!("P{i}"), "quantity": 1 }))
            .collect();

        let response = test_app(config(dir.path(), None))
            .oneshot(request("POST", "/cart/sync", Some(json!({ "items": items })), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"],
            format!("Too many cart items (max {MAX_CART_ITEMS})")
        );
    }
}
