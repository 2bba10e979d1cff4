//! Teslix Parts Admin library.
//!
//! This crate provides the admin functionality as a library,
//! allowing it to be tested and reused. The CLI links it for the
//! [`HttpImageHost`](services::HttpImageHost) upload client.
//!
//! # Security
//!
//! Every write endpoint requires the `x-admin-key` header. Bind to a private
//! interface; the admin API is not meant to face the public internet.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
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
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Build the admin router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
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
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
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
    use std::io::Cursor;
    use std::net::{IpAddr, Ipv4Addr};
    use std::path::Path;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use image::{DynamicImage, GenericImageView, ImageBuffer, ImageFormat, Rgb};
    use secrecy::SecretString;
    use serde_json::{Value, json};
    use sqlx::postgres::PgPoolOptions;
    use teslix_core::images::MAX_IMAGE_BYTES;
    use tower::ServiceExt;

    use super::*;
    use crate::config::AdminConfig;

    const KEY: &str = "k7Qz!p2Lw9#Rx4Vm";
    const BOUNDARY: &str = "teslix-test-boundary";

    fn config(root: &Path) -> AdminConfig {
        AdminConfig {
            database_url: SecretString::from("postgres://localhost/teslix_test"),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3001,
            admin_secret: SecretString::from(KEY),
            uploads_dir: root.join("uploads"),
            uploads_public_url: "/uploads".to_string(),
            parts_dir: root.join("parts"),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Router with a lazy pool; only handlers that never reach the database
    /// are exercised.
    fn test_app(root: &Path) -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/teslix_test")
            .unwrap();
        app(AppState::new(config(root), pool))
    }

    fn request(method: &str, uri: &str, key: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(key) = key {
            builder = builder.header("x-admin-key", key);
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    /// Multipart request; each part is `(field, file name, content type, bytes)`.
    fn multipart(uri: &str, key: &str, parts: &[(&str, Option<&str>, &str, &[u8])]) -> Request<Body> {
        let mut body = Vec::new();
        for (field, file_name, content_type, bytes) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            let disposition = match file_name {
                Some(name) => {
                    format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{name}\"\r\n")
                }
                None => format!("Content-Disposition: form-data; name=\"{field}\"\r\n"),
            };
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header("x-admin-key", key)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let buffer = ImageBuffer::from_fn(width, height, |x, _| Rgb([(x % 256) as u8, 40, 90]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(buffer)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let response = test_app(dir.path())
            .oneshot(request("GET", "/health", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_login() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path());

        let response = app
            .clone()
            .oneshot(request("POST", "/api/admin/login", Some(KEY), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "ok": true }));

        let response = app
            .clone()
            .oneshot(request("POST", "/api/admin/login", Some("Teslix9999"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await, json!({ "error": "Unauthorized" }));

        let response = app
            .oneshot(request("POST", "/api/admin/login", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_writes_require_key() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path());

        for (method, uri) in [
            ("GET", "/api/admin/products"),
            ("POST", "/api/admin/products"),
            ("PATCH", "/api/admin/products/p1"),
            ("POST", "/api/admin/products/p1/images"),
            ("DELETE", "/api/admin/products?id=p1"),
            ("POST", "/api/admin/cars"),
            ("DELETE", "/api/admin/cars?id=v1"),
            ("POST", "/api/admin/upload"),
        ] {
            let response = app
                .clone()
                .oneshot(request(method, uri, None, Some(json!({}))))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
        }
    }

    #[tokio::test]
    async fn test_invalid_product_is_rejected_before_storage() {
        let dir = tempfile::tempdir().unwrap();
        let response = test_app(dir.path())
            .oneshot(request(
                "POST",
                "/api/admin/products",
                Some(KEY),
                Some(json!({
                    "title": "Фара",
                    "description": "LED",
                    "price": "12500",
                    "images": []
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"],
            "at least one image is required"
        );
    }

    #[tokio::test]
    async fn test_unknown_image_edit_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let response = test_app(dir.path())
            .oneshot(request(
                "POST",
                "/api/admin/products/p1/images",
                Some(KEY),
                Some(json!({ "op": "shuffle" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_vehicle_is_rejected_before_storage() {
        let dir = tempfile::tempdir().unwrap();
        let response = test_app(dir.path())
            .oneshot(request(
                "POST",
                "/api/admin/cars",
                Some(KEY),
                Some(json!({
                    "make": "Tesla",
                    "model": "Model 3",
                    "year": 2021,
                    "vin": "5YJ",
                    "images": ["/uploads/1.jpg"]
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_requires_id() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path());

        for uri in ["/api/admin/products", "/api/admin/cars?id=%20"] {
            let response = app
                .clone()
                .oneshot(request("DELETE", uri, Some(KEY), None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(json_body(response).await["error"], "Missing id");
        }
    }

    #[tokio::test]
    async fn test_single_upload() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path());

        let response = app
            .clone()
            .oneshot(multipart(
                "/api/admin/upload",
                KEY,
                &[("file", Some("door panel.png"), "image/png", &png(4, 4))],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let url = json_body(response).await["url"].as_str().unwrap().to_string();
        assert!(url.starts_with("/uploads/") && url.ends_with("-door_panel.png"), "{url}");

        let stored = dir.path().join("uploads").join(url.trim_start_matches("/uploads/"));
        assert!(stored.exists());

        let response = app
            .oneshot(multipart(
                "/api/admin/upload",
                KEY,
                &[("other", None, "text/plain", b"x")],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "No file");
    }

    #[tokio::test]
    async fn test_single_upload_over_ceiling_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let oversize = vec![0u8; usize::try_from(MAX_IMAGE_BYTES).unwrap() + 1];

        let response = test_app(dir.path())
            .oneshot(multipart(
                "/api/admin/upload",
                KEY,
                &[("file", Some("huge.jpg"), "image/jpeg", &oversize)],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "File exceeds 5 MiB limit");

        let stored = std::fs::read_dir(dir.path().join("uploads")).map_or(0, Iterator::count);
        assert_eq!(stored, 0);
    }

    #[tokio::test]
    async fn test_batch_upload_downsamples_and_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let large = png(2400, 1200);
        let small = png(10, 10);

        let response = test_app(dir.path())
            .oneshot(multipart(
                "/api/admin/upload/batch",
                KEY,
                &[
                    ("current_count", None, "text/plain", b"8"),
                    ("file", Some("wide.png"), "image/png", &large),
                    ("file", Some("small.png"), "image/png", &small),
                    ("file", Some("extra.png"), "image/png", &small),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let report = json_body(response).await;
        let urls = report["urls"].as_array().unwrap();
        assert_eq!(urls.len(), 2);
        assert!(urls[0].as_str().unwrap().ends_with("-wide.jpg"));
        assert!(urls[1].as_str().unwrap().ends_with("-small.png"));
        assert_eq!(report["truncated"], json!(["extra.png"]));

        let wide = urls[0].as_str().unwrap().trim_start_matches("/uploads/");
        let bytes = std::fs::read(dir.path().join("uploads").join(wide)).unwrap();
        assert_eq!(
            image::load_from_memory(&bytes).unwrap().dimensions(),
            (1600, 800)
        );
    }

    #[tokio::test]
    async fn test_batch_on_full_listing() {
        let dir = tempfile::tempdir().unwrap();
        let response = test_app(dir.path())
            .oneshot(multipart(
                "/api/admin/upload/batch",
                KEY,
                &[
                    ("current_count", None, "text/plain", b"10"),
                    ("file", Some("a.png"), "image/png", &png(4, 4)),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_images_listing() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path());

        let response = app
            .clone()
            .oneshot(request("GET", "/api/admin/images", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "files": [] }));

        std::fs::create_dir(dir.path().join("parts")).unwrap();
        std::fs::write(dir.path().join("parts").join("door.jpg"), b"x").unwrap();
        let response = app
            .oneshot(request("GET", "/api/admin/images", None, None))
            .await
            .unwrap();
        assert_eq!(json_body(response).await, json!({ "files": ["door.jpg"] }));
    }
}
