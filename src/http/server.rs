//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, CORS, body limit)
//! - Serve on a bound listener until shutdown is signalled

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{CorsConfig, ServiceConfig};
use crate::http::handlers::{health, send_data};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};

/// Application state injected into handlers.
#[derive(Clone, Default)]
pub struct AppState {
    /// Payloads accepted since startup.
    pub received_total: Arc<AtomicU64>,
}

/// The data receiver HTTP server.
///
/// Constructed explicitly by the entry point, then consumed by [`EchoServer::run`].
pub struct EchoServer {
    router: Router,
    config: ServiceConfig,
}

impl EchoServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig) -> Self {
        let router = Self::build_router(&config, AppState::default());
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/send-data", post(send_data))
            .route("/health", get(health))
            .layer(DefaultBodyLimit::max(config.limits.max_body_size))
            .with_state(state)
            .layer(build_cors_layer(&config.cors))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.timeouts.request_secs),
            ))
            .layer(propagate_request_id_layer())
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        request_id = %request_id(request.headers()),
                    )
                }),
            )
            .layer(set_request_id_layer())
    }

    /// A handle to the fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Serve on `listener` until a value arrives on `shutdown`, then drain
    /// in-flight requests and return.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build a CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let allow_origin = if config.allows_any_origin() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            config
                .allowed_origins
                .iter()
                .filter(|origin| origin.as_str() != "*")
                .filter_map(|origin| origin.parse().ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(config.max_age_secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Method};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn router() -> Router {
        EchoServer::new(ServiceConfig::default()).router()
    }

    fn post_json(body: &'static str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/send-data")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn echoes_object() {
        let response = router().oneshot(post_json(r#"{"x": 1}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert_eq!(
            body_json(response).await,
            json!({"message": "Data received successfully", "received": {"x": 1}})
        );
    }

    #[tokio::test]
    async fn echoes_empty_array_and_null() {
        for (body, expected) in [("[]", json!([])), ("null", Value::Null)] {
            let response = router().oneshot(post_json(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_json(response).await["received"], expected);
        }
    }

    #[tokio::test]
    async fn big_integers_keep_their_digits() {
        let response = router()
            .oneshot(post_json("123456789012345678901234567890"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(
            &bytes[..],
            br#"{"message":"Data received successfully","received":123456789012345678901234567890}"#
        );
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let response = router().oneshot(post_json("{\"x\": ")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "invalid_json");
    }

    #[tokio::test]
    async fn missing_content_type_is_unsupported() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/send-data")
            .body(Body::from(r#"{"x": 1}"#))
            .unwrap();
        let response = router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body_json(response).await["error"], "unsupported_media_type");
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let mut config = ServiceConfig::default();
        config.limits.max_body_size = 16;
        let server = EchoServer::new(config);
        assert_eq!(server.config().limits.max_body_size, 16);
        let router = server.router();

        let response = router
            .oneshot(post_json(r#"{"padding": "well over sixteen bytes"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_json(response).await["error"], "payload_too_large");
    }

    #[tokio::test]
    async fn wildcard_cors_header_present() {
        let mut request = post_json("{}");
        request
            .headers_mut()
            .insert(header::ORIGIN, "http://localhost:3000".parse().unwrap());
        let response = router().oneshot(request).await.unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test]
    async fn restricted_cors_only_echoes_listed_origin() {
        let mut config = ServiceConfig::default();
        config.cors.allowed_origins = vec!["https://app.example.com".into()];
        let router = EchoServer::new(config).router();

        let mut allowed = post_json("{}");
        allowed
            .headers_mut()
            .insert(header::ORIGIN, "https://app.example.com".parse().unwrap());
        let response = router.clone().oneshot(allowed).await.unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://app.example.com"
        );

        let mut other = post_json("{}");
        other
            .headers_mut()
            .insert(header::ORIGIN, "https://evil.example.com".parse().unwrap());
        let response = router.oneshot(other).await.unwrap();
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn request_id_is_generated_and_preserved() {
        let response = router().oneshot(post_json("1")).await.unwrap();
        assert!(response.headers().contains_key("x-request-id"));

        let mut request = post_json("1");
        request
            .headers_mut()
            .insert("x-request-id", "abc-123".parse().unwrap());
        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.headers()["x-request-id"], "abc-123");
    }

    #[tokio::test]
    async fn health_counts_received_payloads() {
        let router = router();
        router.clone().oneshot(post_json("true")).await.unwrap();
        router.clone().oneshot(post_json("not json")).await.unwrap();

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["received_total"], 1);
    }

    #[tokio::test]
    async fn get_on_send_data_is_not_allowed() {
        let request = Request::builder()
            .uri("/send-data")
            .body(Body::empty())
            .unwrap();
        let response = router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
