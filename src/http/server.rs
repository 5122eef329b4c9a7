//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the gateway handler
//! - Wire up middleware (tracing, timeout)
//! - Bind server to listener
//! - Normalize every request and run Basic authentication on it
//! - Observability (metrics, per-request span carrying the correlation ID)
//!
//! # Data Flow
//! ```text
//! Request<Body>
//!     → body (limited to security.max_body_size, else 413)
//!     → Environment::from_parts
//!     → ServerRequestFactory::from_environment (error → 400)
//!     → /logout → HttpAuth::log_out
//!     → no credentials → HttpAuth::challenge (401)
//!     → 200 JSON summary
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{request::Parts, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::auth::HttpAuth;
use crate::config::GatewayConfig;
use crate::http::{Environment, ServerRequestFactory};
use crate::observability::metrics;

/// Correlation header, honoured when sent and generated otherwise.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Path that logs the browser out.
pub const LOGOUT_PATH: &str = "/logout";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub requests: ServerRequestFactory,
    pub auth: Arc<HttpAuth>,
    pub max_body_size: usize,
}

/// HTTP front end for the admin UI.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a new server normalizing requests through `requests`.
    pub fn new(config: GatewayConfig, requests: ServerRequestFactory) -> Self {
        let state = AppState {
            requests,
            auth: Arc::new(HttpAuth::new(config.auth.clone())),
            max_body_size: config.security.max_body_size,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .fallback(gateway_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            providers = %self.config.providers.order.join(","),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// JSON body of an authenticated request.
#[derive(Debug, Serialize)]
struct RequestSummary {
    request_id: String,
    user: String,
    provider: &'static str,
    method: String,
    uri: String,
    headers: BTreeMap<String, Vec<String>>,
    query: BTreeMap<String, String>,
    parsed_body: Option<BTreeMap<String, String>>,
}

async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let method = request.method().to_string();
    let span = tracing::info_span!("request", request_id = %request_id, method = %method);

    let (parts, body) = request.into_parts();
    let mut response = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(bytes) => span.in_scope(|| handle(&state, &parts, &bytes, &request_id)),
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Request body rejected");
            (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response()
        }
    };

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    metrics::record_request(
        &method,
        response.status().as_u16(),
        state.requests.provider(),
        start_time,
    );
    response
}

fn handle(state: &AppState, parts: &Parts, body: &[u8], request_id: &str) -> Response {
    let env = Environment::from_parts(parts, body);
    let request = match state.requests.from_environment(&env) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "Request normalization failed");
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    if request.path() == LOGOUT_PATH {
        return state.auth.log_out();
    }

    let Some(credentials) = state.auth.authenticate(&env, &request) else {
        return state.auth.challenge();
    };

    tracing::debug!(
        user = %credentials.user,
        method = %request.method(),
        path = %request.path(),
        "Request authenticated"
    );

    let headers = request
        .headers()
        .into_iter()
        .filter(|(name, _)| !name.eq_ignore_ascii_case("authorization"))
        .collect();

    Json(RequestSummary {
        request_id: request_id.to_string(),
        user: credentials.user,
        provider: request.provider(),
        method: request.method().to_string(),
        uri: request.uri(),
        headers,
        query: request.query_params().clone(),
        parsed_body: request.parsed_body().cloned(),
    })
    .into_response()
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
