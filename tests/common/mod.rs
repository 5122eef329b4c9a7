//! Shared utilities for integration tests.

use axum::body::{to_bytes, Body};
use axum::http::Request;
use axum::response::Response;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use admin_http::config::GatewayConfig;
use admin_http::http::{GatewayServer, ServerRequestFactory};
use admin_http::provider::ProviderResolver;

/// Providers compiled into this build, in default priority order.
#[allow(dead_code)]
pub fn available_providers() -> Vec<&'static str> {
    let mut providers = Vec::new();
    if cfg!(feature = "http-provider") {
        providers.push("http");
    }
    if cfg!(feature = "url-provider") {
        providers.push("url");
    }
    if cfg!(feature = "reqwest-provider") {
        providers.push("reqwest");
    }
    providers
}

/// A normalizer bound to one named provider.
#[allow(dead_code)]
pub fn factory_for(provider: &str) -> ServerRequestFactory {
    let resolved = ProviderResolver::from_names([provider])
        .resolve()
        .unwrap_or_else(|e| panic!("provider {provider} unavailable: {e}"));
    ServerRequestFactory::new(resolved.factory())
}

/// `Basic <base64(user:password)>`.
#[allow(dead_code)]
pub fn basic(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}

/// A gateway server over the first available provider.
#[allow(dead_code)]
pub fn gateway(config: GatewayConfig) -> GatewayServer {
    let provider = available_providers()[0];
    GatewayServer::new(config, factory_for(provider))
}

/// Send one request through a fresh gateway router.
#[allow(dead_code)]
pub async fn send(server: &GatewayServer, request: Request<Body>) -> Response {
    use tower::ServiceExt;

    server.router().oneshot(request).await.unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
