//! Request normalization.
//!
//! # Data Flow
//! ```text
//! Environment (method, REQUEST_URI, QUERY_STRING, HTTP_HOST, GET, POST)
//!     → target URI (scheme://host + path + raw query)
//!     → MessageFactory::create_server_request
//!     → headers from the header source (+ synthesized Host)
//!     → query params + parsed body
//!     → CanonicalRequest
//! ```
//!
//! # Design Decisions
//! - The factory is injected; this module never resolves providers itself
//!   except through the explicit `create()` shortcut
//! - The raw query string is passed through untouched so the URI keeps the
//!   client's percent-encoding
//! - Host synthesis happens before names are case-normalized by the provider
//! - Headers a provider rejects are skipped, not fatal

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::http::environment::{
    is_form_urlencoded, Environment, HTTPS, HTTP_HOST, QUERY_STRING, REQUEST_METHOD, REQUEST_URI,
};
use crate::http::request::CanonicalRequest;
use crate::provider::{MessageFactory, ProviderResolver};

/// Zero-argument function returning the current request's headers.
pub type HeaderSource = Arc<dyn Fn() -> Vec<(String, String)> + Send + Sync>;

/// Builds [`CanonicalRequest`]s through one message factory.
#[derive(Clone)]
pub struct ServerRequestFactory {
    factory: Arc<dyn MessageFactory>,
    header_source: Option<HeaderSource>,
}

impl ServerRequestFactory {
    pub fn new(factory: Arc<dyn MessageFactory>) -> Self {
        Self {
            factory,
            header_source: None,
        }
    }

    /// Use the process-wide provider resolution with the default candidates.
    pub fn create() -> Result<Self> {
        let resolved = ProviderResolver::default().resolve_cached()?;
        Ok(Self::new(resolved.factory()))
    }

    /// Replace the header source used by [`Self::from_environment`].
    ///
    /// Without one, headers come from the environment's `HTTP_*` variables.
    pub fn with_header_source<F>(mut self, source: F) -> Self
    where
        F: Fn() -> Vec<(String, String)> + Send + Sync + 'static,
    {
        self.header_source = Some(Arc::new(source));
        self
    }

    pub fn provider(&self) -> &'static str {
        self.factory.provider()
    }

    /// An empty request for `method` and an absolute `uri`.
    pub fn create_request(&self, method: &str, uri: &str) -> Result<CanonicalRequest> {
        let message = self.factory.create_server_request(method, uri)?;
        Ok(CanonicalRequest::new(
            self.factory.provider(),
            message,
            Default::default(),
            None,
        ))
    }

    /// Normalize one request environment.
    pub fn from_environment(&self, env: &Environment) -> Result<CanonicalRequest> {
        let method = env.server_non_empty(REQUEST_METHOD).unwrap_or("GET");
        let uri = target_uri(env);
        let mut message = self.factory.create_server_request(method, &uri)?;

        for (name, value) in self.collect_headers(env) {
            if let Err(e) = message.append_header(&name, &value) {
                tracing::warn!(provider = self.provider(), error = %e, "Skipping header");
            }
        }

        let parsed_body = if method != "GET" && method != "HEAD" {
            let form = message
                .header("content-type")
                .first()
                .is_some_and(|ct| is_form_urlencoded(ct));
            form.then(|| env.post_params().clone())
        } else {
            None
        };

        tracing::debug!(
            provider = self.provider(),
            method = %method,
            uri = %uri,
            parsed_body = parsed_body.is_some(),
            "Request normalized"
        );

        Ok(CanonicalRequest::new(
            self.factory.provider(),
            message,
            env.get_params().clone(),
            parsed_body,
        ))
    }

    fn collect_headers(&self, env: &Environment) -> Vec<(String, String)> {
        let mut headers = match &self.header_source {
            Some(source) => source(),
            None => env.headers(),
        };

        let has_host = headers.iter().any(|(name, _)| name.eq_ignore_ascii_case("host"));
        if !has_host {
            if let Some(host) = env.server_non_empty(HTTP_HOST) {
                headers.insert(0, ("Host".to_string(), host.to_string()));
            }
        }
        headers
    }
}

impl fmt::Debug for ServerRequestFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerRequestFactory")
            .field("provider", &self.provider())
            .field("custom_header_source", &self.header_source.is_some())
            .finish()
    }
}

/// `scheme://host/path?query`, or `/path?query` when there is no host.
fn target_uri(env: &Environment) -> String {
    let path = env
        .server_non_empty(REQUEST_URI)
        .map(|uri| uri.split_once('?').map_or(uri, |(path, _)| path))
        .filter(|path| !path.is_empty())
        .unwrap_or("/");

    let mut uri = String::new();
    if let Some(host) = env.server_non_empty(HTTP_HOST) {
        uri.push_str(scheme(env));
        uri.push_str("://");
        uri.push_str(host);
    }
    if !path.starts_with('/') {
        uri.push('/');
    }
    uri.push_str(path);

    if let Some(query) = env.server_non_empty(QUERY_STRING) {
        uri.push('?');
        uri.push_str(query);
    }
    uri
}

fn scheme(env: &Environment) -> &'static str {
    match env.server_non_empty(HTTPS) {
        Some(value) if !value.eq_ignore_ascii_case("off") => "https",
        _ => "http",
    }
}
