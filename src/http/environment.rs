//! CGI-style request environment.
//!
//! # Responsibilities
//! - Hold one request's decoded GET/POST parameters and server variables
//! - Build that snapshot from an incoming axum request at the boundary
//! - Derive a header list from `HTTP_*` server variables
//!
//! # Design Decisions
//! - The snapshot is the only input to normalization; nothing reads globals
//! - Duplicate parameters keep the last value, as CGI front ends do
//! - Repeated headers are joined with ", " into one server variable

use std::collections::BTreeMap;

use axum::http::{header, request::Parts};
use url::form_urlencoded;

pub const REQUEST_METHOD: &str = "REQUEST_METHOD";
pub const REQUEST_URI: &str = "REQUEST_URI";
pub const QUERY_STRING: &str = "QUERY_STRING";
pub const HTTP_HOST: &str = "HTTP_HOST";
pub const HTTPS: &str = "HTTPS";
pub const CONTENT_TYPE: &str = "CONTENT_TYPE";
pub const CONTENT_LENGTH: &str = "CONTENT_LENGTH";

/// Immutable snapshot of one request's environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    get: BTreeMap<String, String>,
    post: BTreeMap<String, String>,
    server: BTreeMap<String, String>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a decoded query parameter.
    pub fn with_get(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.get.insert(name.into(), value.into());
        self
    }

    /// Add a decoded body parameter.
    pub fn with_post(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.post.insert(name.into(), value.into());
        self
    }

    /// Add a server variable such as `REQUEST_METHOD` or `HTTP_HOST`.
    pub fn with_server(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.server.insert(name.into(), value.into());
        self
    }

    pub fn get_params(&self) -> &BTreeMap<String, String> {
        &self.get
    }

    pub fn post_params(&self) -> &BTreeMap<String, String> {
        &self.post
    }

    pub fn server_vars(&self) -> &BTreeMap<String, String> {
        &self.server
    }

    pub fn server(&self, name: &str) -> Option<&str> {
        self.server.get(name).map(String::as_str)
    }

    /// A server variable, treating an empty value as absent.
    pub fn server_non_empty(&self, name: &str) -> Option<&str> {
        self.server(name).filter(|v| !v.is_empty())
    }

    /// Headers as a CGI front end would report them.
    ///
    /// `HTTP_X_FORWARDED_FOR` becomes `X-Forwarded-For`; `CONTENT_TYPE` and
    /// `CONTENT_LENGTH` are included when non-empty.
    pub fn headers(&self) -> Vec<(String, String)> {
        let mut headers = Vec::new();
        for (name, value) in &self.server {
            if let Some(rest) = name.strip_prefix("HTTP_") {
                if !rest.is_empty() {
                    headers.push((header_case(rest), value.clone()));
                }
            } else if (name == CONTENT_TYPE || name == CONTENT_LENGTH) && !value.is_empty() {
                headers.push((header_case(name), value.clone()));
            }
        }
        headers
    }

    /// Build the snapshot for an incoming request.
    pub fn from_parts(parts: &Parts, body: &[u8]) -> Self {
        let mut env = Self::new()
            .with_server(REQUEST_METHOD, parts.method.as_str())
            .with_server(
                REQUEST_URI,
                parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or("/"),
            )
            .with_server(QUERY_STRING, parts.uri.query().unwrap_or(""));

        if parts.uri.scheme_str() == Some("https") {
            env = env.with_server(HTTPS, "on");
        }

        for name in parts.headers.keys() {
            let value = parts
                .headers
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect::<Vec<_>>()
                .join(", ");
            env = env.with_server(server_var_name(name.as_str()), value);
        }

        if env.server(HTTP_HOST).is_none() {
            if let Some(authority) = parts.uri.authority() {
                env = env.with_server(HTTP_HOST, authority.as_str());
            }
        }

        if let Some(query) = parts.uri.query() {
            for (name, value) in form_urlencoded::parse(query.as_bytes()) {
                env.get.insert(name.into_owned(), value.into_owned());
            }
        }

        let form_body = parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(is_form_urlencoded);
        if form_body {
            for (name, value) in form_urlencoded::parse(body) {
                env.post.insert(name.into_owned(), value.into_owned());
            }
        }

        env
    }
}

/// True when the media type is `application/x-www-form-urlencoded`.
pub fn is_form_urlencoded(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|media| media.eq_ignore_ascii_case("application/x-www-form-urlencoded"))
}

/// `content-type` → `CONTENT_TYPE`, `x-real-ip` → `HTTP_X_REAL_IP`.
fn server_var_name(header_name: &str) -> String {
    let upper = header_name.to_ascii_uppercase().replace('-', "_");
    if upper == CONTENT_TYPE || upper == CONTENT_LENGTH {
        upper
    } else {
        format!("HTTP_{upper}")
    }
}

/// `X_FORWARDED_FOR` → `X-Forwarded-For`.
fn header_case(var: &str) -> String {
    var.split('_')
        .map(|word| {
            let lower = word.to_ascii_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}
