//! HTTP Basic authentication.
//!
//! # Responsibilities
//! - Read credentials from the request environment
//! - Build the `401` challenge with a sanitized realm
//! - Build the logout response
//!
//! # Data Flow
//! ```text
//! Environment + CanonicalRequest
//!     → credentials::read (server vars, Basic decode, old_usr logout)
//!     → Some(Credentials) → handler continues
//!     → None              → challenge()
//! ```
//!
//! # Design Decisions
//! - Passwords are never verified here; the database login does that
//! - The realm only ever contains printable ASCII

pub mod credentials;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::config::AuthConfig;
use crate::http::{CanonicalRequest, Environment};
use crate::observability::metrics;

pub use credentials::Credentials;

const ACCESS_DENIED: &str = "Wrong username/password. Access denied.";

/// Basic authentication front end.
#[derive(Debug, Clone)]
pub struct HttpAuth {
    config: AuthConfig,
}

impl HttpAuth {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Credentials as sent, with an empty user when none are usable.
    pub fn read_credentials(&self, env: &Environment, request: &CanonicalRequest) -> Credentials {
        credentials::read(env, request)
    }

    /// Credentials when a user is present.
    pub fn authenticate(
        &self,
        env: &Environment,
        request: &CanonicalRequest,
    ) -> Option<Credentials> {
        let creds = self.read_credentials(env, request);
        if creds.is_empty() {
            tracing::debug!("No usable credentials");
            None
        } else {
            tracing::debug!(user = %creds.user, "Credentials accepted");
            Some(creds)
        }
    }

    /// Realm shown in the browser's login dialog.
    pub fn realm(&self) -> String {
        let raw = match self.config.realm.as_deref().filter(|r| !r.is_empty()) {
            Some(realm) => realm.to_string(),
            None if !self.config.verbose.is_empty() => {
                format!("phpMyAdmin {}", self.config.verbose)
            }
            None => format!("phpMyAdmin {}", self.config.host),
        };
        sanitize_realm(&raw)
    }

    /// `401` with a `WWW-Authenticate: Basic` challenge.
    pub fn challenge(&self) -> Response {
        let realm = self.realm();
        metrics::record_auth_challenge();
        tracing::info!(realm = %realm, "Sending authentication challenge");

        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, format!("Basic realm=\"{realm}\""))],
            ACCESS_DENIED,
        )
            .into_response()
    }

    /// Redirect to the logout URL, or challenge again when none is set.
    pub fn log_out(&self) -> Response {
        match self.config.logout_url.as_deref().filter(|u| !u.is_empty()) {
            Some(url) => {
                tracing::info!(location = %url, "Logging out");
                (StatusCode::FOUND, [(header::LOCATION, url.to_string())]).into_response()
            }
            None => self.challenge(),
        }
    }
}

fn sanitize_realm(realm: &str) -> String {
    realm.chars().filter(|c| (' '..='~').contains(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_realm() {
        assert_eq!(sanitize_realm("phpMyAdmin verboseMessagê"), "phpMyAdmin verboseMessag");
        assert_eq!(sanitize_realm("tab\there\n"), "tabhere");
        assert_eq!(sanitize_realm("plain ~ text!"), "plain ~ text!");
    }

    #[test]
    fn test_realm_precedence() {
        let mut config = AuthConfig {
            realm: Some(String::new()),
            verbose: String::new(),
            host: "db.local".into(),
            logout_url: None,
        };
        assert_eq!(HttpAuth::new(config.clone()).realm(), "phpMyAdmin db.local");

        config.verbose = "Production".into();
        assert_eq!(HttpAuth::new(config.clone()).realm(), "phpMyAdmin Production");

        config.realm = Some("Restricted".into());
        assert_eq!(HttpAuth::new(config).realm(), "Restricted");
    }

    #[test]
    fn test_challenge_headers() {
        let auth = HttpAuth::new(AuthConfig {
            host: "localhost".into(),
            ..Default::default()
        });
        let response = auth.challenge();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()[header::WWW_AUTHENTICATE],
            "Basic realm=\"phpMyAdmin localhost\""
        );
    }

    #[test]
    fn test_log_out_without_url_challenges() {
        let response = HttpAuth::new(AuthConfig::default()).log_out();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_log_out_redirects() {
        let response = HttpAuth::new(AuthConfig {
            logout_url: Some("https://example.com/bye".into()),
            ..Default::default()
        })
        .log_out();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "https://example.com/bye");
    }
}
