//! Interchangeable HTTP message providers.
//!
//! # Data Flow
//! ```text
//! ordered candidate list (config or built-in priority)
//!     → resolver.rs (first candidate compiled into this build)
//!     → ResolvedFactory (cached for the process)
//!     → MessageFactory::create_server_request(method, uri)
//!     → Box<dyn ServerMessage> (library-specific request object)
//! ```
//!
//! # Design Decisions
//! - Providers are a closed set gated by Cargo features; "available" means
//!   the feature was enabled at build time
//! - The URI is parsed and owned by the provider, never re-serialized by us
//! - Header names are stored lowercase by every provider; values verbatim

use std::any::Any;
use std::fmt;

use axum::http::{HeaderName, HeaderValue, Method};
use thiserror::Error;
use url::Url;

use crate::error::{Error, Result};

#[cfg(feature = "http-provider")]
pub mod http_message;
#[cfg(feature = "reqwest-provider")]
pub mod reqwest_message;
pub mod resolver;
#[cfg(feature = "url-provider")]
pub mod url_message;

pub use resolver::{ProviderCandidate, ProviderResolver, ResolvedFactory};

/// A factory able to build server request objects for one HTTP library.
pub trait MessageFactory: Send + Sync + fmt::Debug {
    /// Stable provider name, as used in the candidate list.
    fn provider(&self) -> &'static str;

    /// Build an empty request for `method` and `uri`.
    ///
    /// `uri` is either absolute (`http://host/path?query`) or origin-form
    /// (`/path?query`). Anything else is an [`Error::InvalidUri`].
    fn create_server_request(&self, method: &str, uri: &str) -> Result<Box<dyn ServerMessage>>;
}

/// A library-specific request object seen through a common read API.
pub trait ServerMessage: Send + Sync + fmt::Debug {
    fn method(&self) -> &str;

    /// The URI serialized by the underlying library.
    fn uri(&self) -> String;

    fn scheme(&self) -> Option<&str>;

    fn host(&self) -> Option<&str>;

    fn path(&self) -> &str;

    /// Raw query string, exactly as stored by the library.
    fn query(&self) -> Option<&str>;

    /// Append one header value, keeping earlier values for the same name.
    fn append_header(&mut self, name: &str, value: &str) -> std::result::Result<(), HeaderRejected>;

    /// Distinct header names in insertion order (lowercase).
    fn header_names(&self) -> Vec<String>;

    /// All values for `name` in insertion order; lookup is case-insensitive.
    fn header(&self, name: &str) -> Vec<String>;

    /// The concrete library object, for provider identity checks.
    fn as_any(&self) -> &dyn Any;
}

/// A header the provider refused to store.
#[derive(Debug, Clone, Error)]
#[error("header '{name}' rejected: {reason}")]
pub struct HeaderRejected {
    pub name: String,
    pub reason: String,
}

/// Validate a method token the way every provider expects it.
pub(crate) fn parse_method(method: &str) -> Result<Method> {
    Method::from_bytes(method.as_bytes()).map_err(|_| Error::InvalidMethod(method.to_string()))
}

/// Validate and normalize a header pair. The name comes back lowercase.
pub(crate) fn parse_header(
    name: &str,
    value: &str,
) -> std::result::Result<(HeaderName, HeaderValue), HeaderRejected> {
    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| HeaderRejected {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    let header_value = HeaderValue::from_bytes(value.as_bytes()).map_err(|e| HeaderRejected {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    Ok((header_name, header_value))
}

/// Origin-form targets start with a single slash.
pub(crate) fn is_origin_form(uri: &str) -> bool {
    uri.starts_with('/') && !uri.starts_with("//")
}

/// Origin-form targets are resolved against this base and serialized without it.
const ORIGIN_BASE: &str = "http://localhost";

/// A request target split as the client sent it.
///
/// `Url` applies WHATWG normalization (dot segments, quote escaping), so
/// providers built on it serve path, query and serialization from here and
/// keep the `Url` for validation and host/scheme lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(not(any(feature = "url-provider", feature = "reqwest-provider")), allow(dead_code))]
pub(crate) struct RawTarget {
    /// `scheme://authority`, absent in origin form.
    origin: Option<String>,
    path: String,
    query: Option<String>,
}

#[cfg_attr(not(any(feature = "url-provider", feature = "reqwest-provider")), allow(dead_code))]
impl RawTarget {
    fn split(uri: &str, origin_form: bool) -> Self {
        let target = uri.split_once('#').map_or(uri, |(target, _)| target);

        let (origin, rest) = match target.find("://").filter(|_| !origin_form) {
            Some(scheme_end) => {
                let authority_start = scheme_end + 3;
                let authority_end = target[authority_start..]
                    .find(|c| c == '/' || c == '?')
                    .map_or(target.len(), |i| authority_start + i);
                (Some(target[..authority_end].to_string()), &target[authority_end..])
            }
            None => (None, target),
        };

        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (rest, None),
        };
        let path = if path.is_empty() { "/" } else { path };

        Self {
            origin,
            path: path.to_string(),
            query,
        }
    }

    pub(crate) fn is_origin_form(&self) -> bool {
        self.origin.is_none()
    }

    pub(crate) fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }
}

impl fmt::Display for RawTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(origin) = &self.origin {
            f.write_str(origin)?;
        }
        f.write_str(&self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}

/// Validate an absolute or origin-form target.
///
/// The `Url` is only used for validation and host/scheme lookups; the
/// [`RawTarget`] keeps path and query byte-for-byte.
#[cfg_attr(not(any(feature = "url-provider", feature = "reqwest-provider")), allow(dead_code))]
pub(crate) fn parse_target(uri: &str) -> Result<(Url, RawTarget)> {
    if is_origin_form(uri) {
        let base = Url::parse(ORIGIN_BASE).map_err(|e| Error::invalid_uri(uri, e))?;
        let url = base.join(uri).map_err(|e| Error::invalid_uri(uri, e))?;
        return Ok((url, RawTarget::split(uri, true)));
    }

    let url = Url::parse(uri).map_err(|e| Error::invalid_uri(uri, e))?;
    if url.cannot_be_a_base() || !url.has_host() {
        return Err(Error::invalid_uri(uri, "expected a hierarchical URI with a host"));
    }
    Ok((url, RawTarget::split(uri, false)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_method() {
        assert_eq!(parse_method("GET").unwrap(), Method::GET);
        // Extension methods keep their case.
        assert_eq!(parse_method("post").unwrap().as_str(), "post");
        assert!(matches!(parse_method("GE T"), Err(Error::InvalidMethod(_))));
        assert!(parse_method("").is_err());
    }

    #[test]
    fn test_parse_header_lowercases_name() {
        let (name, value) = parse_header("Content-Type", "text/html").unwrap();
        assert_eq!(name.as_str(), "content-type");
        assert_eq!(value.as_bytes(), b"text/html");
    }

    #[test]
    fn test_parse_header_rejects_bad_input() {
        assert!(parse_header("Bad Name", "x").is_err());
        assert!(parse_header("X-Split", "a\r\nb").is_err());
    }

    #[test]
    fn test_origin_form() {
        assert!(is_origin_form("/index.php?x=1"));
        assert!(!is_origin_form("//evil.example/x"));
        assert!(!is_origin_form("index.php"));
    }

    #[test]
    fn test_raw_target_keeps_client_bytes() {
        let (url, target) =
            parse_target("http://pma.local/a/../index.php?sql_query=SELECT+*+WHERE+a='x'#frag")
                .unwrap();
        assert_eq!(url.path(), "/index.php");
        assert_eq!(target.path(), "/a/../index.php");
        assert_eq!(target.query(), Some("sql_query=SELECT+*+WHERE+a='x'"));
        assert_eq!(
            target.to_string(),
            "http://pma.local/a/../index.php?sql_query=SELECT+*+WHERE+a='x'"
        );
        assert!(!target.is_origin_form());
    }

    #[test]
    fn test_raw_target_defaults_path() {
        let (_, target) = parse_target("http://example.com?x=1").unwrap();
        assert_eq!(target.path(), "/");
        assert_eq!(target.to_string(), "http://example.com/?x=1");

        let (_, target) = parse_target("/?").unwrap();
        assert!(target.is_origin_form());
        assert_eq!(target.query(), Some(""));
        assert_eq!(target.to_string(), "/?");
    }
}
