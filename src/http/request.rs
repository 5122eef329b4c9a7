//! Canonical request facade.
//!
//! # Responsibilities
//! - Expose one read API over whatever request object a provider built
//! - Hold the decoded query parameters and the optional parsed body
//!
//! # Design Decisions
//! - Read-only once built; fields are only set by the normalizer
//! - "No parsed body" (`None`) and "empty parsed body" are different states
//! - An empty-string parameter is a value, never replaced by a default

use std::any::Any;
use std::collections::BTreeMap;

use crate::provider::ServerMessage;

/// Normalized, read-only view of one incoming request.
#[derive(Debug)]
pub struct CanonicalRequest {
    provider: &'static str,
    message: Box<dyn ServerMessage>,
    query_params: BTreeMap<String, String>,
    parsed_body: Option<BTreeMap<String, String>>,
}

impl CanonicalRequest {
    pub(crate) fn new(
        provider: &'static str,
        message: Box<dyn ServerMessage>,
        query_params: BTreeMap<String, String>,
        parsed_body: Option<BTreeMap<String, String>>,
    ) -> Self {
        Self {
            provider,
            message,
            query_params,
            parsed_body,
        }
    }

    /// Name of the provider that built the underlying request object.
    pub fn provider(&self) -> &'static str {
        self.provider
    }

    /// The provider's request object, for identity checks.
    pub fn inner(&self) -> &dyn Any {
        self.message.as_any()
    }

    pub fn method(&self) -> &str {
        self.message.method()
    }

    /// True only for the exact method `POST`.
    pub fn is_post(&self) -> bool {
        self.method() == "POST"
    }

    /// The URI as serialized by the provider.
    pub fn uri(&self) -> String {
        self.message.uri()
    }

    pub fn scheme(&self) -> Option<&str> {
        self.message.scheme()
    }

    pub fn host(&self) -> Option<&str> {
        self.message.host()
    }

    pub fn path(&self) -> &str {
        self.message.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.message.query()
    }

    /// Values for `name`, case-insensitive; empty when absent.
    pub fn header(&self, name: &str) -> Vec<String> {
        self.message.header(name)
    }

    pub fn has_header(&self, name: &str) -> bool {
        !self.header(name).is_empty()
    }

    /// All headers in insertion order, names lowercase.
    pub fn headers(&self) -> Vec<(String, Vec<String>)> {
        self.message
            .header_names()
            .into_iter()
            .map(|name| {
                let values = self.message.header(&name);
                (name, values)
            })
            .collect()
    }

    pub fn query_params(&self) -> &BTreeMap<String, String> {
        &self.query_params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    pub fn param_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.param(name).unwrap_or(default)
    }

    /// Decoded form body, `None` when the body was not form-encoded.
    pub fn parsed_body(&self) -> Option<&BTreeMap<String, String>> {
        self.parsed_body.as_ref()
    }

    pub fn parsed_body_param(&self, name: &str) -> Option<&str> {
        self.parsed_body
            .as_ref()
            .and_then(|body| body.get(name))
            .map(String::as_str)
    }

    pub fn parsed_body_param_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.parsed_body_param(name).unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::http_message::HttpMessageFactory;
    use crate::provider::MessageFactory;

    fn to_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn request(
        method: &str,
        query: &[(&str, &str)],
        body: Option<&[(&str, &str)]>,
    ) -> CanonicalRequest {
        let message = HttpMessageFactory
            .create_server_request(method, "http://example.com/index.php")
            .unwrap();
        CanonicalRequest::new("http", message, to_map(query), body.map(to_map))
    }

    #[test]
    fn test_param_fallback() {
        let req = request("GET", &[("foo", "bar"), ("empty", "")], None);
        assert_eq!(req.param("foo"), Some("bar"));
        assert_eq!(req.param_or("missing", "default"), "default");
        assert_eq!(req.param_or("empty", "default"), "");
        assert_eq!(req.param("missing"), None);
    }

    #[test]
    fn test_parsed_body_empty_string_is_kept() {
        let req = request("POST", &[], Some(&[("input1", "value1"), ("input3", "")]));
        assert_eq!(req.parsed_body_param("input1"), Some("value1"));
        assert_eq!(req.parsed_body_param_or("input3", "default"), "");
        assert_eq!(req.parsed_body_param("missing"), None);
        assert_eq!(req.parsed_body_param_or("missing", "default"), "default");
    }

    #[test]
    fn test_absent_vs_empty_body() {
        let absent = request("POST", &[], None);
        assert!(absent.parsed_body().is_none());

        let empty = request("POST", &[], Some(&[]));
        assert_eq!(empty.parsed_body().map(BTreeMap::len), Some(0));
    }

    #[test]
    fn test_is_post_is_case_sensitive() {
        assert!(request("POST", &[], None).is_post());
        assert!(!request("post", &[], None).is_post());
        assert!(!request("GET", &[], None).is_post());
    }
}
