//! Provider backed by the `http` crate types re-exported by axum.

use std::any::Any;

use axum::http::{Request, Uri};

use crate::error::{Error, Result};
use crate::provider::{
    is_origin_form, parse_header, parse_method, HeaderRejected, MessageFactory, ServerMessage,
};

pub const PROVIDER_NAME: &str = "http";

/// Builds `axum::http::Request<()>` values.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpMessageFactory;

impl MessageFactory for HttpMessageFactory {
    fn provider(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn create_server_request(&self, method: &str, uri: &str) -> Result<Box<dyn ServerMessage>> {
        let method = parse_method(method)?;
        let parsed: Uri = uri.parse().map_err(|e| Error::invalid_uri(uri, e))?;

        // `Uri` also accepts authority-form ("example.com:80"), which is not a request target here.
        if parsed.scheme().is_none() && !is_origin_form(uri) {
            return Err(Error::invalid_uri(uri, "expected an absolute URI or an origin-form path"));
        }

        let mut request = Request::new(());
        *request.method_mut() = method;
        *request.uri_mut() = parsed;
        Ok(Box::new(request))
    }
}

impl ServerMessage for Request<()> {
    fn method(&self) -> &str {
        Request::method(self).as_str()
    }

    fn uri(&self) -> String {
        Request::uri(self).to_string()
    }

    fn scheme(&self) -> Option<&str> {
        Request::uri(self).scheme_str()
    }

    fn host(&self) -> Option<&str> {
        Request::uri(self).host()
    }

    fn path(&self) -> &str {
        Request::uri(self).path()
    }

    fn query(&self) -> Option<&str> {
        Request::uri(self).query()
    }

    fn append_header(&mut self, name: &str, value: &str) -> std::result::Result<(), HeaderRejected> {
        let (name, value) = parse_header(name, value)?;
        self.headers_mut().append(name, value);
        Ok(())
    }

    fn header_names(&self) -> Vec<String> {
        self.headers().keys().map(|k| k.as_str().to_string()).collect()
    }

    fn header(&self, name: &str) -> Vec<String> {
        self.headers()
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_http_request() {
        let message = HttpMessageFactory
            .create_server_request("GET", "http://example.com/")
            .unwrap();
        assert!(message.as_any().downcast_ref::<Request<()>>().is_some());
        assert_eq!(message.method(), "GET");
        assert_eq!(message.uri(), "http://example.com/");
        assert_eq!(message.host(), Some("example.com"));
        assert_eq!(message.scheme(), Some("http"));
    }

    #[test]
    fn test_origin_form_target() {
        let message = HttpMessageFactory
            .create_server_request("GET", "/index.php?route=%2Fdatabase")
            .unwrap();
        assert_eq!(message.uri(), "/index.php?route=%2Fdatabase");
        assert_eq!(message.host(), None);
        assert_eq!(message.query(), Some("route=%2Fdatabase"));
    }

    #[test]
    fn test_rejects_invalid_uri() {
        let err = HttpMessageFactory
            .create_server_request("GET", "not a uri")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUri { .. }));

        let err = HttpMessageFactory
            .create_server_request("GET", "example.com:80")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUri { .. }));
    }

    #[test]
    fn test_headers_keep_order_and_values() {
        let mut message = HttpMessageFactory
            .create_server_request("POST", "http://example.com/")
            .unwrap();
        message.append_header("Host", "example.com").unwrap();
        message.append_header("Accept", "text/html").unwrap();
        message.append_header("accept", "application/json").unwrap();

        assert_eq!(message.header_names(), vec!["host", "accept"]);
        assert_eq!(message.header("ACCEPT"), vec!["text/html", "application/json"]);
        assert!(message.header("missing").is_empty());
    }
}
