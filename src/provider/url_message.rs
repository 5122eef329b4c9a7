//! Provider backed by `url::Url` with its own header list.

use std::any::Any;

use url::Url;

use crate::error::Result;
use crate::provider::{
    parse_header, parse_method, parse_target, HeaderRejected, MessageFactory, RawTarget,
    ServerMessage,
};

pub const PROVIDER_NAME: &str = "url";

/// Builds [`UrlMessage`] values.
#[derive(Debug, Default, Clone, Copy)]
pub struct UrlMessageFactory;

impl MessageFactory for UrlMessageFactory {
    fn provider(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn create_server_request(&self, method: &str, uri: &str) -> Result<Box<dyn ServerMessage>> {
        let method = parse_method(method)?;
        let (url, target) = parse_target(uri)?;
        Ok(Box::new(UrlMessage {
            method: method.as_str().to_string(),
            url,
            target,
            headers: Vec::new(),
        }))
    }
}

/// A request message made of a method, a `Url` and a header list.
///
/// Path, query and serialization come from the target as sent; the `Url`
/// is its validated, normalized form.
#[derive(Debug, Clone)]
pub struct UrlMessage {
    method: String,
    url: Url,
    target: RawTarget,
    headers: Vec<(String, Vec<String>)>,
}

impl UrlMessage {
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl ServerMessage for UrlMessage {
    fn method(&self) -> &str {
        &self.method
    }

    fn uri(&self) -> String {
        self.target.to_string()
    }

    fn scheme(&self) -> Option<&str> {
        (!self.target.is_origin_form()).then(|| self.url.scheme())
    }

    fn host(&self) -> Option<&str> {
        if self.target.is_origin_form() {
            None
        } else {
            self.url.host_str()
        }
    }

    fn path(&self) -> &str {
        self.target.path()
    }

    fn query(&self) -> Option<&str> {
        self.target.query()
    }

    fn append_header(&mut self, name: &str, value: &str) -> std::result::Result<(), HeaderRejected> {
        let (name, _) = parse_header(name, value)?;
        let name = name.as_str();
        match self.headers.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, values)) => values.push(value.to_string()),
            None => self.headers.push((name.to_string(), vec![value.to_string()])),
        }
        Ok(())
    }

    fn header_names(&self) -> Vec<String> {
        self.headers.iter().map(|(name, _)| name.clone()).collect()
    }

    fn header(&self, name: &str) -> Vec<String> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, values)| values.clone())
            .unwrap_or_default()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
