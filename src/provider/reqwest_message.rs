//! Provider backed by `reqwest::Request`.

use std::any::Any;

use reqwest::Request;

use crate::error::Result;
use crate::provider::{
    parse_header, parse_method, parse_target, HeaderRejected, MessageFactory, RawTarget,
    ServerMessage,
};

pub const PROVIDER_NAME: &str = "reqwest";

/// Builds [`ReqwestMessage`] values.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReqwestMessageFactory;

impl MessageFactory for ReqwestMessageFactory {
    fn provider(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn create_server_request(&self, method: &str, uri: &str) -> Result<Box<dyn ServerMessage>> {
        // reqwest re-exports the same `http` types axum does.
        let method = parse_method(method)?;
        let (url, target) = parse_target(uri)?;
        Ok(Box::new(ReqwestMessage {
            request: Request::new(method, url),
            target,
        }))
    }
}

/// A `reqwest::Request` plus the target exactly as it was given.
#[derive(Debug)]
pub struct ReqwestMessage {
    request: Request,
    target: RawTarget,
}

impl ReqwestMessage {
    pub fn request(&self) -> &Request {
        &self.request
    }
}

impl ServerMessage for ReqwestMessage {
    fn method(&self) -> &str {
        self.request.method().as_str()
    }

    fn uri(&self) -> String {
        self.target.to_string()
    }

    fn scheme(&self) -> Option<&str> {
        (!self.target.is_origin_form()).then(|| self.request.url().scheme())
    }

    fn host(&self) -> Option<&str> {
        if self.target.is_origin_form() {
            None
        } else {
            self.request.url().host_str()
        }
    }

    fn path(&self) -> &str {
        self.target.path()
    }

    fn query(&self) -> Option<&str> {
        self.target.query()
    }

    fn append_header(&mut self, name: &str, value: &str) -> std::result::Result<(), HeaderRejected> {
        let (name, value) = parse_header(name, value)?;
        self.request.headers_mut().append(name, value);
        Ok(())
    }

    fn header_names(&self) -> Vec<String> {
        self.request
            .headers()
            .keys()
            .map(|k| k.as_str().to_string())
            .collect()
    }

    fn header(&self, name: &str) -> Vec<String> {
        self.request
            .headers()
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
