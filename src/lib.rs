//! Request normalization and HTTP Basic authentication front end for a
//! database administration web UI.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod observability;
pub mod provider;

pub use config::schema::GatewayConfig;
pub use error::{Error, Result};
pub use http::{CanonicalRequest, Environment, GatewayServer, ServerRequestFactory};
pub use provider::{MessageFactory, ProviderResolver, ServerMessage};
