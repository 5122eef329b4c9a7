//! HTTP request handling subsystem.
//!
//! # Data Flow
//! ```text
//! axum Request
//!     → environment.rs (CGI-style snapshot: GET, POST, server vars)
//!     → normalizer.rs (provider builds the request object)
//!     → request.rs (CanonicalRequest, the read API)
//!     → server.rs (auth decision, JSON answer)
//! ```

pub mod environment;
pub mod normalizer;
pub mod request;
pub mod server;

pub use environment::Environment;
pub use normalizer::{HeaderSource, ServerRequestFactory};
pub use request::CanonicalRequest;
pub use server::GatewayServer;
