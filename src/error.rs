//! Error definitions for request construction.

use thiserror::Error;

/// Errors raised while resolving a provider or building a request.
#[derive(Debug, Error)]
pub enum Error {
    /// None of the candidate message factories is compiled into this build.
    #[error("No HTTP server request factories found.")]
    NoProviderAvailable,

    /// The factory could not parse the target URI.
    #[error("Invalid URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    /// The request method is not a valid HTTP token.
    #[error("Invalid HTTP method '{0}'")]
    InvalidMethod(String),
}

impl Error {
    pub(crate) fn invalid_uri(uri: &str, reason: impl ToString) -> Self {
        Self::InvalidUri {
            uri: uri.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for request construction.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NoProviderAvailable;
        assert_eq!(err.to_string(), "No HTTP server request factories found.");

        let err = Error::invalid_uri("not a uri", "relative URL without a base");
        assert!(err.to_string().contains("not a uri"));
        assert!(err.to_string().contains("relative URL"));

        let err = Error::InvalidMethod("GE T".into());
        assert_eq!(err.to_string(), "Invalid HTTP method 'GE T'");
    }
}
