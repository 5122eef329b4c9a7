//! Credential extraction from server variables.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::http::{CanonicalRequest, Environment};

/// Server variables that may carry the user name, highest priority first.
pub const USER_VARS: [&str; 6] = [
    "PHP_AUTH_USER",
    "REMOTE_USER",
    "REDIRECT_REMOTE_USER",
    "AUTH_USER",
    "HTTP_AUTHORIZATION",
    "Authorization",
];

/// Server variables that may carry the password, highest priority first.
pub const PASSWORD_VARS: [&str; 3] = ["PHP_AUTH_PW", "REMOTE_PASSWORD", "AUTH_PASSWORD"];

/// Request parameter naming the user that just logged out.
pub const OLD_USER_PARAM: &str = "old_usr";

/// User and password as sent by the browser.
///
/// `user` is empty when nothing usable was sent or the user just logged out.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn is_empty(&self) -> bool {
        self.user.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Read credentials for one request.
pub fn read(env: &Environment, request: &CanonicalRequest) -> Credentials {
    let mut user = first_non_empty(env, &USER_VARS).unwrap_or_default().to_string();
    let mut password = first_non_empty(env, &PASSWORD_VARS).unwrap_or_default().to_string();

    if let Some((decoded_user, decoded_password)) = decode_basic(&user) {
        user = decoded_user;
        password = decoded_password;
    }

    if let Some(nul) = user.find('\0') {
        user.truncate(nul);
    }

    let old_user = request
        .param(OLD_USER_PARAM)
        .filter(|v| !v.is_empty())
        .or_else(|| request.parsed_body_param(OLD_USER_PARAM).filter(|v| !v.is_empty()));
    if old_user == Some(user.as_str()) {
        user.clear();
    }

    Credentials { user, password }
}

fn first_non_empty<'a>(env: &'a Environment, names: &[&str]) -> Option<&'a str> {
    names.iter().find_map(|name| env.server_non_empty(name))
}

/// Split `Basic <base64(user:password)>`.
///
/// Anything that does not decode to `user:password` with a non-empty user
/// yields `None` and the raw value is kept.
fn decode_basic(value: &str) -> Option<(String, String)> {
    let encoded = value.strip_prefix("Basic ")?;
    let bytes = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(bytes).ok()?;

    match decoded.split_once(':') {
        Some((user, password)) if !user.is_empty() => {
            Some((user.to_string(), password.to_string()))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_basic() {
        let header = format!("Basic {}", STANDARD.encode("root:secret:more"));
        assert_eq!(
            decode_basic(&header),
            Some(("root".to_string(), "secret:more".to_string()))
        );
    }

    #[test]
    fn test_decode_basic_rejects() {
        assert_eq!(decode_basic("Basic Zm9vYmFy"), None);
        assert_eq!(decode_basic("Basic OmZvb2Jhcg=="), None);
        assert_eq!(decode_basic("Basic !!!"), None);
        assert_eq!(decode_basic("BasicTest"), None);
        assert_eq!(decode_basic("Bearer abc"), None);
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials {
            user: "root".into(),
            password: "hunter2".into(),
        };
        let debug = format!("{creds:?}");
        assert!(debug.contains("root"));
        assert!(!debug.contains("hunter2"));
    }
}
