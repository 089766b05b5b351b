//! Caller identity resolution.
//!
//! Authentication itself (the OAuth2 login flow) is an external concern;
//! by the time a request reaches this service a trusted proxy has already
//! resolved the caller and stamped a header with a stable, email-like
//! identifier. Anonymous requests simply lack the header.

use axum::http::HeaderMap;

/// Resolves the caller's ownership key from an incoming request.
pub trait IdentityResolver: Send + Sync {
    /// Return the stable caller identifier, or `None` for anonymous.
    fn resolve(&self, headers: &HeaderMap) -> Option<String>;
}

/// Header-based resolver reading the configured trusted header.
pub struct HeaderIdentity {
    header_name: String,
}

impl HeaderIdentity {
    /// Build a resolver for the given header name.
    pub fn new(header_name: impl Into<String>) -> Self {
        Self {
            header_name: header_name.into(),
        }
    }
}

impl IdentityResolver for HeaderIdentity {
    fn resolve(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get(&self.header_name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }
}
