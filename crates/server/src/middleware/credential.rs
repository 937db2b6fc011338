//! Bearer credential extraction.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

/// The raw `Authorization` header, if present and valid UTF-8.
///
/// Handlers fall back to a body-level `authorization` field when this is
/// `None`. The value is passed through untouched; the identity resolver
/// parses the scheme.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationHeader(pub Option<String>);

impl AuthorizationHeader {
    /// Header value, else `fallback`, else the empty string.
    #[must_use]
    pub fn or_body(self, fallback: Option<String>) -> String {
        self.0.or(fallback).unwrap_or_default()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AuthorizationHeader {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned),
        ))
    }
}
