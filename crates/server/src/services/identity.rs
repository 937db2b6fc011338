//! Caller identity resolution from bearer credentials.
//!
//! Tokens are HS256 JSON Web Tokens issued by the authentication service
//! with the claims `{ id, email, iat, exp }`. Only `id` is consumed here.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

use farm_report_core::UserId;

const BEARER_SCHEME: &str = "bearer";

/// Errors from credential resolution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// Credential is missing its scheme, malformed, or fails verification.
    #[error("{0}")]
    Invalid(String),

    /// Credential was valid but its validity window has lapsed.
    #[error("{0}")]
    Expired(String),
}

/// Maps a bearer credential to the id of the user it was issued to.
pub trait IdentityResolver: Send + Sync {
    /// Resolve `credential` (e.g. `"Bearer <token>"`) to a user id.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Invalid` for malformed or unverifiable
    /// credentials and `IdentityError::Expired` for lapsed ones.
    fn resolve(&self, credential: &str) -> Result<UserId, IdentityError>;
}

#[derive(Debug, Deserialize)]
struct Claims {
    id: UserId,
}

/// Resolves HS256-signed JWTs against a shared secret.
pub struct JwtIdentityResolver {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityResolver {
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
        }
    }
}

impl std::fmt::Debug for JwtIdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtIdentityResolver")
            .field("key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl IdentityResolver for JwtIdentityResolver {
    fn resolve(&self, credential: &str) -> Result<UserId, IdentityError> {
        let token = strip_bearer(credential)?;

        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims.id)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => IdentityError::Expired("Token has expired".to_owned()),
                _ => {
                    tracing::debug!(error = %e, "rejected credential");
                    IdentityError::Invalid("Invalid token".to_owned())
                }
            })
    }
}

/// Split `"Bearer <token>"` into its token, matching the scheme case-insensitively.
fn strip_bearer(credential: &str) -> Result<&str, IdentityError> {
    let missing = || IdentityError::Invalid("Missing bearer token".to_owned());

    let (scheme, token) = credential.trim().split_once(' ').ok_or_else(missing)?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(missing());
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(missing());
    }
    Ok(token)
}
