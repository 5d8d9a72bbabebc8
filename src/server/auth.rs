//! Bearer-token authentication for the record API.
//!
//! API tokens are HMAC-SHA256 signed strings of the form
//!
//! ```text
//! {user}:{expiry}:{hex(hmac_sha256(secret, "{user}:{expiry}"))}
//! ```
//!
//! presented via `Authorization: Bearer ...`. Verification checks the expiry
//! first and compares signatures in constant time. The middleware injects an
//! [`Identity`] request extension on success and lets unauthenticated
//! requests pass through as anonymous; handlers that require an identity use
//! the [`Identity`] extractor, which rejects anonymous requests with 401.

use std::time::Duration;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::service::{unix_now, Identity};

use super::handlers::ErrorResponse;

type HmacSha256 = Hmac<Sha256>;

// =============================================================================
// Errors
// =============================================================================

/// Authentication error types.
#[derive(Debug, Clone)]
pub enum AuthError {
    /// No bearer token on a request that requires one
    MissingToken,

    /// Token does not have the expected shape
    MalformedToken,

    /// Token has expired
    Expired {
        /// When the token expired
        expired_at: u64,
        /// Current time
        current_time: u64,
    },

    /// Token signature does not verify
    InvalidSignature,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "Missing bearer token"),
            AuthError::MalformedToken => write!(f, "Malformed bearer token"),
            AuthError::Expired {
                expired_at,
                current_time,
            } => write!(
                f,
                "Token expired at {} (current time: {})",
                expired_at, current_time
            ),
            AuthError::InvalidSignature => write!(f, "Invalid token signature"),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "missing_token"),
            AuthError::MalformedToken => (StatusCode::BAD_REQUEST, "malformed_token"),
            AuthError::Expired { .. } => (StatusCode::UNAUTHORIZED, "token_expired"),
            AuthError::InvalidSignature => (StatusCode::UNAUTHORIZED, "invalid_signature"),
        };
        let message = self.to_string();

        // An invalid signature could indicate an attack; expired tokens are
        // common and expected.
        match &self {
            AuthError::InvalidSignature => {
                warn!(
                    error_type = error_type,
                    status = status.as_u16(),
                    "Authentication failed: {}",
                    message
                );
            }
            _ => {
                debug!(
                    error_type = error_type,
                    status = status.as_u16(),
                    "Authentication failed: {}",
                    message
                );
            }
        }

        let error_response = ErrorResponse::with_status(error_type, message, status);
        (status, Json(error_response)).into_response()
    }
}

// =============================================================================
// Token Authenticator
// =============================================================================

/// API token authenticator using HMAC-SHA256.
#[derive(Clone)]
pub struct ApiTokenAuth {
    /// Secret key for HMAC computation
    secret_key: Vec<u8>,
}

impl ApiTokenAuth {
    /// Create a new authenticator with the given secret key.
    ///
    /// The key should be at least 32 bytes for security.
    pub fn new(secret_key: impl AsRef<[u8]>) -> Self {
        Self {
            secret_key: secret_key.as_ref().to_vec(),
        }
    }

    /// Issue a token for a user, valid for `ttl`.
    ///
    /// Returns the token and its expiry timestamp (unix seconds).
    pub fn issue(&self, user: &str, ttl: Duration) -> (String, u64) {
        let expiry = unix_now() + ttl.as_secs();
        (self.issue_with_expiry(user, expiry), expiry)
    }

    /// Issue a token with a specific expiry timestamp.
    pub fn issue_with_expiry(&self, user: &str, expiry: u64) -> String {
        let signature = self.compute_signature(user, expiry);
        format!("{user}:{expiry}:{signature}")
    }

    /// Verify a token and return the identity it carries.
    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        // rsplit so user names may themselves contain ':'
        let mut parts = token.rsplitn(3, ':');
        let signature = parts.next().ok_or(AuthError::MalformedToken)?;
        let expiry_str = parts.next().ok_or(AuthError::MalformedToken)?;
        let user = parts.next().ok_or(AuthError::MalformedToken)?;
        if user.is_empty() {
            return Err(AuthError::MalformedToken);
        }

        let expiry: u64 = expiry_str.parse().map_err(|_| AuthError::MalformedToken)?;
        let current_time = unix_now();
        if current_time > expiry {
            return Err(AuthError::Expired {
                expired_at: expiry,
                current_time,
            });
        }

        let provided = hex::decode(signature).map_err(|_| AuthError::MalformedToken)?;
        let expected_hex = self.compute_signature(user, expiry);
        let expected = hex::decode(&expected_hex).map_err(|_| AuthError::MalformedToken)?;

        if provided.ct_eq(&expected).into() {
            Ok(Identity::new(user))
        } else {
            Err(AuthError::InvalidSignature)
        }
    }

    /// Compute the HMAC-SHA256 signature over `"{user}:{expiry}"`.
    fn compute_signature(&self, user: &str, expiry: u64) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.secret_key)
            .expect("HMAC can take key of any size");
        mac.update(user.as_bytes());
        mac.update(b":");
        mac.update(expiry.to_string().as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

// =============================================================================
// Axum Middleware
// =============================================================================

/// Middleware that resolves the caller's identity from a bearer token.
///
/// Requests without an `Authorization` header pass through anonymously;
/// presented tokens must verify or the request is rejected.
pub async fn identity_middleware(
    State(auth): State<ApiTokenAuth>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if let Some(value) = header_value {
        let token = value
            .strip_prefix("Bearer ")
            .ok_or(AuthError::MalformedToken)?;
        let identity = auth.verify(token)?;
        request.extensions_mut().insert(identity);
    }

    Ok(next.run(request).await)
}

/// Middleware that injects a fixed identity when authentication is disabled.
///
/// Only for development and testing.
pub async fn dev_identity_middleware(
    State(user): State<String>,
    mut request: Request,
    next: Next,
) -> Response {
    request.extensions_mut().insert(Identity::new(user));
    next.run(request).await
}

// =============================================================================
// Extractors
// =============================================================================

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or(AuthError::MissingToken)
    }
}

/// Extractor for endpoints that also accept anonymous callers.
#[derive(Debug, Clone)]
pub struct OptionalIdentity(pub Option<Identity>);

impl<S> FromRequestParts<S> for OptionalIdentity
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalIdentity(parts.extensions.get::<Identity>().cloned()))
    }
}

// =============================================================================
// Tests
// =============================================================================
