//! Error taxonomy of the authentication/authorization boundary.
//!
//! Every variant carries enough detail for operators (it is logged), but the
//! transport layer must only ever expose a fixed message per kind.

use thiserror::Error;

use retailx_core::{DomainError, Subject};

use crate::routes::RouteScope;

/// Why a presented token was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed: {0}")]
    Malformed(String),

    #[error("token signature does not verify")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("token has no subject")]
    MissingSubject,

    #[error("token issuer '{0}' is not trusted")]
    WrongIssuer(String),

    #[error("token could not be encoded: {0}")]
    Encoding(String),
}

/// Bad, missing or expired credentials (maps to "unauthenticated").
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    /// Unknown subject or wrong secret; the two are deliberately merged.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("no credentials presented")]
    MissingCredentials,

    #[error("invalid token: {0}")]
    InvalidToken(#[from] TokenError),
}

/// A valid identity without the scope a route requires (maps to "forbidden").
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    #[error("insufficient scope: '{required}' required")]
    InsufficientScope { required: RouteScope },
}

/// Outcome of a denied authorization gate check.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessDenied {
    #[error(transparent)]
    Unauthenticated(#[from] AuthenticationError),

    #[error(transparent)]
    Forbidden(#[from] AuthorizationError),
}

/// Startup-time configuration failures. Never produced per request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("signing secret is missing")]
    MissingSecret,

    #[error("signing secret is too short ({len} bytes, at least {min} required)")]
    WeakSecret { len: usize, min: usize },

    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidRoutePattern { pattern: String, reason: String },

    #[error("token validity window must be positive")]
    InvalidValidity,

    #[error("token issuer must not be empty")]
    MissingIssuer,

    #[error("invalid password hashing parameters: {0}")]
    InvalidHashParams(String),
}

/// Failure reported by a credential store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("subject '{0}' is already registered")]
    Duplicate(Subject),

    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by login/registration flows.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Authentication(#[from] AuthenticationError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}
