//! Consistent error responses.
//!
//! Authentication and authorization failures always render a fixed body per
//! kind; the internal cause is logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use retailx_auth::{AccessDenied, AccountError, AuthenticationError, StoreError};
use retailx_core::DomainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Missing, invalid or expired token.
    Unauthenticated,
    /// Login failed (unknown subject or wrong secret, indistinguishably).
    InvalidCredentials,
    /// Authenticated, but the route needs a scope the principal lacks.
    Forbidden,
    Validation(String),
    /// Request path with dot or empty segments.
    InvalidPath,
    Conflict,
    NotFound,
    Internal,
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                "authentication required".into(),
            ),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "invalid username or password".into(),
            ),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "forbidden",
                "insufficient scope".into(),
            ),
            ApiError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
            }
            ApiError::InvalidPath => (
                StatusCode::BAD_REQUEST,
                "invalid_path",
                "request path is not canonical".into(),
            ),
            ApiError::Conflict => (
                StatusCode::CONFLICT,
                "conflict",
                "account already exists".into(),
            ),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "not_found", "not found".into()),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal error".into(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        json_error(status, code, message)
    }
}

impl From<AuthenticationError> for ApiError {
    fn from(err: AuthenticationError) -> Self {
        match err {
            AuthenticationError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthenticationError::MissingCredentials | AuthenticationError::InvalidToken(_) => {
                ApiError::Unauthenticated
            }
        }
    }
}

impl From<AccessDenied> for ApiError {
    fn from(err: AccessDenied) -> Self {
        match err {
            AccessDenied::Unauthenticated(e) => e.into(),
            AccessDenied::Forbidden(_) => ApiError::Forbidden,
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Authentication(e) => e.into(),
            AccountError::Domain(DomainError::Validation(msg)) => ApiError::Validation(msg),
            AccountError::Domain(DomainError::InvalidSubject(_)) => {
                ApiError::Validation("invalid email".into())
            }
            AccountError::Store(StoreError::Duplicate(_)) => ApiError::Conflict,
            AccountError::Store(StoreError::Unavailable(_))
            | AccountError::Token(_)
            | AccountError::Hashing(_) => {
                tracing::error!(error = %err, "account operation failed");
                ApiError::Internal
            }
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use retailx_auth::{AuthorizationError, RouteScope, TokenError};

    #[test]
    fn token_failures_collapse_to_unauthenticated() {
        for e in [
            TokenError::Expired,
            TokenError::BadSignature,
            TokenError::MissingSubject,
            TokenError::Malformed("x".into()),
        ] {
            assert_eq!(
                ApiError::from(AuthenticationError::InvalidToken(e)),
                ApiError::Unauthenticated
            );
        }
    }

    #[test]
    fn unauthenticated_and_forbidden_are_distinct() {
        let unauth = ApiError::from(AccessDenied::from(AuthenticationError::MissingCredentials));
        let forbidden = ApiError::from(AccessDenied::from(AuthorizationError::InsufficientScope {
            required: RouteScope::Admin,
        }));
        assert_eq!(unauth.into_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(forbidden.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn internal_detail_is_not_exposed() {
        let err = ApiError::from(AccountError::Store(StoreError::Unavailable(
            "connection refused to 10.0.0.7".into(),
        )));
        assert_eq!(err, ApiError::Internal);
        let (_, _, message) = err.parts();
        assert_eq!(message, "internal error");
    }
}
