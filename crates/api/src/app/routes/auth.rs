//! Login and registration endpoints.

use std::sync::Arc;

use axum::{Extension, Json, http::StatusCode};
use chrono::Utc;

use retailx_auth::{AccountService, Password};

use crate::app::dto::{LoginRequest, RegisterRequest, TokenResponse};
use crate::app::errors::ApiError;

/// POST /api/login
pub async fn login(
    Extension(accounts): Extension<Arc<AccountService>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let session = accounts
        .login(&req.email, &Password::new(req.password), Utc::now())
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "login failed");
            ApiError::from(e)
        })?;

    Ok(Json(TokenResponse {
        jwt_token: session.token.into_string(),
    }))
}

/// POST /api/register
pub async fn register(
    Extension(accounts): Extension<Arc<AccountService>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let session = accounts
        .register(&req.email, &Password::new(req.password), Utc::now())
        .await
        .map_err(|e| {
            tracing::info!(error = %e, "registration refused");
            ApiError::from(e)
        })?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            jwt_token: session.token.into_string(),
        }),
    ))
}
