use axum::{Json, http::StatusCode};

use crate::app::dto::PrincipalView;
use crate::app::errors::ApiError;
use crate::context::CurrentPrincipal;

pub async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "Service is up and running")
}

/// The caller's own identity, as established by its token.
pub async fn whoami(CurrentPrincipal(principal): CurrentPrincipal) -> Json<PrincipalView> {
    Json(PrincipalView::from(&principal))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
