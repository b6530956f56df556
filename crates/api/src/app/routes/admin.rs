//! Admin-scope endpoints (`/api/admin/**`).

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::Path,
    routing::get,
};

use retailx_auth::AccountService;
use retailx_core::Subject;

use crate::app::dto::PrincipalView;
use crate::app::errors::ApiError;

pub fn router() -> Router {
    Router::new().route("/principals/:subject", get(get_principal))
}

/// GET /api/admin/principals/:subject - stored authorities of an account
pub async fn get_principal(
    Extension(accounts): Extension<Arc<AccountService>>,
    Path(subject): Path<String>,
) -> Result<Json<PrincipalView>, ApiError> {
    let subject = Subject::parse(&subject).map_err(|_| ApiError::NotFound)?;
    let principal = accounts.lookup(&subject).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(PrincipalView::from(&principal)))
}
