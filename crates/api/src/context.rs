use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use retailx_auth::{Principal, RouteScope, SecurityContext};

use crate::app::errors::ApiError;

/// Scope the route classifier assigned to the current request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ResolvedScope(pub RouteScope);

/// Extractor for handlers that need the authenticated principal.
///
/// Reads the request's [`SecurityContext`]; an empty or absent context is a
/// 401, so handlers never see an anonymous caller by accident.
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SecurityContext>()
            .and_then(SecurityContext::principal)
            .cloned()
            .map(CurrentPrincipal)
            .ok_or(ApiError::Unauthenticated)
    }
}
