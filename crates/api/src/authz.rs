//! Authorization gate: compares the scope the classifier assigned to the
//! request with the authorities in its security context.
//!
//! Runs after [`crate::middleware::auth_middleware`] and before any handler.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use retailx_auth::{AccessDenied, RouteScope, SecurityContext, authorize};

use crate::app::errors::ApiError;
use crate::context::ResolvedScope;

pub async fn authz_middleware(req: Request, next: Next) -> Response {
    // Without a classification the interceptor did not run: fail closed.
    let scope = req
        .extensions()
        .get::<ResolvedScope>()
        .map(|s| s.0)
        .unwrap_or(RouteScope::Authenticated);

    let decision = match req.extensions().get::<SecurityContext>() {
        Some(ctx) => authorize(scope, ctx),
        None => authorize(scope, &SecurityContext::anonymous()),
    };

    match decision {
        Ok(()) => next.run(req).await,
        Err(denied) => {
            log_denial(&denied, scope);
            ApiError::from(denied).into_response()
        }
    }
}

fn log_denial(denied: &AccessDenied, scope: RouteScope) {
    match denied {
        AccessDenied::Unauthenticated(e) => {
            tracing::debug!(%scope, error = %e, "request denied: unauthenticated")
        }
        AccessDenied::Forbidden(e) => {
            tracing::warn!(%scope, error = %e, "request denied: forbidden")
        }
    }
}
