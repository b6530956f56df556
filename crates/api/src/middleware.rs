//! Request interceptor: classify, extract the token, validate it, and
//! populate the request's [`SecurityContext`].
//!
//! A missing token is tolerated here (the gate decides); a token that is
//! present but fails validation rejects the request immediately.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use tracing::Instrument;
use uuid::Uuid;

use retailx_auth::{
    AuthenticationError, Principal, RouteClassifier, RouteScope, SecurityContext, TokenValidator,
    is_canonical_path,
};

use crate::app::errors::ApiError;
use crate::context::ResolvedScope;

#[derive(Clone)]
pub struct AuthState {
    pub validator: Arc<dyn TokenValidator>,
    pub classifier: Arc<RouteClassifier>,
    pub token_header: HeaderName,
}

/// Terminal state of the interceptor for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interception {
    /// Public route: validation skipped, context stays empty.
    Skipped,
    /// Protected route without a token: context stays empty.
    Anonymous,
    /// Token validated; principal stored in the context.
    Populated(Principal),
}

impl Interception {
    pub fn into_context(self) -> SecurityContext {
        match self {
            Interception::Skipped | Interception::Anonymous => SecurityContext::anonymous(),
            Interception::Populated(p) => SecurityContext::authenticated(p),
        }
    }
}

/// Transport-independent interception step.
///
/// The header value is used verbatim as the token (no scheme prefix is
/// stripped).
pub fn intercept(
    scope: RouteScope,
    header: Option<&HeaderValue>,
    validator: &dyn TokenValidator,
    now: DateTime<Utc>,
) -> Result<Interception, AuthenticationError> {
    if scope == RouteScope::Public {
        return Ok(Interception::Skipped);
    }

    let Some(header) = header else {
        return Ok(Interception::Anonymous);
    };

    let token = header.to_str().map_err(|_| {
        AuthenticationError::InvalidToken(retailx_auth::TokenError::Malformed(
            "header is not visible ASCII".into(),
        ))
    })?;

    let principal = validator.validate(token, now)?;
    Ok(Interception::Populated(principal))
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let request_id = Uuid::now_v7();

    // The classifier normalizes paths but the router does not; anything the two
    // could read differently is refused before classification.
    if !is_canonical_path(req.uri().path()) {
        tracing::warn!(%request_id, path = %req.uri().path(), "request rejected: non-canonical path");
        return ApiError::InvalidPath.into_response();
    }

    let scope = if is_preflight_request(req.method(), req.headers()) {
        RouteScope::Public
    } else {
        state.classifier.classify(req.uri().path())
    };

    let span = tracing::info_span!(
        "request",
        %request_id,
        method = %req.method(),
        path = %req.uri().path(),
        %scope,
        authenticated = tracing::field::Empty,
    );

    let outcome = intercept(
        scope,
        req.headers().get(&state.token_header),
        state.validator.as_ref(),
        Utc::now(),
    );

    match outcome {
        Ok(interception) => {
            span.in_scope(|| match &interception {
                Interception::Skipped => tracing::trace!("public route, authentication skipped"),
                Interception::Anonymous => tracing::debug!("no token presented"),
                Interception::Populated(p) => {
                    tracing::debug!(subject = %p.subject(), "token accepted")
                }
            });
            let context = interception.into_context();
            span.record("authenticated", context.is_authenticated());
            req.extensions_mut().insert(ResolvedScope(scope));
            req.extensions_mut().insert(context);
            next.run(req).instrument(span).await
        }
        Err(err) => {
            span.in_scope(|| tracing::warn!(error = %err, "request rejected: invalid token"));
            ApiError::from(err).into_response()
        }
    }
}

/// Preflight requests are OPTIONS requests carrying both `Origin` and
/// `Access-Control-Request-Method`.
fn is_preflight_request(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS
        && headers.contains_key(axum::http::header::ORIGIN)
        && headers.contains_key(axum::http::header::ACCESS_CONTROL_REQUEST_METHOD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use retailx_auth::{Authorities, Hs256TokenCodec, Role, SigningSecret, TokenError, TokenSettings};
    use retailx_core::Subject;

    fn codec() -> Hs256TokenCodec {
        Hs256TokenCodec::new(
            &SigningSecret::new("0123456789abcdef0123456789abcdef").unwrap(),
            TokenSettings::default(),
        )
    }

    fn token(codec: &Hs256TokenCodec, now: DateTime<Utc>) -> HeaderValue {
        let subject = Subject::parse("a@b.com").unwrap();
        let t = codec
            .issue(&subject, &Authorities::from([Role::USER]), now)
            .unwrap();
        HeaderValue::from_str(t.as_str()).unwrap()
    }

    #[test]
    fn public_skips_even_with_garbage_token() {
        let garbage = HeaderValue::from_static("garbage");
        assert_eq!(
            intercept(RouteScope::Public, Some(&garbage), &codec(), Utc::now()),
            Ok(Interception::Skipped)
        );
    }

    #[test]
    fn missing_token_is_not_an_error_here() {
        assert_eq!(
            intercept(RouteScope::Admin, None, &codec(), Utc::now()),
            Ok(Interception::Anonymous)
        );
    }

    #[test]
    fn invalid_token_is_fatal() {
        let garbage = HeaderValue::from_static("garbage");
        assert!(matches!(
            intercept(RouteScope::Authenticated, Some(&garbage), &codec(), Utc::now()),
            Err(AuthenticationError::InvalidToken(TokenError::Malformed(_)))
        ));
    }

    #[test]
    fn bearer_prefix_is_not_stripped() {
        let codec = codec();
        let now = Utc::now();
        let raw = token(&codec, now);
        let prefixed = HeaderValue::from_str(&format!("Bearer {}", raw.to_str().unwrap())).unwrap();
        assert!(intercept(RouteScope::User, Some(&prefixed), &codec, now).is_err());
        assert!(matches!(
            intercept(RouteScope::User, Some(&raw), &codec, now),
            Ok(Interception::Populated(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = codec();
        let now = Utc::now();
        let old = token(&codec, now - Duration::hours(25));
        assert_eq!(
            intercept(RouteScope::User, Some(&old), &codec, now),
            Err(AuthenticationError::InvalidToken(TokenError::Expired))
        );
    }
}
