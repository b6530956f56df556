//! Cross-origin policy for browser clients.
//!
//! Installed outside the interceptor so a preflight is answered before any
//! token handling, and so 401/403 responses still carry the CORS headers.

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::config::{ConfigLoadError, CorsSettings};

/// Build the layer, or `None` when no origin is allowed.
///
/// Methods and request headers are mirrored from the preflight, the form of
/// "allow all" that stays valid together with credentials.
pub fn cors_layer(settings: &CorsSettings) -> Result<Option<CorsLayer>, ConfigLoadError> {
    if settings.allowed_origins.is_empty() {
        return Ok(None);
    }

    let wildcard = settings.allowed_origins.iter().any(|o| o == "*");
    if wildcard && settings.allow_credentials {
        return Err(ConfigLoadError::InvalidCors(
            "origin '*' cannot be combined with credentials".into(),
        ));
    }

    let origins = if wildcard {
        AllowOrigin::any()
    } else {
        let list = settings
            .allowed_origins
            .iter()
            .map(|o| {
                HeaderValue::from_str(o)
                    .map_err(|_| ConfigLoadError::InvalidCors(format!("invalid origin '{o}'")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        AllowOrigin::list(list)
    };

    let exposed = settings
        .exposed_headers
        .iter()
        .map(|h| {
            HeaderName::from_bytes(h.as_bytes())
                .map_err(|_| ConfigLoadError::InvalidCors(format!("invalid header name '{h}'")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(settings.allow_credentials)
            .expose_headers(exposed)
            .max_age(Duration::from_secs(settings.max_age_secs)),
    ))
}
