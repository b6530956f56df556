//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `routes/`: HTTP handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses
//!
//! Layer order per request: CORS (`cors`) -> interceptor (`middleware`) ->
//! gate (`authz`) -> handler. All of them wrap the fallback too, so unknown
//! paths are still gated.

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use retailx_auth::{
    AccountService, CredentialStore, Hs256TokenCodec, InMemoryCredentialStore, Password,
    PasswordHasher, Role, RouteClassifier,
};

use crate::config::{ApiConfig, ConfigLoadError};
use crate::{authz, cors, middleware};

pub mod dto;
pub mod errors;
pub mod routes;

#[derive(Debug, thiserror::Error)]
pub enum AppBuildError {
    #[error(transparent)]
    Config(#[from] ConfigLoadError),

    #[error("failed to initialise accounts: {0}")]
    Accounts(#[from] retailx_auth::AccountError),
}

/// Build the full HTTP router backed by an in-memory credential store.
pub async fn build_app(config: &ApiConfig) -> Result<Router, AppBuildError> {
    build_app_with_store(config, Arc::new(InMemoryCredentialStore::new())).await
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app_with_store(
    config: &ApiConfig,
    store: Arc<dyn CredentialStore>,
) -> Result<Router, AppBuildError> {
    let secret = config.signing_secret().map_err(ConfigLoadError::from)?;
    let settings = config.token_settings().map_err(ConfigLoadError::from)?;
    let rules = config.route_rules().map_err(ConfigLoadError::from)?;
    let hasher = PasswordHasher::new(config.password_hash).map_err(ConfigLoadError::from)?;

    let codec = Arc::new(Hs256TokenCodec::new(&secret, settings));
    tracing::info!(
        issuer = codec.settings().issuer(),
        validity_secs = codec.settings().validity().num_seconds(),
        "token codec ready"
    );
    let accounts = Arc::new(AccountService::new(store, hasher, codec.clone())?);

    if let Some(admin) = &config.bootstrap_admin {
        seed_admin(&accounts, &admin.subject, &Password::new(admin.password.clone())).await?;
    }

    let auth_state = middleware::AuthState {
        validator: codec,
        classifier: Arc::new(RouteClassifier::new(rules)),
        token_header: config.token_header()?,
    };

    let router = routes::router()
        .fallback(routes::system::not_found)
        .layer(Extension(accounts))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    auth_state,
                    middleware::auth_middleware,
                ))
                .layer(axum::middleware::from_fn(authz::authz_middleware)),
        );

    Ok(match cors::cors_layer(&config.cors)? {
        Some(layer) => router.layer(layer),
        None => router,
    })
}

async fn seed_admin(
    accounts: &AccountService,
    subject: &str,
    password: &Password,
) -> Result<(), retailx_auth::AccountError> {
    match accounts.provision(subject, password, [Role::ADMIN, Role::USER]).await {
        Ok(p) => {
            tracing::info!(subject = %p.subject(), "bootstrap admin provisioned");
            Ok(())
        }
        Err(retailx_auth::AccountError::Store(retailx_auth::StoreError::Duplicate(s))) => {
            tracing::info!(subject = %s, "bootstrap admin already present");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
