use axum::{
    Router,
    routing::{get, post},
};

pub mod admin;
pub mod auth;
pub mod system;

/// Every HTTP route. Access control is applied around this router, so the
/// handlers themselves never check scopes.
pub fn router() -> Router {
    Router::new()
        .route("/api/health", get(system::health))
        .route("/api/login", post(auth::login))
        .route("/api/register", post(auth::register))
        .route("/api/whoami", get(system::whoami))
        .route("/api/public/profile", get(system::whoami))
        .nest("/api/admin", admin::router())
}
