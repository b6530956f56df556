//! `retailx-auth`: stateless authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP. The API layer feeds it a
//! path and a header value and gets back a [`SecurityContext`] or a typed
//! rejection.

pub mod accounts;
pub mod authorize;
pub mod claims;
pub mod context;
pub mod credentials;
pub mod error;
pub mod password;
pub mod principal;
pub mod roles;
pub mod routes;
pub mod token;

pub use accounts::{AccountService, Session};
pub use authorize::authorize;
pub use claims::{TokenClaims, validate_claims};
pub use context::SecurityContext;
pub use credentials::{CredentialRecord, CredentialStore, CredentialVerifier, InMemoryCredentialStore};
pub use error::{
    AccessDenied, AccountError, AuthenticationError, AuthorizationError, ConfigError, StoreError,
    TokenError,
};
pub use password::{HashCost, Password, PasswordHasher};
pub use principal::{Authorities, Principal};
pub use roles::Role;
pub use routes::{RouteClassifier, RoutePattern, RouteRules, RouteScope, is_canonical_path};
pub use token::{Hs256TokenCodec, SigningSecret, Token, TokenSettings, TokenValidator};
