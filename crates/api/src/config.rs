//! Process configuration.
//!
//! Sources are merged in this order (later sources override earlier):
//! 1. Defaults from [`ApiConfig::default()`]
//! 2. TOML file (`$RETAILX_CONFIG`, else `./retailx.toml` if present)
//! 3. `JWT_SECRET`
//! 4. `RETAILX_*` environment variables, `__` separating nested keys
//!    (e.g. `RETAILX_ROUTES__ADMIN`, `RETAILX_PASSWORD_HASH__MEMORY_KIB`)
//!
//! Everything is validated at load time; a bad value fails startup.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::http::HeaderName;
use chrono::Duration;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use retailx_auth::{ConfigError, HashCost, RouteRules, SigningSecret, TokenSettings};
use retailx_observability::LogFormat;

pub const ENV_PREFIX: &str = "RETAILX_";
pub const CONFIG_PATH_ENV: &str = "RETAILX_CONFIG";
pub const DEFAULT_CONFIG_FILENAME: &str = "retailx.toml";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read configuration: {0}")]
    Figment(#[from] figment::Error),

    #[error(transparent)]
    Security(#[from] ConfigError),

    #[error("invalid token header name '{0}'")]
    InvalidHeader(String),

    #[error("invalid bind address '{0}'")]
    InvalidBindAddr(String),

    #[error("invalid CORS settings: {0}")]
    InvalidCors(String),
}

/// The three ordered route pattern lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteTable {
    pub public: Vec<String>,
    pub user: Vec<String>,
    pub admin: Vec<String>,
}

impl Default for RouteTable {
    fn default() -> Self {
        let owned = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect();
        Self {
            public: owned(&[
                "/swagger-ui.html",
                "/v3/api-docs/**",
                "/swagger-ui/**",
                "/api/register/**",
                "/api/login",
                "/api/health",
            ]),
            user: owned(&["/api/public/**"]),
            admin: owned(&["/api/admin/**"]),
        }
    }
}

/// Cross-origin policy for browser clients. An empty origin list turns CORS
/// handling off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsSettings {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
    pub exposed_headers: Vec<String>,
    pub max_age_secs: u64,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:4200".to_string()],
            allow_credentials: true,
            exposed_headers: vec!["Authorization".to_string()],
            max_age_secs: 3600,
        }
    }
}

/// Account seeded at startup with `admin` + `user` authorities.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapAdmin {
    pub subject: String,
    pub password: String,
}

impl core::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("subject", &self.subject)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub bind_addr: String,
    /// HMAC signing secret. Required; there is no built-in fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt_secret: Option<String>,
    pub token_validity_secs: i64,
    pub token_issuer: String,
    pub token_header: String,
    pub routes: RouteTable,
    pub password_hash: HashCost,
    pub cors: CorsSettings,
    pub log_format: LogFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            jwt_secret: None,
            token_validity_secs: retailx_auth::token::DEFAULT_VALIDITY_SECS,
            token_issuer: retailx_auth::token::DEFAULT_ISSUER.to_string(),
            token_header: "Authorization".to_string(),
            routes: RouteTable::default(),
            password_hash: HashCost::default(),
            cors: CorsSettings::default(),
            log_format: LogFormat::default(),
            bootstrap_admin: None,
        }
    }
}

impl core::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("token_validity_secs", &self.token_validity_secs)
            .field("token_issuer", &self.token_issuer)
            .field("token_header", &self.token_header)
            .field("routes", &self.routes)
            .field("password_hash", &self.password_hash)
            .field("cors", &self.cors)
            .field("log_format", &self.log_format)
            .field("bootstrap_admin", &self.bootstrap_admin)
            .finish()
    }
}

impl ApiConfig {
    pub fn signing_secret(&self) -> Result<SigningSecret, ConfigError> {
        SigningSecret::from_config(self.jwt_secret.as_deref())
    }

    pub fn token_settings(&self) -> Result<TokenSettings, ConfigError> {
        TokenSettings::new(
            self.token_issuer.clone(),
            Duration::seconds(self.token_validity_secs),
        )
    }

    pub fn route_rules(&self) -> Result<RouteRules, ConfigError> {
        RouteRules::from_patterns(
            self.routes.public.as_slice(),
            self.routes.user.as_slice(),
            self.routes.admin.as_slice(),
        )
    }

    pub fn token_header(&self) -> Result<HeaderName, ConfigLoadError> {
        HeaderName::from_bytes(self.token_header.as_bytes())
            .map_err(|_| ConfigLoadError::InvalidHeader(self.token_header.clone()))
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigLoadError> {
        self.bind_addr
            .parse()
            .map_err(|_| ConfigLoadError::InvalidBindAddr(self.bind_addr.clone()))
    }

    /// Check every derived setting without keeping the results.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        self.signing_secret()?;
        self.token_settings()?;
        self.route_rules()?;
        self.token_header()?;
        self.bind_addr()?;
        retailx_auth::PasswordHasher::new(self.password_hash)?;
        crate::cors::cors_layer(&self.cors)?;
        Ok(())
    }
}

/// Builds an [`ApiConfig`] from defaults, file and environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `$RETAILX_CONFIG` as the config file when it is set.
    pub fn from_env() -> Self {
        Self {
            config_path: std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from),
        }
    }

    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn load(&self) -> Result<ApiConfig, ConfigLoadError> {
        let mut figment = Figment::new().merge(Serialized::defaults(ApiConfig::default()));

        let path = self
            .config_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILENAME));
        if path.exists() {
            figment = figment.merge(Toml::file(&path));
            tracing::info!(path = %path.display(), "configuration file loaded");
        } else if self.config_path.is_some() {
            tracing::warn!(path = %path.display(), "configuration file not found");
        }

        figment = figment
            .merge(Env::raw().only(&["JWT_SECRET"]).map(|_| "jwt_secret".into()))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["CONFIG"]).split("__"));

        let config: ApiConfig = figment.extract()?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn missing_secret_fails_load() {
        Jail::expect_with(|_jail| {
            let err = ConfigLoader::new().load().unwrap_err();
            assert!(matches!(err, ConfigLoadError::Security(ConfigError::MissingSecret)));
            Ok(())
        });
    }

    #[test]
    fn weak_secret_fails_load() {
        Jail::expect_with(|jail| {
            jail.set_env("RETAILX_JWT_SECRET", "too-short");
            let err = ConfigLoader::new().load().unwrap_err();
            assert!(matches!(
                err,
                ConfigLoadError::Security(ConfigError::WeakSecret { .. })
            ));
            Ok(())
        });
    }

    #[test]
    fn defaults_with_env_secret() {
        Jail::expect_with(|jail| {
            jail.set_env("JWT_SECRET", SECRET);
            let cfg = ConfigLoader::new().load().map_err(|e| e.to_string())?;
            assert_eq!(cfg.jwt_secret.as_deref(), Some(SECRET));
            assert_eq!(cfg.token_validity_secs, 86_400);
            assert_eq!(cfg.token_issuer, "RetailX");
            assert_eq!(cfg.routes, RouteTable::default());
            assert_eq!(cfg.log_format, LogFormat::Json);
            Ok(())
        });
    }

    #[test]
    fn file_then_env_precedence() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "retailx.toml",
                r#"
                jwt_secret = "file-secret-file-secret-file-secret"
                token_validity_secs = 3600
                log_format = "compact"

                [routes]
                public = ["/api/login"]
                admin = ["/api/admin/**", "/ops/**"]

                [bootstrap_admin]
                subject = "root@shop.io"
                password = "change-me-now"
                "#,
            )?;
            jail.set_env("RETAILX_TOKEN_VALIDITY_SECS", "60");

            let cfg = ConfigLoader::new().load().map_err(|e| e.to_string())?;
            assert_eq!(cfg.token_validity_secs, 60);
            assert_eq!(cfg.log_format, LogFormat::Compact);
            assert_eq!(cfg.routes.public, vec!["/api/login".to_string()]);
            assert_eq!(cfg.routes.user, RouteTable::default().user);
            assert_eq!(cfg.routes.admin.len(), 2);
            assert_eq!(cfg.bootstrap_admin.as_ref().unwrap().subject, "root@shop.io");
            assert!(!format!("{cfg:?}").contains("change-me-now"));
            assert!(!format!("{cfg:?}").contains("file-secret"));
            Ok(())
        });
    }

    #[test]
    fn malformed_route_pattern_fails_load() {
        Jail::expect_with(|jail| {
            jail.set_env("JWT_SECRET", SECRET);
            jail.create_file("retailx.toml", "[routes]\nadmin = [\"api/admin\"]\n")?;
            let err = ConfigLoader::new().load().unwrap_err();
            assert!(matches!(
                err,
                ConfigLoadError::Security(ConfigError::InvalidRoutePattern { .. })
            ));
            Ok(())
        });
    }

    #[test]
    fn cors_defaults_and_overrides() {
        Jail::expect_with(|jail| {
            jail.set_env("JWT_SECRET", SECRET);
            let cfg = ConfigLoader::new().load().map_err(|e| e.to_string())?;
            assert_eq!(cfg.cors.allowed_origins, vec!["http://localhost:4200".to_string()]);
            assert!(cfg.cors.allow_credentials);
            assert_eq!(cfg.cors.max_age_secs, 3600);

            jail.set_env("RETAILX_CORS__MAX_AGE_SECS", "60");
            let cfg = ConfigLoader::new().load().map_err(|e| e.to_string())?;
            assert_eq!(cfg.cors.max_age_secs, 60);
            Ok(())
        });
    }

    #[test]
    fn wildcard_origin_with_credentials_fails_load() {
        Jail::expect_with(|jail| {
            jail.set_env("JWT_SECRET", SECRET);
            jail.create_file(
                "retailx.toml",
                "[cors]\nallowed_origins = [\"*\"]\nallow_credentials = true\n",
            )?;
            let err = ConfigLoader::new().load().unwrap_err();
            assert!(matches!(err, ConfigLoadError::InvalidCors(_)));
            Ok(())
        });
    }

    #[test]
    fn zero_validity_fails_load() {
        Jail::expect_with(|jail| {
            jail.set_env("JWT_SECRET", SECRET);
            jail.set_env("RETAILX_TOKEN_VALIDITY_SECS", "0");
            let err = ConfigLoader::new().load().unwrap_err();
            assert!(matches!(err, ConfigLoadError::Security(ConfigError::InvalidValidity)));
            Ok(())
        });
    }
}
