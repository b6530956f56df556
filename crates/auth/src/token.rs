//! Signed, time-bounded identity tokens (HS256 JWT).
//!
//! The codec only ever trusts its own algorithm; signature checks are done by
//! `jsonwebtoken` (constant-time HMAC comparison), claim checks by
//! [`validate_claims`].

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use retailx_core::Subject;

use crate::claims::{TokenClaims, validate_claims};
use crate::{Authorities, ConfigError, Principal, TokenError};

/// Minimum HMAC key length accepted at startup (256 bits).
pub const MIN_SECRET_LEN: usize = 32;

/// Default validity window of an issued token (24 hours).
pub const DEFAULT_VALIDITY_SECS: i64 = 24 * 60 * 60;

pub const DEFAULT_ISSUER: &str = "RetailX";

/// Symmetric signing key shared by every issuer and validator in the process.
#[derive(Clone)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if bytes.len() < MIN_SECRET_LEN {
            return Err(ConfigError::WeakSecret {
                len: bytes.len(),
                min: MIN_SECRET_LEN,
            });
        }
        Ok(Self(bytes))
    }

    /// Build from an optional configuration value; absence is fatal.
    pub fn from_config(value: Option<&str>) -> Result<Self, ConfigError> {
        match value {
            Some(v) => Self::new(v.as_bytes()),
            None => Err(ConfigError::MissingSecret),
        }
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl core::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

/// Issuer tag and validity window for minted tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSettings {
    issuer: String,
    validity: Duration,
}

impl TokenSettings {
    pub fn new(issuer: impl Into<String>, validity: Duration) -> Result<Self, ConfigError> {
        let issuer = issuer.into();
        if issuer.trim().is_empty() {
            return Err(ConfigError::MissingIssuer);
        }
        if validity <= Duration::zero() {
            return Err(ConfigError::InvalidValidity);
        }
        Ok(Self { issuer, validity })
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            issuer: DEFAULT_ISSUER.to_string(),
            validity: Duration::seconds(DEFAULT_VALIDITY_SECS),
        }
    }
}

/// Opaque serialized token handed to the client.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl core::fmt::Debug for Token {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

/// Per-request token validation contract.
///
/// Implementations must be safe to call concurrently without locking.
pub trait TokenValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, TokenError>;
}

/// HS256 issuer/validator over a process-wide [`SigningSecret`].
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    settings: TokenSettings,
}

impl Hs256TokenCodec {
    pub fn new(secret: &SigningSecret, settings: TokenSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time window and issuer are checked by `validate_claims` against an
        // injected clock.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::new();

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            settings,
        }
    }

    pub fn settings(&self) -> &TokenSettings {
        &self.settings
    }

    /// Mint a token for `subject` valid from `now` for the configured window.
    pub fn issue(
        &self,
        subject: &Subject,
        authorities: &Authorities,
        now: DateTime<Utc>,
    ) -> Result<Token, TokenError> {
        let principal = Principal::new(subject.clone(), authorities.iter().cloned());
        self.issue_for(&principal, now)
    }

    /// Claims carry whole seconds: `iat` rounds down and `exp` rounds up, so
    /// the token is accepted for the whole window after `now` and rejected
    /// from the first whole second at or past `now + validity`.
    pub fn issue_for(&self, principal: &Principal, now: DateTime<Utc>) -> Result<Token, TokenError> {
        let issued_at = whole_second(now.timestamp())?;
        let end = now
            .checked_add_signed(self.settings.validity)
            .ok_or_else(|| TokenError::Encoding("expiry out of range".into()))?;
        let expires_at = if end.timestamp_subsec_nanos() == 0 {
            end
        } else {
            whole_second(end.timestamp() + 1)?
        };
        let claims = TokenClaims::for_principal(principal, &self.settings.issuer, issued_at, expires_at);

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map(Token)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verify the signature and claims of `token` and extract its principal.
    pub fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, TokenError> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map_err(map_jwt_error)?;
        validate_claims(&data.claims, &self.settings.issuer, now)?;
        data.claims.into_principal()
    }
}

impl TokenValidator for Hs256TokenCodec {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, TokenError> {
        self.decode(token, now)
    }
}

fn whole_second(secs: i64) -> Result<DateTime<Utc>, TokenError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| TokenError::Encoding(format!("timestamp {secs} out of range")))
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::BadSignature,
        _ => TokenError::Malformed(err.to_string()),
    }
}
