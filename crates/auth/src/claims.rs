use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use retailx_core::Subject;

use crate::{Principal, Role, TokenError};

/// Claim set carried inside a signed token.
///
/// Timestamps use whole seconds (JWT NumericDate). `sub` and `authorities`
/// are optional at the serde layer so that a token lacking them surfaces as a
/// precise [`TokenError`] rather than a generic parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject / principal identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Granted authorities, sorted and deduplicated.
    #[serde(default)]
    pub authorities: Vec<Role>,

    /// Issuer tag.
    pub iss: String,

    /// Issued-at timestamp.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub iat: DateTime<Utc>,

    /// Expiration timestamp.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,

    /// Unique token id, only used for log correlation.
    pub jti: Uuid,
}

impl TokenClaims {
    pub fn for_principal(
        principal: &Principal,
        issuer: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: Some(principal.subject().to_string()),
            authorities: principal.authorities().iter().cloned().collect(),
            iss: issuer.to_string(),
            iat: issued_at,
            exp: expires_at,
            jti: Uuid::now_v7(),
        }
    }

    /// Rebuild the principal the claims vouch for.
    pub fn into_principal(self) -> Result<Principal, TokenError> {
        let raw = self.sub.ok_or(TokenError::MissingSubject)?;
        let subject = Subject::parse(&raw).map_err(|_| TokenError::MissingSubject)?;
        Ok(Principal::new(subject, self.authorities))
    }
}

/// Deterministically validate the claim window and issuer.
///
/// The token is valid for `iat <= now < exp`. Signature verification happens
/// before this is called.
pub fn validate_claims(
    claims: &TokenClaims,
    expected_issuer: &str,
    now: DateTime<Utc>,
) -> Result<(), TokenError> {
    if claims.iss != expected_issuer {
        return Err(TokenError::WrongIssuer(claims.iss.clone()));
    }
    if claims.exp <= claims.iat {
        return Err(TokenError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenError::Expired);
    }
    Ok(())
}
