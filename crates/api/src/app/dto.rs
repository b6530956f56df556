//! Request/response DTOs.

use serde::{Deserialize, Serialize};

use retailx_auth::Principal;

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "subject", alias = "username")]
    pub email: String,
    pub password: String,
}

/// Registration payload. Profile fields beyond these belong to the user
/// service and are ignored here.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(rename = "jwt-token")]
    pub jwt_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PrincipalView {
    pub subject: String,
    pub authorities: Vec<String>,
}

impl From<&Principal> for PrincipalView {
    fn from(p: &Principal) -> Self {
        Self {
            subject: p.subject().to_string(),
            authorities: p.authorities().iter().map(|r| r.as_str().to_string()).collect(),
        }
    }
}
