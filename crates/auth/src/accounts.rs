//! Login and registration flows: credential verification followed by token
//! issuance.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use retailx_core::{DomainError, Subject};

use crate::credentials::{CredentialRecord, CredentialStore, CredentialVerifier};
use crate::password::{Password, PasswordHasher};
use crate::token::{Hs256TokenCodec, Token};
use crate::{AccountError, Authorities, Principal, Role};

pub const MIN_PASSWORD_LEN: usize = 8;

/// A freshly authenticated principal and the token minted for it.
#[derive(Debug, Clone)]
pub struct Session {
    pub principal: Principal,
    pub token: Token,
}

pub struct AccountService {
    store: Arc<dyn CredentialStore>,
    verifier: CredentialVerifier,
    hasher: PasswordHasher,
    codec: Arc<Hs256TokenCodec>,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        codec: Arc<Hs256TokenCodec>,
    ) -> Result<Self, AccountError> {
        let verifier = CredentialVerifier::new(store.clone(), hasher.clone())?;
        Ok(Self {
            store,
            verifier,
            hasher,
            codec,
        })
    }

    /// Verify `subject`/`password` and mint a token.
    pub async fn login(
        &self,
        subject: &str,
        password: &Password,
        now: DateTime<Utc>,
    ) -> Result<Session, AccountError> {
        let principal = self.verifier.authenticate(subject, password).await?;
        let token = self.codec.issue_for(&principal, now)?;
        tracing::info!(subject = %principal.subject(), "login succeeded");
        Ok(Session { principal, token })
    }

    /// Create a new account with the default `user` authority and mint a token.
    pub async fn register(
        &self,
        subject: &str,
        password: &Password,
        now: DateTime<Utc>,
    ) -> Result<Session, AccountError> {
        let principal = self.provision(subject, password, [Role::USER]).await?;
        let token = self.codec.issue_for(&principal, now)?;
        tracing::info!(subject = %principal.subject(), "account registered");
        Ok(Session { principal, token })
    }

    /// Store a credential with explicit authorities (used for bootstrap accounts).
    pub async fn provision(
        &self,
        subject: &str,
        password: &Password,
        authorities: impl IntoIterator<Item = Role>,
    ) -> Result<Principal, AccountError> {
        let subject = Subject::parse(subject)?;
        if password.len() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            ))
            .into());
        }

        let authorities: Authorities = authorities.into_iter().collect();
        let record = CredentialRecord {
            subject: subject.clone(),
            password_hash: self.hasher.hash_async(password).await?,
            authorities: authorities.clone(),
        };
        self.store.insert(record).await?;

        Ok(Principal::new(subject, authorities))
    }

    /// Stored authorities of `subject`, if the account exists.
    pub async fn lookup(&self, subject: &Subject) -> Result<Option<Principal>, AccountError> {
        Ok(self
            .store
            .find(subject)
            .await?
            .map(|r| Principal::new(r.subject, r.authorities)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::InMemoryCredentialStore;
    use crate::password::cheap_hasher;
    use crate::token::{SigningSecret, TokenSettings};
    use crate::{AuthenticationError, StoreError};
    use chrono::{Duration, TimeZone};

    fn service() -> (AccountService, Arc<Hs256TokenCodec>) {
        let codec = Arc::new(Hs256TokenCodec::new(
            &SigningSecret::new("0123456789abcdef0123456789abcdef").unwrap(),
            TokenSettings::default(),
        ));
        let store = Arc::new(InMemoryCredentialStore::new());
        (
            AccountService::new(store, cheap_hasher(), codec.clone()).unwrap(),
            codec,
        )
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn register_assigns_user_authority_and_issues_token() {
        let (svc, codec) = service();
        let session = svc
            .register("New@Shop.io", &Password::new("password1"), now())
            .await
            .unwrap();

        let decoded = codec.decode(session.token.as_str(), now()).unwrap();
        assert_eq!(decoded, session.principal);
        assert_eq!(decoded.subject().as_str(), "new@shop.io");
        assert_eq!(decoded.authorities().iter().collect::<Vec<_>>(), vec![&Role::USER]);
    }

    #[tokio::test]
    async fn login_after_register() {
        let (svc, codec) = service();
        svc.register("a@b.com", &Password::new("password1"), now())
            .await
            .unwrap();

        let later = now() + Duration::hours(2);
        let session = svc
            .login("a@b.com", &Password::new("password1"), later)
            .await
            .unwrap();
        assert!(codec.decode(session.token.as_str(), later).is_ok());

        let err = svc
            .login("a@b.com", &Password::new("password2"), later)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AccountError::Authentication(AuthenticationError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let (svc, _) = service();
        svc.register("a@b.com", &Password::new("password1"), now())
            .await
            .unwrap();
        let err = svc
            .register("A@B.COM", &Password::new("password1"), now())
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::Store(StoreError::Duplicate(_))));
    }

    #[tokio::test]
    async fn short_password_and_bad_subject_are_rejected() {
        let (svc, _) = service();
        let short = svc
            .register("a@b.com", &Password::new("short"), now())
            .await
            .unwrap_err();
        assert!(matches!(short, AccountError::Domain(DomainError::Validation(_))));

        let blank = svc
            .register(" ", &Password::new("password1"), now())
            .await
            .unwrap_err();
        assert!(matches!(blank, AccountError::Domain(DomainError::InvalidSubject(_))));
    }

    #[tokio::test]
    async fn provision_and_lookup_admin() {
        let (svc, _) = service();
        svc.provision("root@shop.io", &Password::new("password1"), [Role::ADMIN, Role::USER])
            .await
            .unwrap();

        let found = svc
            .lookup(&Subject::parse("root@shop.io").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(found.has_authority(&Role::ADMIN));
        assert!(
            svc.lookup(&Subject::parse("ghost@shop.io").unwrap())
                .await
                .unwrap()
                .is_none()
        );
    }
}
