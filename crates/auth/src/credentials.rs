//! Credential records, the store seam, and username/password verification.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use retailx_core::Subject;

use crate::password::{Password, PasswordHasher};
use crate::{AccountError, AuthenticationError, Authorities, Principal, StoreError};

/// Persisted subject + hashed secret + assigned roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub subject: Subject,
    /// PHC-formatted hash (algorithm, salt and cost included).
    pub password_hash: String,
    pub authorities: Authorities,
}

/// Identity store consulted by the verifier. Read-only from the auth core's
/// point of view except for registration.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find(&self, subject: &Subject) -> Result<Option<CredentialRecord>, StoreError>;

    /// Insert a new record; an existing subject is [`StoreError::Duplicate`].
    async fn insert(&self, record: CredentialRecord) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> CredentialStore for Arc<S>
where
    S: CredentialStore + ?Sized,
{
    async fn find(&self, subject: &Subject) -> Result<Option<CredentialRecord>, StoreError> {
        (**self).find(subject).await
    }

    async fn insert(&self, record: CredentialRecord) -> Result<(), StoreError> {
        (**self).insert(record).await
    }
}

/// In-memory store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    inner: RwLock<HashMap<Subject, CredentialRecord>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find(&self, subject: &Subject) -> Result<Option<CredentialRecord>, StoreError> {
        let map = self
            .inner
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;
        Ok(map.get(subject).cloned())
    }

    async fn insert(&self, record: CredentialRecord) -> Result<(), StoreError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;
        if map.contains_key(&record.subject) {
            return Err(StoreError::Duplicate(record.subject));
        }
        map.insert(record.subject.clone(), record);
        Ok(())
    }
}

/// Validates a presented subject/secret pair against stored credentials.
pub struct CredentialVerifier {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    // Verified against when the subject is unknown so both failure paths do
    // the same work.
    decoy_hash: String,
}

impl CredentialVerifier {
    pub fn new(store: Arc<dyn CredentialStore>, hasher: PasswordHasher) -> Result<Self, AccountError> {
        let decoy_hash = hasher.hash(&Password::new("retailx-decoy-credential"))?;
        Ok(Self {
            store,
            hasher,
            decoy_hash,
        })
    }

    /// Authenticate `subject` with `presented`.
    ///
    /// Unknown subject, malformed subject and wrong secret all yield
    /// [`AuthenticationError::InvalidCredentials`]. Only store outages differ.
    pub async fn authenticate(
        &self,
        subject: &str,
        presented: &Password,
    ) -> Result<Principal, AccountError> {
        let record = match Subject::parse(subject) {
            Ok(subject) => self.store.find(&subject).await?,
            Err(_) => None,
        };

        let Some(record) = record else {
            let _ = self.hasher.verify_async(presented, &self.decoy_hash).await;
            tracing::debug!(subject, "login for unknown subject");
            return Err(AuthenticationError::InvalidCredentials.into());
        };

        if !self.hasher.verify_async(presented, &record.password_hash).await {
            tracing::debug!(subject = %record.subject, "login with wrong secret");
            return Err(AuthenticationError::InvalidCredentials.into());
        }

        Ok(Principal::new(record.subject, record.authorities))
    }
}
