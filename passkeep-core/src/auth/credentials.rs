//! Credential registry over the `user_credentials` blob.
//!
//! One serialized map from principal id to [`CredentialRecord`]. Local
//! secrets are stored as Argon2id PHC strings and verified with the
//! password-hash API; the plaintext never touches the store.

use std::collections::HashMap;
use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use tracing::debug;

use super::error::{AuthError, AuthResult};
use super::models::{CredentialRecord, Provider};
use crate::storage::{keys, KeyValueStore};

/// Registry of login-matching records, keyed by principal id.
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Hash a secret into an Argon2id PHC string with a fresh salt.
    pub fn hash_secret(secret: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| AuthError::Hash(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Verify a candidate secret against a stored PHC string.
    ///
    /// An unparseable stored hash verifies as false rather than erroring;
    /// the caller sees it as invalid credentials.
    pub fn verify_secret(secret: &str, stored_hash: &str) -> bool {
        match PasswordHash::new(stored_hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(secret.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// Load the whole registry; an absent blob is an empty registry.
    pub async fn load_all(&self) -> AuthResult<HashMap<String, CredentialRecord>> {
        match self.store.get(keys::USER_CREDENTIALS).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(HashMap::new()),
        }
    }

    async fn save_all(&self, records: &HashMap<String, CredentialRecord>) -> AuthResult<()> {
        let raw = serde_json::to_string(records)?;
        self.store.set(keys::USER_CREDENTIALS, &raw).await?;
        Ok(())
    }

    /// Record for one principal id.
    pub async fn get(&self, principal_id: &str) -> AuthResult<Option<CredentialRecord>> {
        Ok(self.load_all().await?.remove(principal_id))
    }

    /// Find the local-provider record matching an email, with its id.
    pub async fn find_local_by_email(
        &self,
        email: &str,
    ) -> AuthResult<Option<(String, CredentialRecord)>> {
        let records = self.load_all().await?;
        Ok(records
            .into_iter()
            .find(|(_, record)| record.provider == Provider::Local && record.email == email))
    }

    /// Whether a local record with this email exists. Federated records
    /// with the same email do not count; uniqueness is a local-provider
    /// invariant.
    pub async fn local_email_in_use(&self, email: &str) -> AuthResult<bool> {
        Ok(self.find_local_by_email(email).await?.is_some())
    }

    /// Insert or replace the record for a principal id.
    pub async fn upsert(&self, principal_id: &str, record: CredentialRecord) -> AuthResult<()> {
        let mut records = self.load_all().await?;
        records.insert(principal_id.to_string(), record);
        self.save_all(&records).await?;
        debug!("Stored credential record for principal {}", principal_id);
        Ok(())
    }

    /// Patch the profile fields of an existing record. Missing records are
    /// left alone; the registry never invents principals. An absent avatar
    /// keeps whatever the record already has.
    pub async fn update_profile_fields(
        &self,
        principal_id: &str,
        name: &str,
        email: &str,
        avatar_url: Option<&str>,
    ) -> AuthResult<()> {
        let mut records = self.load_all().await?;
        if let Some(record) = records.get_mut(principal_id) {
            record.name = name.to_string();
            record.email = email.to_string();
            if let Some(avatar) = avatar_url {
                record.avatar_url = Some(avatar.to_string());
            }
            self.save_all(&records).await?;
        }
        Ok(())
    }

    /// Replace the stored hash for a local principal.
    pub async fn replace_secret_hash(&self, principal_id: &str, hash: String) -> AuthResult<()> {
        let mut records = self.load_all().await?;
        if let Some(record) = records.get_mut(principal_id) {
            record.secret_hash = Some(hash);
            self.save_all(&records).await?;
        }
        Ok(())
    }
}
