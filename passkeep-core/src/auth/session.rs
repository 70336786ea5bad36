//! Session lifecycle: register, login, federated login, logout, profile.
//!
//! The manager owns the persisted `current_user` pointer and publishes the
//! signed-in [`Principal`] through an [`ActiveSession`] handle. The handle
//! is cloned into the vault repository and folder registry so "who is
//! logged in" is injected state, not an ambient global, and tests can run
//! isolated sessions side by side.
//!
//! Storage failures never escape as panics; every operation returns an
//! [`AuthError`] the caller can show.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::credentials::CredentialStore;
use super::error::{AuthError, AuthResult};
use super::models::{CredentialRecord, FederatedProfile, Principal, Provider};
use crate::prefs::ThemePreference;
use crate::storage::{keys, KeyValueStore};
use crate::vault::DEFAULT_FOLDERS;

/// Minimum password length accepted at registration and password change.
const MIN_PASSWORD_LEN: usize = 6;

/// Shared handle to the currently signed-in principal.
///
/// Cheap to clone; all clones observe the same session. Empty until a
/// login/register/restore succeeds.
#[derive(Clone, Default)]
pub struct ActiveSession {
    current: Arc<RwLock<Option<Principal>>>,
}

impl ActiveSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the signed-in principal, if any.
    pub async fn principal(&self) -> Option<Principal> {
        self.current.read().await.clone()
    }

    /// Id of the signed-in principal, if any.
    pub async fn principal_id(&self) -> Option<String> {
        self.current.read().await.as_ref().map(|p| p.id.clone())
    }

    pub(crate) async fn replace(&self, principal: Option<Principal>) {
        *self.current.write().await = principal;
    }
}

/// Authenticates principals and maintains the persisted session pointer.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    credentials: CredentialStore,
    session: ActiveSession,
}

impl SessionManager {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            credentials: CredentialStore::new(store.clone()),
            session: ActiveSession::new(),
            store,
        }
    }

    /// The session handle to inject into repositories.
    pub fn session(&self) -> ActiveSession {
        self.session.clone()
    }

    /// The credential registry (exposed for profile tooling).
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Load a persisted session pointer into the handle, if one exists.
    ///
    /// This is the startup path behind a biometric gate: the prompt only
    /// decides whether to call this; the core merely checks what is
    /// persisted.
    pub async fn restore(&self) -> AuthResult<Option<Principal>> {
        match self.store.get(keys::CURRENT_USER).await? {
            Some(raw) => {
                let principal: Principal = serde_json::from_str(&raw)?;
                info!("Restored session for principal {}", principal.id);
                self.session.replace(Some(principal.clone())).await;
                Ok(Some(principal))
            }
            None => {
                debug!("No persisted session to restore");
                Ok(None)
            }
        }
    }

    /// Create a local account and sign it in.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> AuthResult<Principal> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::InvalidInput("malformed email".into()));
        }
        if password.trim().is_empty() || password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if self.credentials.local_email_in_use(email).await? {
            return Err(AuthError::EmailInUse);
        }

        let id = Uuid::new_v4().to_string();
        // Default the display name to the mailbox part of the email.
        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| email.split('@').next().unwrap_or(email).to_string());

        let principal = Principal {
            id: id.clone(),
            email: email.to_string(),
            name: name.clone(),
            avatar_url: None,
            provider: Provider::Local,
        };
        let record = CredentialRecord {
            email: email.to_string(),
            name,
            provider: Provider::Local,
            avatar_url: None,
            secret_hash: Some(CredentialStore::hash_secret(password)?),
        };

        self.credentials.upsert(&id, record).await?;
        self.bootstrap_principal_storage(&id).await?;
        self.persist_current(&principal).await?;

        info!("Registered principal {}", principal.id);
        Ok(principal)
    }

    /// Sign in a local account by email and password.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<Principal> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') || password.trim().is_empty() {
            return Err(AuthError::InvalidInput("malformed email or empty password".into()));
        }

        let Some((id, record)) = self.credentials.find_local_by_email(email).await? else {
            return Err(AuthError::InvalidCredentials);
        };
        let verified = record
            .secret_hash
            .as_deref()
            .is_some_and(|hash| CredentialStore::verify_secret(password, hash));
        if !verified {
            return Err(AuthError::InvalidCredentials);
        }

        let principal = Principal {
            id: id.clone(),
            email: record.email,
            name: record.name,
            avatar_url: record.avatar_url,
            provider: record.provider,
        };

        // Safe to repeat; only fills in what a fresh account is missing.
        self.bootstrap_principal_storage(&id).await?;
        self.persist_current(&principal).await?;

        info!("Signed in principal {}", principal.id);
        Ok(principal)
    }

    /// Sign in an externally verified identity, creating its credential
    /// record on first arrival. Idempotent: an existing record is kept.
    pub async fn federated_login(&self, profile: FederatedProfile) -> AuthResult<Principal> {
        let name = profile
            .name
            .clone()
            .unwrap_or_else(|| profile.email.split('@').next().unwrap_or("user").to_string());

        if self.credentials.get(&profile.id).await?.is_none() {
            let record = CredentialRecord {
                email: profile.email.clone(),
                name: name.clone(),
                provider: Provider::Federated,
                avatar_url: profile.avatar_url.clone(),
                secret_hash: None,
            };
            self.credentials.upsert(&profile.id, record).await?;
            debug!("Created federated credential record for {}", profile.id);
        }

        let principal = Principal {
            id: profile.id.clone(),
            email: profile.email,
            name,
            avatar_url: profile.avatar_url,
            provider: Provider::Federated,
        };

        self.bootstrap_principal_storage(&principal.id).await?;
        self.persist_current(&principal).await?;

        info!("Signed in federated principal {}", principal.id);
        Ok(principal)
    }

    /// Clear the persisted session pointer. Credential, vault, and folder
    /// data stay on the device.
    pub async fn logout(&self) -> AuthResult<()> {
        self.store.delete(keys::CURRENT_USER).await?;
        self.session.replace(None).await;
        info!("Signed out");
        Ok(())
    }

    /// Overwrite the session pointer and the credential record's profile
    /// fields. Returns `Ok(false)` when no principal is signed in.
    pub async fn update_profile(&self, principal: &Principal) -> AuthResult<bool> {
        if self.session.principal_id().await.is_none() {
            warn!("update_profile called with no active principal");
            return Ok(false);
        }

        self.persist_current(principal).await?;
        self.credentials
            .update_profile_fields(
                &principal.id,
                &principal.name,
                &principal.email,
                principal.avatar_url.as_deref(),
            )
            .await?;

        info!("Updated profile for principal {}", principal.id);
        Ok(true)
    }

    /// Replace the signed-in local principal's password after verifying
    /// the current one.
    pub async fn change_password(&self, current: &str, new: &str) -> AuthResult<()> {
        let Some(principal) = self.session.principal().await else {
            return Err(AuthError::InvalidCredentials);
        };
        if principal.provider != Provider::Local {
            return Err(AuthError::InvalidInput(
                "federated accounts have no local password".into(),
            ));
        }
        if new.trim().is_empty() || new.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let stored = self.credentials.get(&principal.id).await?;
        let verified = stored
            .and_then(|record| record.secret_hash)
            .is_some_and(|hash| CredentialStore::verify_secret(current, &hash));
        if !verified {
            return Err(AuthError::InvalidCredentials);
        }

        let hash = CredentialStore::hash_secret(new)?;
        self.credentials.replace_secret_hash(&principal.id, hash).await?;
        info!("Changed password for principal {}", principal.id);
        Ok(())
    }

    async fn persist_current(&self, principal: &Principal) -> AuthResult<()> {
        let raw = serde_json::to_string(principal)?;
        self.store.set(keys::CURRENT_USER, &raw).await?;
        self.session.replace(Some(principal.clone())).await;
        Ok(())
    }

    /// Initialize a principal's vault, folder, and theme documents when
    /// absent. Idempotent; existing data is never overwritten.
    async fn bootstrap_principal_storage(&self, principal_id: &str) -> AuthResult<()> {
        let passwords_key = keys::passwords(principal_id);
        if self.store.get(&passwords_key).await?.is_none() {
            self.store
                .set(&passwords_key, &serde_json::to_string(&Vec::<String>::new())?)
                .await?;
        }

        let folders_key = keys::folders(principal_id);
        if self.store.get(&folders_key).await?.is_none() {
            self.store
                .set(&folders_key, &serde_json::to_string(&DEFAULT_FOLDERS)?)
                .await?;
        }

        let theme_key = keys::theme(principal_id);
        if self.store.get(&theme_key).await?.is_none() {
            self.store
                .set(&theme_key, &serde_json::to_string(&ThemePreference::System)?)
                .await?;
        }

        debug!("Storage ready for principal {}", principal_id);
        Ok(())
    }
}
