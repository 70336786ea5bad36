//! Per-principal display preferences.
//!
//! Only the theme choice lives here; it shares the per-principal key
//! namespace and the active-session scoping of the vault stores.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::ActiveSession;
use crate::storage::{keys, KeyValueStore};
use crate::vault::{VaultError, VaultResult};

/// Theme choice persisted per principal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

/// Loads and saves the active principal's theme preference.
#[derive(Clone)]
pub struct ThemePrefs {
    store: Arc<dyn KeyValueStore>,
    session: ActiveSession,
}

impl ThemePrefs {
    pub fn new(store: Arc<dyn KeyValueStore>, session: ActiveSession) -> Self {
        Self { store, session }
    }

    async fn active_principal_id(&self) -> VaultResult<String> {
        self.session
            .principal_id()
            .await
            .ok_or(VaultError::NoActivePrincipal)
    }

    /// Stored preference, or the system default when nothing is stored.
    pub async fn load(&self) -> VaultResult<ThemePreference> {
        let principal_id = self.active_principal_id().await?;
        match self.store.get(&keys::theme(&principal_id)).await? {
            Some(raw) => {
                serde_json::from_str(&raw).map_err(|e| VaultError::Corrupted(e.to_string()))
            }
            None => Ok(ThemePreference::default()),
        }
    }

    pub async fn save(&self, preference: ThemePreference) -> VaultResult<()> {
        let principal_id = self.active_principal_id().await?;
        let raw = serde_json::to_string(&preference)?;
        self.store.set(&keys::theme(&principal_id), &raw).await?;
        debug!("Saved theme preference for principal {}", principal_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Principal, Provider};
    use crate::storage::MemoryStore;

    async fn prefs() -> ThemePrefs {
        let session = ActiveSession::new();
        session
            .replace(Some(Principal {
                id: "u1".into(),
                email: "a@b.com".into(),
                name: "A".into(),
                avatar_url: None,
                provider: Provider::Local,
            }))
            .await;
        ThemePrefs::new(Arc::new(MemoryStore::new()), session)
    }

    #[tokio::test]
    async fn test_defaults_to_system() {
        let prefs = prefs().await;
        assert_eq!(prefs.load().await.unwrap(), ThemePreference::System);
    }

    #[tokio::test]
    async fn test_save_load_roundtrip() {
        let prefs = prefs().await;
        prefs.save(ThemePreference::Dark).await.unwrap();
        assert_eq!(prefs.load().await.unwrap(), ThemePreference::Dark);
    }

    #[tokio::test]
    async fn test_requires_active_principal() {
        let prefs = ThemePrefs::new(Arc::new(MemoryStore::new()), ActiveSession::new());
        assert!(matches!(
            prefs.load().await,
            Err(VaultError::NoActivePrincipal)
        ));
    }
}
