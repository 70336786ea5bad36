//! Folder registry: the ordered folder names of the active principal.
//!
//! The registry persists plain names in insertion order. "All" is a
//! virtual bucket: always first in an external listing, never persisted,
//! and protected from create/rename/delete. Renaming or deleting a folder
//! cascades into the vault repository so no entry is left pointing at a
//! name that no longer exists.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::error::{VaultError, VaultResult};
use super::repository::VaultRepository;
use crate::auth::ActiveSession;
use crate::storage::{keys, KeyValueStore};

/// The virtual folder meaning "no filter". Never persisted.
pub const ALL_FOLDER: &str = "All";

/// Folders every fresh principal starts with.
pub const DEFAULT_FOLDERS: [&str; 3] = ["Personal", "Work", "Finance"];

/// Bucket entries fall back to when their folder is deleted.
pub const DEFAULT_BUCKET: &str = ALL_FOLDER;

#[derive(Default)]
struct RegistryState {
    folders: Vec<String>,
    loaded_for: Option<String>,
}

/// Per-principal registry of folder names, with cascade into the vault.
#[derive(Clone)]
pub struct FolderRegistry {
    store: Arc<dyn KeyValueStore>,
    session: ActiveSession,
    vault: VaultRepository,
    state: Arc<RwLock<RegistryState>>,
}

impl FolderRegistry {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        session: ActiveSession,
        vault: VaultRepository,
    ) -> Self {
        Self {
            store,
            session,
            vault,
            state: Arc::new(RwLock::new(RegistryState::default())),
        }
    }

    async fn active_principal_id(&self) -> VaultResult<String> {
        self.session
            .principal_id()
            .await
            .ok_or(VaultError::NoActivePrincipal)
    }

    /// Read the persisted names (excluding the virtual "All"). An absent
    /// blob is initialized to the defaults and persisted.
    pub async fn load(&self) -> VaultResult<Vec<String>> {
        let principal_id = self.active_principal_id().await?;
        let mut state = self.state.write().await;
        self.load_into(&mut state, &principal_id).await?;
        Ok(state.folders.clone())
    }

    async fn load_into(&self, state: &mut RegistryState, principal_id: &str) -> VaultResult<()> {
        let key = keys::folders(principal_id);
        let folders = match self.store.get(&key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| VaultError::Corrupted(e.to_string()))?,
            None => {
                let defaults: Vec<String> = DEFAULT_FOLDERS.iter().map(|s| s.to_string()).collect();
                debug!(
                    "No folders for principal {}, initializing defaults",
                    principal_id
                );
                self.store
                    .set(&key, &serde_json::to_string(&defaults)?)
                    .await?;
                defaults
            }
        };
        state.folders = folders;
        state.loaded_for = Some(principal_id.to_string());
        Ok(())
    }

    async fn ensure_loaded(
        &self,
        state: &mut RegistryState,
        principal_id: &str,
    ) -> VaultResult<()> {
        if state.loaded_for.as_deref() != Some(principal_id) {
            self.load_into(state, principal_id).await?;
        }
        Ok(())
    }

    /// External listing: "All" prepended to the registered names.
    pub async fn listing(&self) -> VaultResult<Vec<String>> {
        let mut listing = vec![ALL_FOLDER.to_string()];
        listing.extend(self.load().await?);
        Ok(listing)
    }

    /// Append a folder. The name is trimmed; empty names, existing names,
    /// and any spelling of "All" are rejected.
    pub async fn add(&self, name: &str) -> VaultResult<()> {
        let principal_id = self.active_principal_id().await?;
        let name = name.trim();
        if name.is_empty() {
            return Err(VaultError::InvalidInput("folder name is empty".into()));
        }
        if name.eq_ignore_ascii_case(ALL_FOLDER) {
            // The virtual bucket always exists, so this is a collision.
            return Err(VaultError::DuplicateName(name.to_string()));
        }

        let mut state = self.state.write().await;
        self.ensure_loaded(&mut state, &principal_id).await?;
        if state.folders.iter().any(|f| f == name) {
            return Err(VaultError::DuplicateName(name.to_string()));
        }

        state.folders.push(name.to_string());
        self.persist(&mut state, &principal_id).await?;
        info!("Added folder \"{}\" for principal {}", name, principal_id);
        Ok(())
    }

    /// Rename a folder and move its entries along.
    ///
    /// The registry entry is updated first, then the vault cascade runs,
    /// then the registry is persisted, matching the order a failed
    /// cascade must observe (registry unchanged on disk).
    pub async fn rename(&self, old_name: &str, new_name: &str) -> VaultResult<()> {
        let principal_id = self.active_principal_id().await?;
        let old_name = old_name.trim();
        let new_name = new_name.trim();

        if old_name.eq_ignore_ascii_case(ALL_FOLDER) {
            return Err(VaultError::ProtectedFolder(old_name.to_string()));
        }
        if new_name.is_empty() {
            return Err(VaultError::InvalidInput("folder name is empty".into()));
        }
        if new_name.eq_ignore_ascii_case(ALL_FOLDER) {
            return Err(VaultError::ReservedName(new_name.to_string()));
        }
        if new_name == old_name {
            debug!("Rename to the same name, nothing to do");
            return Ok(());
        }

        let mut state = self.state.write().await;
        self.ensure_loaded(&mut state, &principal_id).await?;

        let Some(pos) = state.folders.iter().position(|f| f == old_name) else {
            return Err(VaultError::FolderNotFound(old_name.to_string()));
        };
        if state.folders.iter().any(|f| f == new_name) {
            return Err(VaultError::DuplicateName(new_name.to_string()));
        }

        state.folders[pos] = new_name.to_string();

        if let Err(e) = self.vault.reassign_folder(old_name, new_name).await {
            // Cascade failed; roll the in-memory registry back to durable
            // truth before surfacing.
            warn!("Folder cascade failed, reloading registry: {}", e);
            self.load_into(&mut state, &principal_id).await.ok();
            return Err(e);
        }

        self.persist(&mut state, &principal_id).await?;
        info!(
            "Renamed folder \"{}\" to \"{}\" for principal {}",
            old_name, new_name, principal_id
        );
        Ok(())
    }

    /// Delete a folder, moving its entries to the default bucket. Returns
    /// how many entries moved; the caller uses that (and the name) to
    /// reset any UI selection pointing at the deleted folder. Deleting an
    /// unknown folder is a silent no-op.
    pub async fn delete(&self, name: &str) -> VaultResult<usize> {
        let principal_id = self.active_principal_id().await?;
        let name = name.trim();

        if name.eq_ignore_ascii_case(ALL_FOLDER) {
            return Err(VaultError::ProtectedFolder(name.to_string()));
        }

        let mut state = self.state.write().await;
        self.ensure_loaded(&mut state, &principal_id).await?;

        let Some(pos) = state.folders.iter().position(|f| f == name) else {
            debug!("Delete for unknown folder \"{}\", nothing to do", name);
            return Ok(0);
        };
        state.folders.remove(pos);

        let moved = match self.vault.reassign_folder(name, DEFAULT_BUCKET).await {
            Ok(moved) => moved,
            Err(e) => {
                warn!("Folder cascade failed, reloading registry: {}", e);
                self.load_into(&mut state, &principal_id).await.ok();
                return Err(e);
            }
        };

        self.persist(&mut state, &principal_id).await?;
        info!(
            "Deleted folder \"{}\" for principal {} ({} entries moved to \"{}\")",
            name, principal_id, moved, DEFAULT_BUCKET
        );
        Ok(moved)
    }

    /// Persist the names. On failure, reload durable state so memory
    /// reflects what actually survived, then surface the write error.
    async fn persist(&self, state: &mut RegistryState, principal_id: &str) -> VaultResult<()> {
        let key = keys::folders(principal_id);
        let raw = serde_json::to_string(&state.folders)?;
        match self.store.set(&key, &raw).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(
                    "Persist failed for principal {}, resyncing from storage: {}",
                    principal_id, e
                );
                if let Err(reload) = self.load_into(state, principal_id).await {
                    warn!("Resync after failed persist also failed: {}", reload);
                }
                Err(e.into())
            }
        }
    }
}
