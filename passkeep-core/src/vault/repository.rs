//! Vault repository: the password entries of the active principal.
//!
//! All operations are keyed by the injected [`ActiveSession`]; with no
//! signed-in principal every operation fails with `NoActivePrincipal`
//! instead of silently dropping the caller's intent.
//!
//! Each mutation rewrites the whole persisted sequence. When a write
//! fails, the repository reloads durable state into memory before
//! surfacing the error, so a failed mutation observes as "nothing
//! happened" rather than leaving memory and disk diverged. The in-memory
//! snapshot carries a monotonic revision, bumped on every successful load
//! or mutation, which the filter cache uses as its generation stamp.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::entry::{NewPasswordEntry, PasswordEntry, PasswordUpdate};
use super::error::{VaultError, VaultResult};
use super::strength::evaluate;
use crate::auth::ActiveSession;
use crate::storage::{keys, KeyValueStore};

#[derive(Default)]
struct VaultState {
    entries: Vec<PasswordEntry>,
    revision: u64,
    /// Principal whose data is loaded; a mismatch forces a reload so a
    /// stale snapshot from a previous sign-in can never leak across.
    loaded_for: Option<String>,
}

/// Per-principal store of [`PasswordEntry`] records.
///
/// Clones share one snapshot; overlapping calls on clones serialize on the
/// internal lock. Concurrent writers through *separate* repositories over
/// the same backing store remain last-write-wins.
#[derive(Clone)]
pub struct VaultRepository {
    store: Arc<dyn KeyValueStore>,
    session: ActiveSession,
    state: Arc<RwLock<VaultState>>,
}

impl VaultRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, session: ActiveSession) -> Self {
        Self {
            store,
            session,
            state: Arc::new(RwLock::new(VaultState::default())),
        }
    }

    async fn active_principal_id(&self) -> VaultResult<String> {
        self.session
            .principal_id()
            .await
            .ok_or(VaultError::NoActivePrincipal)
    }

    /// Read the persisted sequence for the active principal into memory
    /// and return it. An absent blob is initialized to an empty sequence
    /// and persisted; repeated calls with no mutations in between return
    /// identical snapshots and leave the blob untouched.
    pub async fn load(&self) -> VaultResult<Vec<PasswordEntry>> {
        let principal_id = self.active_principal_id().await?;
        let mut state = self.state.write().await;
        self.load_into(&mut state, &principal_id).await?;
        Ok(state.entries.clone())
    }

    async fn load_into(&self, state: &mut VaultState, principal_id: &str) -> VaultResult<()> {
        let key = keys::passwords(principal_id);
        let entries = match self.store.get(&key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| VaultError::Corrupted(e.to_string()))?,
            None => {
                debug!("No vault for principal {}, initializing empty", principal_id);
                self.store.set(&key, "[]").await?;
                Vec::new()
            }
        };
        debug!(
            "Loaded {} entries for principal {}",
            entries.len(),
            principal_id
        );
        state.entries = entries;
        state.revision += 1;
        state.loaded_for = Some(principal_id.to_string());
        Ok(())
    }

    async fn ensure_loaded(&self, state: &mut VaultState, principal_id: &str) -> VaultResult<()> {
        if state.loaded_for.as_deref() != Some(principal_id) {
            self.load_into(state, principal_id).await?;
        }
        Ok(())
    }

    /// Current in-memory snapshot without touching storage.
    pub async fn snapshot(&self) -> Vec<PasswordEntry> {
        self.state.read().await.entries.clone()
    }

    /// Generation of the current snapshot; moves on every successful load
    /// or mutation. Feed this to `FilterCache::visible`.
    pub async fn revision(&self) -> u64 {
        self.state.read().await.revision
    }

    /// Add an entry: assigns an id, stamps both timestamps, computes the
    /// strength label, appends, and persists the full sequence.
    pub async fn add(&self, new_entry: NewPasswordEntry) -> VaultResult<PasswordEntry> {
        let principal_id = self.active_principal_id().await?;
        let mut state = self.state.write().await;
        self.ensure_loaded(&mut state, &principal_id).await?;

        let now = Utc::now();
        let entry = PasswordEntry {
            id: Uuid::new_v4().to_string(),
            strength: evaluate(new_entry.secret.expose()),
            title: new_entry.title,
            username: new_entry.username,
            secret: new_entry.secret,
            website: new_entry.website,
            folder: new_entry.folder,
            date_added: now,
            last_modified: now,
            notes: new_entry.notes,
        };

        state.entries.push(entry.clone());
        self.persist(&mut state, &principal_id).await?;

        info!("Added entry {} for principal {}", entry.id, principal_id);
        Ok(entry)
    }

    /// Merge a partial update into the entry with `id`, re-stamp
    /// `last_modified`, and recompute the strength label when the secret
    /// changed. A missing id is surfaced as `EntryNotFound`.
    pub async fn update(&self, id: &str, changes: PasswordUpdate) -> VaultResult<PasswordEntry> {
        let principal_id = self.active_principal_id().await?;
        let mut state = self.state.write().await;
        self.ensure_loaded(&mut state, &principal_id).await?;

        let Some(entry) = state.entries.iter_mut().find(|e| e.id == id) else {
            warn!("Update for unknown entry {}", id);
            return Err(VaultError::EntryNotFound(id.to_string()));
        };

        if let Some(title) = changes.title {
            entry.title = title;
        }
        if let Some(username) = changes.username {
            entry.username = username;
        }
        if let Some(secret) = changes.secret {
            if secret != entry.secret {
                entry.strength = evaluate(secret.expose());
            }
            entry.secret = secret;
        }
        if let Some(website) = changes.website {
            entry.website = website;
        }
        if let Some(folder) = changes.folder {
            entry.folder = folder;
        }
        if let Some(notes) = changes.notes {
            entry.notes = if notes.is_empty() { None } else { Some(notes) };
        }
        entry.last_modified = Utc::now();
        let updated = entry.clone();

        self.persist(&mut state, &principal_id).await?;

        info!("Updated entry {} for principal {}", id, principal_id);
        Ok(updated)
    }

    /// Remove the entry with `id` if present; absent ids are a silent
    /// no-op.
    pub async fn remove(&self, id: &str) -> VaultResult<()> {
        let principal_id = self.active_principal_id().await?;
        let mut state = self.state.write().await;
        self.ensure_loaded(&mut state, &principal_id).await?;

        let before = state.entries.len();
        state.entries.retain(|e| e.id != id);
        if state.entries.len() == before {
            debug!("Remove for unknown entry {}, nothing to do", id);
            return Ok(());
        }

        self.persist(&mut state, &principal_id).await?;
        info!("Removed entry {} for principal {}", id, principal_id);
        Ok(())
    }

    /// Move every entry in `old_folder` to `new_folder`, re-stamping each
    /// moved entry. Persists once for the batch; returns how many moved.
    pub async fn reassign_folder(
        &self,
        old_folder: &str,
        new_folder: &str,
    ) -> VaultResult<usize> {
        let principal_id = self.active_principal_id().await?;
        let mut state = self.state.write().await;
        self.ensure_loaded(&mut state, &principal_id).await?;

        let now = Utc::now();
        let mut moved = 0;
        for entry in state.entries.iter_mut().filter(|e| e.folder == old_folder) {
            entry.folder = new_folder.to_string();
            entry.last_modified = now;
            moved += 1;
        }
        if moved == 0 {
            debug!("No entries in folder \"{}\", nothing to move", old_folder);
            return Ok(0);
        }

        self.persist(&mut state, &principal_id).await?;
        info!(
            "Moved {} entries from \"{}\" to \"{}\"",
            moved, old_folder, new_folder
        );
        Ok(moved)
    }

    /// Persist the snapshot. On failure, reload durable state so memory
    /// reflects what actually survived, then surface the write error.
    async fn persist(&self, state: &mut VaultState, principal_id: &str) -> VaultResult<()> {
        let key = keys::passwords(principal_id);
        let raw = serde_json::to_string(&state.entries)?;
        match self.store.set(&key, &raw).await {
            Ok(()) => {
                state.revision += 1;
                Ok(())
            }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Principal, Provider};
    use crate::storage::MemoryStore;
    use crate::vault::entry::SecretString;
    use crate::vault::strength::Strength;

    async fn signed_in_repo() -> (Arc<MemoryStore>, VaultRepository) {
        let store = Arc::new(MemoryStore::new());
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
        let repo = VaultRepository::new(store.clone(), session);
        (store, repo)
    }

    fn github_entry() -> NewPasswordEntry {
        NewPasswordEntry {
            title: "GitHub".into(),
            username: "octocat".into(),
            secret: SecretString::new("P@ssw0rd!"),
            website: "github.com".into(),
            folder: "Work".into(),
            notes: Some("work account".into()),
        }
    }

    #[tokio::test]
    async fn test_mutators_require_active_principal() {
        let store = Arc::new(MemoryStore::new());
        let repo = VaultRepository::new(store, ActiveSession::new());

        assert!(matches!(repo.load().await, Err(VaultError::NoActivePrincipal)));
        assert!(matches!(
            repo.add(github_entry()).await,
            Err(VaultError::NoActivePrincipal)
        ));
        assert!(matches!(
            repo.remove("x").await,
            Err(VaultError::NoActivePrincipal)
        ));
    }

    #[tokio::test]
    async fn test_load_initializes_once_and_is_idempotent() {
        let (store, repo) = signed_in_repo().await;

        assert!(repo.load().await.unwrap().is_empty());
        assert_eq!(
            store.get("passwords_u1").await.unwrap(),
            Some("[]".to_string())
        );

        // Second load reads the same data and does not rewrite the blob.
        store.fail_writes(true);
        assert!(repo.load().await.unwrap().is_empty());
        store.fail_writes(false);
    }

    #[tokio::test]
    async fn test_add_roundtrip() {
        let (_, repo) = signed_in_repo().await;

        let added = repo.add(github_entry()).await.unwrap();
        assert_eq!(added.strength, Strength::Strong);
        assert!(added.last_modified >= added.date_added);

        let loaded = repo.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0], added);
    }

    #[tokio::test]
    async fn test_update_restamps_and_rescores() {
        let (_, repo) = signed_in_repo().await;
        let added = repo.add(github_entry()).await.unwrap();

        let updated = repo
            .update(
                &added.id,
                PasswordUpdate {
                    secret: Some(SecretString::new("password")),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.strength, Strength::Weak);
        assert!(updated.last_modified >= added.last_modified);
        assert_eq!(updated.date_added, added.date_added);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_surfaced() {
        let (_, repo) = signed_in_repo().await;
        repo.load().await.unwrap();

        assert!(matches!(
            repo.update("missing", PasswordUpdate::default()).await,
            Err(VaultError::EntryNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_is_silent_on_unknown_id() {
        let (_, repo) = signed_in_repo().await;
        let added = repo.add(github_entry()).await.unwrap();

        repo.remove("missing").await.unwrap();
        assert_eq!(repo.snapshot().await.len(), 1);

        repo.remove(&added.id).await.unwrap();
        assert!(repo.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reassign_folder_moves_and_restamps() {
        let (_, repo) = signed_in_repo().await;
        let work = repo.add(github_entry()).await.unwrap();
        let personal = repo
            .add(NewPasswordEntry {
                folder: "Personal".into(),
                ..github_entry()
            })
            .await
            .unwrap();

        let moved = repo.reassign_folder("Work", "Job").await.unwrap();
        assert_eq!(moved, 1);

        let entries = repo.load().await.unwrap();
        let moved_entry = entries.iter().find(|e| e.id == work.id).unwrap();
        assert_eq!(moved_entry.folder, "Job");
        assert!(moved_entry.last_modified >= work.last_modified);
        let untouched = entries.iter().find(|e| e.id == personal.id).unwrap();
        assert_eq!(untouched.folder, "Personal");
        assert_eq!(untouched.last_modified, personal.last_modified);
    }

    #[tokio::test]
    async fn test_reassign_with_no_matches_is_a_noop() {
        let (store, repo) = signed_in_repo().await;
        repo.add(github_entry()).await.unwrap();
        let revision = repo.revision().await;

        // Early return must not even attempt a write.
        store.fail_writes(true);
        assert_eq!(repo.reassign_folder("Nope", "Job").await.unwrap(), 0);
        store.fail_writes(false);
        assert_eq!(repo.revision().await, revision);
    }

    #[tokio::test]
    async fn test_failed_write_resyncs_to_durable_state() {
        let (store, repo) = signed_in_repo().await;
        let added = repo.add(github_entry()).await.unwrap();

        store.fail_writes(true);
        let err = repo
            .add(NewPasswordEntry {
                title: "Lost".into(),
                ..github_entry()
            })
            .await;
        assert!(matches!(err, Err(VaultError::Store(_))));
        store.fail_writes(false);

        // Memory reflects durable truth: only the first entry survived.
        let snapshot = repo.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, added.id);
    }

    #[tokio::test]
    async fn test_revision_moves_on_mutation() {
        let (_, repo) = signed_in_repo().await;
        repo.load().await.unwrap();
        let before = repo.revision().await;

        let added = repo.add(github_entry()).await.unwrap();
        let after_add = repo.revision().await;
        assert!(after_add > before);

        repo.remove(&added.id).await.unwrap();
        assert!(repo.revision().await > after_add);
    }

    #[tokio::test]
    async fn test_principal_switch_reloads() {
        let store = Arc::new(MemoryStore::new());
        let session = ActiveSession::new();
        let repo = VaultRepository::new(store.clone(), session.clone());

        let principal = |id: &str| Principal {
            id: id.into(),
            email: format!("{id}@b.com"),
            name: id.into(),
            avatar_url: None,
            provider: Provider::Local,
        };

        session.replace(Some(principal("u1"))).await;
        repo.add(github_entry()).await.unwrap();

        session.replace(Some(principal("u2"))).await;
        assert!(repo.load().await.unwrap().is_empty());
        // A mutation under u2 must not see or touch u1's entries.
        repo.add(NewPasswordEntry {
            title: "Second".into(),
            ..github_entry()
        })
        .await
        .unwrap();
        assert_eq!(repo.snapshot().await.len(), 1);

        session.replace(Some(principal("u1"))).await;
        let back = repo.load().await.unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].title, "GitHub");
    }
}
