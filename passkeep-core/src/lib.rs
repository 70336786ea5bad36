//! PassKeep core: the on-device password-vault data layer.
//!
//! This crate is the data layer of a mobile password vault. It handles:
//! - Account registration, login, federated sign-in, and the persisted
//!   session pointer
//! - Per-principal storage of password entries and folders, with rename
//!   and delete cascades
//! - Visible-list derivation (folder × search) with a memo cache
//! - Password strength scoring and generation
//!
//! Screens, navigation, biometric prompts, and identity-provider token
//! exchange are consumers of this crate, not part of it. Persistence goes
//! through the [`storage::KeyValueStore`] trait so platforms can inject
//! their own on-device store.
//!
//! ## Modules
//!
//! - `auth`: principals, credential records, session lifecycle
//! - `vault`: entries, folders, filtering, strength, generation
//! - `storage`: the key-value contract and the bundled adapters
//! - `prefs`: per-principal theme preference
//! - `error`: crate-level error umbrella

pub mod auth;
pub mod error;
pub mod prefs;
pub mod storage;
pub mod vault;

pub use auth::{
    ActiveSession, AuthError, CredentialStore, FederatedProfile, Principal, Provider,
    SessionManager,
};
pub use error::{PassKeepError, Result};
pub use prefs::{ThemePreference, ThemePrefs};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use vault::{
    evaluate, filter_entries, FilterCache, FolderRegistry, NewPasswordEntry, PasswordEntry,
    PasswordUpdate, SecretString, Strength, VaultError, VaultRepository, ALL_FOLDER,
    DEFAULT_FOLDERS,
};
