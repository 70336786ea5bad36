//! The vault: password entries, folders, search, and scoring.
//!
//! This module owns everything the signed-in principal stores:
//! - `repository`: entry CRUD and the folder-reassignment cascade target
//! - `folders`: the folder registry and its cascades
//! - `filter`: visible-list derivation with a generation-stamped cache
//! - `strength`: the three-tier password score
//! - `generator`: random password generation

pub mod entry;
pub mod error;
pub mod filter;
pub mod folders;
pub mod generator;
pub mod repository;
pub mod strength;

pub use entry::{NewPasswordEntry, PasswordEntry, PasswordUpdate, SecretString};
pub use error::{VaultError, VaultResult};
pub use filter::{filter_entries, FilterCache};
pub use folders::{FolderRegistry, ALL_FOLDER, DEFAULT_BUCKET, DEFAULT_FOLDERS};
pub use repository::VaultRepository;
pub use strength::{evaluate, Strength};
