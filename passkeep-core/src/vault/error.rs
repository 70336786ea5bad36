//! Vault and folder error types.
//!
//! Granular enough for programmatic handling, serialized as
//! `{code, message}` so a UI layer can branch on the code and show the
//! message.

use thiserror::Error;

use crate::storage::StoreError;

/// Errors from vault, folder, and per-principal preference operations.
#[derive(Error, Debug)]
pub enum VaultError {
    /// No principal is signed in; the operation was not applied.
    #[error("No active principal")]
    NoActivePrincipal,

    /// No entry with the given id exists in the vault.
    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    /// The named folder is not in the registry.
    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    /// A folder with this name already exists (or the name is taken by the
    /// virtual "All" bucket).
    #[error("A folder named \"{0}\" already exists")]
    DuplicateName(String),

    /// The name is reserved and cannot be assigned to a folder.
    #[error("\"{0}\" is a reserved folder name")]
    ReservedName(String),

    /// The folder cannot be deleted.
    #[error("The \"{0}\" folder cannot be deleted")]
    ProtectedFolder(String),

    /// Empty or malformed caller input; nothing was mutated.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The persisted blob exists but cannot be parsed. Durable state is
    /// left untouched for recovery.
    #[error("Vault data is corrupted: {0}")]
    Corrupted(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The underlying key-value store failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for vault operations.
pub type VaultResult<T> = std::result::Result<T, VaultError>;

impl serde::Serialize for VaultError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("VaultError", 2)?;

        let code = match self {
            VaultError::NoActivePrincipal => "NO_ACTIVE_PRINCIPAL",
            VaultError::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            VaultError::FolderNotFound(_) => "FOLDER_NOT_FOUND",
            VaultError::DuplicateName(_) => "DUPLICATE_NAME",
            VaultError::ReservedName(_) => "RESERVED_NAME",
            VaultError::ProtectedFolder(_) => "PROTECTED_FOLDER",
            VaultError::InvalidInput(_) => "INVALID_INPUT",
            VaultError::Corrupted(_) => "CORRUPTED",
            VaultError::Serialization(_) => "SERIALIZATION_ERROR",
            VaultError::Store(_) => "STORAGE_ERROR",
        };

        state.serialize_field("code", code)?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = VaultError::ProtectedFolder("All".into());
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("PROTECTED_FOLDER"));
        assert!(json.contains("cannot be deleted"));
    }
}
