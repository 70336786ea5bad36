//! Authentication error types.
//!
//! Validation and credential failures are ordinary return values here;
//! only unexpected storage or hashing trouble carries an inner cause. The
//! `{code, message}` serialization mirrors the vault errors so a UI can
//! handle both uniformly.

use thiserror::Error;

use crate::storage::StoreError;

/// Errors from registration, login, and profile operations.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Malformed email, blank field, or a too-short password. Nothing was
    /// mutated.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A local account with this email already exists.
    #[error("Email is already in use")]
    EmailInUse,

    /// No local account matches the email/password pair.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Password hashing or verification machinery failed.
    #[error("Credential hashing failed: {0}")]
    Hash(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The underlying key-value store failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for auth operations.
pub type AuthResult<T> = std::result::Result<T, AuthError>;

impl serde::Serialize for AuthError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("AuthError", 2)?;

        let code = match self {
            AuthError::InvalidInput(_) => "INVALID_INPUT",
            AuthError::EmailInUse => "EMAIL_IN_USE",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::Hash(_) => "HASH_ERROR",
            AuthError::Serialization(_) => "SERIALIZATION_ERROR",
            AuthError::Store(_) => "STORAGE_ERROR",
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
        let json = serde_json::to_string(&AuthError::EmailInUse).unwrap();
        assert!(json.contains("EMAIL_IN_USE"));
        assert!(json.contains("already in use"));
    }
}
