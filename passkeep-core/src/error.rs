//! Crate-level error umbrella.
//!
//! Module errors stay granular; this type exists for callers that drive
//! the whole stack and want one error channel.

use thiserror::Error;

use crate::auth::AuthError;
use crate::storage::StoreError;
use crate::vault::VaultError;

#[derive(Error, Debug)]
pub enum PassKeepError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl serde::Serialize for PassKeepError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PassKeepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_errors_convert_in() {
        let err: PassKeepError = VaultError::NoActivePrincipal.into();
        assert!(matches!(err, PassKeepError::Vault(_)));

        let err: PassKeepError = AuthError::EmailInUse.into();
        assert_eq!(
            serde_json::to_string(&err).unwrap(),
            "\"Email is already in use\""
        );
    }
}
