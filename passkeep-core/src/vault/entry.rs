//! Vault entry model.
//!
//! A `PasswordEntry` is one stored website credential owned by a single
//! principal. The serialized field names match the on-device layout the
//! mobile app persists (camelCase, secret under `password`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::strength::Strength;

/// A stored secret string, wiped from memory on drop.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Access the secret for comparison, scoring, or display.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SecretString {
    fn from(secret: &str) -> Self {
        Self(secret.to_string())
    }
}

impl From<String> for SecretString {
    fn from(secret: String) -> Self {
        Self(secret)
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never log the actual secret
        f.write_str("SecretString([REDACTED])")
    }
}

/// One website credential in a principal's vault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordEntry {
    /// Unique within the owning principal's vault.
    pub id: String,
    pub title: String,
    pub username: String,
    #[serde(rename = "password")]
    pub secret: SecretString,
    pub website: String,
    /// Name of a registry folder, or the default bucket after a cascade.
    pub folder: String,
    pub date_added: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub strength: Strength,
}

/// Fields of an entry before the repository assigns id, timestamps, and
/// strength.
#[derive(Debug, Clone)]
pub struct NewPasswordEntry {
    pub title: String,
    pub username: String,
    pub secret: SecretString,
    pub website: String,
    pub folder: String,
    pub notes: Option<String>,
}

/// Partial update merged into an existing entry. `None` fields are left
/// untouched; the repository re-stamps `last_modified` and recomputes the
/// strength label when the secret changes.
#[derive(Debug, Clone, Default)]
pub struct PasswordUpdate {
    pub title: Option<String>,
    pub username: Option<String>,
    pub secret: Option<SecretString>,
    pub website: Option<String>,
    pub folder: Option<String>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> PasswordEntry {
        PasswordEntry {
            id: "e1".into(),
            title: "GitHub".into(),
            username: "octocat".into(),
            secret: SecretString::new("P@ssw0rd!"),
            website: "github.com".into(),
            folder: "Work".into(),
            date_added: "2026-01-02T03:04:05Z".parse().unwrap(),
            last_modified: "2026-01-02T03:04:05Z".parse().unwrap(),
            notes: None,
            strength: Strength::Strong,
        }
    }

    #[test]
    fn test_serialized_layout_matches_device_format() {
        let json = serde_json::to_string(&sample_entry()).unwrap();
        assert!(json.contains("\"password\":\"P@ssw0rd!\""));
        assert!(json.contains("\"dateAdded\""));
        assert!(json.contains("\"lastModified\""));
        assert!(json.contains("\"strength\":\"Strong\""));
        // Absent notes are omitted entirely, not serialized as null.
        assert!(!json.contains("notes"));
    }

    #[test]
    fn test_entry_roundtrip() {
        let entry = sample_entry();
        let json = serde_json::to_string(&entry).unwrap();
        let back: PasswordEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = SecretString::new("hunter2");
        let rendered = format!("{secret:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("REDACTED"));
    }
}
