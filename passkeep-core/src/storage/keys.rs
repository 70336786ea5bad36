//! Key namespace for persisted state.
//!
//! Global keys hold the session pointer and the credential registry;
//! everything else is namespaced per principal id so different principals
//! never contend for the same document.

/// Serialized `Principal` of the currently signed-in user (global).
pub const CURRENT_USER: &str = "current_user";

/// Serialized principal-id → credential-record map (global, single blob).
pub const USER_CREDENTIALS: &str = "user_credentials";

/// Key of a principal's password entries.
pub fn passwords(principal_id: &str) -> String {
    format!("passwords_{principal_id}")
}

/// Key of a principal's folder names (never contains the virtual "All").
pub fn folders(principal_id: &str) -> String {
    format!("folders_{principal_id}")
}

/// Key of a principal's theme preference.
pub fn theme(principal_id: &str) -> String {
    format!("theme_{principal_id}")
}
