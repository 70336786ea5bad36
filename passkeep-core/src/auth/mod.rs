//! Authentication: principals, credential records, and the session.
//!
//! The [`SessionManager`] turns registration and login into a signed-in
//! [`Principal`] published through an [`ActiveSession`] handle; everything
//! per-principal downstream (vault, folders, prefs) keys its storage off
//! that handle.

pub mod credentials;
pub mod error;
pub mod models;
pub mod session;

pub use credentials::CredentialStore;
pub use error::{AuthError, AuthResult};
pub use models::{CredentialRecord, FederatedProfile, Principal, Provider};
pub use session::{ActiveSession, SessionManager};
