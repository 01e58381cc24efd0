//! Session and credential lifecycle.
//!
//! This module provides:
//! - `CredentialStore` / `KeyringStore`: durable persistence for the current
//!   identity snapshot and bearer token
//! - `SessionManager`: the single owner of session state - startup
//!   hydration, login, first-login password reset, logout
//!
//! Persisted credentials are never trusted until re-validated remotely.

pub mod credentials;
pub mod manager;
pub mod session;

pub use credentials::{CredentialStore, KeyringStore, StoredCredentials};
pub use manager::{SessionManager, SessionPolicy};
pub use session::{Hydration, LoginOutcome, SessionState};
