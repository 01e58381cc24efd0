//! Opsdeck core - the session and credential lifecycle of the opsdeck
//! operations dashboard.
//!
//! The dashboard screens (onboarding, timesheets, user management) live in
//! the host application and talk to the backend themselves; this crate owns
//! the one piece with real state-machine structure underneath them:
//! establishing, validating, persisting, and tearing down the authenticated
//! identity, including the mandatory first-login password change.
//!
//! Construct a [`SessionManager`] once at process start with an
//! [`AuthClient`] and a [`KeyringStore`], run [`SessionManager::hydrate`]
//! before anything else, and pass the manager by reference to whatever
//! needs the session.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiError, AuthApi, AuthClient};
pub use auth::{
    CredentialStore, Hydration, KeyringStore, LoginOutcome, SessionManager, SessionPolicy,
    SessionState, StoredCredentials,
};
pub use config::Config;
pub use models::{Identity, Role};
