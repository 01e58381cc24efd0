//! Durable credential storage.
//!
//! The store holds exactly one identity snapshot and one bearer token per
//! client installation, in the OS keychain under a fixed service name and
//! two fixed keys. Its presence never implies validity - the session
//! manager re-validates on every startup.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::Identity;

/// Keyring service name for credential storage
const SERVICE_NAME: &str = "opsdeck";

/// Keyring usernames for the two stored values
const KEY_ACCESS_TOKEN: &str = "access_token";
const KEY_IDENTITY: &str = "identity";

/// The persisted pair, as read back from the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub identity: Identity,
    pub token: String,
    pub saved_at: DateTime<Utc>,
}

impl StoredCredentials {
    /// Age of the snapshot, for logging when it is trusted without remote
    /// confirmation.
    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.saved_at).num_minutes()
    }
}

/// Identity entry payload. The token lives in its own entry, so the
/// snapshot never contains it.
#[derive(Debug, Serialize, Deserialize)]
struct IdentitySnapshot {
    identity: Identity,
    saved_at: DateTime<Utc>,
}

/// Durable key/value persistence for the current identity and token.
///
/// `load` returns both values or neither: a missing or unparsable half
/// reads as absent. `clear` is idempotent. Implementations must not panic;
/// callers treat any `Err` as a degraded (memory-only) session, never as a
/// fatal condition.
pub trait CredentialStore: Send + Sync {
    /// Write both values, replacing whatever was stored before.
    fn save(&self, identity: &Identity, token: &str) -> Result<()>;

    /// Read back the persisted pair, or `None` if either half is missing
    /// or unparsable.
    fn load(&self) -> Result<Option<StoredCredentials>>;

    /// Remove both values. Safe to call when already empty.
    fn clear(&self) -> Result<()>;
}

/// Shared handles work anywhere the trait is expected.
impl<T: CredentialStore + ?Sized> CredentialStore for std::sync::Arc<T> {
    fn save(&self, identity: &Identity, token: &str) -> Result<()> {
        (**self).save(identity, token)
    }

    fn load(&self) -> Result<Option<StoredCredentials>> {
        (**self).load()
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

/// Production store backed by the OS keychain.
pub struct KeyringStore;

impl KeyringStore {
    pub fn new() -> Self {
        Self
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(SERVICE_NAME, key).context("Failed to create keyring entry")
    }

    fn read_entry(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to read keyring entry"),
        }
    }

    fn delete_entry(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete keyring entry"),
        }
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeyringStore {
    fn save(&self, identity: &Identity, token: &str) -> Result<()> {
        let snapshot = IdentitySnapshot {
            identity: identity.clone(),
            saved_at: Utc::now(),
        };
        let json = serde_json::to_string(&snapshot).context("Failed to serialize identity")?;

        self.entry(KEY_IDENTITY)?
            .set_password(&json)
            .context("Failed to store identity in keychain")?;
        self.entry(KEY_ACCESS_TOKEN)?
            .set_password(token)
            .context("Failed to store token in keychain")?;
        Ok(())
    }

    fn load(&self) -> Result<Option<StoredCredentials>> {
        let token = self.read_entry(KEY_ACCESS_TOKEN)?;
        let identity_json = self.read_entry(KEY_IDENTITY)?;
        Ok(assemble(token, identity_json))
    }

    fn clear(&self) -> Result<()> {
        self.delete_entry(KEY_ACCESS_TOKEN)?;
        self.delete_entry(KEY_IDENTITY)?;
        Ok(())
    }
}

/// Combine the two raw entries into the persisted pair, failing closed:
/// a partial pair or a snapshot that no longer parses reads as absent.
fn assemble(token: Option<String>, identity_json: Option<String>) -> Option<StoredCredentials> {
    match (token, identity_json) {
        (Some(token), Some(json)) => match serde_json::from_str::<IdentitySnapshot>(&json) {
            Ok(snapshot) => Some(StoredCredentials {
                identity: snapshot.identity,
                token,
                saved_at: snapshot.saved_at,
            }),
            Err(e) => {
                warn!(error = %e, "Stored identity snapshot is unparsable, treating as absent");
                None
            }
        },
        (None, None) => None,
        (token, identity_json) => {
            warn!(
                has_token = token.is_some(),
                has_identity = identity_json.is_some(),
                "Credential store holds a partial pair, treating as absent"
            );
            None
        }
    }
}
