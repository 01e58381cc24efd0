//! Session lifecycle orchestration.
//!
//! `SessionManager` is the only component that mutates session state. It is
//! constructed once at process start with an injected Auth Service client
//! and credential store, and exposes four operations (hydrate, login,
//! reset_password, logout) plus synchronous derived queries.
//!
//! Every operation resolves to a small outcome value rather than an error:
//! callers render deterministic UI from the result, and navigation side
//! effects are returned as signals for the host to interpret.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::AuthApi;
use crate::auth::credentials::CredentialStore;
use crate::auth::session::{Hydration, LoginOutcome, Session, SessionState};
use crate::models::Identity;

/// Trust posture for startup hydration.
#[derive(Debug, Clone, Copy)]
pub struct SessionPolicy {
    /// When the Auth Service cannot be reached at startup (a transport
    /// failure, not a rejection), trust the persisted session instead of
    /// forcing a logout. On by default: losing connectivity should not
    /// eject an already-established user. Stricter deployments turn this
    /// off, which makes an unreachable service behave like a rejection.
    pub offline_trust: bool,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self { offline_trust: true }
    }
}

/// Orchestrates the authenticated-session lifecycle.
///
/// Mutating operations serialize through a single in-flight guard, so a
/// logout can never clear a session a concurrent login just established.
/// The derived queries read a separate lock that is only written at
/// operation completion points, so they stay responsive while a network
/// call is in flight.
pub struct SessionManager<A, S> {
    api: A,
    store: S,
    policy: SessionPolicy,
    session: RwLock<Session>,
    op_guard: Mutex<()>,
}

impl<A, S> SessionManager<A, S>
where
    A: AuthApi,
    S: CredentialStore,
{
    pub fn new(api: A, store: S) -> Self {
        Self::with_policy(api, store, SessionPolicy::default())
    }

    pub fn with_policy(api: A, store: S, policy: SessionPolicy) -> Self {
        Self {
            api,
            store,
            policy,
            session: RwLock::new(Session::new()),
            op_guard: Mutex::new(()),
        }
    }

    fn session(&self) -> RwLockReadGuard<'_, Session> {
        self.session.read().unwrap_or_else(|e| e.into_inner())
    }

    fn session_mut(&self) -> RwLockWriteGuard<'_, Session> {
        self.session.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Startup hydration. Invoked once per process start, before any other
    /// operation.
    ///
    /// Reads the persisted pair and validates the token remotely. An empty
    /// store short-circuits without a network call. A rejected token clears
    /// the store and returns [`Hydration::Rejected`], the signal for the
    /// host to redirect to its login entry point (unless the current
    /// location is one of its public surfaces - that allow-list is the
    /// host's to check). A transport failure falls back to the persisted
    /// values when [`SessionPolicy::offline_trust`] allows it.
    pub async fn hydrate(&self) -> Hydration {
        let _op = self.op_guard.lock().await;

        let stored = match self.store.load() {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "Credential store unavailable, starting unauthenticated");
                None
            }
        };

        let Some(stored) = stored else {
            debug!("No persisted session");
            self.session_mut().clear();
            return Hydration::NoSession;
        };

        match self.api.fetch_identity(&stored.token).await {
            Ok(_) => {
                info!(email = %stored.identity.email, "Persisted session validated");
                self.session_mut().establish(stored.identity, stored.token, None);
                Hydration::Restored
            }
            Err(e) if e.is_transport() && self.policy.offline_trust => {
                warn!(
                    error = %e,
                    snapshot_age_minutes = stored.age_minutes(),
                    "Auth service unreachable, trusting persisted session"
                );
                self.session_mut().establish(stored.identity, stored.token, None);
                Hydration::Offline
            }
            Err(e) => {
                info!(error = %e, "Persisted token rejected, clearing stored session");
                if let Err(e) = self.store.clear() {
                    warn!(error = %e, "Failed to clear credential store");
                }
                self.session_mut().clear();
                Hydration::Rejected
            }
        }
    }

    /// Exchange credentials for a full session.
    ///
    /// The token exchange and the identity fetch succeed or fail as one:
    /// no partial session is ever established. Rejection reasons are
    /// logged for display; callers only branch on the success flag.
    pub async fn login(&self, username: &str, password: &str) -> LoginOutcome {
        let _op = self.op_guard.lock().await;

        let token = match self.api.login(username, password).await {
            Ok(token) => token,
            Err(e) => {
                info!(error = %e, "Login rejected");
                return LoginOutcome::denied();
            }
        };

        let identity = match self.api.fetch_identity(&token).await {
            Ok(identity) => identity,
            Err(e) => {
                warn!(error = %e, "Identity fetch failed after login, discarding token");
                return LoginOutcome::denied();
            }
        };

        if let Err(e) = self.store.save(&identity, &token) {
            warn!(error = %e, "Failed to persist session, continuing in memory only");
        }

        let reset_required = identity.first_login;
        info!(
            email = %identity.email,
            role = %identity.role,
            reset_required,
            "Login succeeded"
        );

        // The reset endpoint needs the current password re-submitted, so it
        // is retained in memory for exactly as long as the reset is pending.
        let secret = reset_required.then(|| password.to_string());
        self.session_mut().establish(identity, token, secret);

        LoginOutcome::granted(reset_required)
    }

    /// Complete the mandatory first-login password change.
    ///
    /// Requires an active session with `first_login` set and a pending
    /// secret; anything else is a caller bug and fails without contacting
    /// the Auth Service. On rejection the session is left untouched so the
    /// user may retry.
    pub async fn reset_password(&self, new_password: &str) -> bool {
        let _op = self.op_guard.lock().await;

        let (token, current) = {
            let session = self.session();
            let reset_pending = session
                .identity
                .as_ref()
                .map(|i| i.first_login)
                .unwrap_or(false);
            match (&session.token, &session.pending_reset_secret) {
                (Some(token), Some(secret)) if reset_pending => (token.clone(), secret.clone()),
                _ => {
                    warn!("reset_password called without a pending first-login reset");
                    return false;
                }
            }
        };

        if let Err(e) = self.api.reset_password(&token, &current, new_password).await {
            info!(error = %e, "Password reset rejected, session unchanged");
            return false;
        }

        let updated = {
            let mut session = self.session_mut();
            session.complete_reset();
            session.identity.clone()
        };
        if let Some(identity) = updated {
            // Token is unchanged; only the identity snapshot moves.
            if let Err(e) = self.store.save(&identity, &token) {
                warn!(error = %e, "Failed to persist updated identity");
            }
        }

        info!("Password reset completed");
        true
    }

    /// End the session. Clears the in-memory state and the credential
    /// store; the host navigates back to its entry point afterwards.
    /// Idempotent - logging out of an empty session still clears the store.
    ///
    /// This is also the teardown path when a screen's own API call comes
    /// back 401: the token is no longer trusted anywhere, so the host
    /// calls this and redirects.
    pub async fn logout(&self) {
        let _op = self.op_guard.lock().await;

        self.session_mut().clear();
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear credential store");
        }
        info!("Logged out");
    }

    /// Current lifecycle state, including the transitional `Hydrating`
    /// value while startup validation is still in flight.
    pub fn state(&self) -> SessionState {
        self.session().state
    }

    /// True iff an identity is present. A reset-required session counts as
    /// authenticated; check [`Self::reset_required`] before granting full
    /// interactive access.
    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    pub fn reset_required(&self) -> bool {
        self.state().reset_required()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.session().identity.clone()
    }

    /// The bearer token, for screens attaching it to their own requests.
    pub fn token(&self) -> Option<String> {
        self.session().token.clone()
    }
}
