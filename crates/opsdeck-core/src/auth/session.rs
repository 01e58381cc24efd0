//! In-memory session state and the outcome values returned by the
//! session manager's operations.

use crate::models::Identity;

/// Externally visible session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Startup validation has not completed yet. Callers should render a
    /// loading affordance rather than treating this as logged out.
    Hydrating,
    Unauthenticated,
    /// Authenticated, but the mandatory first-login password change is
    /// still pending. Full interactive access is withheld until reset.
    ResetRequired,
    Active,
}

impl SessionState {
    /// True for both authenticated states. A reset-required session is
    /// authenticated; callers check `reset_required` separately before
    /// granting full access.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::ResetRequired | SessionState::Active)
    }

    pub fn reset_required(&self) -> bool {
        matches!(self, SessionState::ResetRequired)
    }
}

/// Result of startup hydration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Hydration {
    /// Persisted session found and validated remotely.
    Restored,
    /// Auth service unreachable; the persisted session is trusted without
    /// remote confirmation until the next validation opportunity.
    Offline,
    /// Nothing persisted. No network call was made.
    NoSession,
    /// The persisted token was rejected. The store has been cleared and the
    /// host should redirect to the login entry point, unless the current
    /// location is one of its public surfaces.
    Rejected,
}

impl Hydration {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Hydration::Restored | Hydration::Offline)
    }

    /// The redirect signal. The allow-list of public surfaces is the
    /// host's concern; the core only reports that a redirect is needed.
    pub fn redirect_required(&self) -> bool {
        matches!(self, Hydration::Rejected)
    }
}

/// Result of a login attempt. Rejection reasons are surfaced through logs
/// for display only; callers get a single success boolean for control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginOutcome {
    pub success: bool,
    pub reset_required: bool,
}

impl LoginOutcome {
    pub(crate) fn denied() -> Self {
        Self {
            success: false,
            reset_required: false,
        }
    }

    pub(crate) fn granted(reset_required: bool) -> Self {
        Self {
            success: true,
            reset_required,
        }
    }
}

/// The one live session of this process.
///
/// `pending_reset_secret` is the plaintext password of the most recent
/// successful login, held only while `first_login` is true because the
/// reset endpoint requires it to be re-submitted. It is never persisted
/// and never logged; no `Debug` impl exists on purpose.
pub(crate) struct Session {
    pub(crate) identity: Option<Identity>,
    pub(crate) token: Option<String>,
    pub(crate) pending_reset_secret: Option<String>,
    pub(crate) state: SessionState,
}

impl Session {
    pub(crate) fn new() -> Self {
        Self {
            identity: None,
            token: None,
            pending_reset_secret: None,
            state: SessionState::Hydrating,
        }
    }

    /// Populate the session after a successful login or hydration.
    /// Identity and token are set together or not at all.
    pub(crate) fn establish(
        &mut self,
        identity: Identity,
        token: String,
        pending_reset_secret: Option<String>,
    ) {
        self.state = if identity.first_login {
            SessionState::ResetRequired
        } else {
            SessionState::Active
        };
        // The secret only matters while the reset is pending.
        self.pending_reset_secret = if identity.first_login {
            pending_reset_secret
        } else {
            None
        };
        self.identity = Some(identity);
        self.token = Some(token);
    }

    /// Drop every field, including the pending secret.
    pub(crate) fn clear(&mut self) {
        self.identity = None;
        self.token = None;
        self.pending_reset_secret = None;
        self.state = SessionState::Unauthenticated;
    }

    /// Mark the mandatory password change as done. The only path that
    /// flips `first_login` to false.
    pub(crate) fn complete_reset(&mut self) {
        if let Some(identity) = self.identity.as_mut() {
            identity.first_login = false;
        }
        self.pending_reset_secret = None;
        self.state = SessionState::Active;
    }
}
