use serde::{Deserialize, Serialize};

/// Authorization role of an authenticated principal.
///
/// The role determines which dashboard areas a user may reach; the session
/// core carries it through unchanged and never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Superadmin,
    Admin,
    Consultant,
    Client,
    Contractor,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Superadmin => write!(f, "Superadmin"),
            Role::Admin => write!(f, "Admin"),
            Role::Consultant => write!(f, "Consultant"),
            Role::Client => write!(f, "Client"),
            Role::Contractor => write!(f, "Contractor"),
        }
    }
}

/// The authenticated principal.
///
/// `first_login` stays true until the user completes the mandatory password
/// change; it transitions to false only through a successful reset.
/// `linked_record_id` points at a role-specific profile record (a contractor
/// or client row) and is opaque to the session core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub role: Role,
    pub first_login: bool,
    pub linked_record_id: Option<String>,
}
