use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The secret handed to a session's creator.
///
/// Whoever presents it gets an owner-level grant; it is never derivable
/// from the session itself. Treat it like a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerSecret(Uuid);

impl OwnerSecret {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for OwnerSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for OwnerSecret {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// What a grant lets its holder do, from weakest to strongest.
///
/// `View` reads session state, `Edit` adds people and expenses and
/// recomputes settlement, `Owner` restructures the session (renames,
/// deletions, password changes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccessLevel {
    View,
    Edit,
    Owner,
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessLevel::View => write!(f, "view"),
            AccessLevel::Edit => write!(f, "edit"),
            AccessLevel::Owner => write!(f, "owner"),
        }
    }
}

/// A capability token for one session.
///
/// Grants are minted by [`crate::session::Session`] in exchange for
/// credentials and passed explicitly into every operation that needs
/// authorization. There is no ambient authorization state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionGrant {
    session_id: Uuid,
    level: AccessLevel,
}

impl SessionGrant {
    pub(crate) fn new(session_id: Uuid, level: AccessLevel) -> Self {
        Self { session_id, level }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn level(&self) -> AccessLevel {
        self.level
    }

    /// Whether this grant covers operations requiring `level`.
    pub fn permits(&self, level: AccessLevel) -> bool {
        self.level >= level
    }
}
