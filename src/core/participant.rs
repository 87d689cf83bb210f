use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a participant in a session.
///
/// Participants are identified by display name, unique within a session.
/// The surrounding session layer owns validation and normalization of
/// names; the core treats the identifier as opaque.
///
/// # Examples
///
/// ```
/// use fairsplit_engine::core::participant::ParticipantId;
///
/// let alice = ParticipantId::new("Alice");
/// let bob = ParticipantId::new("Bob");
/// assert_ne!(alice, bob);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Create a new participant identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the string representation of this participant ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_equality() {
        let a = ParticipantId::new("Alice");
        let b = ParticipantId::new("Alice");
        let c = ParticipantId::new("Bob");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_participant_display() {
        let p = ParticipantId::new("Carol");
        assert_eq!(format!("{}", p), "Carol");
    }

    #[test]
    fn test_participant_ordering() {
        let a = ParticipantId::new("Alice");
        let b = ParticipantId::new("Bob");
        assert!(a < b);
    }
}
