//! Turn and Session domain types.
//!
//! A Session is the ordered, append-only log of (role, text) turns for one
//! user session. It is replayed verbatim into every model call, so append
//! order is the conversation order. Turns are never mutated or deleted; the
//! only reset is a full-session clear.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The assistant (generated reply, proactive briefing, or visible failure)
    Assistant,
}

/// A single turn in a session. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Unique turn ID
    pub id: String,

    /// Who authored this turn
    pub role: Role,

    /// The text content
    pub text: String,

    /// When the turn was appended
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a new user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::User,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new assistant turn.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::Assistant,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// The conversation state for one user session.
///
/// Owned by the caller: one instance per active session, created at session
/// start and discarded at session end. Mutation happens at exactly two points
/// — a user submit and a produced reply (proactive or generated) — both
/// appends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session ID
    pub id: SessionId,

    /// Ordered turns
    turns: Vec<Turn>,

    /// When this session was created
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Create a new empty session.
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            turns: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Append a user turn.
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::user(text));
    }

    /// Append an assistant turn.
    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::assistant(text));
    }

    /// The ordered turn log.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Whether any user turn exists yet. The proactive monitor's injected
    /// turn must land while this is still false.
    pub fn has_user_turn(&self) -> bool {
        self.turns.iter().any(|t| t.role == Role::User)
    }

    /// Full-session reset ("clear memory"). The only way turns are removed.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Export the turn log as a pretty JSON dump (the manual escape hatch —
    /// sessions are not otherwise persisted).
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_turn() {
        let turn = Turn::user("what's due this week");
        assert_eq!(turn.role, Role::User);
        assert_eq!(turn.text, "what's due this week");
    }

    #[test]
    fn session_appends_in_order() {
        let mut session = Session::new();
        session.push_user("first");
        session.push_assistant("second");
        session.push_user("third");

        let texts: Vec<&str> = session.turns().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn has_user_turn_ignores_assistant_turns() {
        let mut session = Session::new();
        assert!(!session.has_user_turn());

        session.push_assistant("proactive briefing");
        assert!(!session.has_user_turn());

        session.push_user("hello");
        assert!(session.has_user_turn());
    }

    #[test]
    fn clear_resets_everything() {
        let mut session = Session::new();
        session.push_user("a");
        session.push_assistant("b");
        session.clear();
        assert!(session.is_empty());
        assert!(!session.has_user_turn());
    }

    #[test]
    fn json_export_roundtrip() {
        let mut session = Session::new();
        session.push_user("export me");

        let json = session.to_json().unwrap();
        let parsed: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.turns()[0].text, "export me");
        assert_eq!(parsed.turns()[0].role, Role::User);
    }

    #[test]
    fn turn_serialization_uses_lowercase_roles() {
        let turn = Turn::assistant("hi");
        let json = serde_json::to_string(&turn).unwrap();
        assert!(json.contains("\"assistant\""));
    }
}
