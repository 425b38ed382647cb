//! Conversation types: roles, utterances, and session keys.
//!
//! An [`Utterance`] is one turn of the spoken conversation (what the learner
//! said or what the assistant answered). Utterances are grouped into ordered
//! sequences addressed by a [`SessionKey`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Role of a message in a chat-completion conversation.
///
/// Stored utterances are always `User` or `Assistant`; `System` only appears
/// in the message list sent upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(format!("invalid role: '{other}'")),
        }
    }
}

/// A single recorded turn of the conversation.
///
/// Immutable once created. `id` and `created_at` are bookkeeping only and
/// are never sent upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Utterance {
    /// Something the learner said (a transcription or a typed message).
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    /// A reply produced by the chat model.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Identifies one conversation history.
///
/// The relay addresses the [`SessionKey::shared`] conversation unless
/// per-client isolation is switched on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    const SHARED: &'static str = "shared";

    /// The process-wide conversation used by every client by default.
    pub fn shared() -> Self {
        Self(Self::SHARED.to_string())
    }

    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_shared(&self) -> bool {
        self.0 == Self::SHARED
    }
}

impl Default for SessionKey {
    fn default() -> Self {
        Self::shared()
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
