//! Conversation history storage.
//!
//! Histories are append-only sequences of [`Utterance`]s addressed by
//! [`SessionKey`]. Nothing is persisted; histories live for the lifetime of
//! the process.

use dashmap::DashMap;
use uuid::Uuid;

use parley_types::conversation::{SessionKey, Utterance};

/// Storage for conversation histories.
///
/// Each operation is atomic with respect to the history it touches, but no
/// ordering is promised between concurrent callers: two in-flight requests
/// may interleave their appends.
pub trait ConversationStore: Send + Sync {
    /// Append an utterance to the end of a session's history.
    fn append(&self, session: &SessionKey, utterance: Utterance);

    /// The most recent `n` utterances in chronological order (fewer if the
    /// history is shorter).
    fn last_n(&self, session: &SessionKey, n: usize) -> Vec<Utterance>;

    /// Number of utterances recorded for a session.
    fn count(&self, session: &SessionKey) -> usize;

    /// Empty a session's history, returning how many utterances were dropped.
    fn reset(&self, session: &SessionKey) -> usize;

    /// Remove specific utterances by id, returning how many were found.
    fn remove(&self, session: &SessionKey, ids: &[Uuid]) -> usize;
}

/// In-process [`ConversationStore`] backed by a concurrent map of sessions.
#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    sessions: DashMap<SessionKey, Vec<Utterance>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions with a history entry (including emptied ones).
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

impl ConversationStore for InMemoryConversationStore {
    fn append(&self, session: &SessionKey, utterance: Utterance) {
        self.sessions
            .entry(session.clone())
            .or_default()
            .push(utterance);
    }

    fn last_n(&self, session: &SessionKey, n: usize) -> Vec<Utterance> {
        match self.sessions.get(session) {
            Some(history) => {
                let start = history.len().saturating_sub(n);
                history[start..].to_vec()
            }
            None => Vec::new(),
        }
    }

    fn count(&self, session: &SessionKey) -> usize {
        self.sessions.get(session).map_or(0, |history| history.len())
    }

    fn reset(&self, session: &SessionKey) -> usize {
        match self.sessions.get_mut(session) {
            Some(mut history) => {
                let dropped = history.len();
                history.clear();
                dropped
            }
            None => 0,
        }
    }

    fn remove(&self, session: &SessionKey, ids: &[Uuid]) -> usize {
        match self.sessions.get_mut(session) {
            Some(mut history) => {
                let before = history.len();
                history.retain(|u| !ids.contains(&u.id));
                before - history.len()
            }
            None => 0,
        }
    }
}
