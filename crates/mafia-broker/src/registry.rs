//! Subscription registry: which live session listens on which topic.
//!
//! Pure state, no I/O: the broker wraps it in a single mutex and is the only
//! code that touches it. Handles are generic so the bookkeeping can be
//! tested without sockets.
//!
//! Invariant: a session id appears in a topic's subscriber set only while the
//! session itself is registered. [`Registry::remove_session`] erases it from
//! every topic in the same call, and topics left without subscribers are
//! dropped.
use std::collections::{HashMap, HashSet};

use crate::session::SessionId;

/// Topic → subscriber bookkeeping for all live sessions.
#[derive(Debug)]
pub struct Registry<W> {
    /// Live sessions and their write handles.
    sessions: HashMap<SessionId, W>,
    /// Topic name → subscribed session ids.
    topics: HashMap<String, HashSet<SessionId>>,
}

impl<W> Default for Registry<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> Registry<W> {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            topics: HashMap::new(),
        }
    }

    /// Register a freshly accepted session.
    pub fn insert_session(&mut self, id: SessionId, handle: W) {
        self.sessions.insert(id, handle);
    }

    /// Add `id` to `topic`, creating the topic if needed.
    ///
    /// Returns `false` (and changes nothing) if the session is not live.
    /// Subscribing twice is a no-op that still returns `true`.
    pub fn subscribe(&mut self, id: &SessionId, topic: &str) -> bool {
        if !self.sessions.contains_key(id) {
            return false;
        }
        self.topics
            .entry(topic.to_string())
            .or_default()
            .insert(id.clone());
        true
    }

    /// Forget a session entirely. Returns its handle if it was live.
    pub fn remove_session(&mut self, id: &SessionId) -> Option<W> {
        let handle = self.sessions.remove(id);
        self.topics.retain(|_, subscribers| {
            subscribers.remove(id);
            !subscribers.is_empty()
        });
        handle
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.get(topic).map_or(0, HashSet::len)
    }

    pub fn is_subscribed(&self, id: &SessionId, topic: &str) -> bool {
        self.topics
            .get(topic)
            .is_some_and(|subscribers| subscribers.contains(id))
    }
}

impl<W: Clone> Registry<W> {
    /// Snapshot of `(id, handle)` for every live subscriber of `topic`.
    ///
    /// The snapshot lets the caller release the registry before writing.
    pub fn subscribers(&self, topic: &str) -> Vec<(SessionId, W)> {
        let Some(ids) = self.topics.get(topic) else {
            return Vec::new();
        };
        ids.iter()
            .filter_map(|id| {
                self.sessions
                    .get(id)
                    .map(|handle| (id.clone(), handle.clone()))
            })
            .collect()
    }
}
