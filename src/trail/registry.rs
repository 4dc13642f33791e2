use crate::trail::session::{SessionKey, TrailSession};
use std::collections::HashMap;

/// Live sessions, one per contact
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<SessionKey, TrailSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a session unless its key is already taken
    ///
    /// Returns `false` and leaves the registry unchanged on a duplicate key.
    pub fn insert(&mut self, session: TrailSession) -> bool {
        let key = session.key();
        if self.sessions.contains_key(&key) {
            return false;
        }
        self.sessions.insert(key, session);
        true
    }

    pub fn get(&self, key: &SessionKey) -> Option<&TrailSession> {
        self.sessions.get(key)
    }

    pub fn get_mut(&mut self, key: &SessionKey) -> Option<&mut TrailSession> {
        self.sessions.get_mut(key)
    }

    pub fn remove(&mut self, key: &SessionKey) -> Option<TrailSession> {
        self.sessions.remove(key)
    }

    pub fn contains(&self, key: &SessionKey) -> bool {
        self.sessions.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrailSession> {
        self.sessions.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TrailSession> {
        self.sessions.values_mut()
    }

    /// Keys of every touch session, ending ones included
    pub fn contact_keys(&self) -> Vec<SessionKey> {
        self.sessions
            .keys()
            .copied()
            .filter(SessionKey::is_contact)
            .collect()
    }

    /// Keys of sessions whose removal deadline is at or before `now_ms`
    pub fn expired(&self, now_ms: f64) -> Vec<SessionKey> {
        self.sessions
            .values()
            .filter(|s| s.remove_at_ms().is_some_and(|deadline| deadline <= now_ms))
            .map(TrailSession::key)
            .collect()
    }

    /// Remove and return every session
    pub fn drain(&mut self) -> Vec<TrailSession> {
        self.sessions.drain().map(|(_, session)| session).collect()
    }
}
