use std::collections::HashMap;
use std::time::{Duration, Instant};

use gamestore_core::session::User;

struct SessionEntry {
    user: User,
    last_seen: Instant,
}

/// Opaque bearer tokens issued at sign-in, expiring after an idle TTL.
pub struct SessionStore {
    sessions: HashMap<String, SessionEntry>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            ttl,
        }
    }

    /// Issue a new random token for `user`.
    pub fn create(&mut self, user: User) -> String {
        let token = hex::encode(rand::random::<[u8; 32]>());
        self.sessions.insert(
            token.clone(),
            SessionEntry {
                user,
                last_seen: Instant::now(),
            },
        );
        token
    }

    /// Look up a token, refreshing its idle timer. Expired tokens are
    /// removed and resolve to `None`.
    pub fn resolve(&mut self, token: &str) -> Option<User> {
        let now = Instant::now();
        let expired = match self.sessions.get_mut(token) {
            Some(entry) if now.duration_since(entry.last_seen) < self.ttl => {
                entry.last_seen = now;
                return Some(entry.user.clone());
            },
            Some(_) => true,
            None => false,
        };
        if expired {
            self.sessions.remove(token);
            tracing::debug!("session token expired");
        }
        None
    }

    /// Revoke a token. Returns true if it existed.
    pub fn revoke(&mut self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Drop every expired session, returning how many were removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = Instant::now();
        let before = self.sessions.len();
        let ttl = self.ttl;
        self.sessions
            .retain(|_, entry| now.duration_since(entry.last_seen) < ttl);
        before - self.sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
