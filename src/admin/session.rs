//! In-memory admin sessions.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use uuid::Uuid;

/// Issued admin tokens and when they expire.
#[derive(Debug)]
pub struct AdminSessions {
    tokens: DashMap<String, Instant>,
    ttl: Duration,
}

impl AdminSessions {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            tokens: DashMap::new(),
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    /// Issue a fresh token valid for the configured TTL.
    pub fn issue(&self) -> String {
        self.purge_expired();
        let token = Uuid::new_v4().to_string();
        self.tokens.insert(token.clone(), Instant::now() + self.ttl);
        token
    }

    /// True if `token` was issued and has not expired. Expired tokens are dropped.
    pub fn is_valid(&self, token: &str) -> bool {
        let expired = match self.tokens.get(token) {
            Some(expires_at) => Instant::now() >= *expires_at,
            None => return false,
        };
        if expired {
            self.tokens.remove(token);
        }
        !expired
    }

    fn purge_expired(&self) {
        let now = Instant::now();
        self.tokens.retain(|_, expires_at| *expires_at > now);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issued_token_is_valid() {
        let sessions = AdminSessions::new(60);
        let token = sessions.issue();
        assert!(sessions.is_valid(&token));
        assert!(!sessions.is_valid("not-issued"));
    }

    #[test]
    fn test_tokens_are_unique() {
        let sessions = AdminSessions::new(60);
        assert_ne!(sessions.issue(), sessions.issue());
        assert_eq!(sessions.len(), 2);
    }

    #[test]
    fn test_expired_token_is_dropped() {
        let sessions = AdminSessions::new(0);
        let token = sessions.issue();
        assert!(!sessions.is_valid(&token));
        assert!(sessions.is_empty());
    }
}
