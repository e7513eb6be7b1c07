//! crates/flame_core/src/session.rs
//!
//! Signed-in reader sessions. An `AuthSession` is the explicit context handed
//! to every operation that needs a user identity.

use chrono::Duration;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::domain::AuthSession;
use crate::ports::{Clock, PortError, PortResult};

pub struct SessionRegistry {
    sessions: HashMap<String, AuthSession>,
    clock: Arc<dyn Clock>,
}

impl SessionRegistry {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: HashMap::new(),
            clock,
        }
    }

    /// Issues a fresh opaque token for `user_id`, valid for `ttl`. Expired
    /// sessions are dropped first so abandoned tokens do not accumulate.
    pub fn open(&mut self, user_id: Uuid, ttl: Duration) -> AuthSession {
        let now = self.clock.now();
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.expires_at > now);
        if self.sessions.len() < before {
            debug!(evicted = before - self.sessions.len(), "Dropped expired sessions");
        }
        let session = AuthSession {
            id: Uuid::new_v4().to_string(),
            user_id,
            expires_at: now + ttl,
        };
        self.sessions.insert(session.id.clone(), session.clone());
        session
    }

    pub fn validate(&mut self, session_id: &str) -> PortResult<AuthSession> {
        let session = self.sessions.get(session_id).ok_or(PortError::Unauthorized)?;
        if session.expires_at <= self.clock.now() {
            debug!(user_id = %session.user_id, "Evicting expired session");
            self.sessions.remove(session_id);
            return Err(PortError::Unauthorized);
        }
        Ok(session.clone())
    }

    pub fn close(&mut self, session_id: &str) -> PortResult<()> {
        self.sessions
            .remove(session_id)
            .map(|_| ())
            .ok_or(PortError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::SystemClock;

    #[test]
    fn open_validate_close() {
        let mut sessions = SessionRegistry::new(Arc::new(SystemClock));
        let user = Uuid::new_v4();
        let session = sessions.open(user, Duration::days(1));
        assert_eq!(sessions.validate(&session.id).unwrap().user_id, user);
        sessions.close(&session.id).unwrap();
        assert_eq!(sessions.validate(&session.id), Err(PortError::Unauthorized));
        assert_eq!(sessions.close(&session.id), Err(PortError::Unauthorized));
    }

    #[test]
    fn expired_sessions_are_rejected() {
        let mut sessions = SessionRegistry::new(Arc::new(SystemClock));
        let session = sessions.open(Uuid::new_v4(), Duration::seconds(-1));
        assert_eq!(sessions.validate(&session.id), Err(PortError::Unauthorized));
        assert_eq!(sessions.close(&session.id), Err(PortError::Unauthorized));
    }

    #[test]
    fn opening_a_session_drops_expired_ones() {
        let mut sessions = SessionRegistry::new(Arc::new(SystemClock));
        let stale: Vec<AuthSession> = (0..3)
            .map(|_| sessions.open(Uuid::new_v4(), Duration::seconds(-1)))
            .collect();
        let live = sessions.open(Uuid::new_v4(), Duration::days(1));
        assert_eq!(sessions.sessions.len(), 1);
        assert!(stale.iter().all(|s| !sessions.sessions.contains_key(&s.id)));
        assert_eq!(sessions.validate(&live.id).unwrap().user_id, live.user_id);
    }
}
