//! Table session registry
//!
//! Process-local map of session id → [`TableSession`]. Sessions are minted
//! after QR validation by the caller and expire `ttl` after creation.

use crate::utils::SharedClock;
use dashmap::DashMap;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::TableSession;

/// Concurrency-safe store of live customer sessions
///
/// Built once per process and shared through `Arc`.
pub struct SessionRegistry {
    sessions: DashMap<String, TableSession>,
    clock: SharedClock,
    ttl_millis: i64,
}

impl SessionRegistry {
    pub fn new(clock: SharedClock, ttl_millis: i64) -> Self {
        Self {
            sessions: DashMap::new(),
            clock,
            ttl_millis,
        }
    }

    /// Mint and register a session for a table whose QR code was verified
    pub fn open(&self, table_id: i64, table_number: i32) -> TableSession {
        let now = self.clock.now_millis();
        let session = TableSession {
            session_id: uuid::Uuid::new_v4().to_string(),
            table_id,
            table_number,
            created_at: now,
            expires_at: now + self.ttl_millis,
        };
        self.sessions
            .insert(session.session_id.clone(), session.clone());
        tracing::info!(
            table_id,
            session_id = %session.session_id,
            expires_at = session.expires_at,
            "Table session started"
        );
        session
    }

    /// Check that `session_id` is live and bound to `table_id`
    ///
    /// An expired session is evicted on the way out.
    pub fn validate(&self, table_id: i64, session_id: &str) -> AppResult<TableSession> {
        let now = self.clock.now_millis();

        let session = match self.sessions.get(session_id) {
            Some(entry) => entry.value().clone(),
            None => {
                tracing::debug!(table_id, session_id, "Unknown session rejected");
                return Err(AppError::new(ErrorCode::SessionInvalid)
                    .with_detail("session_id", session_id));
            }
        };

        if session.is_expired_at(now) {
            // Only remove the entry we looked at, a concurrent re-open keeps its own id
            self.sessions
                .remove_if(session_id, |_, s| s.is_expired_at(now));
            tracing::debug!(table_id, session_id, "Expired session rejected");
            return Err(AppError::new(ErrorCode::SessionExpired)
                .with_detail("session_id", session_id));
        }

        if session.table_id != table_id {
            tracing::warn!(
                table_id,
                session_table_id = session.table_id,
                session_id,
                "Session used for another table"
            );
            return Err(AppError::new(ErrorCode::SessionTableMismatch)
                .with_detail("session_id", session_id)
                .with_detail("table_id", table_id));
        }

        Ok(session)
    }

    /// Look a session up without a table check (expired ones count as absent)
    pub fn get(&self, session_id: &str) -> Option<TableSession> {
        let now = self.clock.now_millis();
        self.sessions
            .get(session_id)
            .map(|entry| entry.value().clone())
            .filter(|session| !session.is_expired_at(now))
    }

    /// Remove one session, returns whether it existed
    pub fn end(&self, session_id: &str) -> bool {
        let removed = self.sessions.remove(session_id).is_some();
        if removed {
            tracing::info!(session_id, "Table session ended");
        }
        removed
    }

    /// Drop every session of a table (table deleted or QR code rotated)
    pub fn revoke_table(&self, table_id: i64) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.table_id != table_id);
        let revoked = before.saturating_sub(self.sessions.len());
        if revoked > 0 {
            tracing::info!(table_id, revoked, "Table sessions revoked");
        }
        revoked
    }

    /// Evict all expired sessions, returns how many were dropped
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_millis();
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired_at(now));
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ManualClock;
    use shared::error::ErrorKind;
    use std::sync::Arc;

    const HOUR: i64 = 60 * 60 * 1_000;

    fn registry() -> (Arc<ManualClock>, SessionRegistry) {
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let registry = SessionRegistry::new(clock.clone(), 4 * HOUR);
        (clock, registry)
    }

    #[test]
    fn test_open_then_validate() {
        let (_, registry) = registry();
        let session = registry.open(7, 12);
        assert_eq!(session.expires_at - session.created_at, 4 * HOUR);

        let validated = registry.validate(7, &session.session_id).unwrap();
        assert_eq!(validated, session);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_expiry_boundary() {
        let (clock, registry) = registry();
        let session = registry.open(7, 12);

        clock.set(session.expires_at - 1_000);
        assert!(registry.validate(7, &session.session_id).is_ok());

        clock.set(session.expires_at);
        let err = registry.validate(7, &session.session_id).unwrap_err();
        assert_eq!(err.code, ErrorCode::SessionExpired);
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        // Evicted lazily
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unknown_and_mismatched() {
        let (_, registry) = registry();
        let session = registry.open(7, 12);

        let err = registry.validate(7, "nope").unwrap_err();
        assert_eq!(err.code, ErrorCode::SessionInvalid);

        let err = registry.validate(8, &session.session_id).unwrap_err();
        assert_eq!(err.code, ErrorCode::SessionTableMismatch);
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        // A mismatch does not destroy the session
        assert!(registry.validate(7, &session.session_id).is_ok());
    }

    #[test]
    fn test_purge_and_revoke() {
        let (clock, registry) = registry();
        let old = registry.open(1, 1);
        clock.advance_millis(2 * HOUR);
        let fresh = registry.open(2, 2);
        let other = registry.open(3, 3);

        clock.advance_millis(2 * HOUR + 1);
        assert_eq!(registry.purge_expired(), 1);
        assert!(registry.get(&old.session_id).is_none());
        assert!(registry.get(&fresh.session_id).is_some());

        assert_eq!(registry.revoke_table(2), 1);
        assert!(registry.get(&fresh.session_id).is_none());
        assert!(registry.end(&other.session_id));
        assert!(!registry.end(&other.session_id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_concurrent_open_and_validate() {
        let (_, registry) = registry();
        let registry = Arc::new(registry);
        let handles: Vec<_> = (0..8)
            .map(|table_id| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        let session = registry.open(table_id, table_id as i32);
                        registry.validate(table_id, &session.session_id).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.len(), 400);
    }
}
