//! Keyed session snapshots for in-flight ticket runs.
//!
//! One session per ticket, keyed by the caller's thread id. The engine
//! saves a snapshot after every merged step so an interrupted run can be
//! inspected or resumed. The store is a trait so a durable backend can be
//! slotted in without touching the engine; the in-memory implementation
//! covers tests and single-process deployments.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::state::TicketState;

/// Errors from the session store.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session lock poisoned")]
    LockPoisoned,

    #[error("session backend failure: {0}")]
    Backend(String),
}

/// A stored snapshot plus its bookkeeping.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub state: TicketState,
    pub updated_at: DateTime<Utc>,
}

/// Keyed snapshot/restore semantics for one ticket's workflow state.
///
/// Concurrent runs under different keys must not observe each other's
/// partial updates; one key maps to exactly one ticket's state.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save(&self, thread_id: &str, state: &TicketState) -> Result<(), SessionError>;
    async fn load(&self, thread_id: &str) -> Result<Option<SessionSnapshot>, SessionError>;
    async fn remove(&self, thread_id: &str) -> Result<(), SessionError>;
}

/// In-memory [`SessionStore`] behind a read-write lock.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    entries: RwLock<HashMap<String, SessionSnapshot>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save(&self, thread_id: &str, state: &TicketState) -> Result<(), SessionError> {
        let mut entries = self.entries.write().map_err(|_| SessionError::LockPoisoned)?;
        entries.insert(
            thread_id.to_string(),
            SessionSnapshot {
                state: state.clone(),
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn load(&self, thread_id: &str) -> Result<Option<SessionSnapshot>, SessionError> {
        let entries = self.entries.read().map_err(|_| SessionError::LockPoisoned)?;
        Ok(entries.get(thread_id).cloned())
    }

    async fn remove(&self, thread_id: &str) -> Result<(), SessionError> {
        let mut entries = self.entries.write().map_err(|_| SessionError::LockPoisoned)?;
        entries.remove(thread_id);
        Ok(())
    }
}
