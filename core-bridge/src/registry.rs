//! Session bookkeeping.
//!
//! The registry associates caller-bound session ids with the caller's
//! shared memory handle. It has no concurrency of its own: the dispatcher
//! task owns it, so every mutation happens inside the exclusive region by
//! construction.

use std::collections::HashMap;

use bridge_traits::error::{BridgeError, Result};
use core_shm::SharedRegion;

/// Id → memory-handle association for the bridge's sessions.
///
/// Ids are unique and strictly increasing for the registry's lifetime;
/// closing a session never frees its id for reuse.
#[derive(Debug)]
pub struct SessionRegistry {
    next_id: u64,
    sessions: HashMap<u64, SharedRegion>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            sessions: HashMap::new(),
        }
    }

    /// Registers a memory handle and returns the freshly allocated id.
    pub fn open(&mut self, memory: SharedRegion) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.sessions.insert(id, memory);
        id
    }

    /// Removes a session.
    ///
    /// Fails with [`BridgeError::UnknownSession`] if the id was never
    /// issued or has already been closed; a close for a missing session
    /// is a caller bug worth surfacing.
    pub fn close(&mut self, session_id: u64) -> Result<()> {
        self.sessions
            .remove(&session_id)
            .map(|_| ())
            .ok_or(BridgeError::UnknownSession(session_id))
    }

    /// Replaces the memory handle of an existing session.
    pub fn update_memory(&mut self, session_id: u64, memory: SharedRegion) -> Result<()> {
        match self.sessions.get_mut(&session_id) {
            Some(slot) => {
                *slot = memory;
                Ok(())
            }
            None => Err(BridgeError::UnknownSession(session_id)),
        }
    }

    /// Looks up a session's memory handle.
    pub fn memory(&self, session_id: u64) -> Result<&SharedRegion> {
        self.sessions
            .get(&session_id)
            .ok_or(BridgeError::UnknownSession(session_id))
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
