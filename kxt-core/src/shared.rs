//! Shared access to a document log across threads.
//!
//! ```text
//!  writer ──append──► RwLock<Arc<DocumentLog>> ──version()──► Arc (reader A)
//!                            │                   └──────────► Arc (reader B)
//!                            └── Arc::make_mut: copies only while a
//!                                reader still holds the previous version
//! ```
//!
//! Appends are serialized by the write lock. Readers take the read lock just
//! long enough to clone the `Arc`, then query their version lock-free.
//!
//! Versions do not share a prefix: an append made while a reader still holds
//! a version clones the whole log, so it costs O(frames). With no versions
//! outstanding the append happens in place. Long-lived readers under heavy
//! append traffic should refresh their version rather than hold one.

use std::sync::{Arc, PoisonError, RwLock};

use crate::error::LogError;
use crate::frame::{Editor, Frame};
use crate::log::DocumentLog;

/// Thread-safe handle to a single document log.
#[derive(Debug)]
pub struct SharedLog {
    current: RwLock<Arc<DocumentLog>>,
}

impl SharedLog {
    pub fn new(log: DocumentLog) -> Self {
        Self {
            current: RwLock::new(Arc::new(log)),
        }
    }

    /// Append a frame, returning its index.
    pub fn append(&self, frame: Frame) -> Result<usize, LogError> {
        // Appends are all-or-nothing, so a poisoned lock still guards a
        // consistent log.
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        Arc::make_mut(&mut guard).append(frame)
    }

    /// Immutable version of the log as of now.
    ///
    /// Later appends are not visible through the returned handle.
    pub fn version(&self) -> Arc<DocumentLog> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn reconstruct_at(&self, time_ms: u64) -> Result<String, LogError> {
        self.version().reconstruct_at(time_ms)
    }

    pub fn reconstruct_at_frame(&self, index: usize) -> Result<String, LogError> {
        self.version().reconstruct_at_frame(index)
    }

    pub fn cursor_at(&self, time_ms: u64) -> Result<Editor, LogError> {
        self.version().cursor_at(time_ms)
    }

    pub fn frame_count(&self) -> usize {
        self.version().frame_count()
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.version().total_duration_ms()
    }

    /// Take the log back out, copying only if versions are still held.
    pub fn into_inner(self) -> DocumentLog {
        let current = self
            .current
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::unwrap_or_clone(current)
    }
}

impl From<DocumentLog> for SharedLog {
    fn from(log: DocumentLog) -> Self {
        Self::new(log)
    }
}
