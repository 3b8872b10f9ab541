//! Checkpoint policy.
//!
//! Decides when the log synthesizes a snapshot so that replay cost stays
//! bounded no matter how long a recording grows:
//!
//! ```text
//! snap ── δ ── δ ── δ ── … ── δ ── snap ── δ ── δ …
//!      └──── ≤ N frames or ≤ M ms ────┘
//! ```

use serde::{Deserialize, Serialize};

/// Limits on the distance from the latest snapshot.
///
/// `None` disables a limit. Both disabled means snapshots are only taken
/// when the writer appends one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointPolicy {
    /// Force a snapshot after this many content/cursor frames. Default: 256.
    pub max_frames_since_snapshot: Option<usize>,
    /// Force a snapshot after this much log time. Default: 30s.
    pub max_elapsed_ms_since_snapshot: Option<u64>,
}

impl Default for CheckpointPolicy {
    fn default() -> Self {
        Self {
            max_frames_since_snapshot: Some(256),
            max_elapsed_ms_since_snapshot: Some(30_000),
        }
    }
}

impl CheckpointPolicy {
    /// Never synthesize snapshots.
    pub fn disabled() -> Self {
        Self {
            max_frames_since_snapshot: None,
            max_elapsed_ms_since_snapshot: None,
        }
    }

    /// Policy for testing (snapshot every few frames).
    pub fn for_testing() -> Self {
        Self {
            max_frames_since_snapshot: Some(4),
            max_elapsed_ms_since_snapshot: Some(1_000),
        }
    }

    pub fn every_frames(n: usize) -> Self {
        Self {
            max_frames_since_snapshot: Some(n),
            max_elapsed_ms_since_snapshot: None,
        }
    }

    pub fn every_ms(ms: u64) -> Self {
        Self {
            max_frames_since_snapshot: None,
            max_elapsed_ms_since_snapshot: Some(ms),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.max_frames_since_snapshot.is_none() && self.max_elapsed_ms_since_snapshot.is_none()
    }

    /// Whether a snapshot is due.
    ///
    /// `frames_since` counts content/cursor frames after the latest
    /// snapshot; `elapsed_ms` is log time since that snapshot.
    pub fn should_checkpoint(&self, frames_since: usize, elapsed_ms: u64) -> bool {
        if frames_since == 0 {
            return false;
        }
        let by_frames = self
            .max_frames_since_snapshot
            .is_some_and(|n| frames_since >= n.max(1));
        let by_time = self
            .max_elapsed_ms_since_snapshot
            .is_some_and(|m| elapsed_ms >= m);
        by_frames || by_time
    }
}
