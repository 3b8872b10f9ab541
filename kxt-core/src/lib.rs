//! # kxt-core — Knowledge text edit history
//!
//! A knowledge text file records the history of a document as an ordered
//! log of frames and can produce the document's exact content at any point
//! of the recorded session, not just the final state.
//!
//! ## Architecture
//!
//! ```text
//!   writer                                   reader
//!     │ append*                                │ reconstruct_at(t)
//!     ▼                                        ▼
//! ┌──────────────┐   policy   ┌────────────────────────────┐
//! │ DocumentLog  │ ◄───────── │ CheckpointPolicy           │
//! │ S C δ δ S δ  │            └────────────────────────────┘
//! └──────┬───────┘
//!        │ latest snapshot ≤ t, then forward replay
//!        ▼
//! ┌──────────────┐
//! │ ReplayState  │ ──► content + cursor at t
//! └──────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`frame`] — Snapshot, Cursor and Content frames
//! - [`log`] — Append-only, validated frame log and the loader-facing builder
//! - [`reconstruct`] — Time/index reconstruction by checkpoint + replay
//! - [`checkpoint`] — When to synthesize snapshots
//! - [`shared`] — Lock-guarded log with immutable versions for readers

pub mod checkpoint;
pub mod error;
pub mod frame;
pub mod log;
pub mod reconstruct;
pub mod shared;

pub use checkpoint::CheckpointPolicy;
pub use error::LogError;
pub use frame::{
    ContentFrame, CursorFrame, EditMode, Editor, Frame, FrameKind, SnapshotFrame, Timing,
};
pub use crate::log::{Checkpoint, DocumentLog, LogBuilder};
pub use reconstruct::{Reconstruction, ReplayState};
pub use shared::SharedLog;
