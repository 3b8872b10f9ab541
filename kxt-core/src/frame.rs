//! Frame model for knowledge text recordings.
//!
//! A recording is a sequence of frames. Three kinds exist:
//!
//! ```text
//! ┌──────────────┐  ┌──────────────┐  ┌──────────────┐
//! │  Snapshot    │  │   Cursor     │  │   Content    │
//! │ full text    │  │ Editor       │  │ payload      │
//! │ timestamp    │  │ timestamp    │  │ delta_ms     │
//! └──────────────┘  └──────────────┘  └──────────────┘
//!   absolute time     absolute time     relative time
//! ```
//!
//! Frames are plain values. Nothing here validates cross-frame rules;
//! that happens when a frame is appended to a [`DocumentLog`](crate::DocumentLog).

use serde::{Deserialize, Serialize};

/// How the next content payload is applied at the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum EditMode {
    /// Splice the payload in, keeping the following characters.
    #[default]
    Insert = 0,
    /// Replace `length` characters with the payload.
    Overwrite = 1,
}

impl TryFrom<u8> for EditMode {
    type Error = u8;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(EditMode::Insert),
            1 => Ok(EditMode::Overwrite),
            other => Err(other),
        }
    }
}

/// Edit descriptor carried by a cursor frame.
///
/// `position` and `length` count characters (Unicode scalar values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Editor {
    /// Offset within the document
    pub position: u64,
    /// Number of characters the upcoming edit spans
    pub length: u32,
    /// Insert or overwrite
    pub mode: EditMode,
}

impl Editor {
    pub fn new(position: u64, length: u32, mode: EditMode) -> Self {
        Self {
            position,
            length,
            mode,
        }
    }

    /// Insert cursor at `position`.
    pub fn insert_at(position: u64) -> Self {
        Self::new(position, 0, EditMode::Insert)
    }

    /// Overwrite cursor spanning `length` characters from `position`.
    pub fn overwrite(position: u64, length: u32) -> Self {
        Self::new(position, length, EditMode::Overwrite)
    }

    /// Exclusive end of the range this descriptor touches in the document.
    pub fn range_end(&self) -> u64 {
        match self.mode {
            EditMode::Insert => self.position,
            EditMode::Overwrite => self.position.saturating_add(self.length as u64),
        }
    }
}

/// Full document text at an absolute time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotFrame {
    pub content: String,
    /// Milliseconds since log start
    pub timestamp: u64,
}

/// Declares where and how the next content frames apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorFrame {
    /// Milliseconds since log start
    pub timestamp: u64,
    pub editor: Editor,
}

/// Incremental text captured during live typing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFrame {
    pub content: String,
    /// Milliseconds since the previous frame
    pub delta_ms: u16,
}

/// Discriminant of a [`Frame`], stable across encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FrameKind {
    Snapshot = 1,
    Cursor = 2,
    Content = 3,
}

/// Timing carried by a frame before it is resolved against the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timing {
    /// Offset from the preceding frame
    Relative(u16),
    /// Milliseconds since log start
    Absolute(u64),
}

impl Timing {
    /// Resolve against the previous frame's absolute time.
    ///
    /// Returns `None` when a relative offset would overflow.
    pub fn resolve(self, previous_ms: u64) -> Option<u64> {
        match self {
            Timing::Relative(delta) => previous_ms.checked_add(delta as u64),
            Timing::Absolute(ts) => Some(ts),
        }
    }
}

/// One recorded event in a document's edit history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frame {
    Snapshot(SnapshotFrame),
    Cursor(CursorFrame),
    Content(ContentFrame),
}

impl Frame {
    pub fn snapshot(content: impl Into<String>, timestamp: u64) -> Self {
        Frame::Snapshot(SnapshotFrame {
            content: content.into(),
            timestamp,
        })
    }

    pub fn cursor(timestamp: u64, editor: Editor) -> Self {
        Frame::Cursor(CursorFrame { timestamp, editor })
    }

    pub fn content(content: impl Into<String>, delta_ms: u16) -> Self {
        Frame::Content(ContentFrame {
            content: content.into(),
            delta_ms,
        })
    }

    pub fn kind(&self) -> FrameKind {
        match self {
            Frame::Snapshot(_) => FrameKind::Snapshot,
            Frame::Cursor(_) => FrameKind::Cursor,
            Frame::Content(_) => FrameKind::Content,
        }
    }

    /// Payload text. Always empty for cursor frames.
    pub fn content_str(&self) -> &str {
        match self {
            Frame::Snapshot(s) => &s.content,
            Frame::Cursor(_) => "",
            Frame::Content(c) => &c.content,
        }
    }

    /// Number of characters in the payload.
    pub fn payload_chars(&self) -> u64 {
        self.content_str().chars().count() as u64
    }

    pub fn timing(&self) -> Timing {
        match self {
            Frame::Snapshot(s) => Timing::Absolute(s.timestamp),
            Frame::Cursor(c) => Timing::Absolute(c.timestamp),
            Frame::Content(c) => Timing::Relative(c.delta_ms),
        }
    }

    /// Pending edit descriptor, for cursor frames.
    pub fn editor(&self) -> Option<Editor> {
        match self {
            Frame::Cursor(c) => Some(c.editor),
            _ => None,
        }
    }

    pub fn is_snapshot(&self) -> bool {
        matches!(self, Frame::Snapshot(_))
    }
}
