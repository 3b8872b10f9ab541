//! Reconstruction engine.
//!
//! Produces the document as of a time or frame index:
//!
//! ```text
//!   target ─────────────────────────────┐
//!                                       ▼
//!   S₀ ── δ ── δ ── S₁ ── C ── δ ── δ ── δ ── δ
//!                   ▲    └── forward replay ──┘
//!                   └ latest checkpoint ≤ target (binary search)
//! ```
//!
//! Replay cost is bounded by the distance to the preceding snapshot, which
//! the checkpoint policy keeps small.

use crate::error::LogError;
use crate::frame::{EditMode, Editor, Frame};
use crate::log::DocumentLog;

/// Working content and cursor during replay.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReplayState {
    content: String,
    /// Cached character count of `content`
    char_len: u64,
    /// `None` until a cursor frame is seen; content then appends at the end
    cursor: Option<Editor>,
}

impl ReplayState {
    pub fn seed(content: &str, cursor: Option<Editor>) -> Self {
        Self {
            content: content.to_owned(),
            char_len: content.chars().count() as u64,
            cursor,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }

    /// Document length in characters.
    pub fn len_chars(&self) -> u64 {
        self.char_len
    }

    pub fn cursor(&self) -> Option<Editor> {
        self.cursor
    }

    /// Cursor the next content frame would use.
    ///
    /// Without a cursor frame this is an insert at the end of the document.
    pub fn effective_cursor(&self) -> Editor {
        match self.cursor {
            Some(editor) => Editor {
                position: editor.position.min(self.char_len),
                ..editor
            },
            None => Editor::insert_at(self.char_len),
        }
    }

    /// Apply one frame. Snapshots replace the content wholesale.
    pub fn apply(&mut self, frame: &Frame) {
        match frame {
            Frame::Snapshot(snapshot) => {
                self.content.clone_from(&snapshot.content);
                self.char_len = snapshot.content.chars().count() as u64;
            }
            Frame::Cursor(cursor) => self.cursor = Some(cursor.editor),
            Frame::Content(delta) => self.apply_content(&delta.content),
        }
    }

    /// Apply one frame during replay, checking snapshots against the
    /// incrementally rebuilt content.
    pub fn replay(&mut self, index: usize, time_ms: u64, frame: &Frame) -> Result<(), LogError> {
        if let Frame::Snapshot(snapshot) = frame {
            if snapshot.content != self.content {
                return Err(LogError::CorruptReplay { index, time_ms });
            }
        }
        self.apply(frame);
        Ok(())
    }

    fn apply_content(&mut self, payload: &str) {
        let payload_chars = payload.chars().count() as u64;
        let len = self.char_len;

        let Some(editor) = self.cursor.as_mut() else {
            self.content.push_str(payload);
            self.char_len = len + payload_chars;
            return;
        };

        // Positions can only exceed the content after a shrinking snapshot.
        let start = editor.position.min(len);
        let end = match editor.mode {
            EditMode::Insert => start,
            EditMode::Overwrite => start.saturating_add(editor.length as u64).min(len),
        };
        let start_byte = byte_offset(&self.content, start);
        let end_byte = start_byte + byte_offset(&self.content[start_byte..], end - start);
        self.content.replace_range(start_byte..end_byte, payload);
        self.char_len = len - (end - start) + payload_chars;

        editor.position = start + payload_chars;
        if editor.mode == EditMode::Overwrite {
            // The range is consumed by the first payload.
            editor.length = 0;
        }
    }
}

/// Byte offset of the `chars`-th character, or the end of `text`.
fn byte_offset(text: &str, chars: u64) -> usize {
    usize::try_from(chars)
        .ok()
        .and_then(|n| text.char_indices().nth(n))
        .map_or(text.len(), |(offset, _)| offset)
}

/// Document state as of one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconstruction {
    /// Last frame included
    pub frame_index: usize,
    /// Resolved time of that frame
    pub time_ms: u64,
    pub content: String,
    pub cursor: Editor,
}

impl DocumentLog {
    /// Index of the last frame resolved at or before `time_ms`.
    ///
    /// Times before the first frame map to frame 0.
    pub fn frame_index_at(&self, time_ms: u64) -> usize {
        self.resolved_times()
            .partition_point(|&t| t <= time_ms)
            .saturating_sub(1)
    }

    /// Index into [`checkpoints`](Self::checkpoints) of the latest snapshot
    /// at or before frame `index`.
    pub fn checkpoint_for(&self, index: usize) -> usize {
        self.checkpoints()
            .partition_point(|c| c.frame <= index)
            .saturating_sub(1)
    }

    /// Document state up to and including frame `index`.
    pub fn state_at_frame(&self, index: usize) -> Result<Reconstruction, LogError> {
        self.replay_from(self.checkpoint_for(index), index)
    }

    /// Replay from a chosen checkpoint to frame `target`.
    ///
    /// Any checkpoint at or before `target` yields the same result on a
    /// well-formed log; later snapshots crossed on the way are checked and
    /// a disagreement is reported as `CorruptReplay`.
    pub fn replay_from(
        &self,
        checkpoint: usize,
        target: usize,
    ) -> Result<Reconstruction, LogError> {
        let target_time = self.resolved_time(target)?;
        let usable = self.checkpoint_for(target) + 1;
        let seed = self
            .checkpoints()
            .get(checkpoint)
            .filter(|_| checkpoint < usable)
            .copied()
            .ok_or(LogError::OutOfRange {
                index: checkpoint,
                len: usable,
            })?;

        let frames = self.frames();
        let times = self.resolved_times();
        let mut state = ReplayState::seed(frames[seed.frame].content_str(), seed.cursor);
        for index in seed.frame + 1..=target {
            state.replay(index, times[index], &frames[index])?;
        }

        Ok(Reconstruction {
            frame_index: target,
            time_ms: target_time,
            cursor: state.effective_cursor(),
            content: state.into_content(),
        })
    }

    /// Document text as of `time_ms`.
    pub fn reconstruct_at(&self, time_ms: u64) -> Result<String, LogError> {
        self.reconstruct_at_frame(self.frame_index_at(time_ms))
    }

    /// Document text up to and including frame `index`.
    pub fn reconstruct_at_frame(&self, index: usize) -> Result<String, LogError> {
        Ok(self.state_at_frame(index)?.content)
    }

    /// Effective cursor as of `time_ms`.
    pub fn cursor_at(&self, time_ms: u64) -> Result<Editor, LogError> {
        self.cursor_at_frame(self.frame_index_at(time_ms))
    }

    pub fn cursor_at_frame(&self, index: usize) -> Result<Editor, LogError> {
        Ok(self.state_at_frame(index)?.cursor)
    }

    /// Replay the whole log from frame 0, checking every snapshot.
    pub fn verify(&self) -> Result<(), LogError> {
        let last = self.frame_count() - 1;
        self.replay_from(0, last).map(|_| ())
    }
}
