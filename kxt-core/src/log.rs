//! Append-only document log.
//!
//! Architecture:
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                  DocumentLog                     │
//! │                                                  │
//! │  frames:          [ S | C | δ | δ | S | δ | … ]  │
//! │  resolved_times:  [ 0 | 0 |100|200|200|320| … ]  │
//! │  checkpoints:     [ #0 ─────────────── #4 ]      │
//! │  head:            content + cursor after last    │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! Appends are validated against `head` before anything is mutated, so a
//! failed append leaves the log exactly as it was. Relative content timings
//! are resolved once, at append time, into `resolved_times`.

use uuid::Uuid;

use crate::checkpoint::CheckpointPolicy;
use crate::error::LogError;
use crate::frame::{EditMode, Editor, Frame, Timing};
use crate::reconstruct::ReplayState;

/// A snapshot position in the log, used as a replay seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    /// Index of the snapshot frame
    pub frame: usize,
    /// Resolved time of the snapshot frame
    pub time_ms: u64,
    /// Working cursor as of the snapshot (`None` = append at end)
    pub cursor: Option<Editor>,
}

/// Ordered, append-only sequence of frames for one document.
///
/// Always non-empty: the first frame is a snapshot.
#[derive(Debug, Clone)]
pub struct DocumentLog {
    doc_id: Uuid,
    frames: Vec<Frame>,
    resolved_times: Vec<u64>,
    checkpoints: Vec<Checkpoint>,
    /// Replay state after the last frame
    head: ReplayState,
    policy: CheckpointPolicy,
}

impl Default for DocumentLog {
    fn default() -> Self {
        Self::empty()
    }
}

impl DocumentLog {
    /// Create a log starting from `content` at `timestamp_ms`.
    pub fn new(content: impl Into<String>, timestamp_ms: u64) -> Self {
        let content = content.into();
        let head = ReplayState::seed(&content, None);
        Self {
            doc_id: Uuid::new_v4(),
            frames: vec![Frame::snapshot(content, timestamp_ms)],
            resolved_times: vec![timestamp_ms],
            checkpoints: vec![Checkpoint {
                frame: 0,
                time_ms: timestamp_ms,
                cursor: None,
            }],
            head,
            policy: CheckpointPolicy::default(),
        }
    }

    /// Empty document at time 0.
    pub fn empty() -> Self {
        Self::new(String::new(), 0)
    }

    pub fn with_policy(mut self, policy: CheckpointPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_doc_id(mut self, doc_id: Uuid) -> Self {
        self.doc_id = doc_id;
        self
    }

    /// Replace the checkpoint policy for future appends.
    pub fn set_policy(&mut self, policy: CheckpointPolicy) {
        self.policy = policy;
    }

    pub fn policy(&self) -> CheckpointPolicy {
        self.policy
    }

    pub fn doc_id(&self) -> Uuid {
        self.doc_id
    }

    // ─── Appends ──────────────────────────────────────────────────────

    /// Append a frame, returning its index.
    ///
    /// Fails with `InvalidOrdering` if the frame would resolve before the
    /// log end, with `TimeOverflow` if a content delta runs past `u64::MAX`,
    /// and with `InvalidEditRange` if a cursor frame points outside the
    /// current document. May be followed by a synthesized snapshot when the
    /// checkpoint policy says one is due.
    pub fn append(&mut self, frame: Frame) -> Result<usize, LogError> {
        let index = self.frames.len();
        let last_ms = self.total_duration_ms();

        let timing = frame.timing();
        let time_ms = match (timing.resolve(last_ms), timing) {
            (Some(time_ms), _) => time_ms,
            (None, Timing::Relative(delta_ms)) => {
                return Err(LogError::TimeOverflow {
                    index,
                    last_ms,
                    delta_ms,
                })
            }
            (None, Timing::Absolute(time_ms)) => {
                return Err(LogError::InvalidOrdering {
                    index,
                    time_ms,
                    last_ms,
                })
            }
        };
        if time_ms < last_ms {
            return Err(LogError::InvalidOrdering {
                index,
                time_ms,
                last_ms,
            });
        }

        if let Some(editor) = frame.editor() {
            self.check_edit_range(index, editor)?;
        }

        let is_snapshot = frame.is_snapshot();
        self.push_resolved(frame, time_ms);
        if !is_snapshot {
            self.apply_policy(time_ms);
        }

        Ok(index)
    }

    pub fn append_snapshot(
        &mut self,
        content: impl Into<String>,
        timestamp_ms: u64,
    ) -> Result<usize, LogError> {
        self.append(Frame::snapshot(content, timestamp_ms))
    }

    pub fn append_cursor(
        &mut self,
        timestamp_ms: u64,
        position: u64,
        length: u32,
        mode: EditMode,
    ) -> Result<usize, LogError> {
        self.append(Frame::cursor(
            timestamp_ms,
            Editor::new(position, length, mode),
        ))
    }

    pub fn append_content(
        &mut self,
        text: impl Into<String>,
        delta_ms: u16,
    ) -> Result<usize, LogError> {
        self.append(Frame::content(text, delta_ms))
    }

    fn check_edit_range(&self, index: usize, editor: Editor) -> Result<(), LogError> {
        let document_len = self.head.len_chars();
        let in_bounds = editor.position <= document_len
            && (editor.mode == EditMode::Insert
                || editor.position.saturating_add(editor.length as u64) <= document_len);
        if in_bounds {
            Ok(())
        } else {
            Err(LogError::InvalidEditRange {
                index,
                position: editor.position,
                length: editor.length,
                document_len,
            })
        }
    }

    /// Store an already validated frame and advance the head.
    fn push_resolved(&mut self, frame: Frame, time_ms: u64) {
        let index = self.frames.len();
        self.head.apply(&frame);
        if frame.is_snapshot() {
            self.checkpoints.push(Checkpoint {
                frame: index,
                time_ms,
                cursor: self.head.cursor(),
            });
        }
        self.frames.push(frame);
        self.resolved_times.push(time_ms);
    }

    fn apply_policy(&mut self, time_ms: u64) {
        let last = self.last_checkpoint();
        let frames_since = self.frames.len() - 1 - last.frame;
        let elapsed_ms = time_ms - last.time_ms;
        if !self.policy.should_checkpoint(frames_since, elapsed_ms) {
            return;
        }

        ::log::trace!(
            "Checkpoint at frame {} ({time_ms}ms) after {frames_since} frames / {elapsed_ms}ms",
            self.frames.len()
        );
        let snapshot = Frame::snapshot(self.head.content().to_owned(), time_ms);
        self.push_resolved(snapshot, time_ms);
    }

    // ─── Accessors ────────────────────────────────────────────────────

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame_at(&self, index: usize) -> Result<&Frame, LogError> {
        self.frames.get(index).ok_or(LogError::OutOfRange {
            index,
            len: self.frames.len(),
        })
    }

    /// Absolute time of frame `index`, in milliseconds since log start.
    pub fn resolved_time(&self, index: usize) -> Result<u64, LogError> {
        self.resolved_times
            .get(index)
            .copied()
            .ok_or(LogError::OutOfRange {
                index,
                len: self.frames.len(),
            })
    }

    /// Resolved absolute time of the last frame.
    pub fn total_duration_ms(&self) -> u64 {
        self.resolved_times.last().copied().unwrap_or_default()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn resolved_times(&self) -> &[u64] {
        &self.resolved_times
    }

    /// Snapshot positions, in log order. The first is always frame 0.
    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    fn last_checkpoint(&self) -> Checkpoint {
        self.checkpoints
            .last()
            .copied()
            .unwrap_or(Checkpoint {
                frame: 0,
                time_ms: 0,
                cursor: None,
            })
    }

    /// Document text after the last frame.
    pub fn current_content(&self) -> &str {
        self.head.content()
    }

    /// Effective cursor after the last frame.
    pub fn current_cursor(&self) -> Editor {
        self.head.effective_cursor()
    }
}

/// Construction interface for loaders.
///
/// Frames are supplied in log order; the first call must be `snapshot`.
#[derive(Debug)]
pub struct LogBuilder {
    log: Option<DocumentLog>,
    policy: CheckpointPolicy,
    doc_id: Option<Uuid>,
}

impl Default for LogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LogBuilder {
    pub fn new() -> Self {
        Self {
            log: None,
            policy: CheckpointPolicy::default(),
            doc_id: None,
        }
    }

    pub fn with_policy(mut self, policy: CheckpointPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_doc_id(mut self, doc_id: Uuid) -> Self {
        self.doc_id = Some(doc_id);
        self
    }

    pub fn snapshot(
        &mut self,
        content: impl Into<String>,
        timestamp_ms: u64,
    ) -> Result<usize, LogError> {
        match self.log.as_mut() {
            Some(log) => log.append_snapshot(content, timestamp_ms),
            None => {
                let mut log = DocumentLog::new(content, timestamp_ms).with_policy(self.policy);
                if let Some(doc_id) = self.doc_id {
                    log = log.with_doc_id(doc_id);
                }
                self.log = Some(log);
                Ok(0)
            }
        }
    }

    pub fn cursor(
        &mut self,
        timestamp_ms: u64,
        position: u64,
        length: u32,
        mode: EditMode,
    ) -> Result<usize, LogError> {
        self.started()?
            .append_cursor(timestamp_ms, position, length, mode)
    }

    pub fn content(&mut self, text: impl Into<String>, delta_ms: u16) -> Result<usize, LogError> {
        self.started()?.append_content(text, delta_ms)
    }

    /// Append any frame; the first one must be a snapshot.
    pub fn frame(&mut self, frame: Frame) -> Result<usize, LogError> {
        match frame {
            Frame::Snapshot(s) => self.snapshot(s.content, s.timestamp),
            other => self.started()?.append(other),
        }
    }

    pub fn build(self) -> Result<DocumentLog, LogError> {
        self.log.ok_or(LogError::MissingInitialSnapshot)
    }

    fn started(&mut self) -> Result<&mut DocumentLog, LogError> {
        self.log.as_mut().ok_or(LogError::MissingInitialSnapshot)
    }
}
