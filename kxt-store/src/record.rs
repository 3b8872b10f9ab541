//! Checksummed frame records.
//!
//! Every frame is stored as one self-verifying record:
//!
//! ```text
//! ┌──────────┬──────┬─────────────────────────┬──────────┐
//! │ sequence │ kind │ frame (variant + fields) │ checksum │
//! └──────────┴──────┴─────────────────────────┴──────────┘
//! ```
//!
//! The checksum covers the sequence number, the kind tag and every frame
//! field, so a flipped byte anywhere in a record is caught on decode.

use kxt_core::{Frame, FrameKind};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Upper bound on the bytes a single decode may claim.
///
/// Length prefixes beyond this are rejected before anything is allocated.
pub const MAX_RECORD_BYTES: usize = 64 * 1024 * 1024;

/// A single frame as stored in a `.kxt` stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Position of the frame in the log
    pub sequence: u64,
    /// Redundant variant tag, checked against `frame`
    pub kind: FrameKind,
    pub frame: Frame,
    /// FNV-1a checksum over all other fields
    pub checksum: u32,
}

impl FrameRecord {
    /// Create a record with computed checksum.
    pub fn new(sequence: u64, frame: Frame) -> Self {
        let kind = frame.kind();
        let checksum = Self::compute_checksum(sequence, kind, &frame);
        Self {
            sequence,
            kind,
            frame,
            checksum,
        }
    }

    /// Verify the kind tag and checksum.
    pub fn verify(&self) -> Result<(), StoreError> {
        if self.kind != self.frame.kind() {
            return Err(StoreError::KindMismatch {
                sequence: self.sequence,
            });
        }
        let expected = Self::compute_checksum(self.sequence, self.kind, &self.frame);
        if self.checksum != expected {
            return Err(StoreError::ChecksumMismatch {
                sequence: self.sequence,
            });
        }
        Ok(())
    }

    fn compute_checksum(sequence: u64, kind: FrameKind, frame: &Frame) -> u32 {
        let mut hash = Fnv::new();
        hash.mix_u64(sequence);
        hash.mix_bytes(&[kind as u8]);
        match frame {
            Frame::Snapshot(s) => {
                hash.mix_u64(s.timestamp);
                hash.mix_bytes(s.content.as_bytes());
            }
            Frame::Cursor(c) => {
                hash.mix_u64(c.timestamp);
                hash.mix_u64(c.editor.position);
                hash.mix_u64(c.editor.length as u64);
                hash.mix_bytes(&[c.editor.mode as u8]);
            }
            Frame::Content(c) => {
                hash.mix_u64(c.delta_ms as u64);
                hash.mix_bytes(c.content.as_bytes());
            }
        }
        hash.finish()
    }

    /// Serialize record to bytes.
    pub fn encode(&self) -> Result<Vec<u8>, StoreError> {
        bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Deserialize one record from the front of `bytes`.
    ///
    /// Returns the record and the number of bytes consumed. The record is
    /// not verified.
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize), StoreError> {
        let config = bincode::config::standard().with_limit::<MAX_RECORD_BYTES>();
        bincode::serde::decode_from_slice(bytes, config)
            .map_err(|e| StoreError::Deserialization(e.to_string()))
    }
}

/// 32-bit FNV-1a.
struct Fnv(u32);

impl Fnv {
    const OFFSET_BASIS: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;

    fn new() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    fn mix_bytes(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.0 ^= *byte as u32;
            self.0 = self.0.wrapping_mul(Self::PRIME);
        }
    }

    fn mix_u64(&mut self, value: u64) {
        self.mix_bytes(&value.to_le_bytes());
    }

    fn finish(&self) -> u32 {
        self.0
    }
}
