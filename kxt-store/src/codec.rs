//! `.kxt` stream codec.
//!
//! Layout:
//! ```text
//! ┌────────────────────────────────────────────┐
//! │ KxtHeader  magic "KXT1" | version | doc_id │
//! │            frame_count                     │
//! ├────────────────────────────────────────────┤
//! │ FrameRecord #0   (always a snapshot)       │
//! │ FrameRecord #1                             │
//! │ …                                          │
//! └────────────────────────────────────────────┘
//! ```
//!
//! Decoding rebuilds the log through [`LogBuilder`], so every append-time
//! rule is checked again; a stream a conforming writer could not have
//! produced is rejected rather than repaired.

use std::fs;
use std::path::Path;

use kxt_core::{CheckpointPolicy, DocumentLog, LogBuilder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;
use crate::record::{FrameRecord, MAX_RECORD_BYTES};

/// Leading bytes of every `.kxt` stream.
pub const MAGIC: [u8; 4] = *b"KXT1";
/// Current stream format version.
pub const FORMAT_VERSION: u16 = 1;

/// Stream header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KxtHeader {
    pub magic: [u8; 4],
    pub format_version: u16,
    pub doc_id: Uuid,
    pub frame_count: u64,
}

impl KxtHeader {
    fn for_log(log: &DocumentLog) -> Self {
        Self {
            magic: MAGIC,
            format_version: FORMAT_VERSION,
            doc_id: log.doc_id(),
            frame_count: log.frame_count() as u64,
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.magic != MAGIC {
            return Err(StoreError::BadMagic(self.magic));
        }
        if self.format_version != FORMAT_VERSION {
            return Err(StoreError::UnsupportedVersion(self.format_version));
        }
        Ok(())
    }
}

/// Codec configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Replay the whole log after decoding and reject corrupt snapshots.
    /// Default: true.
    pub verify_on_load: bool,
    /// Policy installed on decoded logs for later appends.
    /// Decoding itself never synthesizes snapshots.
    pub checkpoint_policy: CheckpointPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            verify_on_load: true,
            checkpoint_policy: CheckpointPolicy::default(),
        }
    }
}

impl StoreConfig {
    /// Config for testing (frequent checkpoints after load).
    pub fn for_testing() -> Self {
        Self {
            verify_on_load: true,
            checkpoint_policy: CheckpointPolicy::for_testing(),
        }
    }
}

/// Encodes and decodes document logs as `.kxt` byte streams.
#[derive(Debug, Clone, Default)]
pub struct KxtCodec {
    config: StoreConfig,
}

impl KxtCodec {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Serialize a log, preserving frame order, variants and all fields.
    pub fn encode(&self, log: &DocumentLog) -> Result<Vec<u8>, StoreError> {
        let mut bytes = bincode::serde::encode_to_vec(
            KxtHeader::for_log(log),
            bincode::config::standard(),
        )
        .map_err(|e| StoreError::Serialization(e.to_string()))?;

        for (sequence, frame) in log.frames().iter().enumerate() {
            let record = FrameRecord::new(sequence as u64, frame.clone());
            bytes.extend_from_slice(&record.encode()?);
        }

        log::debug!(
            "Encoded doc {} ({} frames, {} bytes)",
            log.doc_id(),
            log.frame_count(),
            bytes.len()
        );
        Ok(bytes)
    }

    /// Rebuild a log from a byte stream.
    pub fn decode(&self, bytes: &[u8]) -> Result<DocumentLog, StoreError> {
        let config = bincode::config::standard().with_limit::<MAX_RECORD_BYTES>();
        let (header, mut offset): (KxtHeader, usize) =
            bincode::serde::decode_from_slice(bytes, config)
                .map_err(|e| StoreError::Deserialization(e.to_string()))?;
        header.check()?;

        let mut builder = LogBuilder::new()
            .with_policy(CheckpointPolicy::disabled())
            .with_doc_id(header.doc_id);
        for expected in 0..header.frame_count {
            let (record, consumed) = FrameRecord::decode(&bytes[offset..])?;
            offset += consumed;
            if record.sequence != expected {
                return Err(StoreError::SequenceGap {
                    expected,
                    found: record.sequence,
                });
            }
            record.verify()?;
            builder.frame(record.frame)?;
        }
        if offset != bytes.len() {
            return Err(StoreError::TrailingBytes(bytes.len() - offset));
        }

        let mut log = builder.build()?;
        if self.config.verify_on_load {
            log.verify()?;
        }
        log.set_policy(self.config.checkpoint_policy);

        log::debug!(
            "Decoded doc {} ({} frames, {}ms)",
            log.doc_id(),
            log.frame_count(),
            log.total_duration_ms()
        );
        Ok(log)
    }

    /// Write a log to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>, log: &DocumentLog) -> Result<(), StoreError> {
        let path = path.as_ref();
        let bytes = self.encode(log)?;
        fs::write(path, &bytes)?;
        log::info!("Saved {} frames to {}", log.frame_count(), path.display());
        Ok(())
    }

    /// Read a log from `path`.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<DocumentLog, StoreError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let log = self.decode(&bytes)?;
        log::info!("Loaded {} frames from {}", log.frame_count(), path.display());
        Ok(log)
    }
}
