//! # kxt-store — `.kxt` persistence for knowledge text logs
//!
//! Encodes a [`DocumentLog`](kxt_core::DocumentLog) as a byte stream and
//! back, preserving frame order, variant tags and every field.
//!
//! ## Modules
//!
//! - [`record`] — Checksummed per-frame records
//! - [`codec`] — Stream header, encode/decode, file save/load

pub mod codec;
pub mod error;
pub mod record;

pub use codec::{KxtCodec, KxtHeader, StoreConfig, FORMAT_VERSION, MAGIC};
pub use error::StoreError;
pub use record::{FrameRecord, MAX_RECORD_BYTES};
