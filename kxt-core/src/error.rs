use thiserror::Error;

/// Errors raised by the document log and the reconstruction engine.
///
/// Every variant names the offending frame index so a host can point at it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogError {
    #[error("Invalid ordering: frame {index} resolves to {time_ms}ms, before log end at {last_ms}ms")]
    InvalidOrdering {
        index: usize,
        time_ms: u64,
        last_ms: u64,
    },

    #[error("Time overflow: frame {index} adds {delta_ms}ms to log end at {last_ms}ms")]
    TimeOverflow {
        index: usize,
        last_ms: u64,
        delta_ms: u16,
    },

    #[error(
        "Invalid edit range at frame {index}: position {position}, length {length} \
         outside document of {document_len} characters"
    )]
    InvalidEditRange {
        index: usize,
        position: u64,
        length: u32,
        document_len: u64,
    },

    #[error("Frame index {index} out of range (log has {len} frames)")]
    OutOfRange { index: usize, len: usize },

    #[error("Corrupt replay: snapshot at frame {index} ({time_ms}ms) disagrees with replayed content")]
    CorruptReplay { index: usize, time_ms: u64 },

    #[error("Log must start with a snapshot frame")]
    MissingInitialSnapshot,
}
