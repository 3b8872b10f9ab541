use kxt_core::LogError;
use thiserror::Error;

/// Errors raised while encoding or decoding `.kxt` streams.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Not a .kxt stream: bad magic {0:?}")]
    BadMagic([u8; 4]),

    #[error("Unsupported .kxt format version {0}")]
    UnsupportedVersion(u16),

    #[error("Checksum mismatch at record {sequence}")]
    ChecksumMismatch { sequence: u64 },

    #[error("Kind tag of record {sequence} does not match its frame")]
    KindMismatch { sequence: u64 },

    #[error("Expected record {expected}, found {found}")]
    SequenceGap { expected: u64, found: u64 },

    #[error("{0} trailing bytes after the last record")]
    TrailingBytes(usize),

    #[error("Log error: {0}")]
    Log(#[from] LogError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::ChecksumMismatch { sequence: 42 };
        assert!(err.to_string().contains("42"));

        let err = StoreError::BadMagic(*b"ZIP!");
        assert!(err.to_string().contains("bad magic"));

        let err = StoreError::from(LogError::OutOfRange { index: 3, len: 1 });
        assert!(err.to_string().starts_with("Log error"));
    }
}
