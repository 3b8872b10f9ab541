//! Sample recording used by `kxt demo`.

use kxt_core::{CheckpointPolicy, DocumentLog, EditMode, LogBuilder, LogError};

/// Keystroke bursts and the pause before each one.
const BURSTS: &[(&str, u16)] = &[
    ("Hello", 100),
    (" ", 100),
    ("W", 120),
    ("o", 118),
    ("r", 125),
    ("l", 132),
    ("d", 150),
    ("!", 150),
];

/// "Hello World!" typed into an empty document.
pub fn hello_world(policy: CheckpointPolicy) -> Result<DocumentLog, LogError> {
    let mut builder = LogBuilder::new().with_policy(policy);
    builder.snapshot("", 0)?;
    builder.cursor(0, 0, 0, EditMode::Insert)?;
    for (text, delta_ms) in BURSTS {
        builder.content(*text, *delta_ms)?;
    }
    builder.build()
}
