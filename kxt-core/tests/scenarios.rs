//! End-to-end recording scenarios.
//!
//! Verifies:
//! - Typing session reconstruction by time
//! - Overwrite of an existing range
//! - Append-time rejection of bad ordering and bad edit ranges
//! - Construction interface as used by loaders
//! - Bounded replay with automatic checkpoints

use kxt_core::{
    CheckpointPolicy, DocumentLog, EditMode, Editor, Frame, LogBuilder, LogError,
};

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// The sample recording: "Hello World!" typed one burst at a time.
fn sample_recording() -> DocumentLog {
    let mut builder = LogBuilder::new().with_policy(CheckpointPolicy::disabled());
    builder.snapshot("", 0).unwrap();
    builder.cursor(0, 0, 0, EditMode::Insert).unwrap();
    for (text, delta) in [
        ("Hello", 100),
        (" ", 100),
        ("W", 120),
        ("o", 118),
        ("r", 125),
        ("l", 132),
        ("d", 150),
        ("!", 150),
    ] {
        builder.content(text, delta).unwrap();
    }
    builder.build().unwrap()
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[test]
fn test_hello_world_by_time() {
    let mut log = DocumentLog::empty();
    log.append_cursor(0, 0, 0, EditMode::Insert).unwrap();
    log.append_content("Hello", 100).unwrap();
    log.append_content(" ", 100).unwrap();
    log.append_content("World", 120).unwrap();

    assert_eq!(log.reconstruct_at(0).unwrap(), "");
    assert_eq!(log.reconstruct_at(100).unwrap(), "Hello");
    assert_eq!(log.reconstruct_at(200).unwrap(), "Hello ");
    assert_eq!(log.reconstruct_at(320).unwrap(), "Hello World");
    assert_eq!(log.reconstruct_at(10_000).unwrap(), "Hello World");
    assert_eq!(log.total_duration_ms(), 320);
}

#[test]
fn test_overwrite_scenario() {
    let mut log = DocumentLog::empty();
    log.append_content("Hello World", 250).unwrap();
    let t = log.total_duration_ms();

    log.append_cursor(t, 6, 5, EditMode::Overwrite).unwrap();
    log.append_content("Earth", 10).unwrap();

    assert_eq!(log.reconstruct_at(t).unwrap(), "Hello World");
    assert_eq!(log.reconstruct_at(t + 10).unwrap(), "Hello Earth");
}

#[test]
fn test_sample_recording_timeline() {
    let log = sample_recording();
    assert_eq!(log.frame_count(), 10);
    assert_eq!(log.total_duration_ms(), 995);

    let timeline: Vec<String> = (0..log.frame_count())
        .map(|i| log.reconstruct_at_frame(i).unwrap())
        .collect();
    assert_eq!(
        timeline,
        vec![
            "",
            "",
            "Hello",
            "Hello ",
            "Hello W",
            "Hello Wo",
            "Hello Wor",
            "Hello Worl",
            "Hello World",
            "Hello World!",
        ]
    );
    assert_eq!(log.cursor_at(995).unwrap(), Editor::insert_at(12));
}

#[test]
fn test_edit_in_the_past_of_the_document() {
    // Go back and fix a typo, then continue at the end.
    let mut log = DocumentLog::empty();
    log.append_content("Helo World", 300).unwrap();
    log.append_cursor(400, 3, 0, EditMode::Insert).unwrap();
    log.append_content("l", 50).unwrap();
    log.append_cursor(500, 11, 0, EditMode::Insert).unwrap();
    log.append_content("!", 50).unwrap();

    assert_eq!(log.reconstruct_at(399).unwrap(), "Helo World");
    assert_eq!(log.reconstruct_at(450).unwrap(), "Hello World");
    assert_eq!(log.reconstruct_at(550).unwrap(), "Hello World!");
}

#[test]
fn test_bounds_rejection() {
    let mut log = DocumentLog::new("abc", 0);

    let err = log.append_cursor(0, 4, 0, EditMode::Insert).unwrap_err();
    assert!(matches!(err, LogError::InvalidEditRange { position: 4, document_len: 3, .. }));

    log.append_content("def", 100).unwrap();
    let err = log.append(Frame::snapshot("abcdef", 99)).unwrap_err();
    assert_eq!(
        err,
        LogError::InvalidOrdering {
            index: 2,
            time_ms: 99,
            last_ms: 100
        }
    );
}

#[test]
fn test_loader_must_start_with_snapshot() {
    let mut builder = LogBuilder::new();
    let err = builder.frame(Frame::content("x", 1)).unwrap_err();
    assert_eq!(err, LogError::MissingInitialSnapshot);

    builder.frame(Frame::snapshot("x", 0)).unwrap();
    builder.frame(Frame::content("y", 1)).unwrap();
    assert_eq!(builder.build().unwrap().current_content(), "xy");
}

#[test]
fn test_checkpoints_bound_replay_distance() {
    let policy = CheckpointPolicy::every_frames(16);
    let mut log = DocumentLog::empty().with_policy(policy);
    log.append_cursor(0, 0, 0, EditMode::Insert).unwrap();
    for i in 0..1_000 {
        log.append_content(format!("{}", i % 10), 7).unwrap();
    }

    let checkpoints = log.checkpoints();
    assert!(checkpoints.len() > 60);
    for pair in checkpoints.windows(2) {
        assert!(pair[1].frame - pair[0].frame <= 17);
    }

    for i in (0..log.frame_count()).step_by(37) {
        let seeded = log.state_at_frame(i).unwrap();
        let full = log.replay_from(0, i).unwrap();
        assert_eq!(seeded, full);
    }
    assert_eq!(log.current_content().len(), 1_000);
}

#[test]
fn test_policy_can_change_midway() {
    let mut log = DocumentLog::empty().with_policy(CheckpointPolicy::disabled());
    for _ in 0..10 {
        log.append_content("a", 1).unwrap();
    }
    assert_eq!(log.checkpoints().len(), 1);

    log.set_policy(CheckpointPolicy::every_frames(5));
    log.append_content("b", 1).unwrap();
    assert_eq!(log.checkpoints().len(), 2);
    assert_eq!(log.reconstruct_at(u64::MAX).unwrap(), "aaaaaaaaaab");
}
