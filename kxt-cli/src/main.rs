//! kxt — inspect and replay knowledge text recordings.
//!
//! Drives `kxt-core` through its construction and query interfaces and
//! `kxt-store` for `.kxt` files. Set `RUST_LOG=debug` for codec details.

mod sample;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kxt_core::{CheckpointPolicy, DocumentLog, EditMode, Frame};
use kxt_store::KxtCodec;
use log::info;

#[derive(Parser, Debug)]
#[command(name = "kxt", version, about = "Replay knowledge text recordings")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the sample "Hello World!" recording
    Demo {
        path: PathBuf,
        /// Synthesize a snapshot every N frames (0 disables)
        #[arg(long, default_value_t = 0)]
        checkpoint_every: usize,
    },
    /// Print frame count, duration and checkpoints
    Info { path: PathBuf },
    /// Print the document as of a time or frame
    Show {
        path: PathBuf,
        /// Milliseconds since log start (default: end of log)
        #[arg(long, conflicts_with = "frame")]
        at: Option<u64>,
        /// Frame index, inclusive
        #[arg(long)]
        frame: Option<usize>,
        /// Also print the cursor
        #[arg(long)]
        cursor: bool,
    },
    /// Print every frame with the document as of that frame
    Timeline { path: PathBuf },
    /// Replay the whole log and check every snapshot
    Verify { path: PathBuf },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let output = run(cli.command)?;
    print!("{output}");
    Ok(())
}

fn run(command: Command) -> Result<String> {
    let codec = KxtCodec::default();
    match command {
        Command::Demo {
            path,
            checkpoint_every,
        } => {
            let policy = match checkpoint_every {
                0 => CheckpointPolicy::disabled(),
                n => CheckpointPolicy::every_frames(n),
            };
            let log = sample::hello_world(policy)?;
            codec
                .save(&path, &log)
                .with_context(|| format!("writing {}", path.display()))?;
            info!("Demo recording written to {}", path.display());
            Ok(format!(
                "wrote {} frames ({}ms) to {}\n",
                log.frame_count(),
                log.total_duration_ms(),
                path.display()
            ))
        }
        Command::Info { path } => Ok(info_report(&open(&codec, &path)?)),
        Command::Show {
            path,
            at,
            frame,
            cursor,
        } => {
            let log = open(&codec, &path)?;
            let index = match (at, frame) {
                (_, Some(index)) => index,
                (Some(ms), None) => log.frame_index_at(ms),
                (None, None) => log.frame_count() - 1,
            };
            let state = log
                .state_at_frame(index)
                .with_context(|| format!("reconstructing frame {index}"))?;
            if !cursor {
                return Ok(format!("{}\n", state.content));
            }
            Ok(format!(
                "{}\ncursor: position {} length {} {}\n",
                state.content,
                state.cursor.position,
                state.cursor.length,
                mode_name(state.cursor.mode)
            ))
        }
        Command::Timeline { path } => timeline_report(&open(&codec, &path)?),
        Command::Verify { path } => {
            // Load without the built-in check so the failing frame is reported
            // by the replay below.
            let lenient = KxtCodec::new(kxt_store::StoreConfig {
                verify_on_load: false,
                ..Default::default()
            });
            let log = open(&lenient, &path)?;
            log.verify()
                .with_context(|| format!("verifying {}", path.display()))?;
            Ok(format!("ok: {} frames replayed\n", log.frame_count()))
        }
    }
}

fn open(codec: &KxtCodec, path: &Path) -> Result<DocumentLog> {
    codec
        .load(path)
        .with_context(|| format!("reading {}", path.display()))
}

fn info_report(log: &DocumentLog) -> String {
    let checkpoints: String = log
        .checkpoints()
        .iter()
        .map(|c| format!("  #{} at {}ms\n", c.frame, c.time_ms))
        .collect();
    format!(
        "doc:         {}\nframes:      {}\nduration:    {}ms\ncheckpoints: {}\n{checkpoints}",
        log.doc_id(),
        log.frame_count(),
        log.total_duration_ms(),
        log.checkpoints().len()
    )
}

fn timeline_report(log: &DocumentLog) -> Result<String> {
    log.frames()
        .iter()
        .enumerate()
        .map(|(index, frame)| -> Result<String> {
            let time_ms = log.resolved_time(index)?;
            let text = log.reconstruct_at_frame(index)?;
            Ok(format!(
                "{index:>5} {time_ms:>8}ms {:<24} {text:?}\n",
                describe(frame)
            ))
        })
        .collect()
}

fn describe(frame: &Frame) -> String {
    match frame {
        Frame::Snapshot(_) => "snapshot".to_string(),
        Frame::Cursor(c) => format!(
            "cursor {}@{}+{}",
            mode_name(c.editor.mode),
            c.editor.position,
            c.editor.length
        ),
        Frame::Content(c) => format!("content +{}ms", c.delta_ms),
    }
}

fn mode_name(mode: EditMode) -> &'static str {
    match mode {
        EditMode::Insert => "insert",
        EditMode::Overwrite => "overwrite",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn demo(path: &PathBuf) {
        run(Command::Demo {
            path: path.clone(),
            checkpoint_every: 3,
        })
        .unwrap();
    }

    #[test]
    fn test_cli_parses_show() {
        let cli = Cli::try_parse_from(["kxt", "show", "doc.kxt", "--at", "200", "--cursor"]).unwrap();
        match cli.command {
            Command::Show { at, frame, cursor, .. } => {
                assert_eq!(at, Some(200));
                assert_eq!(frame, None);
                assert!(cursor);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_at_and_frame() {
        let result = Cli::try_parse_from(["kxt", "show", "doc.kxt", "--at", "1", "--frame", "2"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_show_at_time() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("demo.kxt");
        demo(&path);

        let out = run(Command::Show {
            path: path.clone(),
            at: Some(200),
            frame: None,
            cursor: true,
        })
        .unwrap();
        assert_eq!(out, "Hello \ncursor: position 6 length 0 insert\n");

        let out = run(Command::Show {
            path,
            at: None,
            frame: None,
            cursor: false,
        })
        .unwrap();
        assert_eq!(out, "Hello World!\n");
    }

    #[test]
    fn test_info_and_verify() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("demo.kxt");
        demo(&path);

        let info = run(Command::Info { path: path.clone() }).unwrap();
        assert!(info.contains("duration:    995ms"));
        assert!(info.contains("  #0 at 0ms"));

        let verified = run(Command::Verify { path }).unwrap();
        assert!(verified.starts_with("ok:"));
    }

    #[test]
    fn test_info_report_lists_checkpoints() {
        let log = sample::hello_world(CheckpointPolicy::every_frames(3)).unwrap();
        let expected = format!(
            "doc:         {}\nframes:      13\nduration:    995ms\ncheckpoints: 4\n  \
             #0 at 0ms\n  #4 at 200ms\n  #8 at 563ms\n  #12 at 995ms\n",
            log.doc_id()
        );
        assert_eq!(info_report(&log), expected);
    }

    #[test]
    fn test_verify_reports_corrupt_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("forged.kxt");
        let mut log = DocumentLog::empty().with_policy(CheckpointPolicy::disabled());
        log.append_content("real", 10).unwrap();
        log.append_snapshot("forged", 20).unwrap();
        log.append_content("!", 10).unwrap();
        KxtCodec::default().save(&path, &log).unwrap();

        let err = run(Command::Verify { path }).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("frame 2"), "{message}");
        assert!(message.contains("20ms"), "{message}");
    }

    #[test]
    fn test_timeline_lists_every_frame() {
        let log = sample::hello_world(CheckpointPolicy::disabled()).unwrap();
        let out = timeline_report(&log).unwrap();
        assert_eq!(out.lines().count(), 10);
        assert!(out.lines().last().unwrap().ends_with("\"Hello World!\""));
        assert!(out.contains("cursor insert@0+0"));
    }

    #[test]
    fn test_show_missing_file() {
        let dir = tempdir().unwrap();
        let err = run(Command::Info {
            path: dir.path().join("missing.kxt"),
        })
        .unwrap_err();
        assert!(format!("{err:#}").contains("missing.kxt"));
    }
}
