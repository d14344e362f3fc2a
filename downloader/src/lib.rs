//! Extraction engine adapter for Vidgrab.
//!
//! Wraps the yt-dlp command-line tool behind the `MediaEngine` trait so the
//! HTTP layer can be exercised against a fake engine.
pub mod engine;
pub mod progress;
pub mod tools;
pub mod ytdlp;

pub use engine::{FormatSpec, MediaEngine, ProgressSender};
pub use ytdlp::{YtDlpConfig, YtDlpEngine};
