/// yt-dlp command-line engine.
///
/// Metadata comes from `yt-dlp -J`; downloads run yt-dlp with an output
/// template inside the session directory. Stdout carries progress lines,
/// stderr is forwarded to tracing logs.
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use vidgrab_shared::errors::ExtractionError;
use vidgrab_shared::models::RawMediaInfo;

use crate::engine::{FormatSpec, MediaEngine, ProgressSender};
use crate::progress::{parse_progress_line, progress_template};
use crate::tools::augmented_path;

/// Number of stderr lines kept for error reports.
const STDERR_TAIL_LINES: usize = 20;

/// Engine settings.
#[derive(Debug, Clone)]
pub struct YtDlpConfig {
    /// yt-dlp executable.
    pub ytdlp_bin: String,
    /// ffmpeg executable used for merging and MP3 extraction.
    pub ffmpeg_bin: String,
    /// Retry count for requests, fragments and extractor calls.
    pub retries: u32,
    /// Per-socket timeout.
    pub socket_timeout_secs: u64,
    /// Directories appended to the subprocess PATH.
    pub extra_paths: Vec<String>,
}

impl Default for YtDlpConfig {
    fn default() -> Self {
        Self {
            ytdlp_bin: "yt-dlp".to_string(),
            ffmpeg_bin: "ffmpeg".to_string(),
            retries: 3,
            socket_timeout_secs: 30,
            extra_paths: Vec::new(),
        }
    }
}

/// `MediaEngine` backed by the yt-dlp CLI.
pub struct YtDlpEngine {
    config: YtDlpConfig,
    path_env: String,
}

impl YtDlpEngine {
    pub fn new(config: YtDlpConfig) -> Self {
        let current_path = std::env::var("PATH").unwrap_or_default();
        let path_env = augmented_path(&current_path, &config.extra_paths);
        if !config.extra_paths.is_empty() {
            info!("Adding to engine PATH: {}", config.extra_paths.join(", "));
        }
        Self { config, path_env }
    }

    fn command(&self, program: &str) -> Command {
        let mut cmd = Command::new(program);
        cmd.env("PATH", &self.path_env).stdin(Stdio::null()).kill_on_drop(false);
        cmd
    }

    /// Arguments for a download into `output_dir`.
    pub fn download_args(&self, url: &str, format: &FormatSpec, output_dir: &Path) -> Vec<String> {
        let retries = self.config.retries.to_string();
        let template = output_dir.join("%(title)s.%(ext)s");
        let mut args = vec![
            "-f".to_string(),
            format.selector.clone(),
            "-o".to_string(),
            template.to_string_lossy().to_string(),
            "--no-playlist".to_string(),
            "--retries".to_string(),
            retries.clone(),
            "--fragment-retries".to_string(),
            retries.clone(),
            "--extractor-retries".to_string(),
            retries,
            "--socket-timeout".to_string(),
            self.config.socket_timeout_secs.to_string(),
            "--no-color".to_string(),
            "--newline".to_string(),
            "--progress-template".to_string(),
            progress_template(),
        ];
        if self.config.ffmpeg_bin != "ffmpeg" {
            args.push("--ffmpeg-location".to_string());
            args.push(self.config.ffmpeg_bin.clone());
        }
        if format.merge_streams {
            args.push("--merge-output-format".to_string());
            args.push("mp4".to_string());
        }
        if format.extract_mp3 {
            args.extend(
                ["--extract-audio", "--audio-format", "mp3", "--audio-quality", "0"]
                    .iter()
                    .map(|s| s.to_string()),
            );
        }
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }
}

#[async_trait]
impl MediaEngine for YtDlpEngine {
    async fn probe(&self, url: &str) -> Result<RawMediaInfo, ExtractionError> {
        debug!("Probing {}", url);
        let output = self
            .command(&self.config.ytdlp_bin)
            .args(["-J", "--no-playlist", "--no-warnings", "--no-color", "--socket-timeout"])
            .arg(self.config.socket_timeout_secs.to_string())
            .args(["--extractor-retries", self.config.retries.to_string().as_str(), "--", url])
            .output()
            .await
            .map_err(|source| ExtractionError::Spawn {
                program: self.config.ytdlp_bin.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::Failed {
                code: output.status.code(),
                message: tail(stderr.lines(), STDERR_TAIL_LINES),
            });
        }
        if output.stdout.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(ExtractionError::NoInfo);
        }

        let info: RawMediaInfo = serde_json::from_slice(&output.stdout)?;
        debug!("Engine reported {} formats for {}", info.formats.len(), url);
        Ok(info)
    }

    async fn fetch(
        &self,
        url: &str,
        format: &FormatSpec,
        output_dir: &Path,
        progress: Option<ProgressSender>,
    ) -> Result<(), ExtractionError> {
        let args = self.download_args(url, format, output_dir);
        info!("Running {} with format {}", self.config.ytdlp_bin, format.selector);

        let mut child = self
            .command(&self.config.ytdlp_bin)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ExtractionError::Spawn {
                program: self.config.ytdlp_bin.clone(),
                source,
            })?;

        let stdout = child.stdout.take().ok_or_else(|| ExtractionError::Failed {
            code: None,
            message: "No stdout handle".into(),
        })?;
        let stderr = child.stderr.take().ok_or_else(|| ExtractionError::Failed {
            code: None,
            message: "No stderr handle".into(),
        })?;

        // Stdout reader - routes progress lines to the subscriber
        let stdout_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                match parse_progress_line(&line) {
                    Some(tick) => {
                        if let Some(tx) = &progress {
                            // A dropped receiver only means nobody is listening.
                            let _ = tx.send(tick);
                        }
                    }
                    None => debug!(target: "ytdlp", "{}", line),
                }
            }
        });

        // Stderr reader - forward to tracing, keep the tail for error reports
        let stderr_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            let mut last = VecDeque::with_capacity(STDERR_TAIL_LINES);
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(target: "ytdlp", "{}", line);
                if last.len() == STDERR_TAIL_LINES {
                    last.pop_front();
                }
                last.push_back(line);
            }
            last
        });

        let status = child.wait().await?;
        let _ = stdout_task.await;
        let stderr_tail = stderr_task.await.unwrap_or_default();

        if status.success() {
            Ok(())
        } else {
            warn!("{} exited with {}", self.config.ytdlp_bin, status);
            Err(ExtractionError::Failed {
                code: status.code(),
                message: tail(stderr_tail.iter().map(String::as_str), STDERR_TAIL_LINES),
            })
        }
    }

    async fn muxer_available(&self) -> bool {
        let status = self
            .command(&self.config.ffmpeg_bin)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
        matches!(status, Ok(s) if s.success())
    }
}

/// Join the last `n` non-empty lines.
fn tail<'a>(lines: impl Iterator<Item = &'a str>, n: usize) -> String {
    let lines: Vec<&str> = lines.map(str::trim).filter(|l| !l.is_empty()).collect();
    let start = lines.len().saturating_sub(n);
    let joined = lines[start..].join("\n");
    if joined.is_empty() {
        "no output from engine".to_string()
    } else {
        joined
    }
}
