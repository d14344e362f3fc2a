/// Process configuration read from the environment (and `.env`).
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use vidgrab_downloader::YtDlpConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub download_dir: PathBuf,
    pub static_dir: Option<PathBuf>,
    pub ytdlp_bin: String,
    pub ffmpeg_bin: String,
    pub retention: Duration,
    pub cleanup_grace: Duration,
    /// `None` leaves sweeping to download traffic alone.
    pub reaper_interval: Option<Duration>,
    pub purge_orphans_on_start: bool,
    pub engine_retries: u32,
    pub engine_socket_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let text = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let reaper_interval_secs: u64 = parse_or(&lookup, "REAPER_INTERVAL_SECS", 0);

        Self {
            host: text("API_HOST", "0.0.0.0"),
            port: parse_or(&lookup, "API_PORT", 3001),
            download_dir: PathBuf::from(text("DOWNLOAD_DIR", "./downloads")),
            static_dir: lookup("STATIC_DIR")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            ytdlp_bin: text("YTDLP_BIN", "yt-dlp"),
            ffmpeg_bin: text("FFMPEG_BIN", "ffmpeg"),
            retention: Duration::from_secs(parse_or(&lookup, "SESSION_RETENTION_SECS", 3600)),
            cleanup_grace: Duration::from_secs(parse_or(&lookup, "CLEANUP_GRACE_SECS", 5)),
            reaper_interval: (reaper_interval_secs > 0).then(|| Duration::from_secs(reaper_interval_secs)),
            purge_orphans_on_start: parse_bool_or(&lookup, "PURGE_ORPHANS_ON_START", true),
            engine_retries: parse_or(&lookup, "ENGINE_RETRIES", 3),
            engine_socket_timeout_secs: parse_or(&lookup, "ENGINE_SOCKET_TIMEOUT_SECS", 30),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Engine settings; tool search paths are filled in by the caller.
    pub fn engine_config(&self) -> YtDlpConfig {
        YtDlpConfig {
            ytdlp_bin: self.ytdlp_bin.clone(),
            ffmpeg_bin: self.ffmpeg_bin.clone(),
            retries: self.engine_retries,
            socket_timeout_secs: self.engine_socket_timeout_secs,
            extra_paths: Vec::new(),
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{}={:?} is not valid, using default", key, raw);
            default
        }),
        None => default,
    }
}

fn parse_bool_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    match lookup(key).map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        Some(v) => {
            warn!("{}={:?} is not a boolean, using default", key, v);
            default
        }
        None => default,
    }
}
