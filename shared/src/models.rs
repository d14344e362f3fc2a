/// Data models shared across all Vidgrab crates.
use serde::{Deserialize, Serialize};

/// Metadata reported by the extraction engine for one video.
///
/// Field names follow the engine's JSON dump; unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMediaInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub formats: Vec<RawFormat>,
}

/// One stream variant as reported by the extraction engine.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFormat {
    pub format_id: String,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub filesize: Option<u64>,
    #[serde(default)]
    pub filesize_approx: Option<f64>,
    #[serde(default)]
    pub fps: Option<f64>,
    #[serde(default)]
    pub format_note: Option<String>,
}

impl RawFormat {
    /// Whether the variant carries a video track.
    pub fn has_video(&self) -> bool {
        codec_present(self.vcodec.as_deref())
    }

    /// Whether the variant carries an embedded audio track.
    pub fn has_audio(&self) -> bool {
        codec_present(self.acodec.as_deref())
    }

    /// Reported size, falling back to the engine's estimate, else 0.
    pub fn size_bytes(&self) -> u64 {
        match self.filesize {
            Some(size) if size > 0 => size,
            _ => self
                .filesize_approx
                .filter(|s| s.is_finite() && *s > 0.0)
                .map(|s| s as u64)
                .unwrap_or(0),
        }
    }
}

fn codec_present(codec: Option<&str>) -> bool {
    matches!(codec, Some(c) if !c.is_empty() && c != "none")
}

/// Kind of media a format yields.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    pub fn as_str(&self) -> &str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "video" => Some(MediaKind::Video),
            "audio" => Some(MediaKind::Audio),
            _ => None,
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Client-facing, resolution-ranked format option.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormatCandidate {
    pub id: String,
    pub container: String,
    pub mime_type: String,
    pub resolution_label: String,
    pub has_audio: bool,
    pub audio_codec: String,
    pub approximate_size_bytes: u64,
    pub size_label: String,
    pub audio_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_codec: Option<String>,
    pub kind: MediaKind,
}

/// Body of a successful info request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaInfoResponse {
    pub title: String,
    pub thumbnail: String,
    pub duration_seconds: u64,
    pub author: String,
    pub formats: Vec<FormatCandidate>,
    pub muxer_available: bool,
}

impl MediaInfoResponse {
    pub fn new(info: &RawMediaInfo, formats: Vec<FormatCandidate>, muxer_available: bool) -> Self {
        Self {
            title: info.title.clone().unwrap_or_default(),
            thumbnail: info.thumbnail.clone().unwrap_or_default(),
            duration_seconds: info
                .duration
                .filter(|d| d.is_finite() && *d > 0.0)
                .map(|d| d.round() as u64)
                .unwrap_or(0),
            author: info.uploader.clone().unwrap_or_default(),
            formats,
            muxer_available,
        }
    }
}

/// One progress tick emitted while the engine downloads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DownloadProgress {
    pub percent: Option<f64>,
    pub downloaded_bytes: Option<u64>,
    pub total_bytes: Option<u64>,
    pub speed_bytes_per_sec: Option<f64>,
    pub eta_secs: Option<u64>,
}

/// Convert bytes to a human-readable size (e.g. "1.5 MB").
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "Unknown".to_string();
    }
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}
