/// The extraction-engine seam used by the request handlers.
use async_trait::async_trait;
use std::path::Path;
use tokio::sync::mpsc;

use vidgrab_shared::errors::ExtractionError;
use vidgrab_shared::format_resolver::BEST_AUDIO_ID;
use vidgrab_shared::models::{DownloadProgress, MediaKind, RawMediaInfo};

/// Channel the engine reports download progress on.
pub type ProgressSender = mpsc::UnboundedSender<DownloadProgress>;

/// Concrete format request handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    /// Engine format selector, e.g. `137+bestaudio/best`.
    pub selector: String,
    /// Convert the fetched audio to MP3 (needs the muxer).
    pub extract_mp3: bool,
    /// Merge separately fetched streams into one container.
    pub merge_streams: bool,
}

impl FormatSpec {
    /// Map a client request onto an engine selector.
    pub fn resolve(format_id: &str, kind: MediaKind, muxer_available: bool) -> Self {
        if kind == MediaKind::Audio || format_id == BEST_AUDIO_ID {
            return Self {
                selector: "bestaudio/best".to_string(),
                extract_mp3: muxer_available,
                merge_streams: false,
            };
        }
        if muxer_available {
            Self {
                selector: format!("{}+bestaudio/best", format_id),
                extract_mp3: false,
                merge_streams: true,
            }
        } else {
            Self {
                selector: format_id.to_string(),
                extract_mp3: false,
                merge_streams: false,
            }
        }
    }
}

/// External collaborator that resolves and fetches media.
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Fetch metadata and the raw variant list without downloading.
    async fn probe(&self, url: &str) -> Result<RawMediaInfo, ExtractionError>;

    /// Download `url` into `output_dir`, optionally reporting progress.
    async fn fetch(
        &self,
        url: &str,
        format: &FormatSpec,
        output_dir: &Path,
        progress: Option<ProgressSender>,
    ) -> Result<(), ExtractionError>;

    /// Whether the external muxer can be invoked.
    async fn muxer_available(&self) -> bool;
}
