/// Turns the engine's raw variant list into client-facing format options.
use crate::models::{format_size, FormatCandidate, MediaKind, RawFormat};

/// Container every video candidate must use.
pub const TARGET_CONTAINER: &str = "mp4";

/// Offered resolutions, best first. Anything else is dropped.
pub const ALLOWED_HEIGHTS: [u32; 4] = [1080, 720, 480, 360];

/// Format id of the synthetic audio-only candidate.
pub const BEST_AUDIO_ID: &str = "bestaudio";

/// Build the ordered candidate list for one info request.
///
/// One candidate per allowed height (embedded audio preferred, then the
/// largest size), ordered by `ALLOWED_HEIGHTS`, followed by the best-audio
/// candidate when a muxer is available.
pub fn resolve_formats(formats: &[RawFormat], muxer_available: bool) -> Vec<FormatCandidate> {
    let eligible: Vec<&RawFormat> = formats
        .iter()
        .filter(|f| f.ext.as_deref() == Some(TARGET_CONTAINER) && f.has_video())
        .collect();

    let mut candidates: Vec<FormatCandidate> = ALLOWED_HEIGHTS
        .iter()
        .filter_map(|&height| {
            eligible
                .iter()
                .filter(|f| f.height == Some(height))
                // Equal keys resolve to the later variant in engine order.
                .max_by_key(|f| (f.has_audio(), f.size_bytes()))
                .map(|f| video_candidate(f, height))
        })
        .collect();

    if muxer_available {
        candidates.push(best_audio_candidate());
    }

    candidates
}

fn video_candidate(fmt: &RawFormat, height: u32) -> FormatCandidate {
    let has_audio = fmt.has_audio();
    let size = fmt.size_bytes();
    FormatCandidate {
        id: fmt.format_id.clone(),
        container: TARGET_CONTAINER.to_string(),
        mime_type: "video/mp4".to_string(),
        resolution_label: format!("{}p", height),
        has_audio,
        audio_codec: fmt
            .acodec
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "unknown".to_string()),
        approximate_size_bytes: size,
        size_label: format_size(size),
        audio_status: if has_audio {
            "Includes Audio".to_string()
        } else {
            "No Audio + Includes Audio".to_string()
        },
        fps: fmt.fps,
        video_codec: fmt.vcodec.clone(),
        kind: MediaKind::Video,
    }
}

fn best_audio_candidate() -> FormatCandidate {
    FormatCandidate {
        id: BEST_AUDIO_ID.to_string(),
        container: "mp3".to_string(),
        mime_type: "audio/mpeg".to_string(),
        resolution_label: "MP3".to_string(),
        has_audio: true,
        audio_codec: "mp3".to_string(),
        approximate_size_bytes: 0,
        size_label: format_size(0),
        audio_status: "High-quality MP3".to_string(),
        fps: None,
        video_codec: None,
        kind: MediaKind::Audio,
    }
}
