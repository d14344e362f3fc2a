/// Discovery of external tool locations for the engine subprocess.
use std::path::PathBuf;
use tracing::debug;

/// Discover extra PATH entries needed for the muxer (ffmpeg).
/// Checks FFMPEG_PATH env var first, then common install locations.
pub fn discover_extra_paths() -> Vec<String> {
    let mut extra = Vec::new();

    if let Ok(ffmpeg_path) = std::env::var("FFMPEG_PATH") {
        if !ffmpeg_path.trim().is_empty() {
            extra.push(ffmpeg_path);
        }
    }

    let candidates: &[&str] = if cfg!(target_os = "windows") {
        &[r"C:\ffmpeg\bin", r"C:\Program Files\ffmpeg\bin"]
    } else {
        &[
            "/usr/local/bin",
            "/snap/bin",
            "/opt/homebrew/bin",
            "/home/linuxbrew/.linuxbrew/bin",
        ]
    };
    let binary = if cfg!(target_os = "windows") { "ffmpeg.exe" } else { "ffmpeg" };

    for path in candidates {
        if PathBuf::from(path).join(binary).exists() && !extra.iter().any(|e| e == path) {
            extra.push(path.to_string());
        }
    }

    debug!("Extra tool paths: {:?}", extra);
    extra
}

/// Append `extra` directories to the given PATH value.
pub fn augmented_path(current: &str, extra: &[String]) -> String {
    let sep = if cfg!(target_os = "windows") { ";" } else { ":" };
    let mut parts: Vec<&str> = current.split(sep).filter(|p| !p.is_empty()).collect();
    for dir in extra {
        if !parts.contains(&dir.as_str()) {
            parts.push(dir);
        }
    }
    parts.join(sep)
}
