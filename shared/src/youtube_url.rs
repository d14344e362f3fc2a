/// YouTube URL detection and canonicalization.
///
/// Every recognised form (watch, youtu.be, shorts, embed, live, ...) maps
/// to `https://www.youtube.com/watch?v=<id>`.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ServiceError;

// ====== REGEX PATTERNS ======

// Scheme and host match case-insensitively; paths and ids do not.

/// Watch page; the `v` parameter may appear anywhere in the query.
static WATCH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?i:(?:https?://)?(?:(?:www|m|music)\.)?youtube\.com)/watch/?\?(?:[^#]*&)?v=([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)"
    ).unwrap()
});

static SHORT_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?i:(?:https?://)?(?:www\.)?youtu\.be)/([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)"
    ).unwrap()
});

/// Path-style links: /shorts/, /embed/, /v/, /live/.
static PATH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?i:(?:https?://)?(?:(?:www|m|music)\.)?youtube(?:-nocookie)?\.com)/(?:shorts|embed|v|live)/([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)"
    ).unwrap()
});

/// Extract the 11-character video id from any recognised URL form.
pub fn extract_video_id(url: &str) -> Option<String> {
    let url = url.trim();
    [&*WATCH_RE, &*SHORT_LINK_RE, &*PATH_RE]
        .iter()
        .find_map(|re| re.captures(url))
        .map(|cap| cap[1].to_string())
}

/// Validate a user-supplied URL and return its canonical watch URL.
pub fn canonicalize(url: &str) -> Result<String, ServiceError> {
    extract_video_id(url)
        .map(|id| format!("https://www.youtube.com/watch?v={}", id))
        .ok_or_else(|| ServiceError::validation("Invalid YouTube URL"))
}
