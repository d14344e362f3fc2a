/// Parsing of the engine's machine-readable progress lines.
use vidgrab_shared::models::DownloadProgress;

/// Marker the engine is told to prefix progress lines with.
pub const PROGRESS_PREFIX: &str = "vidgrab-progress";

/// Template passed to `--progress-template`.
pub fn progress_template() -> String {
    format!(
        "download:{} %(progress.downloaded_bytes)s %(progress.total_bytes)s %(progress.total_bytes_estimate)s %(progress.speed)s %(progress.eta)s",
        PROGRESS_PREFIX
    )
}

/// Parse one stdout line. Returns `None` for anything that is not a progress line.
///
/// Fields are `downloaded total estimate speed eta`; the engine prints `NA`
/// for unknown values.
pub fn parse_progress_line(line: &str) -> Option<DownloadProgress> {
    let mut fields = line.split_whitespace();
    if fields.next()? != PROGRESS_PREFIX {
        return None;
    }
    let downloaded = fields.next().and_then(parse_u64);
    let total = fields.next().and_then(parse_u64);
    let estimate = fields.next().and_then(parse_u64);
    let speed = fields.next().and_then(|s| s.parse::<f64>().ok()).filter(|s| s.is_finite());
    let eta = fields.next().and_then(parse_u64);

    let total = total.or(estimate);
    let percent = match (downloaded, total) {
        (Some(done), Some(total)) if total > 0 => Some((done as f64 / total as f64 * 100.0).min(100.0)),
        _ => None,
    };

    Some(DownloadProgress {
        percent,
        downloaded_bytes: downloaded,
        total_bytes: total,
        speed_bytes_per_sec: speed,
        eta_secs: eta,
    })
}

// The engine sometimes prints integral values as floats ("1024.0").
fn parse_u64(value: &str) -> Option<u64> {
    value
        .parse::<u64>()
        .ok()
        .or_else(|| value.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0).map(|v| v as u64))
}
