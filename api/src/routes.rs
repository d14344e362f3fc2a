/// API route handlers for Vidgrab.
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use vidgrab_downloader::FormatSpec;
use vidgrab_shared::errors::{ServiceError, StorageError};
use vidgrab_shared::format_resolver::resolve_formats;
use vidgrab_shared::models::{DownloadProgress, MediaInfoResponse, MediaKind};
use vidgrab_shared::session_store::SessionId;
use vidgrab_shared::youtube_url;

use crate::error::ApiError;
use crate::AppState;

// ====== REQUEST TYPES ======

#[derive(Deserialize)]
pub struct InfoQuery {
    pub url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadQuery {
    pub url: Option<String>,
    #[serde(alias = "itag")]
    pub format_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

// ====== INFO ROUTE ======

/// GET /api/youtube/info
pub async fn media_info(
    State(state): State<Arc<AppState>>,
    Query(query): Query<InfoQuery>,
) -> Result<Json<MediaInfoResponse>, ApiError> {
    let url = non_empty(query.url).ok_or_else(|| ServiceError::validation("No URL provided"))?;
    info!("Info request for {}", url);

    let canonical = youtube_url::canonicalize(&url)?;
    let muxer_available = state.engine.muxer_available().await;

    let info = state
        .engine
        .probe(&canonical)
        .await
        .map_err(|e| ApiError::from(e).with_summary("Failed to fetch video info"))?;

    let formats = resolve_formats(&info.formats, muxer_available);
    info!(
        "Resolved {} of {} formats for {} (muxer: {})",
        formats.len(),
        info.formats.len(),
        canonical,
        muxer_available
    );
    Ok(Json(MediaInfoResponse::new(&info, formats, muxer_available)))
}

// ====== DOWNLOAD ROUTE ======

/// GET /api/youtube/download
///
/// The reaper runs after every request, whatever the outcome.
pub async fn download(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let result = run_download(&state, query).await;
    state.reaper.run().await;
    result
}

async fn run_download(state: &AppState, query: DownloadQuery) -> Result<Response, ApiError> {
    let (url, format_id) = match (non_empty(query.url), non_empty(query.format_id)) {
        (Some(url), Some(format_id)) => (url, format_id),
        _ => return Err(ServiceError::validation("Missing URL or format").into()),
    };
    let kind = match non_empty(query.kind) {
        None => MediaKind::Video,
        Some(kind) => MediaKind::parse(&kind)
            .ok_or_else(|| ServiceError::validation(format!("Invalid download type: {}", kind)))?,
    };
    let canonical = youtube_url::canonicalize(&url)?;

    // Busy until the response is built; sweeps skip it meanwhile.
    let session = state.sessions.lease().await?;
    info!(
        "Download request - session: {}, url: {}, format: {}, type: {}",
        session.id, canonical, format_id, kind
    );

    let muxer_available = state.engine.muxer_available().await;
    let spec = FormatSpec::resolve(&format_id, kind, muxer_available);
    info!("Session {}: using format specification {}", session.id, spec.selector);

    let (progress_tx, progress_rx) = mpsc::unbounded_channel();
    tokio::spawn(log_progress(session.id, progress_rx));

    // On failure the session stays registered; the reaper reclaims it.
    state
        .engine
        .fetch(&canonical, &spec, &session.working_dir, Some(progress_tx))
        .await?;

    let file_path = state
        .sessions
        .output_file(&session.id)
        .await
        .map_err(|e| ApiError::from(e).with_summary("Failed to read downloaded file"))?
        .ok_or_else(|| ServiceError::OutputMissing {
            session_id: session.id.to_string(),
        })?;
    info!("Session {}: downloaded {:?}", session.id, file_path);

    let response = file_response(&file_path).await?;
    state.cleanup.schedule(session.id, state.cleanup_grace);
    Ok(response)
}

/// Log progress ticks for one session until the engine drops its sender.
async fn log_progress(session_id: SessionId, mut rx: mpsc::UnboundedReceiver<DownloadProgress>) {
    let mut last_quarter = 0;
    while let Some(tick) = rx.recv().await {
        debug!("Session {} progress: {:?}", session_id, tick);
        if let Some(percent) = tick.percent {
            let quarter = (percent / 25.0).floor() as u32;
            if quarter > last_quarter {
                last_quarter = quarter;
                info!("Download progress for {}: {:.1}%", session_id, percent);
            }
        }
    }
}

/// Stream a file back as an attachment, keeping its name.
async fn file_response(path: &Path) -> Result<Response, ApiError> {
    let open_err = |source| {
        ApiError::from(StorageError::OpenFile {
            path: path.to_path_buf(),
            source,
        })
        .with_summary("Failed to read downloaded file")
    };
    let file = tokio::fs::File::open(path).await.map_err(open_err)?;
    let length = file.metadata().await.map_err(open_err)?.len();

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "download".to_string());

    let body = Body::from_stream(ReaderStream::new(file));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type_for(&filename).to_string()),
            (header::CONTENT_LENGTH, length.to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&filename)),
        ],
        body,
    )
        .into_response())
}

fn content_type_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "mp3" => "audio/mpeg",
        "m4a" | "aac" => "audio/mp4",
        "opus" | "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        "wav" => "audio/wav",
        _ => "application/octet-stream",
    }
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 UTF-8 name.
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut encoded = String::with_capacity(filename.len());
    for byte in filename.bytes() {
        if byte.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }

    format!("attachment; filename=\"{}\"; filename*=UTF-8''{}", fallback, encoded)
}

// ====== HEALTH ROUTE ======

/// GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "sessions": state.sessions.len().await,
        "muxerAvailable": state.engine.muxer_available().await,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::Request;
    use axum::Router;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use vidgrab_downloader::{MediaEngine, ProgressSender};
    use vidgrab_shared::cleanup::{CleanupScheduler, Reaper};
    use vidgrab_shared::errors::ExtractionError;
    use vidgrab_shared::models::{RawFormat, RawMediaInfo};
    use vidgrab_shared::session_store::SessionStore;

    const VIDEO_URL: &str = "https://youtu.be/dQw4w9WgXcQ?si=share";
    const CANONICAL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    enum Outcome {
        Produce(&'static str, &'static [u8]),
        NoOutput,
        Fail,
    }

    struct FakeEngine {
        muxer: bool,
        outcome: Outcome,
        probe_fails: bool,
        fetch_delay: Duration,
        probes: AtomicUsize,
        fetches: AtomicUsize,
        last_url: Mutex<Option<String>>,
        last_spec: Mutex<Option<FormatSpec>>,
    }

    impl FakeEngine {
        fn new(outcome: Outcome) -> Self {
            Self {
                muxer: true,
                outcome,
                probe_fails: false,
                fetch_delay: Duration::ZERO,
                probes: AtomicUsize::new(0),
                fetches: AtomicUsize::new(0),
                last_url: Mutex::new(None),
                last_spec: Mutex::new(None),
            }
        }
    }

    fn variant(id: &str, height: u32, acodec: &str, size: u64) -> RawFormat {
        RawFormat {
            format_id: id.to_string(),
            ext: Some("mp4".to_string()),
            vcodec: Some("avc1".to_string()),
            acodec: Some(acodec.to_string()),
            height: Some(height),
            filesize: Some(size),
            ..Default::default()
        }
    }

    #[async_trait]
    impl MediaEngine for FakeEngine {
        async fn probe(&self, url: &str) -> Result<RawMediaInfo, ExtractionError> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            *self.last_url.lock().unwrap() = Some(url.to_string());
            if self.probe_fails {
                return Err(ExtractionError::Failed {
                    code: Some(1),
                    message: "ERROR: Video unavailable".into(),
                });
            }
            Ok(RawMediaInfo {
                title: Some("Never Gonna Give You Up".into()),
                thumbnail: Some("https://i.ytimg.com/vi/dQw4w9WgXcQ/hq.jpg".into()),
                duration: Some(212.0),
                uploader: Some("Rick Astley".into()),
                formats: vec![
                    variant("137", 1080, "none", 50),
                    variant("96", 1080, "mp4a.40.2", 70),
                    variant("22", 720, "mp4a.40.2", 30),
                    variant("401", 2160, "mp4a.40.2", 200),
                ],
            })
        }

        async fn fetch(
            &self,
            url: &str,
            format: &FormatSpec,
            output_dir: &Path,
            progress: Option<ProgressSender>,
        ) -> Result<(), ExtractionError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            *self.last_url.lock().unwrap() = Some(url.to_string());
            *self.last_spec.lock().unwrap() = Some(format.clone());
            if let Some(tx) = progress {
                let _ = tx.send(DownloadProgress {
                    percent: Some(100.0),
                    ..Default::default()
                });
            }
            tokio::time::sleep(self.fetch_delay).await;
            match self.outcome {
                Outcome::Produce(name, bytes) => {
                    tokio::fs::write(output_dir.join(name), bytes).await?;
                    Ok(())
                }
                Outcome::NoOutput => Ok(()),
                Outcome::Fail => Err(ExtractionError::Failed {
                    code: Some(1),
                    message: "ERROR: Requested format is not available".into(),
                }),
            }
        }

        async fn muxer_available(&self) -> bool {
            self.muxer
        }
    }

    struct Harness {
        _tmp: TempDir,
        engine: Arc<FakeEngine>,
        state: Arc<AppState>,
    }

    impl Harness {
        fn new(engine: FakeEngine) -> Self {
            Self::with_retention(engine, Duration::from_secs(3600))
        }

        fn with_retention(engine: FakeEngine, retention: Duration) -> Self {
            let tmp = TempDir::new().unwrap();
            let sessions = SessionStore::new(tmp.path().join("downloads"));
            let cleanup = CleanupScheduler::spawn(sessions.clone());
            let reaper = Reaper::new(sessions.clone(), cleanup.clone(), retention);
            let engine = Arc::new(engine);
            let state = Arc::new(AppState {
                engine: engine.clone(),
                sessions,
                cleanup,
                reaper,
                cleanup_grace: Duration::from_millis(50),
            });
            Self { _tmp: tmp, engine, state }
        }

        fn app(&self) -> Router {
            crate::build_app(self.state.clone(), None)
        }

        async fn get(&self, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
            let response = self
                .app()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            let status = response.status();
            let headers = response.headers().clone();
            let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            (status, headers, body.to_vec())
        }

        async fn get_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
            let (status, _, body) = self.get(uri).await;
            (status, serde_json::from_slice(&body).unwrap())
        }

        fn base_dir_entries(&self) -> usize {
            std::fs::read_dir(self.state.sessions.base_dir())
                .map(|entries| entries.count())
                .unwrap_or(0)
        }
    }

    fn download_uri(url: &str, format_id: &str) -> String {
        format!(
            "/api/youtube/download?url={}&formatId={}",
            encode(url),
            encode(format_id)
        )
    }

    fn encode(value: &str) -> String {
        value
            .bytes()
            .map(|b| {
                if b.is_ascii_alphanumeric() || b"-_.~".contains(&b) {
                    (b as char).to_string()
                } else {
                    format!("%{:02X}", b)
                }
            })
            .collect()
    }

    // ====== INFO ======

    #[tokio::test]
    async fn test_info_returns_ranked_formats() {
        let h = Harness::new(FakeEngine::new(Outcome::NoOutput));
        let (status, json) = h
            .get_json(&format!("/api/youtube/info?url={}", encode(VIDEO_URL)))
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["title"], "Never Gonna Give You Up");
        assert_eq!(json["author"], "Rick Astley");
        assert_eq!(json["durationSeconds"], 212);
        assert_eq!(json["muxerAvailable"], true);

        let formats = json["formats"].as_array().unwrap();
        let ids: Vec<&str> = formats.iter().map(|f| f["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["96", "22", "bestaudio"]);
        assert_eq!(formats[0]["resolutionLabel"], "1080p");
        assert_eq!(formats[0]["hasAudio"], true);
        assert_eq!(formats[2]["kind"], "audio");

        assert_eq!(h.engine.last_url.lock().unwrap().as_deref(), Some(CANONICAL));
        assert!(h.state.sessions.is_empty().await);
    }

    #[tokio::test]
    async fn test_info_without_muxer_has_no_audio_candidate() {
        let mut engine = FakeEngine::new(Outcome::NoOutput);
        engine.muxer = false;
        let h = Harness::new(engine);
        let (status, json) = h
            .get_json(&format!("/api/youtube/info?url={}", encode(VIDEO_URL)))
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["muxerAvailable"], false);
        assert_eq!(json["formats"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_info_requires_url() {
        let h = Harness::new(FakeEngine::new(Outcome::NoOutput));
        let (status, json) = h.get_json("/api/youtube/info").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "No URL provided");
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn test_info_rejects_malformed_url() {
        let h = Harness::new(FakeEngine::new(Outcome::NoOutput));
        let (status, json) = h.get_json("/api/youtube/info?url=https%3A%2F%2Fexample.com%2F").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid YouTube URL");
        assert_eq!(h.engine.probes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_info_engine_failure_is_500() {
        let mut engine = FakeEngine::new(Outcome::NoOutput);
        engine.probe_fails = true;
        let h = Harness::new(engine);
        let (status, json) = h
            .get_json(&format!("/api/youtube/info?url={}", encode(VIDEO_URL)))
            .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Failed to fetch video info");
        assert!(json["details"].as_str().unwrap().contains("Video unavailable"));
    }

    // ====== DOWNLOAD ======

    #[tokio::test]
    async fn test_download_streams_file_and_cleans_up() {
        let h = Harness::new(FakeEngine::new(Outcome::Produce("Clip.mp4", b"fake video bytes")));
        let (status, headers, body) = h.get(&download_uri(VIDEO_URL, "137")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"fake video bytes");
        assert_eq!(headers[header::CONTENT_TYPE], "video/mp4");
        assert_eq!(headers[header::CONTENT_LENGTH], "16");
        let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\"Clip.mp4\""));

        let spec = h.engine.last_spec.lock().unwrap().clone().unwrap();
        assert_eq!(spec.selector, "137+bestaudio/best");
        assert_eq!(h.engine.last_url.lock().unwrap().as_deref(), Some(CANONICAL));

        // Grace period is 50ms in the harness.
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(h.state.sessions.is_empty().await);
        assert_eq!(h.base_dir_entries(), 0);
    }

    #[tokio::test]
    async fn test_download_accepts_itag_alias_and_audio_type() {
        let h = Harness::new(FakeEngine::new(Outcome::Produce("Clip.mp3", b"id3")));
        let uri = format!("/api/youtube/download?url={}&itag=bestaudio&type=audio", encode(VIDEO_URL));
        let (status, headers, _) = h.get(&uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "audio/mpeg");
        let spec = h.engine.last_spec.lock().unwrap().clone().unwrap();
        assert_eq!(spec.selector, "bestaudio/best");
        assert!(spec.extract_mp3);
    }

    #[tokio::test]
    async fn test_download_without_muxer_requests_bare_format() {
        let mut engine = FakeEngine::new(Outcome::Produce("Clip.mp4", b"x"));
        engine.muxer = false;
        let h = Harness::new(engine);
        let (status, _, _) = h.get(&download_uri(VIDEO_URL, "22")).await;

        assert_eq!(status, StatusCode::OK);
        let spec = h.engine.last_spec.lock().unwrap().clone().unwrap();
        assert_eq!(spec.selector, "22");
    }

    #[tokio::test]
    async fn test_download_requires_url_and_format() {
        let h = Harness::new(FakeEngine::new(Outcome::NoOutput));

        let (status, json) = h.get_json(&format!("/api/youtube/download?url={}", encode(VIDEO_URL))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Missing URL or format");

        let (status, _) = h.get_json("/api/youtube/download?formatId=137").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert!(h.state.sessions.is_empty().await);
        assert_eq!(h.engine.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_download_malformed_url_creates_no_session() {
        let h = Harness::new(FakeEngine::new(Outcome::NoOutput));
        for url in ["not a url", "https://vimeo.com/12345", "https://www.youtube.com/watch"] {
            let (status, _) = h.get_json(&download_uri(url, "137")).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "url: {}", url);
        }
        assert!(h.state.sessions.is_empty().await);
        assert_eq!(h.base_dir_entries(), 0);
        assert_eq!(h.engine.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_download_rejects_unknown_type() {
        let h = Harness::new(FakeEngine::new(Outcome::NoOutput));
        let uri = format!("{}&type=gif", download_uri(VIDEO_URL, "137"));
        let (status, json) = h.get_json(&uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid download type: gif");
        assert!(h.state.sessions.is_empty().await);
    }

    #[tokio::test]
    async fn test_download_without_output_keeps_session() {
        let h = Harness::new(FakeEngine::new(Outcome::NoOutput));
        let (status, json) = h.get_json(&download_uri(VIDEO_URL, "137")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "No file was downloaded");
        assert!(json["details"].is_string());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(h.state.sessions.len().await, 1);
        assert_eq!(h.base_dir_entries(), 1);
    }

    #[tokio::test]
    async fn test_download_engine_failure_keeps_session() {
        let h = Harness::new(FakeEngine::new(Outcome::Fail));
        let (status, json) = h.get_json(&download_uri(VIDEO_URL, "137")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Failed to download video");
        assert!(json["details"].as_str().unwrap().contains("Requested format is not available"));

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(h.state.sessions.len().await, 1);
    }

    #[tokio::test]
    async fn test_reaper_runs_on_every_download_request() {
        let h = Harness::with_retention(FakeEngine::new(Outcome::NoOutput), Duration::ZERO);
        let stale = h.state.sessions.create().await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let (status, _) = h.get_json("/api/youtube/download?url=bad&formatId=137").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert!(!h.state.sessions.contains(&stale.id).await);
        assert!(!stale.working_dir.exists());
    }

    #[tokio::test]
    async fn test_reaper_spares_download_in_progress() {
        let mut engine = FakeEngine::new(Outcome::Produce("Clip.mp4", b"slow video"));
        engine.fetch_delay = Duration::from_millis(300);
        let h = Harness::with_retention(engine, Duration::from_millis(50));

        let app = h.app();
        let uri = download_uri(VIDEO_URL, "137");
        let slow = tokio::spawn(async move {
            app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap()
        });

        // The first session is past retention but still downloading.
        tokio::time::sleep(Duration::from_millis(150)).await;
        let (status, _) = h.get_json("/api/youtube/download?url=bad&formatId=137").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(h.state.sessions.len().await, 1);

        let response = slow.await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"slow video");
    }

    #[tokio::test]
    async fn test_download_session_failure_is_500() {
        let h = Harness::new(FakeEngine::new(Outcome::Produce("Clip.mp4", b"x")));
        std::fs::write(h.state.sessions.base_dir(), b"not a directory").unwrap();

        let (status, json) = h.get_json(&download_uri(VIDEO_URL, "137")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Failed to create download session");
        assert!(json["details"].is_string());
        assert_eq!(h.engine.fetches.load(Ordering::SeqCst), 0);
        assert!(h.state.sessions.is_empty().await);
    }

    #[tokio::test]
    async fn test_health() {
        let h = Harness::new(FakeEngine::new(Outcome::NoOutput));
        let (status, json) = h.get_json("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["sessions"], 0);
        assert_eq!(json["muxerAvailable"], true);
    }

    // ====== HELPERS ======

    #[test]
    fn test_content_disposition_keeps_unicode_name() {
        let value = content_disposition("Café \"Live\".mp4");
        assert_eq!(
            value,
            "attachment; filename=\"Caf_ _Live_.mp4\"; filename*=UTF-8''Caf%C3%A9%20%22Live%22.mp4"
        );
        assert!(value.is_ascii());
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a.MP4"), "video/mp4");
        assert_eq!(content_type_for("a.webm"), "video/webm");
        assert_eq!(content_type_for("a.m4a"), "audio/mp4");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }
}
