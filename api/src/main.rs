/// Vidgrab API Server
///
/// Resolves available formats for a YouTube URL and proxies downloads
/// through per-request temporary directories.
mod config;
mod error;
mod routes;

use anyhow::Context;
use axum::routing::get;
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use config::Config;
use vidgrab_downloader::tools::discover_extra_paths;
use vidgrab_downloader::{MediaEngine, YtDlpEngine};
use vidgrab_shared::cleanup::{CleanupScheduler, Reaper};
use vidgrab_shared::session_store::SessionStore;

/// Shared application state for all API handlers.
pub struct AppState {
    pub engine: Arc<dyn MediaEngine>,
    pub sessions: SessionStore,
    pub cleanup: CleanupScheduler,
    pub reaper: Reaper,
    /// Delay between handing a file to the client and deleting its session.
    pub cleanup_grace: Duration,
}

/// Build the router. Unmatched paths fall back to `static_dir` when given.
pub fn build_app(state: Arc<AppState>, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/api/youtube/info", get(routes::media_info))
        .route("/api/youtube/download", get(routes::download))
        .route("/api/health", get(routes::health));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Init tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "vidgrab_api=info,vidgrab_shared=info,vidgrab_downloader=info,tower_http=info".into()
            }),
        )
        .init();

    let config = Config::from_env();
    info!("Download directory: {}", config.download_dir.display());

    tokio::fs::create_dir_all(&config.download_dir)
        .await
        .with_context(|| format!("Failed to create download directory {:?}", config.download_dir))?;

    // Sessions
    let sessions = SessionStore::new(&config.download_dir);
    if config.purge_orphans_on_start {
        sessions.purge_orphans().await;
    }
    let cleanup = CleanupScheduler::spawn(sessions.clone());
    let reaper = Reaper::new(sessions.clone(), cleanup.clone(), config.retention);

    // Optional background sweep, on top of the per-request one
    if let Some(interval) = config.reaper_interval {
        info!("Periodic reaper every {:?}", interval);
        reaper.clone().spawn_periodic(interval);
    }

    // Engine
    let mut engine_config = config.engine_config();
    engine_config.extra_paths = discover_extra_paths();
    let engine = YtDlpEngine::new(engine_config);
    if engine.muxer_available().await {
        info!("FFmpeg available: merged video and MP3 downloads enabled");
    } else {
        warn!("FFmpeg not found: only pre-muxed formats will be offered");
    }

    // App state
    let state = Arc::new(AppState {
        engine: Arc::new(engine),
        sessions: sessions.clone(),
        cleanup,
        reaper,
        cleanup_grace: config.cleanup_grace,
    });

    if let Some(dir) = &config.static_dir {
        info!("Serving front-end from {}", dir.display());
    }
    let app = build_app(state, config.static_dir.as_deref());

    // Bind
    let addr = config.listen_addr();
    info!("Vidgrab API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let removed = sessions.clear().await;
    info!("Shutdown complete, removed {} remaining sessions", removed);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
