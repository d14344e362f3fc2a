/// Registry of temporary download sessions.
///
/// Each session owns one working directory under the base directory, named
/// by its id. The registry map is guarded by a single mutex; directory I/O
/// runs after the map has been updated, outside the lock.
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::StorageError;

/// Opaque session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    fn generate() -> Self {
        SessionId(Uuid::new_v4())
    }

    /// Parse an id previously produced by `Display`.
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value).ok().map(SessionId)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One in-flight or recently completed download.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub working_dir: PathBuf,
    pub created_at: DateTime<Utc>,
    busy: Arc<AtomicBool>,
}

impl Session {
    /// Whether a download is still writing into the working directory.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Keeps a session busy until dropped. Sweeps skip busy sessions.
#[derive(Debug)]
pub struct SessionLease {
    session: Session,
}

impl Deref for SessionLease {
    type Target = Session;

    fn deref(&self) -> &Session {
        &self.session
    }
}

impl Drop for SessionLease {
    fn drop(&mut self) {
        self.session.busy.store(false, Ordering::Release);
        debug!("Session {} released", self.session.id);
    }
}

/// Thread-safe store of active sessions.
#[derive(Clone)]
pub struct SessionStore {
    base_dir: Arc<PathBuf>,
    sessions: Arc<Mutex<HashMap<SessionId, Session>>>,
}

impl SessionStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Arc::new(base_dir.into()),
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Allocate a fresh session and its empty working directory.
    pub async fn create(&self) -> Result<Session, StorageError> {
        self.create_at(Utc::now()).await
    }

    /// Like `create`, but the session is busy until the lease is dropped.
    pub async fn lease(&self) -> Result<SessionLease, StorageError> {
        self.lease_at(Utc::now()).await
    }

    pub(crate) async fn create_at(&self, created_at: DateTime<Utc>) -> Result<Session, StorageError> {
        self.register(created_at, false).await
    }

    pub(crate) async fn lease_at(&self, created_at: DateTime<Utc>) -> Result<SessionLease, StorageError> {
        let session = self.register(created_at, true).await?;
        Ok(SessionLease { session })
    }

    async fn register(&self, created_at: DateTime<Utc>, busy: bool) -> Result<Session, StorageError> {
        tokio::fs::create_dir_all(self.base_dir.as_path())
            .await
            .map_err(|source| StorageError::CreateDir {
                path: self.base_dir.to_path_buf(),
                source,
            })?;

        loop {
            let id = SessionId::generate();
            let working_dir = self.base_dir.join(id.to_string());

            // create_dir (not create_dir_all) fails on an existing directory,
            // so no two sessions ever share one.
            match tokio::fs::create_dir(&working_dir).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    warn!("Session directory {:?} already exists, regenerating id", working_dir);
                    continue;
                }
                Err(source) => {
                    return Err(StorageError::CreateDir {
                        path: working_dir,
                        source,
                    })
                }
            }

            let session = Session {
                id,
                working_dir,
                created_at,
                busy: Arc::new(AtomicBool::new(busy)),
            };
            self.sessions.lock().await.insert(id, session.clone());
            debug!("Session {} registered at {:?}", id, session.working_dir);
            return Ok(session);
        }
    }

    /// Look up a registered session.
    pub async fn get(&self, id: &SessionId) -> Option<Session> {
        self.sessions.lock().await.get(id).cloned()
    }

    pub async fn contains(&self, id: &SessionId) -> bool {
        self.sessions.lock().await.contains_key(id)
    }

    /// Number of registered sessions.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop a session and delete its directory.
    ///
    /// Unknown ids are a no-op. Directory deletion failures are logged and the
    /// registry entry is dropped regardless. Returns whether the id was registered.
    pub async fn remove(&self, id: &SessionId) -> bool {
        let removed = self.sessions.lock().await.remove(id);
        match removed {
            Some(session) => {
                delete_working_dir(&session).await;
                info!("Session {} removed", id);
                true
            }
            None => {
                debug!("Session {} already removed", id);
                false
            }
        }
    }

    /// Remove every idle session older than `max_age`. Returns the removed ids.
    ///
    /// Busy sessions are left for a later sweep.
    pub async fn sweep(&self, max_age: Duration) -> Vec<SessionId> {
        self.sweep_at(Utc::now(), max_age).await
    }

    /// Like `sweep`, measuring ages against `now`.
    pub async fn sweep_at(&self, now: DateTime<Utc>, max_age: Duration) -> Vec<SessionId> {
        let expired: Vec<Session> = {
            let mut sessions = self.sessions.lock().await;
            let ids: Vec<SessionId> = sessions
                .values()
                .filter(|s| !s.is_busy() && is_expired(s, now, max_age))
                .map(|s| s.id)
                .collect();
            ids.iter().filter_map(|id| sessions.remove(id)).collect()
        };

        for session in &expired {
            delete_working_dir(session).await;
        }

        if !expired.is_empty() {
            info!("Swept {} expired sessions", expired.len());
        }
        expired.into_iter().map(|s| s.id).collect()
    }

    /// Remove all sessions (used at shutdown). Returns how many were removed.
    pub async fn clear(&self) -> usize {
        let drained: Vec<Session> = self.sessions.lock().await.drain().map(|(_, s)| s).collect();
        for session in &drained {
            delete_working_dir(session).await;
        }
        drained.len()
    }

    /// Locate the single downloaded file in a session's working directory.
    ///
    /// In-progress artefacts and hidden files are ignored; among the rest
    /// the first in name order wins.
    pub async fn output_file(&self, id: &SessionId) -> Result<Option<PathBuf>, StorageError> {
        let session = self
            .get(id)
            .await
            .ok_or_else(|| StorageError::UnknownSession(id.to_string()))?;

        let read_err = |source| StorageError::ReadDir {
            path: session.working_dir.clone(),
            source,
        };
        let mut entries = tokio::fs::read_dir(&session.working_dir).await.map_err(read_err)?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
            let file_type = entry.file_type().await.map_err(read_err)?;
            if file_type.is_file() && is_finished_output(&entry.file_name().to_string_lossy()) {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files.into_iter().next())
    }

    /// Delete leftover session directories from a previous run.
    ///
    /// Only subdirectories named like a session id and not currently
    /// registered are touched. Returns how many were deleted.
    pub async fn purge_orphans(&self) -> usize {
        let mut entries = match tokio::fs::read_dir(self.base_dir.as_path()).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return 0,
            Err(e) => {
                warn!("Cannot scan {:?} for orphaned sessions: {}", self.base_dir, e);
                return 0;
            }
        };

        let mut purged = 0;
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!("Error while scanning {:?}: {}", self.base_dir, e);
                    break;
                }
            };
            let name = entry.file_name().to_string_lossy().to_string();
            let Some(id) = SessionId::parse(&name) else {
                continue;
            };
            if !entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) || self.contains(&id).await {
                continue;
            }
            match tokio::fs::remove_dir_all(entry.path()).await {
                Ok(()) => purged += 1,
                Err(e) => warn!("Failed to purge orphaned session dir {:?}: {}", entry.path(), e),
            }
        }

        if purged > 0 {
            info!("Purged {} orphaned session directories", purged);
        }
        purged
    }
}

fn is_expired(session: &Session, now: DateTime<Utc>, max_age: Duration) -> bool {
    // Negative ages (clock skew) convert to Err and never expire.
    (now - session.created_at)
        .to_std()
        .map(|age| age > max_age)
        .unwrap_or(false)
}

fn is_finished_output(name: &str) -> bool {
    !name.starts_with('.')
        && !name.ends_with(".part")
        && !name.ends_with(".ytdl")
        && !name.ends_with(".temp")
}

async fn delete_working_dir(session: &Session) {
    match tokio::fs::remove_dir_all(&session.working_dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(source) => {
            let err = StorageError::RemoveDir {
                path: session.working_dir.clone(),
                source,
            };
            warn!("Session {}: {}", session.id, err);
        }
    }
}
