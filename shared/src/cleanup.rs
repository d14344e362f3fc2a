/// Deferred session cleanup and the age-based reaper.
///
/// A single actor task owns a `DelayQueue` of pending removals. Handlers
/// talk to it through the cloneable `CleanupScheduler` handle.
use std::collections::HashMap;
use std::future::poll_fn;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::time::{delay_queue, DelayQueue};
use tracing::{debug, info, warn};

use crate::session_store::{SessionId, SessionStore};

/// Messages accepted by the cleanup actor.
enum CleanupMessage {
    /// Remove the session once `delay` has elapsed. Replaces any earlier timer.
    Schedule { id: SessionId, delay: Duration },
    /// Drop the pending timer for a session, if any.
    Cancel { id: SessionId },
}

/// Handle to the shared cleanup scheduler.
#[derive(Clone)]
pub struct CleanupScheduler {
    sender: mpsc::UnboundedSender<CleanupMessage>,
}

impl CleanupScheduler {
    /// Start the scheduler task. It runs until every handle is dropped.
    pub fn spawn(store: SessionStore) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(CleanupActor::new(store, receiver).run());
        Self { sender }
    }

    /// Remove `id` from the store after `delay`.
    pub fn schedule(&self, id: SessionId, delay: Duration) {
        if self.sender.send(CleanupMessage::Schedule { id, delay }).is_err() {
            warn!("Cleanup scheduler stopped, session {} left for the reaper", id);
        }
    }

    /// Forget a pending removal.
    pub fn cancel(&self, id: SessionId) {
        let _ = self.sender.send(CleanupMessage::Cancel { id });
    }
}

struct CleanupActor {
    store: SessionStore,
    receiver: mpsc::UnboundedReceiver<CleanupMessage>,
    queue: DelayQueue<SessionId>,
    keys: HashMap<SessionId, delay_queue::Key>,
}

impl CleanupActor {
    fn new(store: SessionStore, receiver: mpsc::UnboundedReceiver<CleanupMessage>) -> Self {
        Self {
            store,
            receiver,
            queue: DelayQueue::new(),
            keys: HashMap::new(),
        }
    }

    async fn run(mut self) {
        debug!("Cleanup scheduler started");
        loop {
            tokio::select! {
                msg = self.receiver.recv() => match msg {
                    Some(msg) => self.handle_message(msg),
                    None => break,
                },
                Some(expired) = poll_fn(|cx| self.queue.poll_expired(cx)), if !self.queue.is_empty() => {
                    let id = expired.into_inner();
                    self.keys.remove(&id);
                    self.store.remove(&id).await;
                }
            }
        }
        if !self.keys.is_empty() {
            debug!("Cleanup scheduler stopping with {} pending removals", self.keys.len());
        }
    }

    fn handle_message(&mut self, msg: CleanupMessage) {
        match msg {
            CleanupMessage::Schedule { id, delay } => {
                if let Some(key) = self.keys.get(&id) {
                    self.queue.reset(key, delay);
                } else {
                    let key = self.queue.insert(id, delay);
                    self.keys.insert(id, key);
                }
                debug!("Session {} scheduled for removal in {:?}", id, delay);
            }
            CleanupMessage::Cancel { id } => {
                if let Some(key) = self.keys.remove(&id) {
                    self.queue.remove(&key);
                    debug!("Pending removal of session {} cancelled", id);
                }
            }
        }
    }
}

/// Sweeps sessions older than the retention window.
#[derive(Clone)]
pub struct Reaper {
    store: SessionStore,
    scheduler: CleanupScheduler,
    retention: Duration,
}

impl Reaper {
    pub fn new(store: SessionStore, scheduler: CleanupScheduler, retention: Duration) -> Self {
        Self {
            store,
            scheduler,
            retention,
        }
    }

    /// Run one sweep. Never fails; per-session errors are logged by the store.
    pub async fn run(&self) -> usize {
        let removed = self.store.sweep(self.retention).await;
        for id in &removed {
            self.scheduler.cancel(*id);
        }
        if !removed.is_empty() {
            info!("Reaper reclaimed {} sessions older than {:?}", removed.len(), self.retention);
        }
        removed.len()
    }

    /// Run a sweep every `interval` in a background task.
    pub fn spawn_periodic(self, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                self.run().await;
            }
        })
    }
}
