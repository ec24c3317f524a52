//! # Session Registry
//!
//! Maps session ids to live `ChatSession`s. Each session sits behind its own
//! async mutex, so turns for one session are processed one at a time while
//! other sessions proceed independently.
//!
//! Sessions end when a client deletes them or when they sit idle longer than
//! the configured timeout; a background sweeper removes the idle ones.

use catalog_chat::ChatSession;
use std::{
    collections::HashMap,
    sync::{Arc, Weak},
    time::Duration,
};
use tokio::{
    sync::{Mutex, RwLock},
    task::JoinHandle,
    time::Instant,
};
use tracing::{debug, info};
use uuid::Uuid;

pub type SharedSession = Arc<Mutex<ChatSession>>;

struct SessionEntry {
    session: SharedSession,
    last_active: Instant,
}

type SessionMap = HashMap<Uuid, SessionEntry>;

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<SessionMap>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session under its own id and returns that id.
    pub async fn insert(&self, session: ChatSession) -> Uuid {
        let id = session.id();
        self.sessions.write().await.insert(
            id,
            SessionEntry {
                session: Arc::new(Mutex::new(session)),
                last_active: Instant::now(),
            },
        );
        id
    }

    /// Looks up a session and marks it as active.
    pub async fn get(&self, id: &Uuid) -> Option<SharedSession> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(id)?;
        entry.last_active = Instant::now();
        Some(entry.session.clone())
    }

    /// Removes a session. Its transcript is dropped once no request holds it.
    pub async fn remove(&self, id: &Uuid) -> Option<SharedSession> {
        self.sessions
            .write()
            .await
            .remove(id)
            .map(|entry| entry.session)
    }

    /// Removes every session not used within `idle` and returns how many went.
    ///
    /// A session still held by a request is kept regardless of its age.
    pub async fn remove_idle(&self, idle: Duration) -> usize {
        Self::sweep(&self.sessions, idle).await
    }

    async fn sweep(sessions: &RwLock<SessionMap>, idle: Duration) -> usize {
        let mut sessions = sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| {
            Arc::strong_count(&entry.session) > 1 || entry.last_active.elapsed() < idle
        });
        before - sessions.len()
    }

    /// Starts a task that calls [`remove_idle`](Self::remove_idle) every `every`.
    ///
    /// The task stops once the last clone of this store is dropped.
    pub fn spawn_idle_sweeper(&self, idle: Duration, every: Duration) -> JoinHandle<()> {
        let store: Weak<RwLock<SessionMap>> = Arc::downgrade(&self.sessions);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(sessions) = store.upgrade() else {
                    debug!("Session store dropped, stopping idle sweeper.");
                    break;
                };
                let removed = Self::sweep(&sessions, idle).await;
                if removed > 0 {
                    info!(removed, "Removed idle chat sessions.");
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
