#![cfg(feature = "std")]

//! Live sessions owned by the transport layer.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::core::{Session, SessionError};
use crate::domain::SessionId;

/// Session behind a per-session lock; moves on one session never
/// interleave, while different sessions stay independent.
pub type SharedSession<P> = Arc<Mutex<Session<P>>>;

/// Callbacks fired when a session enters or leaves the registry.
pub trait SessionHooks<P>: Send + Sync {
    fn on_create(&self, _id: SessionId, _session: &Session<P>) {}
    fn on_dispose(&self, _id: SessionId, _session: &Session<P>) {}
}

/// Hooks that only log the lifecycle.
pub struct LoggingHooks;

impl<P: PartialEq + fmt::Debug> SessionHooks<P> for LoggingHooks {
    fn on_create(&self, id: SessionId, session: &Session<P>) {
        let [a, b] = session.players();
        log::info!("session {} created: {:?} vs {:?}", id, a, b);
    }

    fn on_dispose(&self, id: SessionId, session: &Session<P>) {
        log::info!(
            "session {} disposed after {} moves: {:?}",
            id,
            session.moves().len(),
            session.status()
        );
    }
}

struct Entry<P> {
    session: SharedSession<P>,
    last_activity: Instant,
}

pub struct SessionRegistry<P> {
    sessions: HashMap<SessionId, Entry<P>>,
    next_id: SessionId,
    hooks: Box<dyn SessionHooks<P>>,
}

impl<P> SessionRegistry<P>
where
    P: PartialEq + Clone + fmt::Debug + Send + 'static,
{
    pub fn new() -> Self {
        Self::with_hooks(Box::new(LoggingHooks))
    }

    pub fn with_hooks(hooks: Box<dyn SessionHooks<P>>) -> Self {
        Self {
            sessions: HashMap::new(),
            next_id: 1,
            hooks,
        }
    }

    /// Start a session between two distinct players and register it.
    pub fn create(&mut self, players: (P, P)) -> Result<SessionId, SessionError> {
        let session = Session::new(players)?;
        let id = self.next_id;
        self.next_id += 1;
        self.hooks.on_create(id, &session);
        self.sessions.insert(
            id,
            Entry {
                session: Arc::new(Mutex::new(session)),
                last_activity: Instant::now(),
            },
        );
        Ok(id)
    }

    pub fn get(&self, id: SessionId) -> Option<SharedSession<P>> {
        self.sessions.get(&id).map(|e| Arc::clone(&e.session))
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }

    /// Reset the idle clock of a session.
    pub fn touch(&mut self, id: SessionId) {
        if let Some(entry) = self.sessions.get_mut(&id) {
            entry.last_activity = Instant::now();
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Ids of all live sessions in ascending order.
    pub fn ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<_> = self.sessions.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Sessions idle for longer than `timeout`, in ascending order.
    pub fn expired(&self, timeout: Duration) -> Vec<SessionId> {
        let mut ids: Vec<_> = self
            .sessions
            .iter()
            .filter(|(_, e)| e.last_activity.elapsed() > timeout)
            .map(|(&id, _)| id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Remove a session and return its final state.
    pub async fn dispose(&mut self, id: SessionId) -> Option<Session<P>> {
        let entry = self.sessions.remove(&id)?;
        let session = entry.session.lock().await.clone();
        self.hooks.on_dispose(id, &session);
        Some(session)
    }
}

impl<P> Default for SessionRegistry<P>
where
    P: PartialEq + Clone + fmt::Debug + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
