//! SessionManager: in-memory registry of independent intake conversations.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use super::engine::{ConversationEngine, SessionView, SubmitOutcome};
use super::gateway::GenerationGateway;
use super::state::RawAnswer;
use crate::config::DEFAULT_SESSION_TTL;
use crate::error::SessionError;

/// Holds every live session. Each engine sits behind its own mutex, so one
/// candidate's generation pass never blocks another candidate's answers.
pub struct SessionManager {
    gateway: Arc<GenerationGateway>,
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<ConversationEngine>>>>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(gateway: Arc<GenerationGateway>) -> Self {
        Self {
            gateway,
            sessions: RwLock::new(HashMap::new()),
            ttl: DEFAULT_SESSION_TTL,
        }
    }

    /// Keep closed sessions for `ttl` after they close.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Start a new conversation and return its first view.
    pub async fn create(&self) -> SessionView {
        let engine = ConversationEngine::new(Arc::clone(&self.gateway));
        let id = engine.id();
        let view = engine.view();
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(engine)));
        info!(session_id = %id, "Session created");
        view
    }

    async fn get(&self, id: Uuid) -> Result<Arc<Mutex<ConversationEngine>>, SessionError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(SessionError::NotFound { id })
    }

    /// Current view of a session. Pure re-render.
    pub async fn view(&self, id: Uuid) -> Result<SessionView, SessionError> {
        let engine = self.get(id).await?;
        let engine = engine.lock().await;
        Ok(engine.view())
    }

    /// Submit an answer and return the outcome with the updated view.
    pub async fn submit(
        &self,
        id: Uuid,
        answer: RawAnswer,
    ) -> Result<(SubmitOutcome, SessionView), SessionError> {
        let engine = self.get(id).await?;
        let mut engine = engine.lock().await;
        let outcome = engine.submit(answer).await?;
        Ok((outcome, engine.view()))
    }

    /// Drop a session. Returns whether it existed.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!(session_id = %id, "Session removed");
        }
        removed
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions that closed more than the TTL ago.
    /// Returns the number of sessions removed.
    pub async fn prune_closed(&self) -> usize {
        self.prune_closed_at(Utc::now()).await
    }

    async fn prune_closed_at(&self, now: DateTime<Utc>) -> usize {
        let expired: Vec<Uuid> = {
            let sessions = self.sessions.read().await;
            sessions
                .iter()
                .filter_map(|(id, engine)| {
                    // A locked engine is mid-submit, so it is not stale.
                    let engine = engine.try_lock().ok()?;
                    engine
                        .state()
                        .closed_longer_than(self.ttl, now)
                        .then_some(*id)
                })
                .collect()
        };
        if expired.is_empty() {
            return 0;
        }

        let mut sessions = self.sessions.write().await;
        for id in &expired {
            sessions.remove(id);
            debug!(session_id = %id, "Session pruned");
        }
        info!(count = expired.len(), remaining = sessions.len(), "Pruned closed sessions");
        expired.len()
    }
}

/// Spawn a background task that periodically prunes closed sessions.
pub fn spawn_prune_task(manager: Arc<SessionManager>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            manager.prune_closed().await;
        }
    })
}
