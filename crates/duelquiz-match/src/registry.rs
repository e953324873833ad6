//! Session registry: allocates ids, owns the session actors, evicts
//! finished sessions.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, SystemTime};

use dashmap::DashMap;
use duelquiz_directory::UserDirectory;
use duelquiz_protocol::{SessionId, UserId};
use tokio::task::JoinHandle;

use crate::actor::spawn_session;
use crate::{BroadcastGateway, MatchConfig, MatchError, MatchSession, SessionHandle};

/// Every live session, keyed by id.
///
/// The map is sharded, so lookups for different sessions never contend.
/// Handles are cloned out before any `.await`; no map guard is ever held
/// across one.
pub struct SessionRegistry<D, B> {
    sessions: DashMap<SessionId, SessionHandle>,
    next_id: AtomicU64,
    live: AtomicUsize,
    config: MatchConfig,
    directory: Arc<D>,
    gateway: Arc<B>,
}

impl<D: UserDirectory, B: BroadcastGateway> SessionRegistry<D, B> {
    pub fn new(config: MatchConfig, directory: Arc<D>, gateway: Arc<B>) -> Self {
        Self {
            sessions: DashMap::new(),
            next_id: AtomicU64::new(1),
            live: AtomicUsize::new(0),
            config,
            directory,
            gateway,
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn gateway(&self) -> &Arc<B> {
        &self.gateway
    }

    /// Creates a session with `initiator_id` in seat A and spawns its
    /// actor.
    ///
    /// Fails with [`MatchError::RegistryFull`] when `max_sessions` are
    /// live or the id space is exhausted.
    pub fn create(&self, initiator_id: UserId) -> Result<SessionId, MatchError> {
        let max = self.config.max_sessions;
        self.live
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < max).then_some(n + 1)
            })
            .map_err(|_| MatchError::RegistryFull)?;

        let id = self
            .next_id
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                n.checked_add(1)
            });
        let session_id = match id {
            Ok(n) => SessionId(n),
            Err(_) => {
                self.live.fetch_sub(1, Ordering::AcqRel);
                return Err(MatchError::RegistryFull);
            }
        };

        let session =
            MatchSession::new(session_id, initiator_id, SystemTime::now());
        let handle = spawn_session(
            session,
            Arc::clone(&self.directory),
            Arc::clone(&self.gateway),
            &self.config,
        );
        self.sessions.insert(session_id, handle);
        tracing::info!(%session_id, %initiator_id, "session created");
        Ok(session_id)
    }

    /// The last committed state of a session.
    pub fn get(&self, session_id: SessionId) -> Result<MatchSession, MatchError> {
        self.sessions
            .get(&session_id)
            .map(|handle| handle.snapshot())
            .ok_or(MatchError::NotFound(session_id))
    }

    /// A clone of the session's handle.
    pub fn handle(&self, session_id: SessionId) -> Result<SessionHandle, MatchError> {
        self.sessions
            .get(&session_id)
            .map(|handle| handle.value().clone())
            .ok_or(MatchError::NotFound(session_id))
    }

    /// Runs `f` with exclusive access to the session. See
    /// [`SessionHandle::with_session`].
    pub async fn with_session<R, F>(
        &self,
        session_id: SessionId,
        f: F,
    ) -> Result<R, MatchError>
    where
        R: Send + 'static,
        F: FnOnce(&mut MatchSession) -> Result<R, MatchError> + Send + 'static,
    {
        let handle = self.handle(session_id)?;
        handle.with_session(f).await
    }

    /// Removes a completed session whose grace period has elapsed, or a
    /// session whose actor has stopped.
    ///
    /// Returns `false` and leaves the registry untouched for any other
    /// session.
    pub async fn evict(&self, session_id: SessionId) -> bool {
        let grace = self.config.eviction_grace;
        let Some((_, handle)) = self
            .sessions
            .remove_if(&session_id, |_, handle| evictable(handle, grace))
        else {
            return false;
        };
        self.live.fetch_sub(1, Ordering::AcqRel);

        let _ = handle.shutdown().await;
        self.gateway.close(session_id);
        tracing::info!(%session_id, "session evicted");
        true
    }

    /// Evicts every session eligible for [`evict`](Self::evict).
    pub async fn evict_expired(&self) -> Vec<SessionId> {
        let grace = self.config.eviction_grace;
        let candidates: Vec<SessionId> = self
            .sessions
            .iter()
            .filter(|entry| evictable(entry.value(), grace))
            .map(|entry| *entry.key())
            .collect();

        let mut evicted = Vec::with_capacity(candidates.len());
        for session_id in candidates {
            if self.evict(session_id).await {
                evicted.push(session_id);
            }
        }
        evicted
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Ids of all live sessions, in ascending order.
    pub fn session_ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> =
            self.sessions.iter().map(|entry| *entry.key()).collect();
        ids.sort();
        ids
    }
}

fn evictable(handle: &SessionHandle, grace: Duration) -> bool {
    handle.is_closed() || expired(&handle.snapshot(), grace)
}

fn expired(session: &MatchSession, grace: Duration) -> bool {
    session.status.is_terminal()
        && session
            .ended_at
            .and_then(|ended| ended.elapsed().ok())
            .is_some_and(|elapsed| elapsed >= grace)
}

/// Periodically evicts expired sessions.
///
/// The task holds only a weak reference and stops once the registry is
/// dropped.
pub fn spawn_reaper<D: UserDirectory, B: BroadcastGateway>(
    registry: &Arc<SessionRegistry<D, B>>,
    period: Duration,
) -> JoinHandle<()> {
    let weak: Weak<SessionRegistry<D, B>> = Arc::downgrade(registry);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let Some(registry) = weak.upgrade() else {
                break;
            };
            let evicted = registry.evict_expired().await;
            if !evicted.is_empty() {
                tracing::debug!(count = evicted.len(), "reaper pass");
            }
        }
    })
}
