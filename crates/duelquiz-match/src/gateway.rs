//! Delivering session events to everyone watching a session.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use duelquiz_protocol::{ServerEvent, SessionId};
use tokio::sync::mpsc;

/// Fan-out of session events to connected clients.
///
/// Called from inside session actors, so implementations must not block:
/// a slow or gone subscriber is skipped, never awaited.
pub trait BroadcastGateway: Send + Sync + 'static {
    /// Delivers `event` to every subscriber of `session_id`.
    fn broadcast(&self, session_id: SessionId, event: &ServerEvent);

    /// Forgets every subscriber of an evicted session.
    fn close(&self, _session_id: SessionId) {}
}

/// Identifies one subscriber, typically one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub u64);

static NEXT_SUBSCRIBER_ID: AtomicU64 = AtomicU64::new(1);

impl SubscriberId {
    /// Allocates a process-unique subscriber id.
    pub fn next() -> Self {
        Self(NEXT_SUBSCRIBER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Sending half a subscriber hands to the gateway.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// A [`BroadcastGateway`] backed by unbounded channels.
///
/// Each subscriber owns the receiving half and drains it at its own
/// pace. Subscribers whose receiver was dropped are pruned on the next
/// broadcast to their session.
#[derive(Debug, Default)]
pub struct ChannelGateway {
    sessions: DashMap<SessionId, Vec<(SubscriberId, EventSender)>>,
}

impl ChannelGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `subscriber` to `session_id`. Subscribing twice is a no-op.
    pub fn subscribe(
        &self,
        session_id: SessionId,
        subscriber: SubscriberId,
        sender: EventSender,
    ) {
        let mut subs = self.sessions.entry(session_id).or_default();
        if subs.iter().any(|(id, _)| *id == subscriber) {
            return;
        }
        subs.push((subscriber, sender));
        tracing::debug!(%session_id, %subscriber, "subscribed");
    }

    /// Removes `subscriber` from one session.
    pub fn unsubscribe(&self, session_id: SessionId, subscriber: SubscriberId) {
        if let Some(mut subs) = self.sessions.get_mut(&session_id) {
            subs.retain(|(id, _)| *id != subscriber);
        }
        self.sessions.remove_if(&session_id, |_, subs| subs.is_empty());
    }

    /// Removes `subscriber` from every session it watches.
    pub fn unsubscribe_all(&self, subscriber: SubscriberId) {
        self.sessions.iter_mut().for_each(|mut entry| {
            entry.value_mut().retain(|(id, _)| *id != subscriber);
        });
        self.sessions.retain(|_, subs| !subs.is_empty());
    }

    pub fn is_subscribed(
        &self,
        session_id: SessionId,
        subscriber: SubscriberId,
    ) -> bool {
        self.sessions
            .get(&session_id)
            .is_some_and(|subs| subs.iter().any(|(id, _)| *id == subscriber))
    }

    /// Number of live subscribers of `session_id`.
    pub fn subscriber_count(&self, session_id: SessionId) -> usize {
        self.sessions
            .get(&session_id)
            .map(|subs| subs.iter().filter(|(_, tx)| !tx.is_closed()).count())
            .unwrap_or(0)
    }
}

impl BroadcastGateway for ChannelGateway {
    fn broadcast(&self, session_id: SessionId, event: &ServerEvent) {
        let Some(mut subs) = self.sessions.get_mut(&session_id) else {
            return;
        };
        subs.retain(|(_, tx)| tx.send(event.clone()).is_ok());
    }

    fn close(&self, session_id: SessionId) {
        if self.sessions.remove(&session_id).is_some() {
            tracing::debug!(%session_id, "subscribers dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created(id: u64) -> ServerEvent {
        ServerEvent::RoomCreated {
            session_id: SessionId(id),
        }
    }

    #[test]
    fn test_broadcast_reaches_only_session_subscribers() {
        let gateway = ChannelGateway::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        gateway.subscribe(SessionId(1), SubscriberId(1), tx1);
        gateway.subscribe(SessionId(2), SubscriberId(2), tx2);

        gateway.broadcast(SessionId(1), &created(1));

        assert_eq!(rx1.try_recv().unwrap(), created(1));
        assert!(rx2.try_recv().is_err());
    }

    #[test]
    fn test_dropped_receiver_is_pruned() {
        let gateway = ChannelGateway::new();
        let (tx1, rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        gateway.subscribe(SessionId(1), SubscriberId(1), tx1);
        gateway.subscribe(SessionId(1), SubscriberId(2), tx2);
        drop(rx1);

        gateway.broadcast(SessionId(1), &created(1));

        assert_eq!(rx2.try_recv().unwrap(), created(1));
        assert_eq!(gateway.subscriber_count(SessionId(1)), 1);
    }

    #[test]
    fn test_duplicate_subscribe_delivers_once() {
        let gateway = ChannelGateway::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        gateway.subscribe(SessionId(1), SubscriberId(1), tx.clone());
        gateway.subscribe(SessionId(1), SubscriberId(1), tx);

        gateway.broadcast(SessionId(1), &created(1));

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_unsubscribe_all_and_close() {
        let gateway = ChannelGateway::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        gateway.subscribe(SessionId(1), SubscriberId(7), tx.clone());
        gateway.subscribe(SessionId(2), SubscriberId(7), tx.clone());
        gateway.subscribe(SessionId(3), SubscriberId(8), tx);

        gateway.unsubscribe_all(SubscriberId(7));
        assert_eq!(gateway.subscriber_count(SessionId(1)), 0);
        assert_eq!(gateway.subscriber_count(SessionId(2)), 0);
        assert_eq!(gateway.subscriber_count(SessionId(3)), 1);

        gateway.close(SessionId(3));
        assert_eq!(gateway.subscriber_count(SessionId(3)), 0);
    }

    #[test]
    fn test_unsubscribe_single_session() {
        let gateway = ChannelGateway::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        gateway.subscribe(SessionId(1), SubscriberId(1), tx.clone());
        gateway.subscribe(SessionId(2), SubscriberId(1), tx);

        assert!(gateway.is_subscribed(SessionId(1), SubscriberId(1)));
        gateway.unsubscribe(SessionId(1), SubscriberId(1));

        assert!(!gateway.is_subscribed(SessionId(1), SubscriberId(1)));
        assert_eq!(gateway.subscriber_count(SessionId(1)), 0);
        assert_eq!(gateway.subscriber_count(SessionId(2)), 1);
    }
}
