//! Per-connection handler: frame decoding, dispatch, and broadcast
//! delivery.
//!
//! Each accepted connection gets its own Tokio task running this
//! handler. The task waits on two sources at once:
//!   1. inbound frames → decode → coordinator → direct replies
//!   2. session broadcasts queued for this connection by the gateway
//!
//! Closing the connection never touches match state: a participant who
//! drops mid-match leaves the session exactly as it was.

use std::sync::Arc;

use duelquiz_catalog::QuestionCatalog;
use duelquiz_directory::UserDirectory;
use duelquiz_match::{ChannelGateway, EventSender, SubscriberId};
use duelquiz_protocol::{ClientEvent, Codec, ErrorKind, ServerEvent};
use duelquiz_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::DuelquizError;

/// Drop guard that removes a connection from every session it watches.
struct SubscriptionGuard {
    subscriber: SubscriberId,
    gateway: Arc<ChannelGateway>,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.gateway.unsubscribe_all(self.subscriber);
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<Q, D, K>(
    conn: WebSocketConnection,
    state: Arc<ServerState<Q, D, K>>,
) -> Result<(), DuelquizError>
where
    Q: QuestionCatalog,
    D: UserDirectory,
    K: Codec,
{
    let conn_id = conn.id();
    let subscriber = SubscriberId::next();
    tracing::debug!(
        %conn_id,
        %subscriber,
        peer = %conn.peer_addr(),
        "handling new connection"
    );

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
    let _guard = SubscriptionGuard {
        subscriber,
        gateway: Arc::clone(&state.gateway),
    };

    let idle = tokio::time::sleep(state.idle_timeout);
    tokio::pin!(idle);

    loop {
        tokio::select! {
            inbound = conn.recv() => {
                let data = match inbound {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        tracing::info!(%conn_id, "connection closed cleanly");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%conn_id, error = %e, "recv error");
                        break;
                    }
                };
                idle.as_mut().reset(tokio::time::Instant::now() + state.idle_timeout);

                let replies =
                    handle_frame(&state, subscriber, &outbound_tx, &data).await;
                for reply in &replies {
                    send_event(&conn, &state.codec, reply).await?;
                }
            }
            Some(event) = outbound_rx.recv() => {
                send_event(&conn, &state.codec, &event).await?;
            }
            () = &mut idle => {
                tracing::info!(%conn_id, "connection idle, closing");
                let _ = conn.close().await;
                break;
            }
        }
    }

    Ok(())
}

/// Decodes one frame, routes it, and keeps this connection's
/// subscriptions in step with the outcome.
async fn handle_frame<Q, D, K>(
    state: &ServerState<Q, D, K>,
    subscriber: SubscriberId,
    outbound: &EventSender,
    data: &[u8],
) -> Vec<ServerEvent>
where
    Q: QuestionCatalog,
    D: UserDirectory,
    K: Codec,
{
    let event: ClientEvent = match state.codec.decode(data) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(%subscriber, error = %e, "undecodable frame");
            return vec![ServerEvent::ProtocolError {
                kind: ErrorKind::Protocol,
                reason: e.to_string(),
            }];
        }
    };

    // A joiner must already be listening when `matchReady` goes out.
    let watched = match &event {
        ClientEvent::JoinRoom { session_id, .. }
        | ClientEvent::WatchRoom { session_id } => Some(*session_id),
        _ => None,
    };
    let provisional = watched.filter(|&session_id| {
        !state.gateway.is_subscribed(session_id, subscriber)
    });
    if let Some(session_id) = provisional {
        state
            .gateway
            .subscribe(session_id, subscriber, outbound.clone());
    }

    let replies = state.coordinator.dispatch(event).await;

    for reply in &replies {
        match reply {
            ServerEvent::RoomCreated { session_id } => {
                state
                    .gateway
                    .subscribe(*session_id, subscriber, outbound.clone());
            }
            ServerEvent::RoomJoinError { .. } | ServerEvent::RoomWatchError { .. } => {
                if let Some(session_id) = provisional {
                    state.gateway.unsubscribe(session_id, subscriber);
                }
            }
            _ => {}
        }
    }
    replies
}

async fn send_event<K: Codec>(
    conn: &WebSocketConnection,
    codec: &K,
    event: &ServerEvent,
) -> Result<(), DuelquizError> {
    let bytes = codec.encode(event)?;
    conn.send(&bytes).await?;
    Ok(())
}
