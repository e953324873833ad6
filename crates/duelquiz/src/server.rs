//! `DuelquizServer` builder and accept loop.
//!
//! Ties the layers together: transport → codec → coordinator → session
//! actors, with a [`ChannelGateway`] carrying broadcasts back out.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use duelquiz_catalog::QuestionCatalog;
use duelquiz_directory::UserDirectory;
use duelquiz_match::{spawn_reaper, ChannelGateway, MatchConfig, MatchCoordinator};
use duelquiz_protocol::{Codec, JsonCodec};
use duelquiz_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::DuelquizError;

/// Shared server state passed to each connection task.
pub(crate) struct ServerState<Q, D, K> {
    pub(crate) coordinator: MatchCoordinator<Q, D, ChannelGateway>,
    pub(crate) gateway: Arc<ChannelGateway>,
    pub(crate) codec: K,
    pub(crate) idle_timeout: Duration,
}

/// Builder for configuring and starting a Duelquiz server.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use duelquiz::prelude::*;
///
/// # async fn run() -> Result<(), DuelquizError> {
/// let server = DuelquizServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .build(Arc::new(InMemoryCatalog::new()), Arc::new(InMemoryDirectory::new()))
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct DuelquizServerBuilder {
    bind_addr: String,
    match_config: MatchConfig,
    idle_timeout: Duration,
    reaper_interval: Duration,
}

impl DuelquizServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            match_config: MatchConfig::default(),
            idle_timeout: Duration::from_secs(300),
            reaper_interval: Duration::from_secs(10),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    pub fn match_config(mut self, config: MatchConfig) -> Self {
        self.match_config = config;
        self
    }

    /// How long a connection may stay silent before it is dropped.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// How often completed sessions are checked for eviction.
    pub fn reaper_interval(mut self, interval: Duration) -> Self {
        self.reaper_interval = interval;
        self
    }

    /// Binds the listener and wires the coordinator to the given
    /// adapters. Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build<Q, D>(
        self,
        catalog: Arc<Q>,
        directory: Arc<D>,
    ) -> Result<DuelquizServer<Q, D, JsonCodec>, DuelquizError>
    where
        Q: QuestionCatalog,
        D: UserDirectory,
    {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let gateway = Arc::new(ChannelGateway::new());
        let coordinator = MatchCoordinator::new(
            catalog,
            directory,
            Arc::clone(&gateway),
            self.match_config,
        );

        let state = Arc::new(ServerState {
            coordinator,
            gateway,
            codec: JsonCodec,
            idle_timeout: self.idle_timeout,
        });

        Ok(DuelquizServer {
            transport,
            state,
            reaper_interval: self.reaper_interval,
        })
    }
}

impl Default for DuelquizServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Duelquiz server. Call [`run()`](Self::run) to start
/// accepting connections.
pub struct DuelquizServer<Q, D, K> {
    transport: WebSocketTransport,
    state: Arc<ServerState<Q, D, K>>,
    reaper_interval: Duration,
}

impl<Q, D, K> DuelquizServer<Q, D, K>
where
    Q: QuestionCatalog,
    D: UserDirectory,
    K: Codec,
{
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// The coordinator behind this server, for in-process callers.
    pub fn coordinator(&self) -> &MatchCoordinator<Q, D, ChannelGateway> {
        &self.state.coordinator
    }

    /// Runs the eviction reaper and the accept loop. Returns only if
    /// the process is shutting down.
    pub async fn run(mut self) -> Result<(), DuelquizError> {
        let _reaper = spawn_reaper(
            self.state.coordinator.registry(),
            self.reaper_interval,
        );
        tracing::info!(
            addr = ?self.transport.local_addr().ok(),
            "Duelquiz server running"
        );

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
