/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The peer is gone.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding, accepting, or the WebSocket upgrade failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    #[error("transport shut down")]
    Shutdown,
}

impl TransportError {
    pub(crate) fn io(
        kind: std::io::ErrorKind,
        err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> std::io::Error {
        std::io::Error::new(kind, err)
    }
}
