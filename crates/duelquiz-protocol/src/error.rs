//! Error types for the protocol layer.

/// Errors raised while encoding or decoding frames.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A value could not be serialized.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// A frame was malformed, truncated, or not the expected event shape.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame decoded but breaks a protocol rule (e.g. not UTF-8 text
    /// where text is required).
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
