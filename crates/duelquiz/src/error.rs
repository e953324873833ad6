//! Unified error type for the Duelquiz server.

use duelquiz_match::MatchError;
use duelquiz_protocol::ProtocolError;
use duelquiz_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// Adapter failures reach this type through [`MatchError::Adapter`].
#[derive(Debug, thiserror::Error)]
pub enum DuelquizError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Match(#[from] MatchError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err: DuelquizError = TransportError::ConnectionClosed("gone".into()).into();
        assert!(matches!(err, DuelquizError::Transport(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err: DuelquizError = ProtocolError::InvalidMessage("bad".into()).into();
        assert!(matches!(err, DuelquizError::Protocol(_)));
    }

    #[test]
    fn test_from_match_error() {
        let err: DuelquizError = MatchError::RegistryFull.into();
        assert!(matches!(err, DuelquizError::Match(_)));
        assert_eq!(err.to_string(), "session registry is full");
    }
}
