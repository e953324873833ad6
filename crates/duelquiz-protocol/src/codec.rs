//! Codecs turn events into frame bytes and back.
//!
//! The server only talks to the [`Codec`] trait, so the wire format can be
//! swapped without touching the coordinator or the connection handler.
//! [`JsonCodec`] is the only implementation today: frames stay readable in
//! browser dev tools, which matters more for a quiz than frame size.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes values to bytes and decodes bytes back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a frame.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if the value cannot be represented.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes a frame.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] for malformed or mistyped input.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`. Enabled by the `json` feature.
///
/// ```rust
/// use duelquiz_protocol::{ClientEvent, Codec, JsonCodec, UserId};
///
/// let codec = JsonCodec;
/// let event = ClientEvent::CreateRoom { initiator_id: UserId(1) };
///
/// let bytes = codec.encode(&event).unwrap();
/// let decoded: ClientEvent = codec.decode(&bytes).unwrap();
/// assert_eq!(event, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ClientEvent, ServerEvent, SessionId};

    #[test]
    fn test_json_codec_decodes_client_frame() {
        let frame = br#"{"event":"endMatch","data":{"session_id":4}}"#;
        let event: ClientEvent = JsonCodec.decode(frame).unwrap();
        assert_eq!(
            event,
            ClientEvent::EndMatch {
                session_id: SessionId(4)
            }
        );
    }

    #[test]
    fn test_json_codec_encodes_server_event_as_text() {
        let bytes = JsonCodec
            .encode(&ServerEvent::RoomCreated {
                session_id: SessionId(3),
            })
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"roomCreated\""));
    }

    #[test]
    fn test_json_codec_rejects_garbage() {
        let result: Result<ClientEvent, _> =
            JsonCodec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
