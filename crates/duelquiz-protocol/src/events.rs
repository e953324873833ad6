//! Wire events exchanged between clients and the match coordinator.
//!
//! Every frame is one event, adjacently tagged:
//!
//! ```text
//! { "event": "joinRoom", "data": { "session_id": 7, "user_id": 2 } }
//! ```
//!
//! Event names are camelCase; payload fields keep the snake_case names
//! clients already use, except for the few (`seatA_name`, `isCorrect`)
//! that have always been spelled that way.

use serde::{Deserialize, Serialize};

use crate::{MatchStatus, QuestionCard, QuestionId, SessionId, UserId};

// ---------------------------------------------------------------------------
// ErrorKind
// ---------------------------------------------------------------------------

/// Coarse classification carried by every error event.
///
/// Clients branch on this instead of parsing `reason` strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Unknown session, user, or question.
    NotFound,
    /// The event is not legal in the session's current state
    /// (seat taken, match over, not a participant, ...).
    InvalidTransition,
    /// A collaborator (catalog, directory) failed or timed out.
    AdapterFailure,
    /// The registry cannot hold another session.
    ResourceExhausted,
    /// The frame could not be decoded.
    Protocol,
}

// ---------------------------------------------------------------------------
// ClientEvent
// ---------------------------------------------------------------------------

/// Events a client sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Open a new session with the sender in seat A.
    CreateRoom { initiator_id: UserId },

    /// Take seat B of an existing session.
    JoinRoom {
        session_id: SessionId,
        user_id: UserId,
    },

    /// Ask for seat names and status. Never mutates anything.
    GetRoomStatus { session_id: SessionId },

    /// Push a question to both seats.
    SendQuestion {
        session_id: SessionId,
        question: QuestionCard,
    },

    /// Record one answer for a seated participant.
    SubmitAnswer {
        session_id: SessionId,
        user_id: UserId,
        #[serde(rename = "isCorrect")]
        is_correct: bool,
    },

    /// Close the match and compute the winner.
    EndMatch { session_id: SessionId },

    /// Receive a session's broadcasts without taking a seat.
    WatchRoom { session_id: SessionId },

    /// Fetch a question card, by id or at random when `question_id` is
    /// absent.
    GetCard {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        question_id: Option<QuestionId>,
    },
}

// ---------------------------------------------------------------------------
// ServerEvent
// ---------------------------------------------------------------------------

/// Events the server sends, either as a reply to the originating
/// connection or as a broadcast to everyone watching a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    // -- createRoom --
    RoomCreated { session_id: SessionId },
    RoomCreateError { kind: ErrorKind, reason: String },

    // -- joinRoom --
    /// Broadcast: both seats are filled.
    MatchReady {
        #[serde(rename = "seatA_name")]
        seat_a_name: String,
        #[serde(rename = "seatB_name")]
        seat_b_name: String,
    },
    /// Reply to the joiner.
    RoomJoined {
        session_id: SessionId,
        opponent_name: String,
    },
    RoomJoinError { kind: ErrorKind, reason: String },

    // -- getRoomStatus --
    RoomStatus {
        #[serde(rename = "seatA_name")]
        seat_a_name: Option<String>,
        #[serde(rename = "seatB_name")]
        seat_b_name: Option<String>,
        status: MatchStatus,
    },
    RoomStatusError { kind: ErrorKind, reason: String },

    // -- sendQuestion --
    /// Broadcast: a new question for both seats.
    QuestionReceived { question: QuestionCard },
    QuestionError { kind: ErrorKind, reason: String },

    // -- submitAnswer --
    /// Reply to the submitter.
    AnswerSubmitted {
        session_id: SessionId,
        user_id: UserId,
        #[serde(rename = "isCorrect")]
        is_correct: bool,
    },
    AnswerError { kind: ErrorKind, reason: String },

    // -- endMatch --
    /// Broadcast: final result. `winner_id` is `null` on a draw.
    MatchEnded {
        winner_id: Option<UserId>,
        draw: bool,
        score_a: u32,
        score_b: u32,
    },
    /// Either the whole request failed (`user_id` absent) or one
    /// participant's statistics could not be written (`user_id` set).
    MatchEndError {
        kind: ErrorKind,
        reason: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_id: Option<UserId>,
    },

    // -- watchRoom --
    RoomWatched { session_id: SessionId },
    RoomWatchError { kind: ErrorKind, reason: String },

    // -- getCard --
    Card(QuestionCard),
    CardError { kind: ErrorKind, reason: String },

    /// The inbound frame was not a valid client event.
    ProtocolError { kind: ErrorKind, reason: String },
}

impl ServerEvent {
    /// Returns `true` for the error variants.
    pub fn is_error(&self) -> bool {
        self.error_kind().is_some()
    }

    /// The error classification, if this is an error event.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::RoomCreateError { kind, .. }
            | Self::RoomJoinError { kind, .. }
            | Self::RoomStatusError { kind, .. }
            | Self::QuestionError { kind, .. }
            | Self::AnswerError { kind, .. }
            | Self::MatchEndError { kind, .. }
            | Self::RoomWatchError { kind, .. }
            | Self::CardError { kind, .. }
            | Self::ProtocolError { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_event_is_adjacently_tagged_camel_case() {
        let event = ClientEvent::JoinRoom {
            session_id: SessionId(7),
            user_id: UserId(2),
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "joinRoom");
        assert_eq!(json["data"]["session_id"], 7);
        assert_eq!(json["data"]["user_id"], 2);
    }

    #[test]
    fn test_submit_answer_uses_is_correct_spelling() {
        let raw = r#"{
            "event": "submitAnswer",
            "data": { "session_id": 1, "user_id": 3, "isCorrect": true }
        }"#;
        let event: ClientEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(
            event,
            ClientEvent::SubmitAnswer {
                session_id: SessionId(1),
                user_id: UserId(3),
                is_correct: true,
            }
        );
    }

    #[test]
    fn test_get_card_question_id_is_optional() {
        let raw = r#"{ "event": "getCard", "data": {} }"#;
        let event: ClientEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event, ClientEvent::GetCard { question_id: None });
    }

    #[test]
    fn test_match_ready_seat_names() {
        let event = ServerEvent::MatchReady {
            seat_a_name: "alice".into(),
            seat_b_name: "bob".into(),
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "matchReady");
        assert_eq!(json["data"]["seatA_name"], "alice");
        assert_eq!(json["data"]["seatB_name"], "bob");
    }

    #[test]
    fn test_match_ended_draw_has_null_winner() {
        let event = ServerEvent::MatchEnded {
            winner_id: None,
            draw: true,
            score_a: 2,
            score_b: 2,
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "matchEnded");
        assert!(json["data"]["winner_id"].is_null());
        assert_eq!(json["data"]["draw"], true);
    }

    #[test]
    fn test_match_end_error_omits_absent_user() {
        let event = ServerEvent::MatchEndError {
            kind: ErrorKind::InvalidTransition,
            reason: "match already ended".into(),
            user_id: None,
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["data"]["kind"], "invalidTransition");
        assert!(json["data"].get("user_id").is_none());
    }

    #[test]
    fn test_error_kind_classification() {
        let err = ServerEvent::AnswerError {
            kind: ErrorKind::NotFound,
            reason: "session S-1 not found".into(),
        };
        assert!(err.is_error());
        assert_eq!(err.error_kind(), Some(ErrorKind::NotFound));

        let ok = ServerEvent::RoomCreated {
            session_id: SessionId(1),
        };
        assert!(!ok.is_error());
    }

    #[test]
    fn test_unknown_event_name_is_rejected() {
        let raw = r#"{ "event": "flyToMoon", "data": {} }"#;
        let result: Result<ClientEvent, _> = serde_json::from_str(raw);
        assert!(result.is_err());
    }
}
