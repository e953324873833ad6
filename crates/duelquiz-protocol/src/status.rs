//! The match lifecycle, as seen by clients and by the state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The lifecycle state of a match session.
///
/// Transitions are strictly forward, one step at a time:
///
/// ```text
/// AwaitingOpponent → InProgress → Completed
/// ```
///
/// - **AwaitingOpponent**: created, seat B is empty.
/// - **InProgress**: both seats filled; questions and answers flow.
/// - **Completed**: the match ended and a result was computed. Only
///   status reads succeed from here on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchStatus {
    AwaitingOpponent,
    InProgress,
    Completed,
}

impl MatchStatus {
    /// Returns `true` if a second participant may still take seat B.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::AwaitingOpponent)
    }

    /// Returns `true` while questions and answers are accepted.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InProgress)
    }

    /// Returns `true` once the match has a final result.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// The only state this one may move to, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::AwaitingOpponent => Some(Self::InProgress),
            Self::InProgress => Some(Self::Completed),
            Self::Completed => None,
        }
    }

    /// Returns `true` if moving to `target` is a legal single step.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingOpponent => write!(f, "AwaitingOpponent"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Completed => write!(f, "Completed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_follows_strict_order() {
        assert_eq!(
            MatchStatus::AwaitingOpponent.next(),
            Some(MatchStatus::InProgress)
        );
        assert_eq!(
            MatchStatus::InProgress.next(),
            Some(MatchStatus::Completed)
        );
        assert_eq!(MatchStatus::Completed.next(), None);
    }

    #[test]
    fn test_can_transition_to_rejects_skips_and_reversals() {
        assert!(MatchStatus::AwaitingOpponent
            .can_transition_to(MatchStatus::InProgress));
        assert!(!MatchStatus::AwaitingOpponent
            .can_transition_to(MatchStatus::Completed));
        assert!(!MatchStatus::Completed
            .can_transition_to(MatchStatus::AwaitingOpponent));
        assert!(!MatchStatus::InProgress
            .can_transition_to(MatchStatus::AwaitingOpponent));
    }

    #[test]
    fn test_predicates() {
        assert!(MatchStatus::AwaitingOpponent.is_joinable());
        assert!(!MatchStatus::InProgress.is_joinable());
        assert!(MatchStatus::InProgress.is_active());
        assert!(!MatchStatus::Completed.is_active());
        assert!(MatchStatus::Completed.is_terminal());
    }

    #[test]
    fn test_serializes_as_variant_name() {
        let json = serde_json::to_string(&MatchStatus::InProgress).unwrap();
        assert_eq!(json, "\"InProgress\"");
        assert_eq!(MatchStatus::Completed.to_string(), "Completed");
    }
}
