//! Per-user aggregate statistics and the increments applied to them.

use duelquiz_protocol::UserId;
use serde::{Deserialize, Serialize};

/// Lifetime counters for one user.
///
/// The coordinator only ever adds to these through a [`StatsDelta`];
/// nothing in the match path decrements or resets them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantStats {
    pub total_win: u64,
    pub total_lose: u64,
    pub total_draw: u64,
    pub total_answer: u64,
    pub correct_answer: u64,
    pub incorrect_answer: u64,
}

impl ParticipantStats {
    /// Adds every counter of `delta`. Saturates instead of wrapping.
    pub fn apply(&mut self, delta: &StatsDelta) {
        self.total_win = self.total_win.saturating_add(delta.total_win);
        self.total_lose = self.total_lose.saturating_add(delta.total_lose);
        self.total_draw = self.total_draw.saturating_add(delta.total_draw);
        self.total_answer =
            self.total_answer.saturating_add(delta.total_answer);
        self.correct_answer =
            self.correct_answer.saturating_add(delta.correct_answer);
        self.incorrect_answer =
            self.incorrect_answer.saturating_add(delta.incorrect_answer);
    }
}

/// A partial set of named counter increments.
///
/// Fields left at zero are untouched. Build one with the event-specific
/// constructors rather than by hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsDelta {
    pub total_win: u64,
    pub total_lose: u64,
    pub total_draw: u64,
    pub total_answer: u64,
    pub correct_answer: u64,
    pub incorrect_answer: u64,
}

impl StatsDelta {
    /// One answered question: `total_answer` plus the matching
    /// correct/incorrect counter.
    pub fn answer(correct: bool) -> Self {
        Self {
            total_answer: 1,
            correct_answer: u64::from(correct),
            incorrect_answer: u64::from(!correct),
            ..Self::default()
        }
    }

    pub fn win() -> Self {
        Self {
            total_win: 1,
            ..Self::default()
        }
    }

    pub fn lose() -> Self {
        Self {
            total_lose: 1,
            ..Self::default()
        }
    }

    pub fn draw() -> Self {
        Self {
            total_draw: 1,
            ..Self::default()
        }
    }

    /// Returns `true` if applying this delta changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A user as the directory knows them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub user_name: String,
    #[serde(default)]
    pub stats: ParticipantStats,
}

impl UserProfile {
    /// A fresh profile with all counters at zero.
    pub fn new(user_id: UserId, user_name: impl Into<String>) -> Self {
        Self {
            user_id,
            user_name: user_name.into(),
            stats: ParticipantStats::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_delta_counts_correct() {
        let delta = StatsDelta::answer(true);
        assert_eq!(delta.total_answer, 1);
        assert_eq!(delta.correct_answer, 1);
        assert_eq!(delta.incorrect_answer, 0);
    }

    #[test]
    fn test_answer_delta_counts_incorrect() {
        let delta = StatsDelta::answer(false);
        assert_eq!(delta.total_answer, 1);
        assert_eq!(delta.correct_answer, 0);
        assert_eq!(delta.incorrect_answer, 1);
    }

    #[test]
    fn test_apply_only_touches_named_counters() {
        let mut stats = ParticipantStats {
            total_win: 3,
            total_draw: 1,
            ..ParticipantStats::default()
        };
        stats.apply(&StatsDelta::lose());

        assert_eq!(stats.total_win, 3);
        assert_eq!(stats.total_lose, 1);
        assert_eq!(stats.total_draw, 1);
        assert_eq!(stats.total_answer, 0);
    }

    #[test]
    fn test_apply_saturates() {
        let mut stats = ParticipantStats {
            total_answer: u64::MAX,
            ..ParticipantStats::default()
        };
        stats.apply(&StatsDelta::answer(true));
        assert_eq!(stats.total_answer, u64::MAX);
        assert_eq!(stats.correct_answer, 1);
    }

    #[test]
    fn test_default_delta_is_empty() {
        assert!(StatsDelta::default().is_empty());
        assert!(!StatsDelta::draw().is_empty());
    }
}
