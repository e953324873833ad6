//! The match session record and its pure transitions.
//!
//! Every method here is synchronous and side-effect free apart from
//! mutating `self`. The actor (see `actor.rs`) runs them on a draft
//! copy, performs adapter I/O, and only then commits, so a method that
//! returns `Err` always leaves the session as it found it.

use std::time::SystemTime;

use duelquiz_protocol::{MatchStatus, SessionId, UserId};
use serde::{Deserialize, Serialize};

use crate::MatchError;

/// One of the two participant slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    A,
    B,
}

/// A trivia match between two participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSession {
    pub session_id: SessionId,
    pub seat_a_id: UserId,
    pub seat_b_id: Option<UserId>,
    pub status: MatchStatus,
    pub score_a: u32,
    pub score_b: u32,
    pub winner_id: Option<UserId>,
    pub draw: bool,
    pub started_at: SystemTime,
    pub ended_at: Option<SystemTime>,
}

/// The result of a finished match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// `None` on a draw.
    pub winner_id: Option<UserId>,
    /// `None` on a draw.
    pub loser_id: Option<UserId>,
    pub draw: bool,
    pub score_a: u32,
    pub score_b: u32,
}

/// Picks the winning seat: the strictly higher score wins, equal scores
/// draw.
pub fn decide_winner(score_a: u32, score_b: u32) -> Option<Seat> {
    match score_a.cmp(&score_b) {
        std::cmp::Ordering::Greater => Some(Seat::A),
        std::cmp::Ordering::Less => Some(Seat::B),
        std::cmp::Ordering::Equal => None,
    }
}

impl MatchSession {
    /// A fresh session with `initiator` in seat A, waiting for an
    /// opponent.
    pub fn new(
        session_id: SessionId,
        initiator: UserId,
        started_at: SystemTime,
    ) -> Self {
        Self {
            session_id,
            seat_a_id: initiator,
            seat_b_id: None,
            status: MatchStatus::AwaitingOpponent,
            score_a: 0,
            score_b: 0,
            winner_id: None,
            draw: false,
            started_at,
            ended_at: None,
        }
    }

    /// Which seat `user_id` holds, if any.
    pub fn seat_of(&self, user_id: UserId) -> Option<Seat> {
        if user_id == self.seat_a_id {
            Some(Seat::A)
        } else if self.seat_b_id == Some(user_id) {
            Some(Seat::B)
        } else {
            None
        }
    }

    /// The user in `seat`. `None` only for an empty seat B.
    pub fn occupant(&self, seat: Seat) -> Option<UserId> {
        match seat {
            Seat::A => Some(self.seat_a_id),
            Seat::B => self.seat_b_id,
        }
    }

    /// Seats `user_id` in seat B and starts the match.
    pub fn join(&mut self, user_id: UserId) -> Result<(), MatchError> {
        match self.status {
            MatchStatus::Completed => {
                Err(MatchError::MatchAlreadyEnded(self.session_id))
            }
            MatchStatus::InProgress => {
                Err(MatchError::SeatTaken(self.session_id))
            }
            MatchStatus::AwaitingOpponent => {
                if self.seat_b_id.is_some() {
                    return Err(MatchError::SeatTaken(self.session_id));
                }
                if user_id == self.seat_a_id {
                    return Err(MatchError::SelfJoin(user_id));
                }
                self.seat_b_id = Some(user_id);
                self.advance(MatchStatus::InProgress);
                Ok(())
            }
        }
    }

    /// Succeeds only while questions and answers are accepted.
    pub fn ensure_in_progress(&self) -> Result<(), MatchError> {
        match self.status {
            MatchStatus::InProgress => Ok(()),
            MatchStatus::AwaitingOpponent => {
                Err(MatchError::NotStarted(self.session_id))
            }
            MatchStatus::Completed => {
                Err(MatchError::MatchAlreadyEnded(self.session_id))
            }
        }
    }

    /// Records one answer, scoring a point for a correct one.
    ///
    /// Returns the answering seat.
    pub fn record_answer(
        &mut self,
        user_id: UserId,
        is_correct: bool,
    ) -> Result<Seat, MatchError> {
        self.ensure_in_progress()?;
        let seat = self.seat_of(user_id).ok_or(
            MatchError::NotAParticipant(user_id, self.session_id),
        )?;
        if is_correct {
            match seat {
                Seat::A => self.score_a = self.score_a.saturating_add(1),
                Seat::B => self.score_b = self.score_b.saturating_add(1),
            }
        }
        Ok(seat)
    }

    /// Completes the match and fixes the result.
    pub fn finish(
        &mut self,
        now: SystemTime,
    ) -> Result<MatchOutcome, MatchError> {
        self.ensure_in_progress()?;

        let winner = decide_winner(self.score_a, self.score_b);
        self.winner_id = winner.and_then(|seat| self.occupant(seat));
        self.draw = winner.is_none();
        self.ended_at = Some(now);
        self.advance(MatchStatus::Completed);

        let loser_id = winner.and_then(|seat| {
            self.occupant(match seat {
                Seat::A => Seat::B,
                Seat::B => Seat::A,
            })
        });
        Ok(MatchOutcome {
            winner_id: self.winner_id,
            loser_id,
            draw: self.draw,
            score_a: self.score_a,
            score_b: self.score_b,
        })
    }

    /// The outcome of a completed match, `None` before completion.
    pub fn outcome(&self) -> Option<MatchOutcome> {
        if !self.status.is_terminal() {
            return None;
        }
        let loser_id = self.winner_id.and_then(|winner| {
            if winner == self.seat_a_id {
                self.seat_b_id
            } else {
                Some(self.seat_a_id)
            }
        });
        Some(MatchOutcome {
            winner_id: self.winner_id,
            loser_id,
            draw: self.draw,
            score_a: self.score_a,
            score_b: self.score_b,
        })
    }

    /// Checks that `next` is a state this session may move to.
    ///
    /// Identity and seat A never change, status only moves forward,
    /// seat B is fixed once filled, scores never decrease, and `next`
    /// must itself be a consistent record.
    pub fn check_successor(&self, next: &MatchSession) -> Result<(), MatchError> {
        let reject = |reason| Err(MatchError::InvalidUpdate(self.session_id, reason));

        if next.session_id != self.session_id {
            return reject("session id changed");
        }
        if next.seat_a_id != self.seat_a_id {
            return reject("seat A changed");
        }
        if next.started_at != self.started_at {
            return reject("start time changed");
        }
        if next.status != self.status && !self.status.can_transition_to(next.status) {
            return reject("status moved backward");
        }
        if self.seat_b_id.is_some() && next.seat_b_id != self.seat_b_id {
            return reject("seat B changed");
        }
        if next.score_a < self.score_a || next.score_b < self.score_b {
            return reject("score decreased");
        }
        next.check_consistent()
            .or_else(|reason| reject(reason))
    }

    /// The field combinations each status allows.
    fn check_consistent(&self) -> Result<(), &'static str> {
        if self.seat_b_id == Some(self.seat_a_id) {
            return Err("one user holds both seats");
        }
        match self.status {
            MatchStatus::AwaitingOpponent => {
                if self.seat_b_id.is_some() {
                    return Err("seat B filled before the match started");
                }
                if self.score_a != 0 || self.score_b != 0 {
                    return Err("scored before the match started");
                }
            }
            MatchStatus::InProgress => {
                if self.seat_b_id.is_none() {
                    return Err("match started without seat B");
                }
            }
            MatchStatus::Completed => {
                if self.seat_b_id.is_none() {
                    return Err("match completed without seat B");
                }
                if self.ended_at.is_none() {
                    return Err("completed without an end time");
                }
                let winner = decide_winner(self.score_a, self.score_b);
                if self.winner_id != winner.and_then(|seat| self.occupant(seat))
                    || self.draw != winner.is_none()
                {
                    return Err("result disagrees with the scores");
                }
                return Ok(());
            }
        }
        if self.ended_at.is_some() || self.winner_id.is_some() || self.draw {
            return Err("result set before completion");
        }
        Ok(())
    }

    fn advance(&mut self, target: MatchStatus) {
        debug_assert!(self.status.can_transition_to(target));
        self.status = target;
    }
}
