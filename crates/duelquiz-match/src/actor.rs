//! Session actor: one Tokio task per match session.
//!
//! The actor owns the authoritative [`MatchSession`] and is its only
//! writer. Commands arrive through a bounded mpsc mailbox and are applied
//! one at a time in arrival order, so the guard and the effect of a
//! transition can never interleave with another transition on the same
//! session.
//!
//! Every mutating command works on a draft copy. The draft replaces the
//! live session only once the whole transition, adapter calls included,
//! has succeeded; the committed value is then published on a `watch`
//! channel for lock-free reads.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use duelquiz_directory::{display_name, StatsDelta, UserDirectory};
use duelquiz_protocol::{QuestionCard, ServerEvent, SessionId, UserId};
use futures_util::future::join_all;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch};

use crate::{
    AdapterError, BroadcastGateway, MatchConfig, MatchError, MatchOutcome,
    MatchSession,
};

/// Returned to the participant who took seat B.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinReceipt {
    pub session_id: SessionId,
    pub seat_a_id: UserId,
    pub seat_b_id: UserId,
    pub seat_a_name: String,
    pub seat_b_name: String,
}

/// A participant whose end-of-match statistics could not be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatWriteFailure {
    pub user_id: UserId,
    pub error: MatchError,
}

/// What `EndMatch` did.
///
/// The session is `Completed` whenever a report exists; `failures` lists
/// the statistics writes that did not go through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndReport {
    pub outcome: MatchOutcome,
    pub failures: Vec<StatWriteFailure>,
}

impl EndReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Result of a generic job: whether to keep the draft, and a callback
/// that hands the caller its value once the commit has happened.
pub(crate) struct JobOutcome {
    commit: bool,
    deliver: Box<dyn FnOnce() + Send>,
}

pub(crate) type Job = Box<dyn FnOnce(&mut MatchSession) -> JobOutcome + Send>;

type Reply<T> = oneshot::Sender<Result<T, MatchError>>;

pub(crate) enum SessionCommand {
    Join {
        user_id: UserId,
        reply: Reply<JoinReceipt>,
    },
    SendQuestion {
        card: QuestionCard,
        reply: Reply<()>,
    },
    SubmitAnswer {
        user_id: UserId,
        is_correct: bool,
        reply: Reply<()>,
    },
    EndMatch {
        reply: Reply<EndReport>,
    },
    Apply(Job),
    Shutdown,
}

/// Handle to a running session actor.
///
/// Cheap to clone. Reads go through the published snapshot and never
/// touch the mailbox.
#[derive(Clone)]
pub struct SessionHandle {
    session_id: SessionId,
    sender: mpsc::Sender<SessionCommand>,
    snapshot: watch::Receiver<MatchSession>,
}

impl SessionHandle {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// The last committed state.
    pub fn snapshot(&self) -> MatchSession {
        self.snapshot.borrow().clone()
    }

    /// Returns `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    pub async fn join(&self, user_id: UserId) -> Result<JoinReceipt, MatchError> {
        self.request(|reply| SessionCommand::Join { user_id, reply })
            .await
    }

    pub async fn send_question(
        &self,
        card: QuestionCard,
    ) -> Result<(), MatchError> {
        self.request(|reply| SessionCommand::SendQuestion { card, reply })
            .await
    }

    pub async fn submit_answer(
        &self,
        user_id: UserId,
        is_correct: bool,
    ) -> Result<(), MatchError> {
        self.request(|reply| SessionCommand::SubmitAnswer {
            user_id,
            is_correct,
            reply,
        })
        .await
    }

    pub async fn end_match(&self) -> Result<EndReport, MatchError> {
        self.request(|reply| SessionCommand::EndMatch { reply }).await
    }

    /// Runs `f` with exclusive access to a draft of the session.
    ///
    /// `Ok` commits the draft, `Err` discards it. A completed session is
    /// refused with [`MatchError::MatchAlreadyEnded`] before `f` runs, and
    /// a draft that fails [`MatchSession::check_successor`] is discarded
    /// with [`MatchError::InvalidUpdate`]. `f` runs inside the actor, so
    /// it must not block.
    pub async fn with_session<R, F>(&self, f: F) -> Result<R, MatchError>
    where
        R: Send + 'static,
        F: FnOnce(&mut MatchSession) -> Result<R, MatchError> + Send + 'static,
    {
        self.request(|reply| {
            SessionCommand::Apply(Box::new(move |draft: &mut MatchSession| {
                let result = if draft.status.is_terminal() {
                    Err(MatchError::MatchAlreadyEnded(draft.session_id))
                } else {
                    let before = draft.clone();
                    f(draft).and_then(|value| {
                        before.check_successor(draft).map(|()| value)
                    })
                };
                JobOutcome {
                    commit: result.is_ok(),
                    deliver: Box::new(move || {
                        let _ = reply.send(result);
                    }),
                }
            }))
        })
        .await
    }

    /// Tells the actor to stop after the commands already queued.
    pub async fn shutdown(&self) -> Result<(), MatchError> {
        self.sender
            .send(SessionCommand::Shutdown)
            .await
            .map_err(|_| MatchError::Unavailable(self.session_id))
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> SessionCommand,
    ) -> Result<T, MatchError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| MatchError::Unavailable(self.session_id))?;
        reply_rx
            .await
            .map_err(|_| MatchError::Unavailable(self.session_id))?
    }
}

/// Runs one adapter call under `limit`.
pub(crate) async fn bounded<T, E>(
    limit: Duration,
    op: &'static str,
    call: impl Future<Output = Result<T, E>>,
) -> Result<T, MatchError>
where
    E: Into<AdapterError>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(|e| MatchError::Adapter(e.into())),
        Err(_) => Err(MatchError::Adapter(AdapterError::Timeout(op))),
    }
}

struct SessionActor<D, B> {
    session: MatchSession,
    directory: Arc<D>,
    gateway: Arc<B>,
    adapter_timeout: Duration,
    snapshot: watch::Sender<MatchSession>,
    receiver: mpsc::Receiver<SessionCommand>,
}

impl<D: UserDirectory, B: BroadcastGateway> SessionActor<D, B> {
    async fn run(mut self) {
        let session_id = self.session.session_id;
        tracing::info!(%session_id, "session actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                SessionCommand::Join { user_id, reply } => {
                    let result = self.handle_join(user_id).await;
                    self.log_rejection("join", &result);
                    let _ = reply.send(result);
                }
                SessionCommand::SendQuestion { card, reply } => {
                    let result = self.handle_send_question(card);
                    self.log_rejection("send_question", &result);
                    let _ = reply.send(result);
                }
                SessionCommand::SubmitAnswer {
                    user_id,
                    is_correct,
                    reply,
                } => {
                    let result =
                        self.handle_submit_answer(user_id, is_correct).await;
                    self.log_rejection("submit_answer", &result);
                    let _ = reply.send(result);
                }
                SessionCommand::EndMatch { reply } => {
                    let result = self.handle_end_match().await;
                    self.log_rejection("end_match", &result);
                    let _ = reply.send(result);
                }
                SessionCommand::Apply(job) => {
                    let mut draft = self.session.clone();
                    let outcome = job(&mut draft);
                    if outcome.commit {
                        self.commit(draft);
                    }
                    (outcome.deliver)();
                }
                SessionCommand::Shutdown => break,
            }
        }

        tracing::info!(%session_id, "session actor stopped");
    }

    async fn handle_join(
        &mut self,
        user_id: UserId,
    ) -> Result<JoinReceipt, MatchError> {
        let mut draft = self.session.clone();
        draft.join(user_id)?;

        let directory = &*self.directory;
        let (seat_a_name, seat_b_name) = tokio::try_join!(
            bounded(
                self.adapter_timeout,
                "get_user",
                display_name(directory, draft.seat_a_id),
            ),
            bounded(
                self.adapter_timeout,
                "get_user",
                display_name(directory, user_id),
            ),
        )?;

        let seat_a_id = draft.seat_a_id;
        self.commit(draft);
        tracing::info!(
            session_id = %self.session.session_id,
            %user_id,
            "opponent joined, match started"
        );

        self.gateway.broadcast(
            self.session.session_id,
            &ServerEvent::MatchReady {
                seat_a_name: seat_a_name.clone(),
                seat_b_name: seat_b_name.clone(),
            },
        );

        Ok(JoinReceipt {
            session_id: self.session.session_id,
            seat_a_id,
            seat_b_id: user_id,
            seat_a_name,
            seat_b_name,
        })
    }

    fn handle_send_question(
        &self,
        card: QuestionCard,
    ) -> Result<(), MatchError> {
        self.session.ensure_in_progress()?;
        tracing::debug!(
            session_id = %self.session.session_id,
            question_id = %card.question_id,
            "question sent"
        );
        self.gateway.broadcast(
            self.session.session_id,
            &ServerEvent::QuestionReceived { question: card },
        );
        Ok(())
    }

    async fn handle_submit_answer(
        &mut self,
        user_id: UserId,
        is_correct: bool,
    ) -> Result<(), MatchError> {
        let mut draft = self.session.clone();
        draft.record_answer(user_id, is_correct)?;

        bounded(
            self.adapter_timeout,
            "increment_stats",
            self.directory
                .increment_stats(user_id, StatsDelta::answer(is_correct)),
        )
        .await?;

        self.commit(draft);
        tracing::debug!(
            session_id = %self.session.session_id,
            %user_id,
            is_correct,
            score_a = self.session.score_a,
            score_b = self.session.score_b,
            "answer recorded"
        );
        Ok(())
    }

    async fn handle_end_match(&mut self) -> Result<EndReport, MatchError> {
        let mut draft = self.session.clone();
        let outcome = draft.finish(SystemTime::now())?;
        self.commit(draft);

        let session_id = self.session.session_id;
        let participants = std::iter::once(self.session.seat_a_id)
            .chain(self.session.seat_b_id);
        let writes = participants.map(|user_id| {
            let delta = if outcome.draw {
                StatsDelta::draw()
            } else if outcome.winner_id == Some(user_id) {
                StatsDelta::win()
            } else {
                StatsDelta::lose()
            };
            let directory = Arc::clone(&self.directory);
            let limit = self.adapter_timeout;
            async move {
                bounded(
                    limit,
                    "increment_stats",
                    directory.increment_stats(user_id, delta),
                )
                .await
                .err()
                .map(|error| StatWriteFailure { user_id, error })
            }
        });
        let failures: Vec<StatWriteFailure> =
            join_all(writes).await.into_iter().flatten().collect();

        for failure in &failures {
            tracing::warn!(
                %session_id,
                user_id = %failure.user_id,
                error = %failure.error,
                "end-of-match stats not written"
            );
        }
        tracing::info!(
            %session_id,
            winner = ?outcome.winner_id,
            draw = outcome.draw,
            score_a = outcome.score_a,
            score_b = outcome.score_b,
            "match ended"
        );

        self.gateway.broadcast(
            session_id,
            &ServerEvent::MatchEnded {
                winner_id: outcome.winner_id,
                draw: outcome.draw,
                score_a: outcome.score_a,
                score_b: outcome.score_b,
            },
        );

        Ok(EndReport { outcome, failures })
    }

    fn commit(&mut self, draft: MatchSession) {
        self.session = draft;
        self.snapshot.send_replace(self.session.clone());
    }

    fn log_rejection<T>(&self, op: &str, result: &Result<T, MatchError>) {
        let Err(err) = result else { return };
        match err {
            MatchError::Adapter(_) => tracing::warn!(
                session_id = %self.session.session_id,
                op,
                error = %err,
                "transition aborted"
            ),
            _ => tracing::debug!(
                session_id = %self.session.session_id,
                op,
                error = %err,
                "transition rejected"
            ),
        }
    }
}

/// Spawns the actor for `session` and returns a handle to it.
pub(crate) fn spawn_session<D: UserDirectory, B: BroadcastGateway>(
    session: MatchSession,
    directory: Arc<D>,
    gateway: Arc<B>,
    config: &MatchConfig,
) -> SessionHandle {
    let session_id = session.session_id;
    let (tx, rx) = mpsc::channel(config.channel_size.max(1));
    let (snapshot_tx, snapshot_rx) = watch::channel(session.clone());

    let actor = SessionActor {
        session,
        directory,
        gateway,
        adapter_timeout: config.adapter_timeout,
        snapshot: snapshot_tx,
        receiver: rx,
    };
    tokio::spawn(actor.run());

    SessionHandle {
        session_id,
        sender: tx,
        snapshot: snapshot_rx,
    }
}
