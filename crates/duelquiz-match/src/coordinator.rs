//! Match coordinator: routes client events to sessions and turns
//! results into wire events.

use std::sync::Arc;

use duelquiz_catalog::{CardDealer, QuestionCatalog};
use duelquiz_directory::{display_name, UserDirectory};
use duelquiz_protocol::{
    ClientEvent, MatchStatus, QuestionCard, QuestionId, ServerEvent, SessionId,
    UserId,
};
use serde::Serialize;

use crate::actor::bounded;
use crate::{
    BroadcastGateway, EndReport, JoinReceipt, MatchConfig, MatchError,
    SessionRegistry,
};

/// Seat names and status of one session, as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomStatusView {
    pub session_id: SessionId,
    pub seat_a_name: String,
    pub seat_b_name: Option<String>,
    pub status: MatchStatus,
}

/// Entry point for every match operation.
///
/// Generic over the two adapters and the broadcast gateway so a test can
/// swap any of them.
pub struct MatchCoordinator<C, D, B> {
    registry: Arc<SessionRegistry<D, B>>,
    dealer: CardDealer<C>,
    directory: Arc<D>,
}

impl<C, D, B> MatchCoordinator<C, D, B>
where
    C: QuestionCatalog,
    D: UserDirectory,
    B: BroadcastGateway,
{
    pub fn new(
        catalog: Arc<C>,
        directory: Arc<D>,
        gateway: Arc<B>,
        config: MatchConfig,
    ) -> Self {
        let registry = Arc::new(SessionRegistry::new(
            config,
            Arc::clone(&directory),
            gateway,
        ));
        Self {
            registry,
            dealer: CardDealer::new(catalog),
            directory,
        }
    }

    /// Replaces the card dealer, e.g. with a seeded one.
    pub fn with_dealer(mut self, dealer: CardDealer<C>) -> Self {
        self.dealer = dealer;
        self
    }

    pub fn registry(&self) -> &Arc<SessionRegistry<D, B>> {
        &self.registry
    }

    pub fn dealer(&self) -> &CardDealer<C> {
        &self.dealer
    }

    pub fn create_room(&self, initiator_id: UserId) -> Result<SessionId, MatchError> {
        self.registry.create(initiator_id)
    }

    pub async fn join_room(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> Result<JoinReceipt, MatchError> {
        self.registry.handle(session_id)?.join(user_id).await
    }

    /// Seat names and status. Never mutates; repeated calls agree until
    /// some other operation commits.
    pub async fn room_status(
        &self,
        session_id: SessionId,
    ) -> Result<RoomStatusView, MatchError> {
        let session = self.registry.get(session_id)?;
        let limit = self.registry.config().adapter_timeout;

        let seat_a_name = bounded(
            limit,
            "get_user",
            display_name(&*self.directory, session.seat_a_id),
        )
        .await?;
        let seat_b_name = match session.seat_b_id {
            Some(user_id) => Some(
                bounded(
                    limit,
                    "get_user",
                    display_name(&*self.directory, user_id),
                )
                .await?,
            ),
            None => None,
        };

        Ok(RoomStatusView {
            session_id,
            seat_a_name,
            seat_b_name,
            status: session.status,
        })
    }

    pub async fn send_question(
        &self,
        session_id: SessionId,
        card: QuestionCard,
    ) -> Result<(), MatchError> {
        self.registry.handle(session_id)?.send_question(card).await
    }

    pub async fn submit_answer(
        &self,
        session_id: SessionId,
        user_id: UserId,
        is_correct: bool,
    ) -> Result<(), MatchError> {
        self.registry
            .handle(session_id)?
            .submit_answer(user_id, is_correct)
            .await
    }

    pub async fn end_match(&self, session_id: SessionId) -> Result<EndReport, MatchError> {
        self.registry.handle(session_id)?.end_match().await
    }

    /// A question card by id, or a uniformly random one.
    pub async fn get_card(
        &self,
        question_id: Option<QuestionId>,
    ) -> Result<QuestionCard, MatchError> {
        let limit = self.registry.config().adapter_timeout;
        bounded(limit, "get_card", self.dealer.card(question_id)).await
    }

    /// Handles one client event and returns the events for the sender.
    ///
    /// Broadcasts to the session's subscribers happen inside the
    /// operation; only direct replies are returned here. Errors become
    /// the matching error event, never an `Err`.
    pub async fn dispatch(&self, event: ClientEvent) -> Vec<ServerEvent> {
        match event {
            ClientEvent::CreateRoom { initiator_id } => {
                match self.create_room(initiator_id) {
                    Ok(session_id) => vec![ServerEvent::RoomCreated { session_id }],
                    Err(e) => vec![ServerEvent::RoomCreateError {
                        kind: e.kind(),
                        reason: e.to_string(),
                    }],
                }
            }

            ClientEvent::JoinRoom {
                session_id,
                user_id,
            } => match self.join_room(session_id, user_id).await {
                Ok(receipt) => vec![ServerEvent::RoomJoined {
                    session_id,
                    opponent_name: receipt.seat_a_name,
                }],
                Err(e) => vec![ServerEvent::RoomJoinError {
                    kind: e.kind(),
                    reason: e.to_string(),
                }],
            },

            ClientEvent::GetRoomStatus { session_id } => {
                match self.room_status(session_id).await {
                    Ok(view) => vec![ServerEvent::RoomStatus {
                        seat_a_name: Some(view.seat_a_name),
                        seat_b_name: view.seat_b_name,
                        status: view.status,
                    }],
                    Err(e) => vec![ServerEvent::RoomStatusError {
                        kind: e.kind(),
                        reason: e.to_string(),
                    }],
                }
            }

            ClientEvent::SendQuestion {
                session_id,
                question,
            } => match self.send_question(session_id, question).await {
                Ok(()) => Vec::new(),
                Err(e) => vec![ServerEvent::QuestionError {
                    kind: e.kind(),
                    reason: e.to_string(),
                }],
            },

            ClientEvent::SubmitAnswer {
                session_id,
                user_id,
                is_correct,
            } => match self.submit_answer(session_id, user_id, is_correct).await {
                Ok(()) => vec![ServerEvent::AnswerSubmitted {
                    session_id,
                    user_id,
                    is_correct,
                }],
                Err(e) => vec![ServerEvent::AnswerError {
                    kind: e.kind(),
                    reason: e.to_string(),
                }],
            },

            ClientEvent::EndMatch { session_id } => {
                match self.end_match(session_id).await {
                    Ok(report) => report
                        .failures
                        .into_iter()
                        .map(|failure| ServerEvent::MatchEndError {
                            kind: failure.error.kind(),
                            reason: failure.error.to_string(),
                            user_id: Some(failure.user_id),
                        })
                        .collect(),
                    Err(e) => vec![ServerEvent::MatchEndError {
                        kind: e.kind(),
                        reason: e.to_string(),
                        user_id: None,
                    }],
                }
            }

            ClientEvent::WatchRoom { session_id } => {
                match self.registry.get(session_id) {
                    Ok(_) => vec![ServerEvent::RoomWatched { session_id }],
                    Err(e) => vec![ServerEvent::RoomWatchError {
                        kind: e.kind(),
                        reason: e.to_string(),
                    }],
                }
            }

            ClientEvent::GetCard { question_id } => {
                match self.get_card(question_id).await {
                    Ok(card) => vec![ServerEvent::Card(card)],
                    Err(e) => vec![ServerEvent::CardError {
                        kind: e.kind(),
                        reason: e.to_string(),
                    }],
                }
            }
        }
    }
}
