//! Error types for the match layer.

use duelquiz_catalog::CatalogError;
use duelquiz_directory::DirectoryError;
use duelquiz_protocol::{ErrorKind, SessionId, UserId};

/// A collaborator call made during a transition failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    #[error("question catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("user directory: {0}")]
    Directory(#[from] DirectoryError),

    /// The call did not complete within `adapter_timeout`.
    #[error("{0} timed out")]
    Timeout(&'static str),
}

/// Errors that can occur during match operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// The session does not exist (never created, or evicted).
    #[error("session {0} not found")]
    NotFound(SessionId),

    /// Seat B is already filled.
    #[error("session {0} already has two participants")]
    SeatTaken(SessionId),

    /// The initiator tried to take seat B of their own session.
    #[error("user {0} already holds seat A")]
    SelfJoin(UserId),

    /// The session is still waiting for its second participant.
    #[error("session {0} has not started")]
    NotStarted(SessionId),

    #[error("match in session {0} already ended")]
    MatchAlreadyEnded(SessionId),

    #[error("user {0} is not a participant of session {1}")]
    NotAParticipant(UserId, SessionId),

    /// A generic update left the session in a state no transition can
    /// reach.
    #[error("update to session {0} rejected: {1}")]
    InvalidUpdate(SessionId, &'static str),

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// No capacity for another session.
    #[error("session registry is full")]
    RegistryFull,

    /// The session's actor stopped while the command was in flight.
    #[error("session {0} is unavailable")]
    Unavailable(SessionId),
}

impl From<CatalogError> for MatchError {
    fn from(err: CatalogError) -> Self {
        Self::Adapter(AdapterError::Catalog(err))
    }
}

impl From<DirectoryError> for MatchError {
    fn from(err: DirectoryError) -> Self {
        Self::Adapter(AdapterError::Directory(err))
    }
}

impl MatchError {
    /// The wire classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_)
            | Self::Adapter(AdapterError::Catalog(
                CatalogError::QuestionNotFound(_) | CatalogError::Empty,
            ))
            | Self::Adapter(AdapterError::Directory(
                DirectoryError::UserNotFound(_),
            )) => ErrorKind::NotFound,
            Self::SeatTaken(_)
            | Self::SelfJoin(_)
            | Self::NotStarted(_)
            | Self::MatchAlreadyEnded(_)
            | Self::NotAParticipant(..)
            | Self::InvalidUpdate(..) => ErrorKind::InvalidTransition,
            Self::Adapter(_) | Self::Unavailable(_) => {
                ErrorKind::AdapterFailure
            }
            Self::RegistryFull => ErrorKind::ResourceExhausted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classifies_transitions() {
        assert_eq!(
            MatchError::SeatTaken(SessionId(1)).kind(),
            ErrorKind::InvalidTransition
        );
        assert_eq!(
            MatchError::MatchAlreadyEnded(SessionId(1)).kind(),
            ErrorKind::InvalidTransition
        );
        assert_eq!(
            MatchError::InvalidUpdate(SessionId(1), "status moved backward")
                .kind(),
            ErrorKind::InvalidTransition
        );
        assert_eq!(
            MatchError::RegistryFull.kind(),
            ErrorKind::ResourceExhausted
        );
    }

    #[test]
    fn test_kind_looks_through_adapter_not_found() {
        let err: MatchError =
            CatalogError::QuestionNotFound(duelquiz_protocol::QuestionId(4))
                .into();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err: MatchError = DirectoryError::UserNotFound(UserId(9)).into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_kind_adapter_failures() {
        let err: MatchError =
            DirectoryError::Unavailable("db down".into()).into();
        assert_eq!(err.kind(), ErrorKind::AdapterFailure);

        let err = MatchError::Adapter(AdapterError::Timeout("get_user"));
        assert_eq!(err.kind(), ErrorKind::AdapterFailure);
        assert_eq!(err.to_string(), "get_user timed out");
    }
}
