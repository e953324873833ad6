//! Error types for the user directory.

use duelquiz_protocol::UserId;

/// Errors a [`UserDirectory`](crate::UserDirectory) can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    /// No user with this id exists.
    #[error("user {0} not found")]
    UserNotFound(UserId),

    /// The backing store could not be reached or refused the operation.
    #[error("user directory unavailable: {0}")]
    Unavailable(String),
}
