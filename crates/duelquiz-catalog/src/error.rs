//! Error types for the question catalog.

use duelquiz_protocol::QuestionId;

/// Errors a [`QuestionCatalog`](crate::QuestionCatalog) or the
/// [`CardDealer`](crate::CardDealer) can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// No question with this id exists.
    #[error("question {0} not found")]
    QuestionNotFound(QuestionId),

    /// A random card was requested but the catalog holds no questions.
    #[error("question catalog is empty")]
    Empty,

    /// The backing store could not be reached or refused the query.
    #[error("question catalog unavailable: {0}")]
    Unavailable(String),
}
