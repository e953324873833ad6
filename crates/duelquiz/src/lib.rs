//! # Duelquiz
//!
//! Real-time two-player trivia matches over WebSocket.
//!
//! A client creates a room and becomes seat A; a second client joins as
//! seat B and both receive `matchReady`. Questions are broadcast to the
//! room, answers are scored per seat, and `endMatch` fixes the winner and
//! records lifetime statistics through the user directory.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use duelquiz::prelude::*;
//!
//! # async fn run() -> Result<(), DuelquizError> {
//! let directory = InMemoryDirectory::new();
//! directory.insert(UserProfile::new(UserId(1), "alice"));
//!
//! let server = DuelquizServerBuilder::new()
//!     .bind("0.0.0.0:8080")
//!     .build(Arc::new(InMemoryCatalog::new()), Arc::new(directory))
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::DuelquizError;
pub use server::{DuelquizServer, DuelquizServerBuilder};

/// Re-exports of the types a server author needs.
pub mod prelude {
    pub use crate::{DuelquizError, DuelquizServer, DuelquizServerBuilder};
    pub use duelquiz_catalog::{
        CardDealer, CatalogError, InMemoryCatalog, Question, QuestionCatalog,
    };
    pub use duelquiz_directory::{
        DirectoryError, InMemoryDirectory, ParticipantStats, StatsDelta,
        UserDirectory, UserProfile,
    };
    pub use duelquiz_match::{MatchConfig, MatchError, MatchStatus};
    pub use duelquiz_protocol::{
        AnswerOption, ClientEvent, ErrorKind, Field, FieldId, OptionId,
        QuestionCard, QuestionId, ServerEvent, SessionId, UserId,
    };
}
