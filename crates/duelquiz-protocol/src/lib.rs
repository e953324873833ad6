//! Wire protocol for Duelquiz.
//!
//! - **Identity** ([`UserId`], [`SessionId`], [`QuestionId`], ...): the
//!   newtypes every other crate keys its data by.
//! - **Events** ([`ClientEvent`], [`ServerEvent`], [`ErrorKind`]): what
//!   travels over a connection.
//! - **Cards** ([`QuestionCard`], [`AnswerOption`], [`Field`]): the
//!   question payload.
//! - **Status** ([`MatchStatus`]): the match lifecycle.
//! - **Codec** ([`Codec`], [`JsonCodec`]): events to bytes and back.
//!
//! ```text
//! Transport (bytes) → Protocol (events) → Match coordinator
//! ```

mod card;
mod codec;
mod error;
mod events;
mod ids;
mod status;

pub use card::{AnswerOption, Field, QuestionCard};
pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use events::{ClientEvent, ErrorKind, ServerEvent};
pub use ids::{FieldId, OptionId, QuestionId, SessionId, UserId};
pub use status::MatchStatus;
