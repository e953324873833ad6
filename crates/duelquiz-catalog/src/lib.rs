//! Question catalog adapter for Duelquiz.
//!
//! - [`QuestionCatalog`]: the read-only contract the coordinator consumes.
//! - [`InMemoryCatalog`]: reference implementation for demos and tests.
//! - [`CardDealer`]: turns a question into a [`QuestionCard`] with up to
//!   [`DISTRACTOR_COUNT`] distractors from the same field.
//! - [`sampling`]: the uniform selection functions both of the above use.
//!
//! [`QuestionCard`]: duelquiz_protocol::QuestionCard

#![allow(async_fn_in_trait)]

mod catalog;
mod dealer;
mod error;
pub mod sampling;

pub use catalog::{InMemoryCatalog, Question, QuestionCatalog};
pub use dealer::{CardDealer, DISTRACTOR_COUNT};
pub use error::CatalogError;
