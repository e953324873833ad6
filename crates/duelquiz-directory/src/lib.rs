//! User directory adapter for Duelquiz.
//!
//! The coordinator needs two things from the user store: a display name
//! per seat and a way to bump lifetime counters when answers are
//! submitted and matches end. [`UserDirectory`] is that contract;
//! [`InMemoryDirectory`] is the reference implementation.

#![allow(async_fn_in_trait)]

mod directory;
mod error;
mod stats;

pub use directory::{
    display_name, InMemoryDirectory, UserDirectory, UNKNOWN_USER_NAME,
};
pub use error::DirectoryError;
pub use stats::{ParticipantStats, StatsDelta, UserProfile};
