//! Match sessions for Duelquiz.
//!
//! Each session runs as its own Tokio task (actor model). The task is the
//! session's single writer: transitions queue in its mailbox and run one
//! at a time, adapter calls included, while reads go through a published
//! snapshot.
//!
//! # Key types
//!
//! - [`MatchCoordinator`]: typed operations and wire-event dispatch
//! - [`SessionRegistry`]: creates, finds and evicts sessions
//! - [`SessionHandle`]: commands for one running session actor
//! - [`MatchSession`]: the session record and its pure transitions
//! - [`BroadcastGateway`] / [`ChannelGateway`]: fan-out to clients
//! - [`MatchConfig`]: capacity, mailbox size, timeouts

mod actor;
mod config;
mod coordinator;
mod error;
mod gateway;
mod registry;
mod session;

pub use actor::{EndReport, JoinReceipt, SessionHandle, StatWriteFailure};
pub use config::MatchConfig;
pub use coordinator::{MatchCoordinator, RoomStatusView};
pub use duelquiz_protocol::MatchStatus;
pub use error::{AdapterError, MatchError};
pub use gateway::{BroadcastGateway, ChannelGateway, EventSender, SubscriberId};
pub use registry::{spawn_reaper, SessionRegistry};
pub use session::{decide_winner, MatchOutcome, MatchSession, Seat};
