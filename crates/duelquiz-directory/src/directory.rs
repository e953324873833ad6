//! The user directory contract and an in-memory implementation.
//!
//! The match coordinator never owns user records. It reads display names
//! and bumps counters through [`UserDirectory`], so the real store (SQL,
//! a user service, ...) stays behind one narrow seam.

use std::future::Future;

use dashmap::DashMap;
use duelquiz_protocol::UserId;

use crate::{DirectoryError, ParticipantStats, StatsDelta, UserProfile};

/// Name shown for a seat whose user the directory does not know.
pub const UNKNOWN_USER_NAME: &str = "Unknown";

/// Read and update access to user records.
///
/// Implementations must be shareable across tasks (`Send + Sync`) and
/// return `Send` futures, since calls are made from inside session actors
/// running on the Tokio thread pool.
///
/// # Example
///
/// ```rust
/// use duelquiz_directory::{
///     DirectoryError, StatsDelta, UserDirectory, UserProfile,
/// };
/// use duelquiz_protocol::UserId;
///
/// /// A directory where every user is called "guest" and writes vanish.
/// struct GuestDirectory;
///
/// impl UserDirectory for GuestDirectory {
///     async fn get_user(
///         &self,
///         user_id: UserId,
///     ) -> Result<UserProfile, DirectoryError> {
///         Ok(UserProfile::new(user_id, "guest"))
///     }
///
///     async fn increment_stats(
///         &self,
///         _user_id: UserId,
///         _delta: StatsDelta,
///     ) -> Result<(), DirectoryError> {
///         Ok(())
///     }
/// }
/// ```
pub trait UserDirectory: Send + Sync + 'static {
    /// Looks up a user.
    ///
    /// # Errors
    /// [`DirectoryError::UserNotFound`] for an unknown id,
    /// [`DirectoryError::Unavailable`] on I/O failure.
    fn get_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<UserProfile, DirectoryError>> + Send;

    /// Applies a partial set of counter increments to one user.
    ///
    /// # Errors
    /// Same as [`get_user`](Self::get_user).
    fn increment_stats(
        &self,
        user_id: UserId,
        delta: StatsDelta,
    ) -> impl Future<Output = Result<(), DirectoryError>> + Send;
}

/// Resolves a user's display name, or [`UNKNOWN_USER_NAME`] if the
/// directory has no such user. Store failures still propagate.
pub async fn display_name<D: UserDirectory>(
    directory: &D,
    user_id: UserId,
) -> Result<String, DirectoryError> {
    match directory.get_user(user_id).await {
        Ok(profile) => Ok(profile.user_name),
        Err(DirectoryError::UserNotFound(_)) => {
            Ok(UNKNOWN_USER_NAME.to_string())
        }
        Err(e) => Err(e),
    }
}

// ---------------------------------------------------------------------------
// InMemoryDirectory
// ---------------------------------------------------------------------------

/// A [`UserDirectory`] kept in a concurrent map.
///
/// Used by the demo server and the test suites. Records live as long as
/// the process.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    users: DashMap<UserId, UserProfile>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a user record.
    pub fn insert(&self, profile: UserProfile) {
        self.users.insert(profile.user_id, profile);
    }

    /// Current counters for a user, if known.
    pub fn stats(&self, user_id: UserId) -> Option<ParticipantStats> {
        self.users.get(&user_id).map(|p| p.stats)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl UserDirectory for InMemoryDirectory {
    async fn get_user(
        &self,
        user_id: UserId,
    ) -> Result<UserProfile, DirectoryError> {
        self.users
            .get(&user_id)
            .map(|p| p.clone())
            .ok_or(DirectoryError::UserNotFound(user_id))
    }

    async fn increment_stats(
        &self,
        user_id: UserId,
        delta: StatsDelta,
    ) -> Result<(), DirectoryError> {
        let mut profile = self
            .users
            .get_mut(&user_id)
            .ok_or(DirectoryError::UserNotFound(user_id))?;
        profile.stats.apply(&delta);
        tracing::trace!(%user_id, ?delta, "stats incremented");
        Ok(())
    }
}
