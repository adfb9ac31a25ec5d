//! Progress store gateway
//!
//! The hosted document database is opaque to the rest of the system;
//! everything reaches it through [`ProgressStore`]. Two backends ship
//! with the crate: an in-memory store for tests and demo seeding, and a
//! SQLite store for local persistence.
//!
//! The components downstream of the store never retry; a transient
//! failure surfaces as [`StoreError::Unavailable`] and retry policy
//! belongs to the caller.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;

use crate::domain::{ProgressDelta, UserId, UserProgress};
use crate::progress::ChallengeDefinition;

/// Snapshot size used when a caller needs the whole collection: rank
/// lookups are defined over the full set, not the display page.
pub const SNAPSHOT_CEILING: usize = 10_000;

/// Failures surfaced by a store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The identity has no progress record. Callers synthesize a zeroed
    /// default rather than propagating this to the user.
    #[error("no progress record for {0}")]
    NotFound(UserId),

    /// Transient connectivity failure; retryable by the caller.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored document could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Async gateway to the progress collection.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Fetch one identity's record, or [`StoreError::NotFound`].
    async fn fetch_user_progress(&self, identity: &UserId) -> Result<UserProgress, StoreError>;

    /// Fetch up to `limit` records for the leaderboard. The backend may
    /// order server-side, but callers must not rely on it: the
    /// aggregator re-sorts defensively.
    async fn fetch_leaderboard_snapshot(
        &self,
        limit: usize,
    ) -> Result<Vec<UserProgress>, StoreError>;

    /// Fetch the challenge catalog. Empty means "use the built-in
    /// default set".
    async fn fetch_challenge_catalog(&self) -> Result<Vec<ChallengeDefinition>, StoreError>;

    /// Apply a counter increment, creating the zeroed record first when
    /// the identity is new. Returns the updated record.
    async fn apply_delta(
        &self,
        identity: &UserId,
        delta: &ProgressDelta,
    ) -> Result<UserProgress, StoreError>;

    /// Fetch a record, synthesizing the zeroed default on NotFound
    /// ("create default profile on first load").
    async fn fetch_or_default(&self, identity: &UserId) -> Result<UserProgress, StoreError> {
        match self.fetch_user_progress(identity).await {
            Err(StoreError::NotFound(_)) => Ok(UserProgress::new(identity.clone())),
            other => other,
        }
    }
}
