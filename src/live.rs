//! Live dashboard recomputation
//!
//! The hosted store pushes whole-collection snapshots; every push
//! triggers one full, independent recomputation. Nothing is patched
//! incrementally: ranks and ties are only well-defined relative to one
//! complete snapshot, so each new view replaces the previous one
//! wholesale (last write wins at the watch channel).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::board::{self, LeaderboardEntry};
use crate::domain::UserProgress;
use crate::progress::{
    self, BadgeDefinition, BadgeStatus, ChallengeStatus,
};
use crate::session::SessionProvider;
use crate::store::{ProgressStore, StoreError};

/// Lazy, infinite, non-restartable sequence of collection snapshots.
///
/// The producing side sits wherever the store subscription lands
/// (a sync listener, a test, a replay); consumers just await the next
/// complete snapshot.
pub struct SnapshotFeed {
    rx: mpsc::Receiver<Vec<UserProgress>>,
}

/// Producer half of a [`SnapshotFeed`].
#[derive(Clone)]
pub struct SnapshotPublisher {
    tx: mpsc::Sender<Vec<UserProgress>>,
}

impl SnapshotFeed {
    /// Create a connected publisher/feed pair.
    pub fn channel(capacity: usize) -> (SnapshotPublisher, SnapshotFeed) {
        let (tx, rx) = mpsc::channel(capacity);
        (SnapshotPublisher { tx }, SnapshotFeed { rx })
    }

    /// Next snapshot, or `None` once the publisher is gone.
    pub async fn next(&mut self) -> Option<Vec<UserProgress>> {
        self.rx.recv().await
    }
}

impl SnapshotPublisher {
    /// Push a complete collection snapshot to the consumer.
    pub async fn publish(&self, snapshot: Vec<UserProgress>) -> bool {
        self.tx.send(snapshot).await.is_ok()
    }
}

/// Everything one presentation pass needs, derived from one snapshot.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub entries: Vec<LeaderboardEntry>,
    /// The signed-in viewer's record (zeroed default for first-time
    /// identities), `None` when anonymous.
    pub viewer: Option<UserProgress>,
    /// Viewer's rank over the full snapshot, not just the top-N.
    pub viewer_rank: Option<u32>,
    pub badges: Vec<BadgeStatus>,
    pub challenges: Vec<ChallengeStatus>,
    pub generated_at: DateTime<Utc>,
}

impl DashboardView {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            viewer: None,
            viewer_rank: None,
            badges: Vec::new(),
            challenges: Vec::new(),
            generated_at: DateTime::UNIX_EPOCH,
        }
    }

    /// Top-three slice for the podium; the table shows all entries.
    pub fn podium(&self) -> &[LeaderboardEntry] {
        &self.entries[..self.entries.len().min(3)]
    }
}

impl Default for DashboardView {
    fn default() -> Self {
        Self::empty()
    }
}

/// Owns the dashboard state that the reference kept in module globals:
/// the store, the session, the badge catalog, and the display limit.
pub struct Dashboard {
    store: Arc<dyn ProgressStore>,
    session: Arc<dyn SessionProvider>,
    badge_catalog: Vec<BadgeDefinition>,
    limit: usize,
}

impl Dashboard {
    pub fn new(store: Arc<dyn ProgressStore>, session: Arc<dyn SessionProvider>, limit: usize) -> Self {
        Self {
            store,
            session,
            badge_catalog: progress::builtin_badges().to_vec(),
            limit,
        }
    }

    /// Swap in an externally supplied badge catalog.
    pub fn with_badge_catalog(mut self, catalog: Vec<BadgeDefinition>) -> Self {
        self.badge_catalog = catalog;
        self
    }

    /// One full recomputation from a freshly fetched snapshot. The full
    /// collection is fetched so the viewer's rank is correct even when
    /// they fall outside the displayed top-N.
    pub async fn refresh(&self) -> Result<DashboardView, StoreError> {
        let snapshot = self
            .store
            .fetch_leaderboard_snapshot(crate::store::SNAPSHOT_CEILING)
            .await?;
        self.view_of(snapshot).await
    }

    /// One full recomputation from a pushed snapshot.
    pub async fn view_of(&self, snapshot: Vec<UserProgress>) -> Result<DashboardView, StoreError> {
        let viewer = match self.session.current().identity() {
            Some(identity) => Some(self.store.fetch_or_default(identity).await?),
            None => None,
        };

        let viewer_rank = viewer
            .as_ref()
            .and_then(|viewer| board::find_rank(&snapshot, &viewer.identity));

        let entries = board::rank(&snapshot, self.limit);

        let (badges, challenges) = match &viewer {
            Some(viewer) => {
                let badges = progress::evaluate(viewer, &self.badge_catalog);
                let catalog = match self.store.fetch_challenge_catalog().await {
                    Ok(catalog) => catalog,
                    Err(err) => {
                        warn!(error = %err, "challenge catalog unavailable, using defaults");
                        Vec::new()
                    }
                };
                let catalog = if catalog.is_empty() {
                    progress::default_challenges()
                } else {
                    catalog
                };
                let challenges = progress::challenge_progress(viewer, &catalog);
                (badges, challenges)
            }
            None => (Vec::new(), Vec::new()),
        };

        debug!(
            entries = entries.len(),
            viewer_rank,
            "dashboard view recomputed"
        );

        Ok(DashboardView {
            entries,
            viewer,
            viewer_rank,
            badges,
            challenges,
            generated_at: Utc::now(),
        })
    }

    /// Consume a snapshot feed until the publisher closes, publishing
    /// each recomputed view through `view_tx`. A snapshot that fails to
    /// compute is logged and skipped; the previous view stays current.
    pub async fn run(&self, mut feed: SnapshotFeed, view_tx: watch::Sender<DashboardView>) {
        while let Some(snapshot) = feed.next().await {
            match self.view_of(snapshot).await {
                Ok(view) => {
                    let _ = view_tx.send(view);
                }
                Err(err) => warn!(error = %err, "snapshot recomputation failed"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use crate::session::SessionHandle;
    use crate::store::MemoryStore;

    fn record(id: &str, points: u64) -> UserProgress {
        let mut user = UserProgress::new(UserId::from(id));
        user.points = points;
        user
    }

    fn make_dashboard(store: MemoryStore, session: SessionHandle, limit: usize) -> Dashboard {
        Dashboard::new(Arc::new(store), Arc::new(session), limit)
    }

    #[tokio::test]
    async fn test_refresh_anonymous() {
        let store = MemoryStore::with_records(vec![record("a", 900), record("b", 500)]);
        let dashboard = make_dashboard(store, SessionHandle::new(), 50);

        let view = dashboard.refresh().await.unwrap();
        assert_eq!(view.entries.len(), 2);
        assert!(view.viewer.is_none());
        assert!(view.viewer_rank.is_none());
        assert!(view.badges.is_empty());
        assert!(view.challenges.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_signed_in_first_time() {
        let store = MemoryStore::with_records(vec![record("a", 900)]);
        let session = SessionHandle::signed_in(UserId::from("newcomer"));
        let dashboard = make_dashboard(store, session, 50);

        let view = dashboard.refresh().await.unwrap();
        // NotFound synthesized into a zeroed default, never an error.
        let viewer = view.viewer.unwrap();
        assert_eq!(viewer.points, 0);
        assert!(view.viewer_rank.is_none());
        // No catalog in the store: exactly the four default challenges.
        assert_eq!(view.challenges.len(), 4);
        assert_eq!(view.badges.len(), progress::builtin_badges().len());
    }

    #[tokio::test]
    async fn test_viewer_rank_over_full_snapshot() {
        let store = MemoryStore::with_records(vec![
            record("a", 900),
            record("b", 700),
            record("me", 100),
        ]);
        let session = SessionHandle::signed_in(UserId::from("me"));
        let dashboard = make_dashboard(store, session, 2);

        let view = dashboard.refresh().await.unwrap();
        // Truncated out of the table, still ranked over the full set.
        assert_eq!(view.entries.len(), 2);
        assert_eq!(view.viewer_rank, Some(3));
    }

    #[tokio::test]
    async fn test_podium_is_presentation_slice() {
        let store = MemoryStore::with_records(vec![
            record("a", 900),
            record("b", 700),
            record("c", 500),
            record("d", 300),
        ]);
        let dashboard = make_dashboard(store, SessionHandle::new(), 50);

        let view = dashboard.refresh().await.unwrap();
        assert_eq!(view.podium().len(), 3);
        assert_eq!(view.podium()[0].user.identity.as_str(), "a");
        assert_eq!(view.entries.len(), 4);

        let tiny = MemoryStore::with_records(vec![record("solo", 10)]);
        let view = make_dashboard(tiny, SessionHandle::new(), 50).refresh().await.unwrap();
        assert_eq!(view.podium().len(), 1);
    }

    #[tokio::test]
    async fn test_feed_snapshots_supersede() {
        let store = MemoryStore::new();
        let dashboard = make_dashboard(store, SessionHandle::new(), 50);
        let (publisher, feed) = SnapshotFeed::channel(8);
        let (view_tx, mut view_rx) = watch::channel(DashboardView::empty());

        let driver = tokio::spawn(async move {
            dashboard.run(feed, view_tx).await;
        });

        publisher.publish(vec![record("a", 100)]).await;
        publisher.publish(vec![record("a", 100), record("b", 900)]).await;
        drop(publisher);
        driver.await.unwrap();

        // Only the latest view matters; earlier ones were superseded.
        let view = view_rx.borrow_and_update().clone();
        assert_eq!(view.entries.len(), 2);
        assert_eq!(view.entries[0].user.identity.as_str(), "b");
    }
}
