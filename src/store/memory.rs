//! In-memory store backend
//!
//! Backs tests and demo seeding. Records live in a mutex-guarded map;
//! snapshot reads return records ordered by points descending the way
//! the hosted store would, though callers re-sort anyway.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{ProgressDelta, UserId, UserProgress};
use crate::progress::ChallengeDefinition;

use super::{ProgressStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<UserId, UserProgress>>,
    catalog: Mutex<Vec<ChallengeDefinition>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a set of records.
    pub fn with_records(records: impl IntoIterator<Item = UserProgress>) -> Self {
        let store = Self::new();
        store.insert_all(records);
        store
    }

    pub fn insert(&self, record: UserProgress) {
        self.records
            .lock()
            .expect("memory store lock poisoned")
            .insert(record.identity.clone(), record);
    }

    pub fn insert_all(&self, records: impl IntoIterator<Item = UserProgress>) {
        let mut guard = self.records.lock().expect("memory store lock poisoned");
        for record in records {
            guard.insert(record.identity.clone(), record);
        }
    }

    pub fn set_challenge_catalog(&self, catalog: Vec<ChallengeDefinition>) {
        *self.catalog.lock().expect("memory store lock poisoned") = catalog;
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn fetch_user_progress(&self, identity: &UserId) -> Result<UserProgress, StoreError> {
        self.records
            .lock()
            .expect("memory store lock poisoned")
            .get(identity)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(identity.clone()))
    }

    async fn fetch_leaderboard_snapshot(
        &self,
        limit: usize,
    ) -> Result<Vec<UserProgress>, StoreError> {
        let mut records: Vec<UserProgress> = self
            .records
            .lock()
            .expect("memory store lock poisoned")
            .values()
            .cloned()
            .collect();
        records.sort_by(|a, b| b.points.cmp(&a.points));
        records.truncate(limit);
        Ok(records)
    }

    async fn fetch_challenge_catalog(&self) -> Result<Vec<ChallengeDefinition>, StoreError> {
        Ok(self.catalog.lock().expect("memory store lock poisoned").clone())
    }

    async fn apply_delta(
        &self,
        identity: &UserId,
        delta: &ProgressDelta,
    ) -> Result<UserProgress, StoreError> {
        let mut guard = self.records.lock().expect("memory store lock poisoned");
        let record = guard
            .entry(identity.clone())
            .or_insert_with(|| UserProgress::new(identity.clone()));
        delta.apply(record);
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_not_found_and_default_synthesis() {
        let store = MemoryStore::new();
        let identity = UserId::from("newcomer");

        let err = store.fetch_user_progress(&identity).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        let record = store.fetch_or_default(&identity).await.unwrap();
        assert_eq!(record.identity, identity);
        assert_eq!(record.points, 0);
        assert!(record.badges.is_empty());
    }

    #[tokio::test]
    async fn test_delta_creates_record() {
        let store = MemoryStore::new();
        let identity = UserId::from("fresh");

        let delta = ProgressDelta {
            reports: 1,
            points: 50,
            ..Default::default()
        };
        let record = store.apply_delta(&identity, &delta).await.unwrap();
        assert_eq!(record.total_reports, 1);
        assert_eq!(record.points, 50);

        let fetched = store.fetch_user_progress(&identity).await.unwrap();
        assert_eq!(fetched.points, 50);
    }

    #[tokio::test]
    async fn test_snapshot_limit() {
        let records = (0..10).map(|i| {
            let mut record = UserProgress::new(UserId::new(format!("user-{i}")));
            record.points = i * 100;
            record
        });
        let store = MemoryStore::with_records(records);

        let snapshot = store.fetch_leaderboard_snapshot(3).await.unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[0].points, 900);
    }
}
