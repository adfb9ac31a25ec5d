//! SQLite store backend
//!
//! Local persistence for progress records, the challenge catalog, and
//! the prior rank snapshot (`~/.ecolens/ecolens.db`). Schema migrations
//! run on open.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::board::RankSnapshot;
use crate::config::Config;
use crate::domain::{ProgressDelta, UserId, UserProgress};
use crate::progress::ChallengeDefinition;

use super::{ProgressStore, StoreError};

/// Database wrapper; clones share one connection.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the database at the default location
    /// (`~/.ecolens/ecolens.db`).
    pub fn open_default() -> Result<Self> {
        let db_path = Config::global_config_dir().join("ecolens.db");
        Self::open(&db_path)
    }

    /// Open or create the database at a specific path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create store dir: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open store db: {}", path.display()))?;

        // WAL so a dashboard read never blocks on a report write
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("store db lock poisoned")
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    /// Insert or replace a full record (seeding, migrations from the
    /// hosted store).
    pub fn upsert_record(&self, record: &UserProgress) -> Result<(), StoreError> {
        let badges = serde_json::to_string(&record.badges)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let challenge_progress = serde_json::to_string(&record.challenge_progress)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        self.conn()
            .execute(
                r#"
                INSERT INTO users (
                    identity, display_name, points,
                    total_reports, verified_reports, rejected_reports, pending_reports,
                    current_streak, longest_streak,
                    badges, challenge_progress, last_active
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                ON CONFLICT(identity) DO UPDATE SET
                    display_name = ?2, points = ?3,
                    total_reports = ?4, verified_reports = ?5,
                    rejected_reports = ?6, pending_reports = ?7,
                    current_streak = ?8, longest_streak = ?9,
                    badges = ?10, challenge_progress = ?11, last_active = ?12
                "#,
                params![
                    record.identity.as_str(),
                    record.display_name,
                    record.points as i64,
                    record.total_reports as i64,
                    record.verified_reports as i64,
                    record.rejected_reports as i64,
                    record.pending_reports as i64,
                    record.current_streak as i64,
                    record.longest_streak as i64,
                    badges,
                    challenge_progress,
                    record.last_active.timestamp_millis(),
                ],
            )
            .map_err(unavailable)?;
        Ok(())
    }

    /// Persist the full ranking so the next read can compute trends.
    pub fn save_rank_snapshot(&self, snapshot: &RankSnapshot) -> Result<(), StoreError> {
        let now = Utc::now().timestamp_millis();
        let mut conn = self.conn();
        let tx = conn.transaction().map_err(unavailable)?;
        tx.execute("DELETE FROM rank_snapshot", [])
            .map_err(unavailable)?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO rank_snapshot (identity, rank, captured_at) VALUES (?1, ?2, ?3)",
                )
                .map_err(unavailable)?;
            for (identity, rank) in snapshot.iter() {
                stmt.execute(params![identity.as_str(), rank, now])
                    .map_err(unavailable)?;
            }
        }
        tx.commit().map_err(unavailable)?;
        Ok(())
    }

    /// Load the previously persisted ranking, `None` when no snapshot
    /// has been captured yet.
    pub fn load_rank_snapshot(&self) -> Result<Option<RankSnapshot>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT identity, rank FROM rank_snapshot")
            .map_err(unavailable)?;
        let ranks: Vec<(UserId, u32)> = stmt
            .query_map([], |row| {
                Ok((UserId::new(row.get::<_, String>(0)?), row.get::<_, u32>(1)?))
            })
            .map_err(unavailable)?
            .filter_map(|r| r.ok())
            .collect();

        if ranks.is_empty() {
            Ok(None)
        } else {
            Ok(Some(RankSnapshot::from_ranks(ranks)))
        }
    }

    /// Replace the stored challenge catalog.
    pub fn replace_challenge_catalog(
        &self,
        catalog: &[ChallengeDefinition],
    ) -> Result<(), StoreError> {
        let mut conn = self.conn();
        let tx = conn.transaction().map_err(unavailable)?;
        tx.execute("DELETE FROM challenges", []).map_err(unavailable)?;
        {
            let mut stmt = tx
                .prepare(
                    r#"
                    INSERT INTO challenges
                        (id, title, description, reward_points, target_value, fallback_field, expires_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    "#,
                )
                .map_err(unavailable)?;
            for challenge in catalog {
                stmt.execute(params![
                    challenge.id,
                    challenge.title,
                    challenge.description,
                    challenge.reward_points as i64,
                    challenge.target_value as i64,
                    challenge.fallback_field,
                    challenge.expires_at.map(|t| t.timestamp_millis()),
                ])
                .map_err(unavailable)?;
            }
        }
        tx.commit().map_err(unavailable)?;
        Ok(())
    }

    fn load_record(
        conn: &Connection,
        identity: &UserId,
    ) -> Result<Option<UserProgress>, StoreError> {
        let row = conn
            .query_row(
                "SELECT identity, display_name, points, total_reports, verified_reports, \
                 rejected_reports, pending_reports, current_streak, longest_streak, badges, \
                 challenge_progress, last_active FROM users WHERE identity = ?1",
                params![identity.as_str()],
                row_to_raw,
            )
            .optional()
            .map_err(unavailable)?;

        row.map(raw_to_record).transpose()
    }
}

/// Column tuple pulled out of a `users` row before JSON decoding.
type RawUserRow = (
    String,
    Option<String>,
    i64,
    i64,
    i64,
    i64,
    i64,
    i64,
    i64,
    String,
    String,
    i64,
);

fn row_to_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawUserRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
        row.get(10)?,
        row.get(11)?,
    ))
}

fn raw_to_record(raw: RawUserRow) -> Result<UserProgress, StoreError> {
    let (
        identity,
        display_name,
        points,
        total_reports,
        verified_reports,
        rejected_reports,
        pending_reports,
        current_streak,
        longest_streak,
        badges,
        challenge_progress,
        last_active,
    ) = raw;

    Ok(UserProgress {
        identity: UserId::new(identity),
        display_name,
        points: points as u64,
        total_reports: total_reports as u64,
        verified_reports: verified_reports as u64,
        rejected_reports: rejected_reports as u64,
        pending_reports: pending_reports as u64,
        current_streak: current_streak as u64,
        longest_streak: longest_streak as u64,
        badges: serde_json::from_str(&badges).map_err(|e| StoreError::Corrupt(e.to_string()))?,
        challenge_progress: serde_json::from_str(&challenge_progress)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?,
        last_active: DateTime::from_timestamp_millis(last_active).unwrap_or_else(Utc::now),
    })
}

fn unavailable(err: rusqlite::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

#[async_trait]
impl ProgressStore for SqliteStore {
    async fn fetch_user_progress(&self, identity: &UserId) -> Result<UserProgress, StoreError> {
        let conn = self.conn();
        Self::load_record(&conn, identity)?.ok_or_else(|| StoreError::NotFound(identity.clone()))
    }

    async fn fetch_leaderboard_snapshot(
        &self,
        limit: usize,
    ) -> Result<Vec<UserProgress>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT identity, display_name, points, total_reports, verified_reports, \
                 rejected_reports, pending_reports, current_streak, longest_streak, badges, \
                 challenge_progress, last_active FROM users ORDER BY points DESC LIMIT ?1",
            )
            .map_err(unavailable)?;
        let rows: Vec<RawUserRow> = stmt
            .query_map(params![limit as i64], row_to_raw)
            .map_err(unavailable)?
            .filter_map(|r| r.ok())
            .collect();

        rows.into_iter().map(raw_to_record).collect()
    }

    async fn fetch_challenge_catalog(&self) -> Result<Vec<ChallengeDefinition>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id, title, description, reward_points, target_value, fallback_field, \
                 expires_at FROM challenges",
            )
            .map_err(unavailable)?;
        let challenges = stmt
            .query_map([], |row| {
                Ok(ChallengeDefinition {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    description: row.get(2)?,
                    reward_points: row.get::<_, i64>(3)? as u64,
                    target_value: row.get::<_, i64>(4)? as u64,
                    fallback_field: row.get(5)?,
                    expires_at: row
                        .get::<_, Option<i64>>(6)?
                        .and_then(DateTime::from_timestamp_millis),
                })
            })
            .map_err(unavailable)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(challenges)
    }

    async fn apply_delta(
        &self,
        identity: &UserId,
        delta: &ProgressDelta,
    ) -> Result<UserProgress, StoreError> {
        let mut record = {
            let conn = self.conn();
            Self::load_record(&conn, identity)?
                .unwrap_or_else(|| UserProgress::new(identity.clone()))
        };
        delta.apply(&mut record);
        self.upsert_record(&record)?;
        Ok(record)
    }
}

const SCHEMA_SQL: &str = r#"
-- Progress records (one row per identity)
CREATE TABLE IF NOT EXISTS users (
    identity TEXT PRIMARY KEY,
    display_name TEXT,
    points INTEGER NOT NULL DEFAULT 0,
    total_reports INTEGER NOT NULL DEFAULT 0,
    verified_reports INTEGER NOT NULL DEFAULT 0,
    rejected_reports INTEGER NOT NULL DEFAULT 0,
    pending_reports INTEGER NOT NULL DEFAULT 0,
    current_streak INTEGER NOT NULL DEFAULT 0,
    longest_streak INTEGER NOT NULL DEFAULT 0,
    badges TEXT NOT NULL DEFAULT '[]',
    challenge_progress TEXT NOT NULL DEFAULT '{}',
    last_active INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_users_points ON users(points);

-- Challenge catalog
CREATE TABLE IF NOT EXISTS challenges (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    reward_points INTEGER NOT NULL DEFAULT 0,
    target_value INTEGER NOT NULL DEFAULT 0,
    fallback_field TEXT,
    expires_at INTEGER
);

-- Prior ranking, replaced wholesale on every leaderboard read
CREATE TABLE IF NOT EXISTS rank_snapshot (
    identity TEXT PRIMARY KEY,
    rank INTEGER NOT NULL,
    captured_at INTEGER NOT NULL
);

-- Schema version
CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);
INSERT OR IGNORE INTO schema_version VALUES (1);
"#;
