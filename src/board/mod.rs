//! Leaderboard aggregation
//!
//! Pure, synchronous ranking over an in-memory snapshot of progress
//! records. The store may apply its own server-side ordering, but nothing
//! here trusts it: every computation re-sorts the snapshot it is given.
//! Results are derived per call and never cached, because tie-breaking is
//! only well-defined relative to one complete snapshot.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{UserId, UserProgress};

/// Rank movement relative to a prior snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn arrow(&self) -> &'static str {
        match self {
            Self::Up => "↑",
            Self::Down => "↓",
            Self::Flat => "→",
        }
    }
}

/// One ranked row, recomputed on every read.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    /// 1-based, gapless; ties get consecutive distinct ranks in snapshot
    /// order.
    pub rank: u32,
    /// `None` until a prior snapshot is applied via [`apply_trend`];
    /// there is no history to compare against otherwise.
    pub trend: Option<Trend>,
    pub user: UserProgress,
}

/// Rank the snapshot and keep the top `limit` entries.
///
/// Stable sort by points descending: two entries with equal points keep
/// their snapshot order. Duplicate identities are a caller contract
/// violation; they are collapsed defensively (latest record wins, the
/// earliest position is kept) and logged.
pub fn rank(snapshot: &[UserProgress], limit: usize) -> Vec<LeaderboardEntry> {
    sort_snapshot(snapshot)
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(index, user)| LeaderboardEntry {
            rank: index as u32 + 1,
            trend: None,
            user,
        })
        .collect()
}

/// Position of `identity` in the full sorted snapshot (not just the
/// top-N). `None` when absent, so "unranked" is distinguishable from
/// rank 0, which does not exist.
pub fn find_rank(snapshot: &[UserProgress], identity: &UserId) -> Option<u32> {
    sort_snapshot(snapshot)
        .iter()
        .position(|user| &user.identity == identity)
        .map(|index| index as u32 + 1)
}

/// Dedup by identity, then stable-sort by points descending.
fn sort_snapshot(snapshot: &[UserProgress]) -> Vec<UserProgress> {
    let mut ordered: Vec<UserProgress> = Vec::with_capacity(snapshot.len());
    let mut positions: HashMap<UserId, usize> = HashMap::with_capacity(snapshot.len());

    for record in snapshot {
        match positions.get(&record.identity) {
            Some(&index) => {
                warn!(identity = %record.identity, "duplicate identity in snapshot, keeping latest record");
                ordered[index] = record.clone();
            }
            None => {
                positions.insert(record.identity.clone(), ordered.len());
                ordered.push(record.clone());
            }
        }
    }

    // Vec::sort_by is stable, which is what preserves the tie policy.
    ordered.sort_by(|a, b| b.points.cmp(&a.points));
    ordered
}

/// Persisted ranks from an earlier snapshot, the only legitimate source
/// of trend arrows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankSnapshot {
    ranks: HashMap<UserId, u32>,
}

impl RankSnapshot {
    /// Capture the full ranking of a snapshot (never just the top-N, so
    /// entries moving across the cutoff still get a correct trend).
    pub fn capture(snapshot: &[UserProgress]) -> Self {
        let ranks = sort_snapshot(snapshot)
            .into_iter()
            .enumerate()
            .map(|(index, user)| (user.identity, index as u32 + 1))
            .collect();
        Self { ranks }
    }

    pub fn from_ranks(ranks: impl IntoIterator<Item = (UserId, u32)>) -> Self {
        Self {
            ranks: ranks.into_iter().collect(),
        }
    }

    pub fn rank_of(&self, identity: &UserId) -> Option<u32> {
        self.ranks.get(identity).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UserId, u32)> {
        self.ranks.iter().map(|(identity, rank)| (identity, *rank))
    }
}

/// Fill in trend arrows by comparing against a prior snapshot.
///
/// Entries absent from the prior snapshot stay `None` (new arrivals have
/// no history; nothing is fabricated for them).
pub fn apply_trend(entries: &mut [LeaderboardEntry], prior: &RankSnapshot) {
    for entry in entries {
        entry.trend = prior.rank_of(&entry.user.identity).map(|previous| {
            if entry.rank < previous {
                Trend::Up
            } else if entry.rank > previous {
                Trend::Down
            } else {
                Trend::Flat
            }
        });
    }
}
