use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identity key for a registered contributor.
///
/// Issued by the session provider (the hosted auth service); the rest of
/// the system never inspects it beyond equality and display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for UserId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// One contributor's cumulative progress record.
///
/// This is the `users` collection document; field names on the wire stay
/// camelCase for interoperability with existing stored data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub identity: UserId,

    /// Human-readable label; [`UserProgress::display_label`] derives one
    /// when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Awarded for verified contributions; never decreases.
    #[serde(default)]
    pub points: u64,

    #[serde(default)]
    pub total_reports: u64,
    #[serde(default)]
    pub verified_reports: u64,
    #[serde(default)]
    pub rejected_reports: u64,
    #[serde(default)]
    pub pending_reports: u64,

    /// Invariant: `current_streak <= longest_streak` after every update.
    #[serde(default)]
    pub current_streak: u64,
    #[serde(default)]
    pub longest_streak: u64,

    /// Unlock cache / audit trail. Badge display recomputes from the
    /// counters wherever they resolve; this set only decides badges whose
    /// condition is not a stored counter.
    #[serde(default)]
    pub badges: Vec<String>,

    /// Per-challenge progress keyed by challenge id.
    #[serde(default)]
    pub challenge_progress: HashMap<String, u64>,

    /// Display only ("time ago"); never used for ranking.
    #[serde(default = "Utc::now")]
    pub last_active: DateTime<Utc>,
}

impl UserProgress {
    /// Zeroed record, synthesized at first sign-in or on NotFound.
    pub fn new(identity: UserId) -> Self {
        Self {
            identity,
            display_name: None,
            points: 0,
            total_reports: 0,
            verified_reports: 0,
            rejected_reports: 0,
            pending_reports: 0,
            current_streak: 0,
            longest_streak: 0,
            badges: Vec::new(),
            challenge_progress: HashMap::new(),
            last_active: Utc::now(),
        }
    }

    /// Display name, falling back to a label derived from the identity
    /// (local part of an email-shaped key) and finally to "User".
    pub fn display_label(&self) -> String {
        if let Some(name) = &self.display_name {
            if !name.trim().is_empty() {
                return name.clone();
            }
        }
        match self.identity.as_str().split_once('@') {
            Some((local, _)) if !local.is_empty() => local.to_string(),
            _ => "User".to_string(),
        }
    }

    /// Up to two uppercase initials for avatar rendering.
    pub fn initials(&self) -> String {
        self.display_label()
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(|c| c.to_uppercase())
            .collect()
    }

    pub fn badge_count(&self) -> u64 {
        self.badges.len() as u64
    }

    /// Verification accuracy in percent; `None` until at least one report
    /// has been resolved either way.
    pub fn accuracy_percent(&self) -> Option<u64> {
        let resolved = self.verified_reports + self.rejected_reports;
        if resolved == 0 {
            return None;
        }
        Some(self.verified_reports * 100 / resolved)
    }

    /// Resolve a canonical counter field name to its current value.
    ///
    /// Unknown names return `None`; badge evaluation uses that to fall
    /// back to the stored unlock set.
    pub fn counter(&self, field: &str) -> Option<u64> {
        match field {
            "points" => Some(self.points),
            "totalReports" => Some(self.total_reports),
            "verifiedReports" => Some(self.verified_reports),
            "rejectedReports" => Some(self.rejected_reports),
            "pendingReports" => Some(self.pending_reports),
            "currentStreak" => Some(self.current_streak),
            "longestStreak" => Some(self.longest_streak),
            "badgeCount" => Some(self.badge_count()),
            "accuracyPercent" => self.accuracy_percent(),
            _ => None,
        }
    }
}

/// Additive update to one progress record.
///
/// Produced by report-submission and verification events; the store
/// applies it atomically. Counters only ever move forward.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressDelta {
    /// Points to award.
    pub points: u64,
    /// Newly submitted reports (enter the pending pool).
    pub reports: u64,
    /// Pending reports that were verified.
    pub verified: u64,
    /// Pending reports that were rejected.
    pub rejected: u64,
    /// Observed current streak length, when the event carries one.
    pub streak: Option<u64>,
    /// Badge ids to add to the unlock cache.
    pub grant_badges: Vec<String>,
    /// Explicit challenge progress updates keyed by challenge id.
    pub challenge_progress: HashMap<String, u64>,
}

impl ProgressDelta {
    pub fn is_empty(&self) -> bool {
        self.points == 0
            && self.reports == 0
            && self.verified == 0
            && self.rejected == 0
            && self.streak.is_none()
            && self.grant_badges.is_empty()
            && self.challenge_progress.is_empty()
    }

    /// Fold this delta into a record, re-establishing the streak
    /// invariant and refreshing the activity timestamp.
    pub fn apply(&self, record: &mut UserProgress) {
        record.points += self.points;
        record.total_reports += self.reports;
        record.pending_reports += self.reports;

        let resolved = self.verified + self.rejected;
        record.verified_reports += self.verified;
        record.rejected_reports += self.rejected;
        record.pending_reports = record.pending_reports.saturating_sub(resolved);

        if let Some(streak) = self.streak {
            record.current_streak = streak;
            record.longest_streak = record.longest_streak.max(streak);
        }

        for badge in &self.grant_badges {
            if !record.badges.contains(badge) {
                record.badges.push(badge.clone());
            }
        }

        for (challenge, progress) in &self.challenge_progress {
            let entry = record.challenge_progress.entry(challenge.clone()).or_insert(0);
            *entry = (*entry).max(*progress);
        }

        record.last_active = Utc::now();
    }
}
