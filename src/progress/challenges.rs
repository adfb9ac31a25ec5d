//! Challenge definitions and progress resolution

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::UserProgress;

/// A time-boxed goal, either supplied by the challenge catalog in the
/// store or taken from the built-in default set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeDefinition {
    pub id: String,
    pub title: String,
    pub description: String,
    pub reward_points: u64,
    pub target_value: u64,
    /// Counter consulted when the per-user progress map carries no entry
    /// for this challenge (a "report 10 sites" challenge falls back to
    /// `totalReports`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ChallengeDefinition {
    fn new(
        id: &str,
        title: &str,
        description: &str,
        reward_points: u64,
        target_value: u64,
        fallback_field: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            reward_points,
            target_value,
            fallback_field: Some(fallback_field.to_string()),
            expires_at: None,
        }
    }
}

/// Resolved display state for one challenge.
#[derive(Debug, Clone, Serialize)]
pub struct ChallengeStatus {
    pub challenge: ChallengeDefinition,
    pub current_progress: u64,
    /// Whole percent, clamped to [0, 100] and rounded to nearest.
    pub percent: u8,
    pub completed: bool,
}

/// Resolve progress for each challenge against one record.
///
/// Resolution order: explicit entry in the record's progress map, then
/// the challenge's fallback counter, then 0.
pub fn challenge_progress(
    progress: &UserProgress,
    challenges: &[ChallengeDefinition],
) -> Vec<ChallengeStatus> {
    challenges
        .iter()
        .map(|challenge| {
            let current_progress = progress
                .challenge_progress
                .get(&challenge.id)
                .copied()
                .or_else(|| {
                    challenge
                        .fallback_field
                        .as_deref()
                        .and_then(|field| progress.counter(field))
                })
                .unwrap_or(0);

            let completed = current_progress >= challenge.target_value;
            let percent = if challenge.target_value == 0 {
                100
            } else {
                (current_progress as f64 / challenge.target_value as f64 * 100.0)
                    .round()
                    .clamp(0.0, 100.0) as u8
            };

            ChallengeStatus {
                challenge: challenge.clone(),
                current_progress,
                percent,
                completed,
            }
        })
        .collect()
}

/// The documented fallback set used when no challenge catalog is
/// available: four challenges derived purely from the user's own
/// counters (reports, verified count, streak, badge count).
pub fn default_challenges() -> Vec<ChallengeDefinition> {
    vec![
        ChallengeDefinition::new(
            "weekly-warrior",
            "Weekly Warrior",
            "Report 10 sites this week",
            500,
            10,
            "totalReports",
        ),
        ChallengeDefinition::new(
            "carbon-detective",
            "Carbon Detective",
            "Find 5 high-emission sites",
            750,
            5,
            "verifiedReports",
        ),
        ChallengeDefinition::new(
            "early-bird",
            "Early Bird",
            "Log in 7 days in a row",
            300,
            7,
            "currentStreak",
        ),
        ChallengeDefinition::new(
            "team-player",
            "Team Player",
            "Verify 15 community reports",
            600,
            15,
            "badgeCount",
        ),
    ]
}
