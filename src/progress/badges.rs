//! Badge catalog and unlock evaluation

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::UserProgress;

/// Catalog entry: a threshold predicate over one counter field.
///
/// Catalogs may be loaded from an external document, so fields are owned
/// strings rather than statics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Canonical counter field name (see [`UserProgress::counter`]). A
    /// name that does not resolve to a counter is not malformed: such
    /// badges are awarded externally, and display falls back to the
    /// stored unlock set.
    pub field: String,
    pub threshold: u64,
}

impl BadgeDefinition {
    fn new(id: &str, name: &str, description: &str, field: &str, threshold: u64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            field: field.to_string(),
            threshold,
        }
    }
}

/// Evaluated display state for one badge.
#[derive(Debug, Clone, Serialize)]
pub struct BadgeStatus {
    pub badge: BadgeDefinition,
    pub earned: bool,
    /// Counter value the decision was based on (0 when the field did not
    /// resolve).
    pub current_value: u64,
    /// Fraction of the threshold reached, clamped to [0, 1]. Always 1.0
    /// for earned badges.
    pub progress_fraction: f64,
}

/// Evaluate every catalog entry against one progress record.
///
/// Output order matches catalog order. The counters are the source of
/// truth wherever they resolve; the stored `badges` set only decides
/// entries whose field is not a counter. A malformed definition (empty
/// field or zero threshold) is skipped with a warning so one bad catalog
/// entry cannot blank the whole panel.
pub fn evaluate(progress: &UserProgress, catalog: &[BadgeDefinition]) -> Vec<BadgeStatus> {
    let mut statuses = Vec::with_capacity(catalog.len());

    for badge in catalog {
        if badge.field.trim().is_empty() || badge.threshold == 0 {
            warn!(badge = %badge.id, "skipping malformed badge definition");
            continue;
        }

        let (earned, current_value) = match progress.counter(&badge.field) {
            Some(value) => (value >= badge.threshold, value),
            None => (progress.badges.contains(&badge.id), 0),
        };

        let progress_fraction = if earned {
            1.0
        } else {
            (current_value as f64 / badge.threshold as f64).clamp(0.0, 1.0)
        };

        statuses.push(BadgeStatus {
            badge: badge.clone(),
            earned,
            current_value,
            progress_fraction,
        });
    }

    statuses
}

/// The built-in twelve-badge catalog.
///
/// `top-contributor`, `speed-demon`, `global-guardian` and `legendary`
/// key off conditions that are not stored counters (rank, per-day and
/// per-country tallies); those unlock through the stored badge set.
static BUILTIN_BADGES: Lazy<Vec<BadgeDefinition>> = Lazy::new(|| {
    vec![
        BadgeDefinition::new(
            "first-report",
            "First Report",
            "Submit your first report",
            "totalReports",
            1,
        ),
        BadgeDefinition::new("eco-warrior", "Eco Warrior", "Report 10 sites", "totalReports", 10),
        BadgeDefinition::new(
            "top-contributor",
            "Top Contributor",
            "Reach top 100",
            "globalRank",
            100,
        ),
        BadgeDefinition::new(
            "carbon-detective",
            "Carbon Detective",
            "Find 5 violations",
            "verifiedReports",
            5,
        ),
        BadgeDefinition::new(
            "satellite-master",
            "Satellite Master",
            "Analyze 50 sites",
            "totalReports",
            50,
        ),
        BadgeDefinition::new("week-streak", "Week Streak", "7 day streak", "longestStreak", 7),
        BadgeDefinition::new("month-streak", "Month Streak", "30 day streak", "longestStreak", 30),
        BadgeDefinition::new(
            "team-player",
            "Team Player",
            "Verify 20 reports",
            "verifiedReports",
            20,
        ),
        BadgeDefinition::new(
            "accuracy-ace",
            "Accuracy Ace",
            "95%+ accuracy",
            "accuracyPercent",
            95,
        ),
        BadgeDefinition::new(
            "speed-demon",
            "Speed Demon",
            "10 reports in 1 day",
            "reportsToday",
            10,
        ),
        BadgeDefinition::new(
            "global-guardian",
            "Global Guardian",
            "Report from 10 countries",
            "countriesReported",
            10,
        ),
        BadgeDefinition::new("legendary", "Legendary", "Reach rank #1", "globalRank", 1),
    ]
});

/// The built-in catalog as a slice.
pub fn builtin_badges() -> &'static [BadgeDefinition] {
    &BUILTIN_BADGES
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;

    fn progress_with_reports(total: u64) -> UserProgress {
        let mut progress = UserProgress::new(UserId::from("tester"));
        progress.total_reports = total;
        progress
    }

    fn report_badge(threshold: u64) -> BadgeDefinition {
        BadgeDefinition::new("eco-warrior", "Eco Warrior", "Report sites", "totalReports", threshold)
    }

    #[test]
    fn test_partial_progress_fraction() {
        let progress = progress_with_reports(7);
        let statuses = evaluate(&progress, &[report_badge(10)]);

        assert_eq!(statuses.len(), 1);
        assert!(!statuses[0].earned);
        assert_eq!(statuses[0].current_value, 7);
        assert!((statuses[0].progress_fraction - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_counter_beats_stored_set() {
        // Counter says earned even though the stored set is empty.
        let progress = progress_with_reports(12);
        let statuses = evaluate(&progress, &[report_badge(10)]);
        assert!(statuses[0].earned);
        assert_eq!(statuses[0].progress_fraction, 1.0);

        // And the stored set cannot resurrect a badge the counter denies.
        let mut stale = progress_with_reports(3);
        stale.badges = vec!["eco-warrior".to_string()];
        let statuses = evaluate(&stale, &[report_badge(10)]);
        assert!(!statuses[0].earned);
    }

    #[test]
    fn test_unresolvable_field_falls_back_to_stored_set() {
        let badge = BadgeDefinition::new(
            "top-contributor",
            "Top Contributor",
            "Reach top 100",
            "globalRank",
            100,
        );

        let unranked = progress_with_reports(40);
        let statuses = evaluate(&unranked, &[badge.clone()]);
        assert!(!statuses[0].earned);
        assert_eq!(statuses[0].current_value, 0);
        assert_eq!(statuses[0].progress_fraction, 0.0);

        let mut ranked = progress_with_reports(40);
        ranked.badges = vec!["top-contributor".to_string()];
        let statuses = evaluate(&ranked, &[badge]);
        assert!(statuses[0].earned);
    }

    #[test]
    fn test_malformed_definitions_are_skipped() {
        let malformed_field = BadgeDefinition::new("broken-a", "Broken", "", "", 5);
        let malformed_threshold =
            BadgeDefinition::new("broken-b", "Broken", "", "totalReports", 0);
        let valid = report_badge(10);

        let progress = progress_with_reports(12);
        let statuses = evaluate(
            &progress,
            &[malformed_field, valid, malformed_threshold],
        );

        // The two malformed entries are dropped; the valid one survives.
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].badge.id, "eco-warrior");
        assert!(statuses[0].earned);
    }

    #[test]
    fn test_output_order_matches_catalog_order() {
        let mut progress = progress_with_reports(60);
        progress.longest_streak = 30;
        let statuses = evaluate(&progress, builtin_badges());

        let ids: Vec<&str> = statuses.iter().map(|s| s.badge.id.as_str()).collect();
        let expected: Vec<&str> = builtin_badges().iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_fraction_always_within_unit_interval() {
        let mut progress = progress_with_reports(5_000);
        progress.verified_reports = 4_999;
        progress.longest_streak = 365;

        for status in evaluate(&progress, builtin_badges()) {
            assert!((0.0..=1.0).contains(&status.progress_fraction));
            if status.current_value >= status.badge.threshold {
                assert!(status.earned);
            }
        }
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let progress = progress_with_reports(7);
        let first = evaluate(&progress, builtin_badges());
        let second = evaluate(&progress, builtin_badges());

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.earned, b.earned);
            assert_eq!(a.current_value, b.current_value);
            assert_eq!(a.progress_fraction, b.progress_fraction);
        }
    }
}
