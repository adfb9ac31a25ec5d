//! Fallback data provider
//!
//! One documented source of default data per entity type, used whenever
//! the store is unreachable or empty: the product degrades to plausible
//! demo data instead of an empty or error screen. The generated values
//! reproduce the reference demo dataset and are fully deterministic (no
//! random trends; see the board module for how trends are actually
//! derived).

use std::fmt;
use std::str::FromStr;

use crate::domain::{UserId, UserProgress};
use crate::progress;

/// Leaderboard time window. Filtering happens store-side; here it only
/// scales the demo dataset the way the reference did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    #[default]
    AllTime,
    Month,
    Week,
}

impl Period {
    fn multiplier(&self) -> f64 {
        match self {
            Self::AllTime => 1.0,
            Self::Month => 0.6,
            Self::Week => 0.3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::AllTime => "All Time",
            Self::Month => "This Month",
            Self::Week => "This Week",
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::AllTime),
            "month" => Ok(Self::Month),
            "week" => Ok(Self::Week),
            other => Err(format!("unknown period '{other}' (expected all, month or week)")),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AllTime => "all",
            Self::Month => "month",
            Self::Week => "week",
        };
        f.write_str(s)
    }
}

/// Contributor roster for the demo leaderboard.
const ROSTER: &[&str] = &[
    "Arjun Kumar",
    "Priya Sharma",
    "Rahul Verma",
    "Ananya Patel",
    "Rohan Singh",
    "Sneha Reddy",
    "Vikram Joshi",
    "Divya Gupta",
    "Amit Desai",
    "Kavya Iyer",
    "Siddharth Roy",
    "Meera Nair",
    "Aditya Mehta",
    "Pooja Shah",
    "Karthik Rao",
    "Lakshmi Pillai",
    "Nikhil Malhotra",
    "Anjali Bose",
    "Varun Kapoor",
    "Riya Das",
    "Suresh Kumar",
    "Deepika Singh",
    "Manish Agarwal",
    "Swati Menon",
    "Rajesh Pandey",
];

fn slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// Fifty demo leaders, points strictly descending within a period.
pub fn demo_leaders(period: Period) -> Vec<UserProgress> {
    let m = period.multiplier();
    let catalog = progress::builtin_badges();

    (0..50usize)
        .map(|i| {
            let name = ROSTER[i % ROSTER.len()];
            let generation = i / ROSTER.len();
            let (display_name, identity) = if generation == 0 {
                (name.to_string(), slug(name))
            } else {
                (
                    format!("{} {}", name, generation + 1),
                    format!("{}-{}", slug(name), generation + 1),
                )
            };

            let points = ((5000 - i as i64 * 80) as f64 * m).floor() as u64;
            let reports = ((150 - i as i64 * 2) as f64 * m).floor() as u64;
            let badge_count = (reports / 10).min(8) as usize;

            let mut record = UserProgress::new(UserId::new(identity));
            record.display_name = Some(display_name);
            record.points = points;
            record.total_reports = reports;
            record.verified_reports = reports;
            record.badges = catalog
                .iter()
                .take(badge_count)
                .map(|badge| badge.id.clone())
                .collect();
            record
        })
        .collect()
}

/// The reference demo profile shown to signed-out visitors.
pub fn demo_profile() -> UserProgress {
    let mut record = UserProgress::new(UserId::from("demo-user"));
    record.display_name = Some("Demo User".to_string());
    record.points = 1250;
    record.total_reports = 47;
    record.verified_reports = 38;
    record.pending_reports = 9;
    record.current_streak = 5;
    record.longest_streak = 30;
    record.badges = vec![
        "first-report".to_string(),
        "eco-warrior".to_string(),
        "top-contributor".to_string(),
        "carbon-detective".to_string(),
        "satellite-master".to_string(),
        "week-streak".to_string(),
        "month-streak".to_string(),
        "team-player".to_string(),
    ];
    for (challenge, progress) in [
        ("weekly-warrior", 7),
        ("carbon-detective", 3),
        ("early-bird", 5),
        ("team-player", 9),
    ] {
        record.challenge_progress.insert(challenge.to_string(), progress);
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_leaders_shape() {
        let leaders = demo_leaders(Period::AllTime);
        assert_eq!(leaders.len(), 50);
        assert_eq!(leaders[0].points, 5000);
        assert_eq!(leaders[0].total_reports, 150);

        for pair in leaders.windows(2) {
            assert!(pair[0].points > pair[1].points);
        }
        for leader in &leaders {
            assert!(leader.badges.len() <= 8);
            assert!(
                leader.verified_reports + leader.rejected_reports + leader.pending_reports
                    <= leader.total_reports
            );
        }
    }

    #[test]
    fn test_demo_leaders_identities_unique() {
        let leaders = demo_leaders(Period::AllTime);
        let mut identities: Vec<&str> =
            leaders.iter().map(|l| l.identity.as_str()).collect();
        identities.sort();
        identities.dedup();
        assert_eq!(identities.len(), 50);
    }

    #[test]
    fn test_period_scales_points_down() {
        let all = demo_leaders(Period::AllTime);
        let week = demo_leaders(Period::Week);
        assert_eq!(week[0].points, 1500); // 5000 * 0.3
        assert!(week[0].points < all[0].points);
    }

    #[test]
    fn test_demo_leaders_deterministic() {
        let first = demo_leaders(Period::Month);
        let second = demo_leaders(Period::Month);
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.identity, b.identity);
            assert_eq!(a.points, b.points);
        }
    }

    #[test]
    fn test_demo_profile_matches_reference() {
        let profile = demo_profile();
        assert_eq!(profile.points, 1250);
        assert_eq!(profile.total_reports, 47);
        assert_eq!(profile.verified_reports, 38);
        assert_eq!(profile.badges.len(), 8);
    }

    #[test]
    fn test_period_parsing() {
        assert_eq!("all".parse::<Period>().unwrap(), Period::AllTime);
        assert_eq!("week".parse::<Period>().unwrap(), Period::Week);
        assert!("fortnight".parse::<Period>().is_err());
    }
}
