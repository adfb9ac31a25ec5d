//! Leaderboard command implementation

use anyhow::Result;
use tracing::{info, warn};

use ecolens::board::{self, LeaderboardEntry, RankSnapshot};
use ecolens::config::Config;
use ecolens::defaults::{self, Period};
use ecolens::domain::{format_number, UserId, UserProgress};
use ecolens::store::{ProgressStore, SqliteStore, SNAPSHOT_CEILING};

use super::open_store;

/// Fetch, rank and print the leaderboard, then persist the ranking so
/// the next invocation can show trends.
pub async fn leaderboard_command(config: &Config, limit: usize, period: Period) -> Result<()> {
    let store = open_store(config);
    let snapshot = load_snapshot(store.as_ref(), period).await;

    let mut entries = board::rank(&snapshot, limit);
    if let Some(store) = &store {
        match store.load_rank_snapshot() {
            Ok(Some(prior)) => board::apply_trend(&mut entries, &prior),
            Ok(None) => {}
            Err(err) => warn!(error = %err, "prior rank snapshot unreadable, trends omitted"),
        }
    }

    if entries.is_empty() {
        println!("No contributors yet.");
        return Ok(());
    }

    println!("Leaderboard - {}\n", period.label());
    print_podium(&entries);
    print_table(&entries);

    if let Some(identity) = &config.identity {
        let identity = UserId::from(identity.as_str());
        match board::find_rank(&snapshot, &identity) {
            Some(rank) => println!("\nYour rank: #{rank}"),
            None => println!("\nYou are not ranked yet - submit your first report!"),
        }
    }

    if let Some(store) = &store {
        if let Err(err) = store.save_rank_snapshot(&RankSnapshot::capture(&snapshot)) {
            warn!(error = %err, "failed to persist rank snapshot");
        }
    }

    Ok(())
}

/// Full collection snapshot, falling back to the demo dataset when the
/// store is unreachable or empty.
async fn load_snapshot(store: Option<&SqliteStore>, period: Period) -> Vec<UserProgress> {
    match store {
        Some(store) => match store.fetch_leaderboard_snapshot(SNAPSHOT_CEILING).await {
            Ok(records) if !records.is_empty() => records,
            Ok(_) => {
                info!("store is empty, showing demo leaderboard");
                defaults::demo_leaders(period)
            }
            Err(err) => {
                warn!(error = %err, "leaderboard unavailable, showing demo data");
                defaults::demo_leaders(period)
            }
        },
        None => defaults::demo_leaders(period),
    }
}

fn print_podium(entries: &[LeaderboardEntry]) {
    const MEDALS: &[&str] = &["🥇", "🥈", "🥉"];
    for (medal, entry) in MEDALS.iter().zip(entries.iter()) {
        println!(
            "  {} {} - {} points ({} reports, {} badges)",
            medal,
            entry.user.display_label(),
            format_number(entry.user.points),
            entry.user.total_reports,
            entry.user.badge_count(),
        );
    }
    println!();
}

fn print_table(entries: &[LeaderboardEntry]) {
    println!(
        "{:>5}  {:<24} {:>10} {:>9}  {}",
        "Rank", "Contributor", "Points", "Reports", "Trend"
    );
    for entry in entries {
        let trend = entry.trend.map(|t| t.arrow()).unwrap_or("-");
        println!(
            "{:>5}  {:<24} {:>10} {:>9}  {}",
            format!("#{}", entry.rank),
            entry.user.display_label(),
            format_number(entry.user.points),
            entry.user.total_reports,
            trend,
        );
    }
}
