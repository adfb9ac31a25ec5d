//! Profile command implementation

use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use ecolens::board;
use ecolens::config::Config;
use ecolens::defaults;
use ecolens::domain::{format_number, format_time_ago, UserId, UserProgress};
use ecolens::progress::{self, BadgeStatus};
use ecolens::store::{ProgressStore, SqliteStore, SNAPSHOT_CEILING};

use super::open_store;

/// Print a contributor profile: stats card plus the badge grid.
pub async fn profile_command(config: &Config, identity: Option<String>) -> Result<()> {
    let identity = identity.or_else(|| config.identity.clone());
    let store = open_store(config);

    let record = resolve_record(store.as_ref(), identity.as_deref()).await;
    let rank = match &store {
        Some(store) => match store.fetch_leaderboard_snapshot(SNAPSHOT_CEILING).await {
            Ok(snapshot) => board::find_rank(&snapshot, &record.identity),
            Err(err) => {
                warn!(error = %err, "snapshot unavailable, rank omitted");
                None
            }
        },
        None => None,
    };

    print_profile(&record, rank);
    print_badges(&progress::evaluate(&record, progress::builtin_badges()));

    Ok(())
}

/// The record to display: the requested identity (zeroed default when
/// new), or the demo profile when anonymous or the store is down.
pub(crate) async fn resolve_record(
    store: Option<&SqliteStore>,
    identity: Option<&str>,
) -> UserProgress {
    match (identity, store) {
        (Some(identity), Some(store)) => {
            let identity = UserId::from(identity);
            match store.fetch_or_default(&identity).await {
                Ok(record) => record,
                Err(err) => {
                    warn!(error = %err, "profile unavailable, showing demo profile");
                    defaults::demo_profile()
                }
            }
        }
        // Store is down: degrade rather than erroring out.
        (Some(_), None) => defaults::demo_profile(),
        (None, _) => {
            info!("no signed-in identity, showing demo profile");
            defaults::demo_profile()
        }
    }
}

fn print_profile(record: &UserProgress, rank: Option<u32>) {
    println!("{}", record.display_label());
    println!("  identity:     {}", record.identity);
    println!("  points:       {}", format_number(record.points));
    match rank {
        Some(rank) => println!("  global rank:  #{rank}"),
        None => println!("  global rank:  --"),
    }
    println!(
        "  reports:      {} total / {} verified / {} pending / {} rejected",
        record.total_reports,
        record.verified_reports,
        record.pending_reports,
        record.rejected_reports,
    );
    if let Some(accuracy) = record.accuracy_percent() {
        println!("  accuracy:     {accuracy}%");
    }
    println!(
        "  streak:       {} days (best {})",
        record.current_streak, record.longest_streak
    );
    println!(
        "  last active:  {}",
        format_time_ago(record.last_active, Utc::now())
    );
}

fn print_badges(statuses: &[BadgeStatus]) {
    let earned = statuses.iter().filter(|s| s.earned).count();
    println!("\nBadges ({earned}/{})", statuses.len());
    for status in statuses {
        if status.earned {
            println!("  [x] {:<18} {}", status.badge.name, status.badge.description);
        } else {
            let percent = (status.progress_fraction * 100.0).round() as u32;
            println!(
                "  [ ] {:<18} {} ({percent}%)",
                status.badge.name, status.badge.description
            );
        }
    }
}
