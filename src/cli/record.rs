//! Record command implementation

use anyhow::{bail, Result};

use ecolens::config::Config;
use ecolens::domain::{format_number, ProgressDelta, UserId};
use ecolens::store::ProgressStore;

use super::open_store_strict;

/// Apply a progress delta for an identity and print the updated record.
///
/// This is the write path the report-submission and verification events
/// go through; unlike the read commands it fails loudly when the store
/// is unreachable.
#[allow(clippy::too_many_arguments)]
pub async fn record_command(
    config: &Config,
    identity: Option<String>,
    reports: u64,
    verified: u64,
    rejected: u64,
    points: u64,
    streak: Option<u64>,
    badges: Vec<String>,
) -> Result<()> {
    let Some(identity) = identity.or_else(|| config.identity.clone()) else {
        bail!("No identity given and none configured (set `identity` in config.toml)");
    };

    let delta = ProgressDelta {
        points,
        reports,
        verified,
        rejected,
        streak,
        grant_badges: badges,
        ..Default::default()
    };
    if delta.is_empty() {
        bail!("Nothing to record (pass --reports, --verified, --points, ...)");
    }

    let store = open_store_strict(config)?;
    let record = store.apply_delta(&UserId::from(identity.as_str()), &delta).await?;

    println!("Recorded activity for {}", record.display_label());
    println!(
        "  points: {}  reports: {} ({} pending)  streak: {} days",
        format_number(record.points),
        record.total_reports,
        record.pending_reports,
        record.current_streak,
    );

    Ok(())
}
