//! Challenges command implementation

use anyhow::Result;
use tracing::warn;

use ecolens::config::Config;
use ecolens::progress::{self, ChallengeStatus};
use ecolens::store::ProgressStore;

use super::open_store;
use super::profile::resolve_record;

/// Print challenge progress for the given (or configured) identity.
pub async fn challenges_command(config: &Config, identity: Option<String>) -> Result<()> {
    let identity = identity.or_else(|| config.identity.clone());
    let store = open_store(config);

    let record = resolve_record(store.as_ref(), identity.as_deref()).await;

    let catalog = match &store {
        Some(store) => match store.fetch_challenge_catalog().await {
            Ok(catalog) => catalog,
            Err(err) => {
                warn!(error = %err, "challenge catalog unavailable, using defaults");
                Vec::new()
            }
        },
        None => Vec::new(),
    };
    let catalog = if catalog.is_empty() {
        progress::default_challenges()
    } else {
        catalog
    };

    let statuses = progress::challenge_progress(&record, &catalog);
    println!("Challenges for {}\n", record.display_label());
    for status in &statuses {
        print_challenge(status);
    }

    Ok(())
}

fn print_challenge(status: &ChallengeStatus) {
    let marker = if status.completed { "[x]" } else { "[ ]" };
    println!("{} {} (+{} points)", marker, status.challenge.title, status.challenge.reward_points);
    println!("    {}", status.challenge.description);
    println!(
        "    {}/{} completed - {}%",
        status.current_progress, status.challenge.target_value, status.percent
    );
    println!("    [{}]", bar(status.percent));
    if let Some(expires_at) = status.challenge.expires_at {
        let left = expires_at - chrono::Utc::now();
        if left.num_seconds() > 0 {
            println!("    {} days left", left.num_days().max(1));
        } else {
            println!("    expired");
        }
    }
}

/// Twenty-cell progress bar.
fn bar(percent: u8) -> String {
    let filled = (percent as usize * 20) / 100;
    let mut out = String::with_capacity(20);
    for i in 0..20 {
        out.push(if i < filled { '#' } else { '.' });
    }
    out
}
