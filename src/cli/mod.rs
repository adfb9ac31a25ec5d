//! CLI command implementations

pub mod challenges;
pub mod init;
pub mod leaderboard;
pub mod profile;
pub mod record;

use anyhow::Result;
use tracing::warn;

use ecolens::config::Config;
use ecolens::store::SqliteStore;

/// Open the local store, degrading to `None` (fallback data) when it
/// cannot be opened. Read commands never fail on store trouble.
pub(crate) fn open_store(config: &Config) -> Option<SqliteStore> {
    match SqliteStore::open(&config.store_path()) {
        Ok(store) => Some(store),
        Err(err) => {
            warn!(error = %err, "store unavailable, falling back to demo data");
            None
        }
    }
}

/// Open the local store for a write command; here failure is an error.
pub(crate) fn open_store_strict(config: &Config) -> Result<SqliteStore> {
    SqliteStore::open(&config.store_path())
}
