//! Init command implementation

use std::path::Path;

use anyhow::Result;

use ecolens::config::Config;

/// Write a starter configuration file.
pub fn init_command(path: Option<&Path>, force: bool) -> Result<()> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::default_path);
    Config::write_starter(&path, force)?;
    println!("Created {}", path.display());
    println!("Edit it to set your identity and store path.");
    Ok(())
}
