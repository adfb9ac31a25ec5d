use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use ecolens::config::Config;
use ecolens::defaults::Period;

mod cli;

#[derive(Parser)]
#[command(name = "ecolens")]
#[command(about = "EcoLens - crowdsourced environmental monitoring dashboard")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.ecolens/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the leaderboard (podium + table)
    Leaderboard {
        /// How many rows to show
        #[arg(long)]
        limit: Option<usize>,

        /// Time window: all, month or week
        #[arg(long, default_value = "all")]
        period: Period,
    },

    /// Show a contributor profile with badge progress
    Profile {
        /// Identity to show (defaults to the configured one)
        identity: Option<String>,
    },

    /// Show challenge progress
    Challenges {
        /// Identity to show (defaults to the configured one)
        identity: Option<String>,
    },

    /// Record report and verification activity for an identity
    Record {
        /// Identity to update (defaults to the configured one)
        identity: Option<String>,

        /// Newly submitted reports
        #[arg(long, default_value_t = 0)]
        reports: u64,

        /// Pending reports that were verified
        #[arg(long, default_value_t = 0)]
        verified: u64,

        /// Pending reports that were rejected
        #[arg(long, default_value_t = 0)]
        rejected: u64,

        /// Points to award
        #[arg(long, default_value_t = 0)]
        points: u64,

        /// Observed daily streak length
        #[arg(long)]
        streak: Option<u64>,

        /// Badge ids to grant (repeatable)
        #[arg(long = "badge")]
        badges: Vec<String>,
    },

    /// Initialize a new ~/.ecolens/config.toml configuration file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Leaderboard { limit, period }) => {
            let limit = limit.unwrap_or(config.leaderboard_limit);
            cli::leaderboard::leaderboard_command(&config, limit, period).await?;
        }
        Some(Commands::Profile { identity }) => {
            cli::profile::profile_command(&config, identity).await?;
        }
        Some(Commands::Challenges { identity }) => {
            cli::challenges::challenges_command(&config, identity).await?;
        }
        Some(Commands::Record {
            identity,
            reports,
            verified,
            rejected,
            points,
            streak,
            badges,
        }) => {
            cli::record::record_command(
                &config, identity, reports, verified, rejected, points, streak, badges,
            )
            .await?;
        }
        Some(Commands::Init { force }) => {
            cli::init::init_command(cli.config.as_deref(), force)?;
        }
        None => {
            let limit = config.leaderboard_limit;
            cli::leaderboard::leaderboard_command(&config, limit, Period::AllTime).await?;
        }
    }

    Ok(())
}
