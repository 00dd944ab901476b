//! CLI argument definitions for fxbulletin.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rates` | Fetch today's rates for a list of currency codes |
//! | `bulletin` | Fetch and print the whole parsed bulletin |
//! | `parse` | Parse a bulletin stored in a local file |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `table` | Output format (table, json) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--timeout-ms` | config | Overall fetch budget in ms |
//! | `--retries` | config | Total fetch attempts |
//! | `--base-url` | config | Bulletin host |
//! | `--log-level` | `warn` | Log filter when `RUST_LOG` is unset |
//! | `--log-json` | `false` | Emit logs as JSON lines |
//!
//! # Examples
//!
//! ```bash
//! # Rates for the default currency list
//! fxbulletin rates
//!
//! # Selected currencies as JSON
//! fxbulletin rates usd eur --format json --pretty
//!
//! # Re-serialize today's bulletin
//! fxbulletin bulletin --raw
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Currencies requested by `rates` when none are given.
pub const DEFAULT_CODES: [&str; 9] = ["USD", "EUR", "CZK", "JPY", "KES", "RUB", "THB", "TRY", "XYZ"];

/// Daily exchange-rate bulletin client
#[derive(Debug, Parser)]
#[command(
    name = "fxbulletin",
    author,
    version,
    about = "Daily exchange-rate bulletin client",
    long_about = "Fetches the central bank's daily exchange-rate bulletin, validates its \
format and prints rates against the quote currency.\n\
\n\
Configuration is read from FXBULLETIN_* environment variables (a .env file is \
loaded if present); command-line flags take precedence."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Overall fetch budget in milliseconds, retries included.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Total fetch attempts (1 disables retrying).
    #[arg(long, global = true)]
    pub retries: Option<u32>,

    /// Bulletin host, e.g. https://www.cnb.cz
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true, default_value_t = false)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines.
    Table,
    /// Single JSON object.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch rates for the given currency codes.
    Rates(RatesArgs),
    /// Fetch and print the whole bulletin.
    Bulletin(BulletinArgs),
    /// Parse a bulletin from a local file.
    Parse(ParseArgs),
}

#[derive(Debug, Args)]
pub struct RatesArgs {
    /// 3-letter currency codes, case-insensitive.
    pub codes: Vec<String>,
}

impl RatesArgs {
    pub fn requested_codes(&self) -> Vec<String> {
        if self.codes.is_empty() {
            DEFAULT_CODES.iter().map(|code| (*code).to_owned()).collect()
        } else {
            self.codes.clone()
        }
    }
}

#[derive(Debug, Args)]
pub struct BulletinArgs {
    /// Print the bulletin re-serialized in its upstream text format.
    #[arg(long, default_value_t = false)]
    pub raw: bool,
}

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Path to a bulletin text file.
    pub file: PathBuf,

    /// Print the bulletin re-serialized in its upstream text format.
    #[arg(long, default_value_t = false)]
    pub raw: bool,
}
