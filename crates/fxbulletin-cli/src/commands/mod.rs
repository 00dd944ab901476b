mod bulletin;
mod parse;
mod rates;

use std::time::Duration;

use fxbulletin_core::{DailyBulletin, ProviderConfig, RateProvider};
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// What a command produced, ready for [`crate::output::render`].
pub struct CommandResult {
    pub data: Value,
    /// Lines printed in table format.
    pub lines: Vec<String>,
    /// Printed verbatim regardless of format.
    pub raw: Option<String>,
    pub warnings: Vec<String>,
}

impl CommandResult {
    pub fn ok(data: Value, lines: Vec<String>) -> Self {
        Self {
            data,
            lines,
            raw: None,
            warnings: Vec::new(),
        }
    }

    pub fn raw(text: String) -> Self {
        Self {
            data: Value::Null,
            lines: Vec::new(),
            raw: Some(text),
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

pub async fn run(cli: &Cli, cancel: &CancellationToken) -> Result<CommandResult, CliError> {
    match &cli.command {
        Command::Rates(args) => rates::run(args, &provider(cli)?, cancel).await,
        Command::Bulletin(args) => bulletin::run(args, &provider(cli)?, cancel).await,
        Command::Parse(args) => parse::run(args).await,
    }
}

fn provider(cli: &Cli) -> Result<RateProvider, CliError> {
    Ok(RateProvider::from_config(&provider_config(cli)?)?)
}

/// Environment-derived configuration with command-line overrides applied.
fn provider_config(cli: &Cli) -> Result<ProviderConfig, CliError> {
    let mut config = ProviderConfig::from_env()?;
    apply_overrides(&mut config, cli);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(config: &mut ProviderConfig, cli: &Cli) {
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.timeout = Duration::from_millis(timeout_ms);
    }
    if let Some(retries) = cli.retries {
        config.retry.max_attempts = retries;
    }
}

#[derive(Debug, Serialize)]
struct BulletinData<'a> {
    bulletin: &'a DailyBulletin,
}

/// Shared rendering for `bulletin` and `parse`.
fn bulletin_result(bulletin: &DailyBulletin, raw: bool) -> Result<CommandResult, CliError> {
    if raw {
        return Ok(CommandResult::raw(bulletin.to_text()));
    }

    let mut lines = vec![bulletin.header_line()];
    lines.extend(bulletin.records.iter().map(|record| {
        format!(
            "{:<20} {:<12} {:>6} {:<3} {:>10}",
            record.country, record.currency_name, record.amount, record.code, record.rate
        )
    }));
    lines.push(format!("{} records", bulletin.records.len()));

    let data = serde_json::to_value(BulletinData { bulletin })?;
    Ok(CommandResult::ok(data, lines))
}
