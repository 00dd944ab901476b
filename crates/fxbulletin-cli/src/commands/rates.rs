use fxbulletin_core::{Currency, ExchangeRate, RateProvider};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::cli::RatesArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct RatesResponseData<'a> {
    quote_currency: &'a Currency,
    requested: &'a [Currency],
    rates: &'a [ExchangeRate],
    missing: Vec<&'a Currency>,
}

pub async fn run(
    args: &RatesArgs,
    provider: &RateProvider,
    cancel: &CancellationToken,
) -> Result<CommandResult, CliError> {
    let requested = args
        .requested_codes()
        .iter()
        .map(|raw| Currency::parse(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let rates = provider.get_rates(&requested, cancel).await?;
    let missing = missing_currencies(&requested, &rates);

    let mut lines = vec![format!(
        "Retrieved {} of {} requested exchange rates:",
        rates.len(),
        requested.len()
    )];
    lines.extend(rates.iter().map(ToString::to_string));

    let warnings = missing
        .iter()
        .map(|currency| format!("no rate published for {currency}"))
        .collect();

    let data = serde_json::to_value(RatesResponseData {
        quote_currency: provider.quote_currency(),
        requested: &requested,
        rates: &rates,
        missing,
    })?;

    Ok(CommandResult::ok(data, lines).with_warnings(warnings))
}

fn missing_currencies<'a>(requested: &'a [Currency], rates: &[ExchangeRate]) -> Vec<&'a Currency> {
    requested
        .iter()
        .filter(|currency| !rates.iter().any(|rate| rate.source() == *currency))
        .collect()
}
