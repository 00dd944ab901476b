//! Rate provider: fetch, parse, filter, project.

use std::collections::HashSet;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::fetcher::{BulletinFetch, ResilientFetcher};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::parser::BulletinParser;
use crate::{ConfigError, Currency, DailyBulletin, ExchangeRate, ProviderConfig, ProviderError};

/// Single entry point for retrieving today's rates against the quote currency.
///
/// Each call fetches the bulletin afresh; nothing is cached between calls. The
/// only state shared across calls is the circuit breaker inside the fetcher.
pub struct RateProvider {
    fetcher: Arc<dyn BulletinFetch>,
    parser: BulletinParser,
    quote_currency: Currency,
}

impl RateProvider {
    pub fn new(fetcher: Arc<dyn BulletinFetch>, quote_currency: Currency) -> Self {
        Self {
            fetcher,
            parser: BulletinParser::new(),
            quote_currency,
        }
    }

    /// Validate `config` and wire a reqwest-backed [`ResilientFetcher`].
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let http_client: Arc<dyn HttpClient> =
            Arc::new(ReqwestHttpClient::with_user_agent(&config.user_agent)?);
        Ok(Self::with_http_client(config, http_client))
    }

    /// Same wiring as [`RateProvider::from_config`] over a caller-supplied transport.
    pub fn with_http_client(config: &ProviderConfig, http_client: Arc<dyn HttpClient>) -> Self {
        let fetcher = ResilientFetcher::new(config, http_client);
        Self::new(Arc::new(fetcher), config.quote_currency.clone())
    }

    pub fn quote_currency(&self) -> &Currency {
        &self.quote_currency
    }

    /// Rates for every bulletin record whose code is in `currencies`, in bulletin order.
    ///
    /// Requested codes missing from the bulletin are omitted, not reported as errors.
    pub async fn get_rates(
        &self,
        currencies: &[Currency],
        cancel: &CancellationToken,
    ) -> Result<Vec<ExchangeRate>, ProviderError> {
        let codes: Vec<&str> = currencies.iter().map(Currency::as_str).collect();
        tracing::info!(count = currencies.len(), codes = ?codes, "requesting exchange rates");

        let bulletin = self.latest_bulletin(cancel).await?;

        let requested: HashSet<&str> = codes.iter().copied().collect();
        let mut rates = Vec::new();
        let mut found = HashSet::new();
        for record in &bulletin.records {
            let code = record.code.trim().to_ascii_uppercase();
            if !requested.contains(code.as_str()) {
                continue;
            }
            let source = Currency::parse(&code)?;
            rates.push(ExchangeRate::new(
                source,
                self.quote_currency.clone(),
                record.unit_rate(),
            )?);
            found.insert(code);
        }

        tracing::info!(
            found = found.len(),
            requested = requested.len(),
            date = %bulletin.date,
            sequence = bulletin.sequence,
            "retrieved exchange rates"
        );

        let missing: Vec<&str> = codes
            .iter()
            .copied()
            .filter(|code| !found.contains(*code))
            .collect();
        if !missing.is_empty() {
            tracing::warn!(missing = ?missing, "requested currencies not in bulletin");
        }

        Ok(rates)
    }

    /// Validate raw codes, then behave like [`RateProvider::get_rates`].
    pub async fn get_rates_for_codes<S: AsRef<str>>(
        &self,
        codes: &[S],
        cancel: &CancellationToken,
    ) -> Result<Vec<ExchangeRate>, ProviderError> {
        let currencies = codes
            .iter()
            .map(|code| Currency::parse(code.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        self.get_rates(&currencies, cancel).await
    }

    /// Fetch and parse the bulletin without filtering.
    pub async fn latest_bulletin(
        &self,
        cancel: &CancellationToken,
    ) -> Result<DailyBulletin, ProviderError> {
        let raw = self.fetcher.fetch(cancel).await.map_err(|error| {
            tracing::error!(error = %error, "failed to fetch exchange rate bulletin");
            ProviderError::FetchFailed(error)
        })?;

        self.parser.parse(&raw).map_err(|error| {
            tracing::error!(error = %error, "failed to parse exchange rate bulletin");
            ProviderError::ParseFailed(error)
        })
    }
}
