use super::util::{RETRY_DELAY_MS, fetch_body, http_client};
use crate::core::country::RawRates;
use crate::core::error::CountryError;
use crate::core::source::RateSource;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const PROVIDER: &str = "open.er-api.com";

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    result: Option<String>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    #[serde(alias = "base")]
    base_code: Option<String>,
    rates: Option<HashMap<String, f64>>,
}

/// Exchange rates from the open.er-api.com `latest` endpoint.
pub struct OpenExchangeRatesProvider {
    base_url: String,
    base_currency: String,
    client: reqwest::Client,
    retries: usize,
    retry_delay_ms: u64,
}

impl OpenExchangeRatesProvider {
    pub fn new(
        base_url: &str,
        base_currency: &str,
        timeout: Duration,
        retries: usize,
    ) -> Result<Self, CountryError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            base_currency: base_currency.to_string(),
            client: http_client(timeout, PROVIDER)?,
            retries,
            retry_delay_ms: RETRY_DELAY_MS,
        })
    }

    pub fn with_retry_delay(mut self, delay_ms: u64) -> Self {
        self.retry_delay_ms = delay_ms;
        self
    }
}

/// Keeps only finite, positive rates.
fn validate_rates(rates: HashMap<String, f64>) -> RawRates {
    rates
        .into_iter()
        .filter(|(code, rate)| {
            let valid = rate.is_finite() && *rate > 0.0;
            if !valid {
                warn!(currency = %code, rate, "Dropping invalid exchange rate");
            }
            valid
        })
        .collect()
}

#[async_trait]
impl RateSource for OpenExchangeRatesProvider {
    #[instrument(
        name = "ExchangeRatesFetch",
        skip(self),
        fields(base = %self.base_currency)
    )]
    async fn fetch_rates(&self) -> Result<RawRates, CountryError> {
        let url = format!("{}/v6/latest/{}", self.base_url, self.base_currency);
        let body = fetch_body(
            &self.client,
            &url,
            self.retries,
            self.retry_delay_ms,
            PROVIDER,
        )
        .await?;

        let data: LatestRatesResponse = serde_json::from_str(&body).map_err(|e| {
            CountryError::unavailable(PROVIDER, format!("Failed to parse JSON response: {e}"))
        })?;

        if let Some(result) = data.result.as_deref() {
            if result != "success" {
                return Err(CountryError::unavailable(
                    PROVIDER,
                    format!(
                        "Rate lookup failed: {}",
                        data.error_type.as_deref().unwrap_or(result)
                    ),
                ));
            }
        }

        if let Some(base) = data.base_code.as_deref() {
            if base != self.base_currency {
                warn!(expected = %self.base_currency, actual = %base, "Unexpected base currency");
            }
        }

        let rates = data
            .rates
            .ok_or_else(|| CountryError::unavailable(PROVIDER, "No rates in response"))?;
        let rates = validate_rates(rates);
        debug!(count = rates.len(), "Fetched exchange rates");
        Ok(rates)
    }
}
