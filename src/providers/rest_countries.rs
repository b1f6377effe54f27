use super::util::{RETRY_DELAY_MS, fetch_body, http_client};
use crate::core::country::RawCountry;
use crate::core::error::CountryError;
use crate::core::source::CountrySource;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const PROVIDER: &str = "restcountries.com";
const FIELDS: &str = "name,capital,region,population,flag,currencies";

#[derive(Debug, Deserialize)]
struct RestCurrency {
    code: Option<String>,
}

/// v2 lists currencies as an array; v3 keys them by code.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RestCurrencies {
    List(Vec<RestCurrency>),
    Map(BTreeMap<String, serde_json::Value>),
}

impl RestCurrencies {
    fn codes(self) -> Vec<String> {
        let codes: Vec<String> = match self {
            RestCurrencies::List(list) => list.into_iter().filter_map(|c| c.code).collect(),
            RestCurrencies::Map(map) => map.into_keys().collect(),
        };
        codes
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct RestCountry {
    name: Option<String>,
    capital: Option<String>,
    region: Option<String>,
    population: Option<u64>,
    currencies: Option<RestCurrencies>,
    flag: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl RestCountry {
    fn normalize(self) -> Option<RawCountry> {
        let name = non_empty(self.name)?;
        Some(RawCountry {
            name,
            capital: non_empty(self.capital),
            region: non_empty(self.region),
            population: self.population,
            currencies: self.currencies.map(RestCurrencies::codes).unwrap_or_default(),
            flag_url: non_empty(self.flag),
        })
    }
}

/// Country list from the REST Countries v2 API.
pub struct RestCountriesProvider {
    base_url: String,
    client: reqwest::Client,
    retries: usize,
    retry_delay_ms: u64,
}

impl RestCountriesProvider {
    pub fn new(base_url: &str, timeout: Duration, retries: usize) -> Result<Self, CountryError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
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

#[async_trait]
impl CountrySource for RestCountriesProvider {
    #[instrument(name = "RestCountriesFetch", skip(self))]
    async fn fetch_countries(&self) -> Result<Vec<RawCountry>, CountryError> {
        let url = format!("{}/v2/all?fields={}", self.base_url, FIELDS);
        let body = fetch_body(
            &self.client,
            &url,
            self.retries,
            self.retry_delay_ms,
            PROVIDER,
        )
        .await?;

        let entries: Vec<RestCountry> = serde_json::from_str(&body).map_err(|e| {
            CountryError::unavailable(PROVIDER, format!("Failed to parse JSON response: {e}"))
        })?;

        let total = entries.len();
        let countries: Vec<RawCountry> = entries
            .into_iter()
            .filter_map(RestCountry::normalize)
            .collect();
        if countries.len() < total {
            warn!(
                dropped = total - countries.len(),
                "Dropped countries without a name"
            );
        }
        debug!(count = countries.len(), "Fetched countries");
        Ok(countries)
    }
}
