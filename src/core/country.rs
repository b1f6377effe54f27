//! Country records, raw upstream shapes and aggregate status types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A country as supplied by the country source, after normalization.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawCountry {
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: Option<u64>,
    /// Currency codes in source order. The first entry is the country's currency.
    pub currencies: Vec<String>,
    pub flag_url: Option<String>,
}

impl RawCountry {
    pub fn primary_currency(&self) -> Option<&str> {
        self.currencies.first().map(String::as_str)
    }
}

/// Exchange rates keyed by currency code, relative to the rate source's base currency.
pub type RawRates = HashMap<String, f64>;

/// The canonical, persisted country record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    #[serde(default)]
    pub capital: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub population: Option<u64>,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub exchange_rate: Option<f64>,
    #[serde(default)]
    pub estimated_gdp: Option<f64>,
    #[serde(default)]
    pub flag_url: Option<String>,
    pub last_refreshed_at: DateTime<Utc>,
}

impl Country {
    /// Key used by the stores. Names are matched case-insensitively.
    pub fn store_key(name: &str) -> String {
        name.trim().to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreStatus {
    pub total_countries: usize,
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshSummary {
    pub total_countries: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub deleted: bool,
}
