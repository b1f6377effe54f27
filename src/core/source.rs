//! Upstream data source abstractions

use crate::core::country::{RawCountry, RawRates};
use crate::core::error::CountryError;
use async_trait::async_trait;

#[async_trait]
pub trait CountrySource: Send + Sync {
    async fn fetch_countries(&self) -> Result<Vec<RawCountry>, CountryError>;
}

#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rates(&self) -> Result<RawRates, CountryError>;
}
