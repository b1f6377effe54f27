//! Joins countries with exchange rates and derives the estimated GDP.
//!
//! Aggregation is a pure calculation: the caller supplies the fetched data, the
//! refresh timestamp and a [`MultiplierSource`]. Nothing here touches the
//! network or the store.
use crate::core::country::{Country, RawCountry, RawRates};
use crate::core::error::CountryError;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::VecDeque;
use std::ops::RangeInclusive;
use tracing::{debug, warn};

pub const GDP_MULTIPLIER_RANGE: RangeInclusive<f64> = 1000.0..=2000.0;

/// Supplies the random GDP multiplier, one draw per country.
pub trait MultiplierSource {
    fn next_multiplier(&mut self) -> f64;
}

/// Draws multipliers uniformly from [`GDP_MULTIPLIER_RANGE`].
pub struct RandomMultiplier<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomMultiplier<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> MultiplierSource for RandomMultiplier<R> {
    fn next_multiplier(&mut self) -> f64 {
        self.rng.gen_range(GDP_MULTIPLIER_RANGE)
    }
}

/// Replays a fixed sequence of multipliers, cycling when exhausted.
pub struct FixedMultipliers {
    values: VecDeque<f64>,
}

impl FixedMultipliers {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }
}

impl MultiplierSource for FixedMultipliers {
    fn next_multiplier(&mut self) -> f64 {
        match self.values.pop_front() {
            Some(value) => {
                self.values.push_back(value);
                value
            }
            None => *GDP_MULTIPLIER_RANGE.start(),
        }
    }
}

/// Computes `(population * multiplier) / rate`.
pub fn compute_gdp(
    population: u64,
    rate: f64,
    multiplier: f64,
    currency_code: &str,
) -> Result<f64, CountryError> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(CountryError::InvalidRate {
            currency_code: currency_code.to_string(),
        });
    }
    Ok((population as f64 * multiplier) / rate)
}

/// Builds canonical country records from the fetched country list and rate table.
pub fn aggregate(
    countries: &[RawCountry],
    rates: &RawRates,
    refreshed_at: DateTime<Utc>,
    multipliers: &mut dyn MultiplierSource,
) -> Vec<Country> {
    let records: Vec<Country> = countries
        .iter()
        .map(|raw| {
            let currency_code = raw.primary_currency().map(str::to_string);
            let exchange_rate = currency_code
                .as_deref()
                .and_then(|code| rates.get(code).copied());

            let estimated_gdp = match (raw.population, exchange_rate, currency_code.as_deref()) {
                (Some(population), Some(rate), Some(code)) => {
                    let multiplier = multipliers.next_multiplier();
                    match compute_gdp(population, rate, multiplier, code) {
                        Ok(gdp) => Some(gdp),
                        Err(e) => {
                            warn!(country = %raw.name, error = %e, "Skipping GDP estimate");
                            None
                        }
                    }
                }
                _ => None,
            };

            Country {
                name: raw.name.clone(),
                capital: raw.capital.clone(),
                region: raw.region.clone(),
                population: raw.population,
                currency_code,
                exchange_rate,
                estimated_gdp,
                flag_url: raw.flag_url.clone(),
                last_refreshed_at: refreshed_at,
            }
        })
        .collect();

    debug!(
        total = records.len(),
        with_gdp = records.iter().filter(|c| c.estimated_gdp.is_some()).count(),
        "Aggregated country records"
    );
    records
}
