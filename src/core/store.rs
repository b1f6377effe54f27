//! Cache store abstractions

use crate::core::country::{Country, StoreStatus};
use crate::core::error::CountryError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::warn;

/// Outcome of a best-effort batch upsert.
#[derive(Debug, Default)]
pub struct UpsertReport {
    /// Distinct store keys written in this batch.
    pub written: usize,
    pub first_error: Option<CountryError>,
    keys: HashSet<String>,
}

impl UpsertReport {
    /// Records one write. `Ok` carries the store key that was written.
    pub fn record(&mut self, outcome: Result<String, CountryError>) {
        match outcome {
            Ok(key) => {
                if self.keys.insert(key) {
                    self.written += 1;
                } else {
                    warn!("Names differing only in case share one record, keeping the last");
                }
            }
            Err(e) => self.fail(e),
        }
    }

    pub fn fail(&mut self, error: CountryError) {
        if self.first_error.is_none() {
            self.first_error = Some(error);
        }
    }

    pub fn into_result(self) -> Result<usize, CountryError> {
        match self.first_error {
            Some(e) => Err(e),
            None => Ok(self.written),
        }
    }
}

/// Persisted collection of countries keyed by name.
#[async_trait]
pub trait CountryStore: Send + Sync {
    /// Replaces every record by name, stamping `refreshed_at`. Each record is
    /// written independently; failures do not roll back earlier writes.
    async fn upsert_all(&self, countries: &[Country], refreshed_at: DateTime<Utc>)
    -> UpsertReport;

    async fn get_by_name(&self, name: &str) -> Result<Country, CountryError>;

    /// Returns `true` if a record existed and was removed.
    async fn delete_by_name(&self, name: &str) -> Result<bool, CountryError>;

    /// All records in store key order.
    async fn list_all(&self) -> Result<Vec<Country>, CountryError>;

    async fn status(&self) -> Result<StoreStatus, CountryError>;
}

/// Validates a record for writing and returns its store key with the refresh stamp applied.
pub fn prepare_record(
    country: &Country,
    refreshed_at: DateTime<Utc>,
) -> Result<(String, Country), CountryError> {
    let key = Country::store_key(&country.name);
    if key.is_empty() {
        return Err(CountryError::validation("name", "must not be empty"));
    }
    let record = Country {
        last_refreshed_at: refreshed_at,
        ..country.clone()
    };
    Ok((key, record))
}

/// Folds records into the aggregate status.
pub fn summarize<'a>(countries: impl IntoIterator<Item = &'a Country>) -> StoreStatus {
    countries.into_iter().fold(
        StoreStatus {
            total_countries: 0,
            last_refreshed_at: None,
        },
        |mut status, country| {
            status.total_countries += 1;
            status.last_refreshed_at = status
                .last_refreshed_at
                .max(Some(country.last_refreshed_at));
            status
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn country(name: &str, refreshed_at: DateTime<Utc>) -> Country {
        Country {
            name: name.to_string(),
            capital: None,
            region: None,
            population: None,
            currency_code: None,
            exchange_rate: None,
            estimated_gdp: None,
            flag_url: None,
            last_refreshed_at: refreshed_at,
        }
    }

    #[test]
    fn test_report_keeps_first_error() {
        let mut report = UpsertReport::default();
        report.record(Ok("ghana".to_string()));
        report.record(Err(CountryError::persistence("disk full")));
        report.record(Ok("togo".to_string()));
        report.record(Err(CountryError::validation("name", "empty")));

        assert_eq!(report.written, 2);
        assert_eq!(
            report.into_result(),
            Err(CountryError::persistence("disk full"))
        );
    }

    #[test]
    fn test_report_counts_distinct_keys() {
        let mut report = UpsertReport::default();
        report.record(Ok("congo".to_string()));
        report.record(Ok("congo".to_string()));
        report.record(Ok("chad".to_string()));
        assert_eq!(report.into_result(), Ok(2));
    }

    #[test]
    fn test_prepare_record_rejects_blank_name() {
        let result = prepare_record(&country("  ", Utc::now()), Utc::now());
        assert!(matches!(
            result,
            Err(CountryError::ValidationFailed { ref field, .. }) if field == "name"
        ));
    }

    #[test]
    fn test_prepare_record_stamps_timestamp() {
        let old = Utc::now() - Duration::days(3);
        let now = Utc::now();
        let (key, record) = prepare_record(&country("Benin", old), now).unwrap();
        assert_eq!(key, "benin");
        assert_eq!(record.name, "Benin");
        assert_eq!(record.last_refreshed_at, now);
    }

    #[test]
    fn test_summarize_takes_latest_timestamp() {
        let now = Utc::now();
        let records = [
            country("A", now - Duration::hours(2)),
            country("B", now),
            country("C", now - Duration::hours(1)),
        ];
        let status = summarize(&records);
        assert_eq!(status.total_countries, 3);
        assert_eq!(status.last_refreshed_at, Some(now));

        let none: Vec<Country> = Vec::new();
        let empty = summarize(&none);
        assert_eq!(empty.total_countries, 0);
        assert!(empty.last_refreshed_at.is_none());
    }
}
