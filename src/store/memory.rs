use crate::core::country::{Country, StoreStatus};
use crate::core::error::CountryError;
use crate::core::store::{CountryStore, UpsertReport, prepare_record, summarize};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory country store, ordered by store key.
#[derive(Default)]
pub struct MemoryCountryStore {
    inner: RwLock<BTreeMap<String, Country>>,
}

impl MemoryCountryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CountryStore for MemoryCountryStore {
    async fn upsert_all(
        &self,
        countries: &[Country],
        refreshed_at: DateTime<Utc>,
    ) -> UpsertReport {
        let mut report = UpsertReport::default();
        for country in countries {
            // Lock per record so readers can observe a refresh in progress
            let outcome = match prepare_record(country, refreshed_at) {
                Ok((key, record)) => {
                    self.inner.write().await.insert(key.clone(), record);
                    Ok(key)
                }
                Err(e) => Err(e),
            };
            report.record(outcome);
        }
        debug!(written = report.written, "Memory store upsert complete");
        report
    }

    async fn get_by_name(&self, name: &str) -> Result<Country, CountryError> {
        let store = self.inner.read().await;
        store
            .get(&Country::store_key(name))
            .cloned()
            .ok_or_else(|| CountryError::not_found(name))
    }

    async fn delete_by_name(&self, name: &str) -> Result<bool, CountryError> {
        let mut store = self.inner.write().await;
        let removed = store.remove(&Country::store_key(name)).is_some();
        debug!(name, removed, "Memory store delete");
        Ok(removed)
    }

    async fn list_all(&self) -> Result<Vec<Country>, CountryError> {
        let store = self.inner.read().await;
        Ok(store.values().cloned().collect())
    }

    async fn status(&self) -> Result<StoreStatus, CountryError> {
        let store = self.inner.read().await;
        Ok(summarize(store.values()))
    }
}
