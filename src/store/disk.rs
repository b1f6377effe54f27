use crate::core::country::{Country, StoreStatus};
use crate::core::error::CountryError;
use crate::core::store::{CountryStore, UpsertReport, prepare_record, summarize};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, warn};

const COUNTRIES_PARTITION: &str = "countries";

/// Country store backed by a fjall partition. Values are JSON encoded.
///
/// Writers take `write_lock`, so a read-then-remove in `delete_by_name` cannot
/// interleave with another delete or an upsert.
pub struct DiskCountryStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
    write_lock: Mutex<()>,
}

impl DiskCountryStore {
    pub fn open(path: &Path) -> Result<Self, CountryError> {
        std::fs::create_dir_all(path).map_err(CountryError::persistence)?;
        let keyspace = fjall::Config::new(path)
            .open()
            .map_err(CountryError::persistence)?;
        let partition = keyspace
            .open_partition(COUNTRIES_PARTITION, PartitionCreateOptions::default())
            .map_err(CountryError::persistence)?;
        debug!("Opened country store at {}", path.display());
        Ok(Self {
            keyspace,
            partition,
            write_lock: Mutex::new(()),
        })
    }

    fn write_record(
        &self,
        country: &Country,
        refreshed_at: DateTime<Utc>,
    ) -> Result<String, CountryError> {
        let (key, record) = prepare_record(country, refreshed_at)?;
        let value = serde_json::to_vec(&record).map_err(CountryError::persistence)?;
        self.partition
            .insert(key.as_bytes(), value)
            .map_err(CountryError::persistence)?;
        Ok(key)
    }

    fn decode(value: &[u8]) -> Result<Country, CountryError> {
        serde_json::from_slice(value).map_err(CountryError::persistence)
    }

    fn sync(&self) -> Result<(), CountryError> {
        self.keyspace
            .persist(PersistMode::SyncAll)
            .map_err(CountryError::persistence)
    }
}

#[async_trait]
impl CountryStore for DiskCountryStore {
    async fn upsert_all(
        &self,
        countries: &[Country],
        refreshed_at: DateTime<Utc>,
    ) -> UpsertReport {
        let _guard = self.write_lock.lock().await;
        let mut report = UpsertReport::default();
        for country in countries {
            let outcome = self.write_record(country, refreshed_at);
            if let Err(e) = &outcome {
                warn!(country = %country.name, error = %e, "Failed to write country");
            }
            report.record(outcome);
        }
        if let Err(e) = self.sync() {
            report.fail(e);
        }
        debug!(written = report.written, "Disk store upsert complete");
        report
    }

    async fn get_by_name(&self, name: &str) -> Result<Country, CountryError> {
        match self
            .partition
            .get(Country::store_key(name))
            .map_err(CountryError::persistence)?
        {
            Some(value) => Self::decode(&value),
            None => Err(CountryError::not_found(name)),
        }
    }

    async fn delete_by_name(&self, name: &str) -> Result<bool, CountryError> {
        let key = Country::store_key(name);
        let _guard = self.write_lock.lock().await;
        let existed = self
            .partition
            .get(&key)
            .map_err(CountryError::persistence)?
            .is_some();
        if existed {
            self.partition
                .remove(key.as_bytes())
                .map_err(CountryError::persistence)?;
            self.sync()?;
        }
        debug!(name, existed, "Disk store delete");
        Ok(existed)
    }

    async fn list_all(&self) -> Result<Vec<Country>, CountryError> {
        self.partition
            .iter()
            .map(|entry| {
                let (_, value) = entry.map_err(CountryError::persistence)?;
                Self::decode(&value)
            })
            .collect()
    }

    async fn status(&self) -> Result<StoreStatus, CountryError> {
        let countries = self.list_all().await?;
        Ok(summarize(&countries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn country(name: &str, gdp: Option<f64>) -> Country {
        Country {
            name: name.to_string(),
            capital: Some("Capital".to_string()),
            region: Some("Europe".to_string()),
            population: Some(1_000),
            currency_code: Some("EUR".to_string()),
            exchange_rate: Some(0.9),
            estimated_gdp: gdp,
            flag_url: Some("https://flagcdn.com/fr.svg".to_string()),
            last_refreshed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_disk_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = DiskCountryStore::open(dir.path()).unwrap();
        let now = Utc::now();

        let report = store
            .upsert_all(&[country("France", Some(12.5)), country("Spain", None)], now)
            .await;
        assert_eq!(report.into_result().unwrap(), 2);

        let france = store.get_by_name("FRANCE").await.unwrap();
        assert_eq!(france.name, "France");
        assert_eq!(france.estimated_gdp, Some(12.5));
        assert_eq!(france.last_refreshed_at, now);

        let names: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["France", "Spain"]);
    }

    #[tokio::test]
    async fn test_disk_store_is_idempotent_on_name() {
        let dir = tempdir().unwrap();
        let store = DiskCountryStore::open(dir.path()).unwrap();

        let batch = [country("Italy", Some(1.0)), country("Malta", Some(2.0))];
        store.upsert_all(&batch, Utc::now()).await;
        store.upsert_all(&batch, Utc::now()).await;

        assert_eq!(store.status().await.unwrap().total_countries, 2);
    }

    #[tokio::test]
    async fn test_disk_store_delete_and_missing() {
        let dir = tempdir().unwrap();
        let store = DiskCountryStore::open(dir.path()).unwrap();
        store.upsert_all(&[country("Austria", None)], Utc::now()).await;

        assert!(store.delete_by_name("austria").await.unwrap());
        assert!(!store.delete_by_name("austria").await.unwrap());
        assert_eq!(
            store.get_by_name("Austria").await,
            Err(CountryError::not_found("Austria"))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_disk_store_concurrent_deletes_remove_once() {
        let dir = tempdir().unwrap();
        let store = std::sync::Arc::new(DiskCountryStore::open(dir.path()).unwrap());
        store.upsert_all(&[country("Belgium", None)], Utc::now()).await;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.delete_by_name("Belgium").await.unwrap() })
            })
            .collect();

        let mut removed = 0;
        for handle in handles {
            if handle.await.unwrap() {
                removed += 1;
            }
        }
        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn test_disk_store_counts_case_collisions_once() {
        let dir = tempdir().unwrap();
        let store = DiskCountryStore::open(dir.path()).unwrap();
        let report = store
            .upsert_all(&[country("Congo", None), country("CONGO", Some(3.0))], Utc::now())
            .await;

        assert_eq!(report.into_result().unwrap(), 1);
        let congo = store.get_by_name("congo").await.unwrap();
        assert_eq!(congo.name, "CONGO");
        assert_eq!(store.status().await.unwrap().total_countries, 1);
    }

    #[tokio::test]
    async fn test_disk_store_status_when_empty() {
        let dir = tempdir().unwrap();
        let store = DiskCountryStore::open(dir.path()).unwrap();
        let status = store.status().await.unwrap();
        assert_eq!(status.total_countries, 0);
        assert!(status.last_refreshed_at.is_none());
    }

    #[tokio::test]
    async fn test_disk_store_rejects_blank_name() {
        let dir = tempdir().unwrap();
        let store = DiskCountryStore::open(dir.path()).unwrap();
        let report = store
            .upsert_all(&[country("", None), country("Poland", None)], Utc::now())
            .await;
        assert_eq!(report.written, 1);
        assert!(matches!(
            report.into_result(),
            Err(CountryError::ValidationFailed { .. })
        ));
    }
}
