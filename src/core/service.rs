//! Refresh pipeline and read operations over the country cache.
use crate::core::aggregate::{RandomMultiplier, aggregate};
use crate::core::country::{Country, DeleteOutcome, RefreshSummary, StoreStatus};
use crate::core::error::CountryError;
use crate::core::query::{CountryFilter, SortOrder, query};
use crate::core::render::render_summary;
use crate::core::source::{CountrySource, RateSource};
use crate::core::store::CountryStore;
use anyhow::Result;
use chrono::Utc;
use futures::future::try_join;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub struct CountryService {
    store: Arc<dyn CountryStore>,
    countries: Arc<dyn CountrySource>,
    rates: Arc<dyn RateSource>,
}

impl CountryService {
    pub fn new(
        store: Arc<dyn CountryStore>,
        countries: Arc<dyn CountrySource>,
        rates: Arc<dyn RateSource>,
    ) -> Self {
        Self {
            store,
            countries,
            rates,
        }
    }

    /// Runs one refresh cycle: fetch both sources, aggregate, then upsert.
    ///
    /// Both fetches must succeed before anything is written.
    #[instrument(name = "Refresh", skip(self))]
    pub async fn refresh(&self) -> Result<RefreshSummary, CountryError> {
        let (raw_countries, rates) =
            try_join(self.countries.fetch_countries(), self.rates.fetch_rates()).await?;
        debug!(
            countries = raw_countries.len(),
            rates = rates.len(),
            "Fetched upstream data"
        );

        let refreshed_at = Utc::now();
        let mut multipliers = RandomMultiplier::new(StdRng::from_entropy());
        let records = aggregate(&raw_countries, &rates, refreshed_at, &mut multipliers);

        let written = self
            .store
            .upsert_all(&records, refreshed_at)
            .await
            .into_result()?;
        info!(total = written, "Refresh complete");

        Ok(RefreshSummary {
            total_countries: written,
            timestamp: refreshed_at,
        })
    }

    pub async fn list_countries(
        &self,
        filter: &CountryFilter,
        sort: Option<SortOrder>,
    ) -> Result<Vec<Country>, CountryError> {
        let all = self.store.list_all().await?;
        Ok(query(all, filter, sort))
    }

    pub async fn get_country(&self, name: &str) -> Result<Country, CountryError> {
        self.store.get_by_name(name).await
    }

    pub async fn delete_country(&self, name: &str) -> Result<DeleteOutcome, CountryError> {
        let deleted = self.store.delete_by_name(name).await?;
        Ok(DeleteOutcome { deleted })
    }

    pub async fn status(&self) -> Result<StoreStatus, CountryError> {
        self.store.status().await
    }

    /// Renders the summary PNG from the current store contents.
    pub async fn summary_image(&self) -> Result<Vec<u8>> {
        let countries = self.store.list_all().await?;
        let status = self.store.status().await?;
        render_summary(&countries, status.last_refreshed_at)
    }
}
