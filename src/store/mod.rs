pub mod disk;
pub mod memory;

use crate::core::config::AppConfig;
use crate::core::store::CountryStore;
use anyhow::{Context, Result};
use std::sync::Arc;

pub use disk::DiskCountryStore;
pub use memory::MemoryCountryStore;

/// Opens the persistent country store under `<data_path>/cache`.
pub fn open_store(config: &AppConfig) -> Result<Arc<dyn CountryStore>> {
    let path = config.cache_path()?;
    let store = DiskCountryStore::open(&path)
        .with_context(|| format!("Failed to open country store at {}", path.display()))?;
    Ok(Arc::new(store))
}
