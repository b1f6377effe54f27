use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

const DEFAULT_COUNTRIES_URL: &str = "https://restcountries.com";
const DEFAULT_RATES_URL: &str = "https://open.er-api.com";
const DEFAULT_BASE_CURRENCY: &str = "USD";

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CountriesProviderConfig {
    pub base_url: String,
}

impl Default for CountriesProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_COUNTRIES_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct RatesProviderConfig {
    pub base_url: String,
    pub base_currency: String,
}

impl Default for RatesProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_RATES_URL.to_string(),
            base_currency: DEFAULT_BASE_CURRENCY.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub countries: CountriesProviderConfig,
    #[serde(default)]
    pub rates: RatesProviderConfig,
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_retries() -> usize {
    2
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    pub data_path: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_retries")]
    pub retries: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            providers: ProvidersConfig::default(),
            data_path: None,
            request_timeout_secs: default_request_timeout_secs(),
            retries: default_retries(),
        }
    }
}

impl AppConfig {
    /// Loads the default config file, falling back to defaults when it does not exist.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "countryfx", "countryfx")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("in", "countryfx", "countryfx")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    /// Directory holding the country store and the rendered summary image.
    pub fn cache_path(&self) -> Result<PathBuf> {
        Ok(self.default_data_path()?.join("cache"))
    }

    pub fn summary_image_path(&self) -> Result<PathBuf> {
        Ok(self.cache_path()?.join("summary.png"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        // An empty document parses as null, which is not a valid mapping
        if config_str.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
