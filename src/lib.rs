pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::{CountryFilter, CountryService, SortOrder};
use crate::providers::{OpenExchangeRatesProvider, RestCountriesProvider};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub enum AppCommand {
    Refresh,
    List {
        region: Option<String>,
        currency: Option<String>,
        sort: Option<SortOrder>,
    },
    Get {
        name: String,
    },
    Delete {
        name: String,
    },
    Status,
    Image {
        output: Option<PathBuf>,
    },
}

/// Builds the service with the configured providers and the persistent store.
pub fn build_service(config: &AppConfig) -> Result<CountryService> {
    let timeout = config.request_timeout();
    let countries = RestCountriesProvider::new(
        &config.providers.countries.base_url,
        timeout,
        config.retries,
    )?;
    let rates = OpenExchangeRatesProvider::new(
        &config.providers.rates.base_url,
        &config.providers.rates.base_currency,
        timeout,
        config.retries,
    )?;
    let store = store::open_store(config)?;

    Ok(CountryService::new(
        store,
        Arc::new(countries),
        Arc::new(rates),
    ))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("countryfx starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let service = build_service(&config)?;

    match command {
        AppCommand::Refresh => cli::refresh::run(&service, &config.summary_image_path()?).await,
        AppCommand::List {
            region,
            currency,
            sort,
        } => {
            let filter = CountryFilter { region, currency };
            cli::countries::list(&service, &filter, sort).await
        }
        AppCommand::Get { name } => cli::countries::get(&service, &name).await,
        AppCommand::Delete { name } => cli::countries::delete(&service, &name).await,
        AppCommand::Status => cli::status::status(&service).await,
        AppCommand::Image { output } => {
            let output = match output {
                Some(path) => path,
                None => config.summary_image_path()?,
            };
            cli::status::image(&service, &output).await
        }
    }
}
