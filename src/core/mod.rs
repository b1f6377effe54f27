//! Core business logic abstractions

pub mod aggregate;
pub mod config;
pub mod country;
pub mod error;
pub mod log;
pub mod query;
pub mod render;
pub mod service;
pub mod source;
pub mod store;

// Re-export main types for cleaner imports
pub use country::{Country, DeleteOutcome, RawCountry, RawRates, RefreshSummary, StoreStatus};
pub use error::CountryError;
pub use query::{CountryFilter, SortOrder};
pub use service::CountryService;
pub use source::{CountrySource, RateSource};
pub use store::CountryStore;
