//! Error taxonomy for the refresh pipeline and the cache store.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CountryError {
    /// Network, HTTP status or payload failure from one of the upstream sources.
    #[error("External data source unavailable: {provider}: {cause}")]
    ExternalSourceUnavailable { provider: String, cause: String },

    #[error("Validation failed for {field}: {reason}")]
    ValidationFailed { field: String, reason: String },

    #[error("Country not found: {name}")]
    NotFound { name: String },

    /// A non-positive or non-finite rate reached the GDP computation.
    #[error("Invalid exchange rate for currency: {currency_code}")]
    InvalidRate { currency_code: String },

    #[error("Persistence failure: {cause}")]
    PersistenceFailure { cause: String },
}

impl CountryError {
    pub fn unavailable(provider: &str, cause: impl ToString) -> Self {
        CountryError::ExternalSourceUnavailable {
            provider: provider.to_string(),
            cause: cause.to_string(),
        }
    }

    pub fn persistence(cause: impl ToString) -> Self {
        CountryError::PersistenceFailure {
            cause: cause.to_string(),
        }
    }

    pub fn validation(field: &str, reason: impl ToString) -> Self {
        CountryError::ValidationFailed {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn not_found(name: &str) -> Self {
        CountryError::NotFound {
            name: name.to_string(),
        }
    }
}
