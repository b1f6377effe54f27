pub mod exchange_rates;
pub mod rest_countries;
pub mod util;

pub use exchange_rates::OpenExchangeRatesProvider;
pub use rest_countries::RestCountriesProvider;
