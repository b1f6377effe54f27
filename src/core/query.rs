//! Filtering and ordering over the cached country collection.
use crate::core::country::Country;
use crate::core::error::CountryError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    GdpDesc,
    GdpAsc,
    PopulationDesc,
    PopulationAsc,
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SortOrder::GdpDesc => "gdp_desc",
                SortOrder::GdpAsc => "gdp_asc",
                SortOrder::PopulationDesc => "population_desc",
                SortOrder::PopulationAsc => "population_asc",
            }
        )
    }
}

impl FromStr for SortOrder {
    type Err = CountryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gdp_desc" => Ok(SortOrder::GdpDesc),
            "gdp_asc" => Ok(SortOrder::GdpAsc),
            "population_desc" => Ok(SortOrder::PopulationDesc),
            "population_asc" => Ok(SortOrder::PopulationAsc),
            _ => Err(CountryError::validation(
                "sort",
                format!(
                    "unknown sort order '{s}', expected one of gdp_desc, gdp_asc, population_desc, population_asc"
                ),
            )),
        }
    }
}

/// Optional exact-match constraints, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryFilter {
    pub region: Option<String>,
    pub currency: Option<String>,
}

impl CountryFilter {
    pub fn matches(&self, country: &Country) -> bool {
        let region_ok = self
            .region
            .as_deref()
            .is_none_or(|region| country.region.as_deref() == Some(region));
        let currency_ok = self
            .currency
            .as_deref()
            .is_none_or(|currency| country.currency_code.as_deref() == Some(currency));
        region_ok && currency_ok
    }
}

/// Orders two optional keys, placing absent values last whatever the direction.
fn cmp_present_first<T>(a: Option<T>, b: Option<T>, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(&a, &b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare(a: &Country, b: &Country, order: SortOrder) -> Ordering {
    match order {
        SortOrder::GdpDesc => {
            cmp_present_first(a.estimated_gdp, b.estimated_gdp, |x, y| y.total_cmp(x))
        }
        SortOrder::GdpAsc => {
            cmp_present_first(a.estimated_gdp, b.estimated_gdp, |x, y| x.total_cmp(y))
        }
        SortOrder::PopulationDesc => {
            cmp_present_first(a.population, b.population, |x, y| y.cmp(x))
        }
        SortOrder::PopulationAsc => {
            cmp_present_first(a.population, b.population, |x, y| x.cmp(y))
        }
    }
}

/// Applies `filter` and then a stable sort. Without a sort order the input order is kept.
pub fn query(
    countries: Vec<Country>,
    filter: &CountryFilter,
    sort: Option<SortOrder>,
) -> Vec<Country> {
    let mut result: Vec<Country> = countries
        .into_iter()
        .filter(|c| filter.matches(c))
        .collect();
    if let Some(order) = sort {
        result.sort_by(|a, b| compare(a, b, order));
    }
    result
}
