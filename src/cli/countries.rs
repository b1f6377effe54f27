use super::ui;
use crate::core::{Country, CountryFilter, CountryService, SortOrder};
use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

/// Renders a list of countries as a table.
pub fn countries_table(countries: &[Country]) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Country"),
        ui::header_cell("Capital"),
        ui::header_cell("Region"),
        ui::header_cell("Population"),
        ui::header_cell("Currency"),
        ui::header_cell("Rate"),
        ui::header_cell("Est. GDP"),
    ]);

    for country in countries {
        table.add_row(vec![
            Cell::new(&country.name),
            ui::optional_text_cell(country.capital.as_deref()),
            ui::optional_text_cell(country.region.as_deref()),
            ui::format_optional_cell(country.population, ui::group_thousands),
            ui::optional_text_cell(country.currency_code.as_deref()),
            ui::format_optional_cell(country.exchange_rate, |r| format!("{r:.4}")),
            ui::format_optional_cell(country.estimated_gdp, |g| format!("{g:.2}")),
        ]);
    }
    table
}

/// Renders a single country as a two column detail table.
pub fn country_detail(country: &Country) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Field"), ui::header_cell("Value")]);
    let rows: Vec<(&str, Cell)> = vec![
        ("Capital", ui::optional_text_cell(country.capital.as_deref())),
        ("Region", ui::optional_text_cell(country.region.as_deref())),
        (
            "Population",
            ui::format_optional_cell(country.population, ui::group_thousands),
        ),
        (
            "Currency",
            ui::optional_text_cell(country.currency_code.as_deref()),
        ),
        (
            "Exchange Rate",
            ui::format_optional_cell(country.exchange_rate, |r| format!("{r:.4}")),
        ),
        (
            "Estimated GDP",
            ui::format_optional_cell(country.estimated_gdp, |g| format!("{g:.2}")),
        ),
        ("Flag", ui::optional_text_cell(country.flag_url.as_deref())),
        (
            "Last Refreshed",
            Cell::new(country.last_refreshed_at.format("%Y-%m-%d %H:%M:%S UTC")),
        ),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), value]);
    }

    format!(
        "Country: {}\n\n{}",
        ui::style_text(&country.name, ui::StyleType::Title),
        table
    )
}

pub async fn list(
    service: &CountryService,
    filter: &CountryFilter,
    sort: Option<SortOrder>,
) -> Result<()> {
    let countries = service
        .list_countries(filter, sort)
        .await
        .context("Failed to list countries")?;

    if countries.is_empty() {
        println!(
            "{}",
            ui::style_text("No countries match the given filters.", ui::StyleType::Subtle)
        );
        return Ok(());
    }

    println!("{}", countries_table(&countries));
    println!(
        "\n{} {}",
        ui::style_text("Countries:", ui::StyleType::TotalLabel),
        ui::style_text(&countries.len().to_string(), ui::StyleType::TotalValue)
    );
    Ok(())
}

pub async fn get(service: &CountryService, name: &str) -> Result<()> {
    let country = service.get_country(name).await?;
    println!("{}", country_detail(&country));
    Ok(())
}

pub async fn delete(service: &CountryService, name: &str) -> Result<()> {
    let outcome = service
        .delete_country(name)
        .await
        .with_context(|| format!("Failed to delete country: {name}"))?;
    if outcome.deleted {
        println!("Country '{name}' deleted");
    } else {
        println!(
            "{}",
            ui::style_text(&format!("Country '{name}' was not cached"), ui::StyleType::Subtle)
        );
    }
    Ok(())
}
