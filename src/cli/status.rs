use super::refresh::write_summary_image;
use super::ui;
use crate::core::CountryService;
use crate::core::render::format_timestamp;
use anyhow::{Context, Result};
use std::path::Path;

pub async fn status(service: &CountryService) -> Result<()> {
    let status = service
        .status()
        .await
        .context("Failed to read cache status")?;

    println!(
        "{} {}",
        ui::style_text("Total Countries:", ui::StyleType::TotalLabel),
        ui::style_text(&status.total_countries.to_string(), ui::StyleType::TotalValue)
    );
    println!(
        "{} {}",
        ui::style_text("Last Refreshed:", ui::StyleType::TotalLabel),
        format_timestamp(status.last_refreshed_at)
    );
    Ok(())
}

pub async fn image(service: &CountryService, output: &Path) -> Result<()> {
    write_summary_image(service, output).await?;
    println!("Summary image written to {}", output.display());
    Ok(())
}
