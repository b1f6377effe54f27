use super::ui;
use crate::core::CountryService;
use crate::core::render::format_timestamp;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

/// Writes the rendered summary PNG to `path`, creating parent directories.
pub async fn write_summary_image(service: &CountryService, path: &Path) -> Result<()> {
    let png = service.summary_image().await?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    tokio::fs::write(path, png)
        .await
        .with_context(|| format!("Failed to write summary image to {}", path.display()))?;
    info!("Wrote summary image to {}", path.display());
    Ok(())
}

/// Runs a refresh cycle and regenerates the summary image.
pub async fn run(service: &CountryService, image_path: &Path) -> Result<()> {
    let pb = ui::new_spinner("Refreshing countries and exchange rates...");
    let result = service.refresh().await;
    pb.finish_and_clear();
    let summary = result.context("Refresh failed")?;

    println!(
        "{} {}",
        ui::style_text("Total Countries:", ui::StyleType::TotalLabel),
        ui::style_text(&summary.total_countries.to_string(), ui::StyleType::TotalValue)
    );
    println!(
        "{} {}",
        ui::style_text("Refreshed At:", ui::StyleType::TotalLabel),
        format_timestamp(Some(summary.timestamp))
    );

    // A failed image write does not fail the refresh
    if let Err(e) = write_summary_image(service, image_path).await {
        warn!(error = %e, "Failed to regenerate summary image");
        println!(
            "{}",
            ui::style_text(
                &format!("Summary image not updated: {e}"),
                ui::StyleType::Error
            )
        );
    }
    Ok(())
}
