//! Summary image rendering.
//!
//! The summary is laid out as an SVG document in memory and rasterized to PNG
//! with resvg. Rendering only looks at the records it is given.
use crate::core::country::Country;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use resvg::tiny_skia;
use resvg::usvg::{Options, Transform, Tree, fontdb};
use std::sync::{Arc, OnceLock};
use tracing::debug;

pub const TOP_COUNT: usize = 5;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;
const FONT_FAMILY: &str = "DejaVu Sans, Arial, Helvetica, sans-serif";

/// Countries with an estimated GDP paired with it, highest first, at most `n` of them.
/// Ties keep input order.
pub fn top_by_gdp(countries: &[Country], n: usize) -> Vec<(&Country, f64)> {
    let mut ranked: Vec<(&Country, f64)> = countries
        .iter()
        .filter_map(|c| c.estimated_gdp.map(|gdp| (c, gdp)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(n);
    ranked
}

/// Inserts a comma every three digits of an unsigned digit string.
pub fn group_digits(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Formats a GDP value as `$1,234,567.89`.
pub fn format_gdp(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}${}.{fraction}", group_digits(whole))
}

pub fn format_timestamp(refreshed_at: Option<DateTime<Utc>>) -> String {
    refreshed_at.map_or_else(
        || "never".to_string(),
        |ts| ts.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

/// Text content of the summary image, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryLayout {
    pub title: String,
    pub total_line: String,
    pub refreshed_line: String,
    pub top_heading: String,
    pub top_lines: Vec<String>,
}

impl SummaryLayout {
    pub fn new(countries: &[Country], refreshed_at: Option<DateTime<Utc>>) -> Self {
        let top_lines = top_by_gdp(countries, TOP_COUNT)
            .iter()
            .enumerate()
            .map(|(i, (c, gdp))| format!("{}. {}: {}", i + 1, c.name, format_gdp(*gdp)))
            .collect();

        Self {
            title: "Country Statistics Summary".to_string(),
            total_line: format!("Total Countries: {}", countries.len()),
            refreshed_line: format!("Last Refreshed: {}", format_timestamp(refreshed_at)),
            top_heading: format!("Top {TOP_COUNT} Countries by Estimated GDP:"),
            top_lines,
        }
    }

    pub fn to_svg(&self) -> String {
        let mut svg = format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">
<rect width="100%" height="100%" fill="#ffffff"/>
<g font-family="{FONT_FAMILY}">
<text x="50" y="62" font-size="32" font-weight="bold" fill="#2c3e50">{}</text>
<text x="50" y="124" font-size="24" font-weight="bold" fill="#34495e">{}</text>
<text x="50" y="158" font-size="18" fill="#7f8c8d">{}</text>
<text x="50" y="224" font-size="24" font-weight="bold" fill="#2c3e50">{}</text>
"##,
            escape_xml(&self.title),
            escape_xml(&self.total_line),
            escape_xml(&self.refreshed_line),
            escape_xml(&self.top_heading),
        );

        if self.top_lines.is_empty() {
            svg.push_str(
                r##"<text x="70" y="268" font-size="18" fill="#95a5a6">No GDP estimates available</text>
"##,
            );
        }
        for (i, line) in self.top_lines.iter().enumerate() {
            let y = 268 + i * 40;
            svg.push_str(&format!(
                r##"<text x="70" y="{y}" font-size="18" fill="#34495e">{}</text>
"##,
                escape_xml(line)
            ));
        }

        svg.push_str("</g>\n</svg>\n");
        svg
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn font_database() -> Arc<fontdb::Database> {
    static FONTS: OnceLock<Arc<fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            debug!("Loaded {} system font faces", db.len());
            Arc::new(db)
        })
        .clone()
}

fn rasterize(svg: &str) -> Result<Vec<u8>> {
    let mut options = Options::default();
    options.fontdb = font_database();

    let tree = Tree::from_str(svg, &options).context("Failed to parse summary SVG")?;
    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
        .context("Failed to create pixmap")?;

    resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

    pixmap.encode_png().context("Failed to encode PNG")
}

/// Renders the summary PNG for `countries`.
pub fn render_summary(
    countries: &[Country],
    refreshed_at: Option<DateTime<Utc>>,
) -> Result<Vec<u8>> {
    let layout = SummaryLayout::new(countries, refreshed_at);
    debug!(?layout, "Rendering summary image");
    rasterize(&layout.to_svg())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn country(name: &str, gdp: Option<f64>) -> Country {
        Country {
            name: name.to_string(),
            capital: None,
            region: None,
            population: Some(1_000),
            currency_code: None,
            exchange_rate: None,
            estimated_gdp: gdp,
            flag_url: None,
            last_refreshed_at: Utc::now(),
        }
    }

    #[test]
    fn test_top_by_gdp_excludes_missing() {
        let countries = vec![
            country("A", Some(10.0)),
            country("B", None),
            country("C", Some(30.0)),
            country("D", None),
            country("E", Some(20.0)),
        ];
        let top = top_by_gdp(&countries, TOP_COUNT);
        let names: Vec<&str> = top.iter().map(|(c, _)| c.name.as_str()).collect();
        assert_eq!(names, vec!["C", "E", "A"]);
        let gdps: Vec<f64> = top.iter().map(|(_, gdp)| *gdp).collect();
        assert_eq!(gdps, vec![30.0, 20.0, 10.0]);
    }

    #[test]
    fn test_top_by_gdp_caps_at_n() {
        let countries: Vec<Country> = (0..8)
            .map(|i| country(&format!("C{i}"), Some(i as f64)))
            .collect();
        let top = top_by_gdp(&countries, TOP_COUNT);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0].0.name, "C7");
        assert_eq!(top[4].0.name, "C3");
    }

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits("0"), "0");
        assert_eq!(group_digits("999"), "999");
        assert_eq!(group_digits("1000"), "1,000");
        assert_eq!(group_digits("1234567"), "1,234,567");
    }

    #[test]
    fn test_format_gdp() {
        assert_eq!(format_gdp(0.0), "$0.00");
        assert_eq!(format_gdp(999.999), "$1,000.00");
        assert_eq!(format_gdp(1234567.891), "$1,234,567.89");
        assert_eq!(format_gdp(100.5), "$100.50");
    }

    #[test]
    fn test_layout_lines() {
        let ts = Utc.with_ymd_and_hms(2025, 10, 22, 14, 5, 9).unwrap();
        let countries = vec![country("Nigeria", Some(1_500_000.0)), country("Ghana", None)];
        let layout = SummaryLayout::new(&countries, Some(ts));

        assert_eq!(layout.total_line, "Total Countries: 2");
        assert_eq!(layout.refreshed_line, "Last Refreshed: 2025-10-22 14:05:09 UTC");
        assert_eq!(layout.top_lines, vec!["1. Nigeria: $1,500,000.00"]);
    }

    #[test]
    fn test_layout_without_refresh() {
        let layout = SummaryLayout::new(&[], None);
        assert_eq!(layout.total_line, "Total Countries: 0");
        assert_eq!(layout.refreshed_line, "Last Refreshed: never");
        assert!(layout.top_lines.is_empty());
        assert!(layout.to_svg().contains("No GDP estimates available"));
    }

    #[test]
    fn test_svg_escapes_names() {
        let layout = SummaryLayout::new(&[country("Trinidad & Tobago", Some(1.0))], None);
        let svg = layout.to_svg();
        assert!(svg.contains("Trinidad &amp; Tobago"));
        assert!(!svg.contains("Trinidad & Tobago"));
    }

    #[test]
    fn test_render_summary_produces_png() {
        let countries = vec![country("Nigeria", Some(42.0)), country("Chad", None)];
        let png = render_summary(&countries, Some(Utc::now())).unwrap();
        assert!(png.len() > PNG_SIGNATURE.len());
        assert_eq!(&png[..8], &PNG_SIGNATURE);
    }

    #[test]
    fn test_render_summary_empty_store() {
        let png = render_summary(&[], None).unwrap();
        assert_eq!(&png[..8], &PNG_SIGNATURE);
    }
}
