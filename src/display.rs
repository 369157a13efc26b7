use std::env;

#[cfg(feature = "colors")]
use owo_colors::OwoColorize;

use crate::analysis::HistorySummary;
use crate::error::LookupError;
use crate::maps::MapLinks;
use crate::models::LookupResult;

const NA: &str = "N/A";
const RULE_WIDTH: usize = 50;
const DEFAULT_CHART_WIDTH: usize = 80;

fn or_na(v: Option<&str>) -> &str {
    v.unwrap_or(NA)
}

fn coord(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_else(|| NA.to_string())
}

/// What a piece of report text is, mapped to a color when color is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Heading,
    Label,
    Failure,
    ErrorTag,
}

fn color_enabled() -> bool {
    cfg!(feature = "colors") && env::var_os("NO_COLOR").is_none()
}

fn paint(text: &str, tone: Tone) -> String {
    styled(text, tone, color_enabled())
}

#[cfg(feature = "colors")]
fn styled(text: &str, tone: Tone, enabled: bool) -> String {
    if !enabled {
        return text.to_string();
    }
    match tone {
        Tone::Heading => text.bold().bright_cyan().to_string(),
        Tone::Label => text.bright_black().to_string(),
        Tone::Failure => text.red().to_string(),
        Tone::ErrorTag => text.red().bold().to_string(),
    }
}

#[cfg(not(feature = "colors"))]
fn styled(text: &str, _tone: Tone, _enabled: bool) -> String {
    text.to_string()
}

fn heading(text: &str) -> String {
    paint(text, Tone::Heading)
}

fn label(text: &str) -> String {
    paint(&format!("{text:<14}"), Tone::Label)
}

/// Location section lines; empty when the lookup did not succeed.
pub fn location_lines(result: &LookupResult) -> Vec<String> {
    if !result.is_success() {
        return Vec::new();
    }
    vec![
        format!(
            "{}{} ({})",
            label("Country"),
            or_na(result.country.as_deref()),
            or_na(result.country_code.as_deref())
        ),
        format!(
            "{}{} ({})",
            label("Region"),
            or_na(result.region_name.as_deref()),
            or_na(result.region.as_deref())
        ),
        format!("{}{}", label("City"), or_na(result.city.as_deref())),
        format!("{}{}", label("Postal code"), or_na(result.zip.as_deref())),
        format!(
            "{}{}, {}",
            label("Coordinates"),
            coord(result.lat),
            coord(result.lon)
        ),
        format!("{}{}", label("Timezone"), or_na(result.timezone.as_deref())),
    ]
}

/// Network section lines; empty when the lookup did not succeed.
pub fn network_lines(result: &LookupResult) -> Vec<String> {
    if !result.is_success() {
        return Vec::new();
    }
    vec![
        format!("{}{}", label("ISP"), or_na(result.isp.as_deref())),
        format!("{}{}", label("Organization"), or_na(result.org.as_deref())),
        format!("{}{}", label("AS"), or_na(result.as_name.as_deref())),
        format!("{}{}", label("IP address"), or_na(result.query.as_deref())),
    ]
}

pub fn print_report(result: &LookupResult) {
    println!("{}", "=".repeat(RULE_WIDTH));
    if !result.is_success() {
        let msg = format!(
            "Lookup failed for {}: {}",
            or_na(result.query.as_deref()),
            result.message.as_deref().unwrap_or("no details")
        );
        println!("{}", paint(&msg, Tone::Failure));
        println!("{}", "=".repeat(RULE_WIDTH));
        return;
    }
    println!("{}", heading("Location"));
    for line in location_lines(result) {
        println!("  {line}");
    }
    println!();
    println!("{}", heading("Network"));
    for line in network_lines(result) {
        println!("  {line}");
    }
    println!("{}", "=".repeat(RULE_WIDTH));
}

pub fn print_map_links(result: &LookupResult) {
    let Some(links) = MapLinks::from_result(result) else {
        println!("No coordinates available for map links");
        return;
    };
    println!("{}", heading("Map links"));
    for (name, url) in links.labelled() {
        println!("  {}{}", label(name), url);
    }
}

/// Machine-readable result, with map links when coordinates are present.
pub fn build_json_output(result: &LookupResult) -> serde_json::Value {
    serde_json::json!({
        "result": result,
        "map_links": MapLinks::from_result(result),
    })
}

pub fn print_json_output(result: &LookupResult) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&build_json_output(result))?);
    Ok(())
}

fn chart_width() -> usize {
    terminal_size::terminal_size()
        .map(|(terminal_size::Width(w), _)| w as usize)
        .unwrap_or(DEFAULT_CHART_WIDTH)
}

/// Horizontal bar chart rows, bars scaled to `width` columns overall.
pub fn country_chart(summary: &HistorySummary, width: usize) -> Vec<String> {
    let Some(max) = summary.countries.iter().map(|(_, n)| *n).max() else {
        return Vec::new();
    };
    let name_width = summary
        .countries
        .iter()
        .map(|(c, _)| c.chars().count())
        .max()
        .unwrap_or(0)
        .min(24);
    // name column, separators and the trailing count
    let bar_room = width.saturating_sub(name_width + 10).max(1);
    summary
        .countries
        .iter()
        .map(|(country, n)| {
            let len = ((*n as f64 / max as f64) * bar_room as f64).round().max(1.0) as usize;
            let name: String = country.chars().take(name_width).collect();
            format!("{name:<name_width$} │{} {n}", "█".repeat(len))
        })
        .collect()
}

pub fn print_history_summary(summary: &HistorySummary) {
    if summary.is_empty() {
        println!("History is empty");
        return;
    }
    println!("{}", heading(&format!("Lookups by country ({} total)", summary.total)));
    for row in country_chart(summary, chart_width()) {
        println!("  {row}");
    }
    if let Some((min_lat, min_lon, max_lat, max_lon)) = summary.bounds() {
        println!();
        println!(
            "  {} located lookups spanning lat {min_lat:.2}..{max_lat:.2}, lon {min_lon:.2}..{max_lon:.2}",
            summary.points.len()
        );
    }
    println!();
    println!("{}", heading("Recent lookups"));
    for entry in &summary.recent {
        println!(
            "  - {}: {} ({}, {})",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.ip,
            or_na(entry.city.as_deref()),
            or_na(entry.country.as_deref())
        );
    }
}

/// One-line description of a failure for the console.
pub fn print_error(err: &LookupError) {
    let msg = match err {
        LookupError::RateLimitExceeded { wait_seconds } => {
            format!("Rate limit reached, try again in {wait_seconds:.1} seconds")
        }
        other => other.to_string(),
    };
    eprintln!("{} {msg}", paint("error:", Tone::ErrorTag));
}
