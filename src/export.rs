//! History export to JSON or CSV files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::ExportArg;
use crate::models::HistoryEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn default_path(self) -> PathBuf {
        PathBuf::from(format!("ip_history_export.{}", self.extension()))
    }
}

impl From<ExportArg> for ExportFormat {
    fn from(arg: ExportArg) -> Self {
        match arg {
            ExportArg::Json => ExportFormat::Json,
            ExportArg::Csv => ExportFormat::Csv,
        }
    }
}

/// Flat row; CSV cannot hold `DateTime` or nested options directly.
#[derive(Serialize)]
struct CsvRow<'a> {
    timestamp: String,
    ip: &'a str,
    country: Option<&'a str>,
    city: Option<&'a str>,
    isp: Option<&'a str>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl<'a> From<&'a HistoryEntry> for CsvRow<'a> {
    fn from(e: &'a HistoryEntry) -> Self {
        CsvRow {
            timestamp: e.timestamp.to_rfc3339(),
            ip: &e.ip,
            country: e.country.as_deref(),
            city: e.city.as_deref(),
            isp: e.isp.as_deref(),
            lat: e.lat,
            lon: e.lon,
        }
    }
}

/// Write every entry to `path`. Returns `Ok(false)` and writes nothing for an empty history.
pub fn export_history(entries: &[HistoryEntry], format: ExportFormat, path: &Path) -> Result<bool> {
    if entries.is_empty() {
        return Ok(false);
    }
    let file = File::create(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    match format {
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, entries).context("Failed to write JSON")?;
            writer.write_all(b"\n")?;
        }
        ExportFormat::Csv => {
            let mut csv_writer = csv::WriterBuilder::new().from_writer(&mut writer);
            for entry in entries {
                csv_writer
                    .serialize(CsvRow::from(entry))
                    .context("Failed to write CSV row")?;
            }
            csv_writer.flush().context("Failed to flush CSV")?;
        }
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush export file: {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use tempfile::TempDir;

    fn sample() -> Vec<HistoryEntry> {
        vec![
            HistoryEntry {
                timestamp: Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
                ip: "8.8.8.8".into(),
                country: Some("United States".into()),
                city: Some("Mountain View".into()),
                isp: Some("Google LLC, Inc".into()),
                lat: Some(37.4056),
                lon: Some(-122.0775),
            },
            HistoryEntry {
                timestamp: Local.with_ymd_and_hms(2024, 5, 2, 8, 30, 0).unwrap(),
                ip: "1.1.1.1".into(),
                country: None,
                city: None,
                isp: None,
                lat: None,
                lon: None,
            },
        ]
    }

    #[test]
    fn csv_has_header_and_quotes_commas() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        assert!(export_history(&sample(), ExportFormat::Csv, &path).unwrap());
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "timestamp,ip,country,city,isp,lat,lon");
        assert!(lines[1].contains("\"Google LLC, Inc\""));
        assert!(lines[2].ends_with(",1.1.1.1,,,,,"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn json_export_reads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        assert!(export_history(&sample(), ExportFormat::Json, &path).unwrap());
        let back: Vec<HistoryEntry> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn empty_history_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        assert!(!export_history(&[], ExportFormat::Json, &path).unwrap());
        assert!(!path.exists());
        assert_eq!(ExportFormat::Csv.default_path(), PathBuf::from("ip_history_export.csv"));
    }
}
