//! # Analysis Module
//!
//! Aggregates over the history log for the summary printout.

use std::collections::HashMap;

use crate::models::HistoryEntry;

pub const RECENT_LIMIT: usize = 5;
const UNKNOWN_COUNTRY: &str = "Unknown";

#[derive(Debug, Clone, PartialEq)]
pub struct HistorySummary {
    pub total: usize,
    /// Lookups per country, most frequent first, ties broken by name.
    pub countries: Vec<(String, usize)>,
    /// `(lat, lon)` of every entry that has both.
    pub points: Vec<(f64, f64)>,
    /// The last few entries, oldest first.
    pub recent: Vec<HistoryEntry>,
}

impl HistorySummary {
    pub fn from_entries(entries: &[HistoryEntry]) -> Self {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for entry in entries {
            let country = entry
                .country
                .as_deref()
                .filter(|c| !c.is_empty())
                .unwrap_or(UNKNOWN_COUNTRY);
            *counts.entry(country).or_default() += 1;
        }
        let mut countries: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(country, n)| (country.to_string(), n))
            .collect();
        countries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let points = entries
            .iter()
            .filter_map(|e| Some((e.lat?, e.lon?)))
            .collect();

        let recent = entries[entries.len().saturating_sub(RECENT_LIMIT)..].to_vec();

        HistorySummary {
            total: entries.len(),
            countries,
            points,
            recent,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Bounding box `(min_lat, min_lon, max_lat, max_lon)` of the recorded points.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let (first, rest) = self.points.split_first()?;
        Some(rest.iter().fold(
            (first.0, first.1, first.0, first.1),
            |(min_lat, min_lon, max_lat, max_lon), &(lat, lon)| {
                (
                    min_lat.min(lat),
                    min_lon.min(lon),
                    max_lat.max(lat),
                    max_lon.max(lon),
                )
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn entry(ip: &str, country: Option<&str>, coords: Option<(f64, f64)>) -> HistoryEntry {
        HistoryEntry {
            timestamp: Local::now(),
            ip: ip.to_string(),
            country: country.map(str::to_string),
            city: None,
            isp: None,
            lat: coords.map(|c| c.0),
            lon: coords.map(|c| c.1),
        }
    }

    #[test]
    fn counts_countries_by_frequency() {
        let entries = vec![
            entry("1.1.1.1", Some("Australia"), Some((-33.0, 151.0))),
            entry("8.8.8.8", Some("United States"), Some((37.4, -122.0))),
            entry("8.8.4.4", Some("United States"), None),
            entry("9.9.9.9", None, None),
            entry("4.4.4.4", Some("Germany"), Some((50.1, 8.6))),
        ];
        let summary = HistorySummary::from_entries(&entries);
        assert_eq!(summary.total, 5);
        assert_eq!(
            summary.countries,
            vec![
                ("United States".to_string(), 2),
                ("Australia".to_string(), 1),
                ("Germany".to_string(), 1),
                ("Unknown".to_string(), 1),
            ]
        );
        assert_eq!(summary.points.len(), 3);
        assert_eq!(summary.bounds(), Some((-33.0, -122.0, 50.1, 151.0)));
    }

    #[test]
    fn recent_keeps_last_five_in_order() {
        let entries: Vec<_> = (0..8)
            .map(|i| entry(&format!("10.0.0.{i}"), Some("X"), None))
            .collect();
        let summary = HistorySummary::from_entries(&entries);
        let ips: Vec<_> = summary.recent.iter().map(|e| e.ip.as_str()).collect();
        assert_eq!(ips, ["10.0.0.3", "10.0.0.4", "10.0.0.5", "10.0.0.6", "10.0.0.7"]);
    }

    #[test]
    fn empty_history() {
        let summary = HistorySummary::from_entries(&[]);
        assert!(summary.is_empty());
        assert!(summary.recent.is_empty());
        assert_eq!(summary.bounds(), None);
    }
}
