use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

use super::lookup::LookupResult;

/// One recorded successful lookup, as persisted in the history log.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Local>,
    pub ip: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub isp: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl HistoryEntry {
    /// Build an entry from a successful result. Failed lookups are never recorded.
    pub fn from_result(result: &LookupResult, timestamp: DateTime<Local>) -> Option<Self> {
        if !result.is_success() {
            return None;
        }
        Some(HistoryEntry {
            timestamp,
            ip: result.query.clone().unwrap_or_default(),
            country: result.country.clone(),
            city: result.city.clone(),
            isp: result.isp.clone(),
            lat: result.lat,
            lon: result.lon,
        })
    }
}

/// Accepts RFC 3339 timestamps and offset-less ISO-8601 ones (read as local time).
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Local>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return Ok(dt.with_timezone(&Local));
    }
    let naive = NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(serde::de::Error::custom)?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| serde::de::Error::custom(format!("nonexistent local time: {s}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn reads_naive_and_offset_timestamps() {
        let naive: HistoryEntry = serde_json::from_str(
            r#"{"timestamp":"2024-03-01T10:15:30.123456","ip":"8.8.8.8","country":"United States","city":null,"isp":"Google LLC","lat":37.4,"lon":-122.0}"#,
        )
        .unwrap();
        assert_eq!(naive.timestamp.year(), 2024);
        assert_eq!(naive.timestamp.hour(), 10);
        assert_eq!(naive.city, None);

        let offset: HistoryEntry =
            serde_json::from_str(r#"{"timestamp":"2024-03-01T10:15:30Z","ip":"1.1.1.1"}"#)
                .unwrap();
        assert_eq!(offset.ip, "1.1.1.1");
        assert_eq!(offset.lat, None);
    }

    #[test]
    fn rejects_garbage_timestamp() {
        let err = serde_json::from_str::<HistoryEntry>(r#"{"timestamp":"yesterday","ip":"1.1.1.1"}"#);
        assert!(err.is_err());
    }
}
