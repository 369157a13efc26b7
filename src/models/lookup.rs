use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::phpser::PhpValue;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LookupStatus {
    Success,
    Fail,
}

/// Decoded answer of the lookup endpoint for one address.
///
/// When `status` is [`LookupStatus::Fail`] every geolocation and network field is
/// `None`; only `query` and `message` may be set.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LookupResult {
    pub query: Option<String>,
    pub status: LookupStatus,
    pub continent: Option<String>,
    pub continent_code: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub region: Option<String>,
    pub region_name: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub timezone: Option<String>,
    pub isp: Option<String>,
    pub org: Option<String>,
    #[serde(rename = "as")]
    pub as_name: Option<String>,
    pub message: Option<String>,
}

fn text(payload: &PhpValue, key: &str) -> Option<String> {
    payload
        .get(key)
        .and_then(PhpValue::as_text)
        .filter(|s| !s.is_empty())
}

fn number(payload: &PhpValue, key: &str) -> Option<f64> {
    payload.get(key).and_then(PhpValue::as_f64)
}

impl LookupResult {
    /// Extract a typed result from a decoded payload map.
    pub fn from_payload(payload: &PhpValue) -> Result<Self, DecodeError> {
        if !matches!(payload, PhpValue::Map(_)) {
            return Err(DecodeError::NotAMap);
        }
        let status = match payload.get("status") {
            Some(PhpValue::Str(s)) if s == "success" => LookupStatus::Success,
            Some(PhpValue::Str(s)) if s == "fail" => LookupStatus::Fail,
            _ => return Err(DecodeError::MissingStatus),
        };
        let query = text(payload, "query");
        let message = text(payload, "message");

        if status == LookupStatus::Fail {
            return Ok(LookupResult::failed(query, message));
        }

        Ok(LookupResult {
            query,
            status,
            continent: text(payload, "continent"),
            continent_code: text(payload, "continentCode"),
            country: text(payload, "country"),
            country_code: text(payload, "countryCode"),
            region: text(payload, "region"),
            region_name: text(payload, "regionName"),
            city: text(payload, "city"),
            zip: text(payload, "zip"),
            lat: number(payload, "lat"),
            lon: number(payload, "lon"),
            timezone: text(payload, "timezone"),
            isp: text(payload, "isp"),
            org: text(payload, "org"),
            as_name: text(payload, "as"),
            message,
        })
    }

    pub fn failed(query: Option<String>, message: Option<String>) -> Self {
        LookupResult {
            query,
            status: LookupStatus::Fail,
            continent: None,
            continent_code: None,
            country: None,
            country_code: None,
            region: None,
            region_name: None,
            city: None,
            zip: None,
            lat: None,
            lon: None,
            timezone: None,
            isp: None,
            org: None,
            as_name: None,
            message,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == LookupStatus::Success
    }

    /// Both coordinates, when the service returned them.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}
