//! # Lookup Client
//!
//! Issues the remote geolocation query, decodes the serialized-map payload and
//! keeps the [`QuotaTracker`] in step with the quota headers of every completed
//! exchange.

use std::time::Duration;

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::error::LookupError;
use crate::models::LookupResult;
use crate::phpser;
use crate::quota::QuotaTracker;

pub const DEFAULT_BASE_URL: &str = "http://ip-api.com/php/";
pub const DEFAULT_PUBLIC_IP_URL: &str = "https://api.ipify.org";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Field mask selecting everything the report shows, plus status/message/query.
pub const DEFAULT_FIELDS: u64 = 3_207_167;
pub const DEFAULT_LANG: &str = "en";

const REMAINING_HEADER: &str = "X-Rl";
const TTL_HEADER: &str = "X-Ttl";
const USER_AGENT: &str = concat!("ip-tracker/", env!("CARGO_PKG_VERSION"));

static LANG_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{2,3}(-[A-Za-z]{2,4})?$").unwrap());

static IPV4_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}$").unwrap());

/// True iff `address` is a dotted-decimal IPv4 address (four octets, each 0-255).
pub fn validate_address(address: &str) -> bool {
    IPV4_SHAPE.is_match(address)
        && address
            .split('.')
            .all(|octet| octet.parse::<u16>().is_ok_and(|v| v <= 255))
}

/// A completed HTTP exchange, whatever its status code.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Failure to complete an exchange at all (DNS, connect, TLS, timeout, I/O).
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Blocking HTTP GET. Implementations must return non-2xx statuses as responses, not errors.
pub trait HttpTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

/// Production transport backed by a single `ureq` agent.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        UreqTransport { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

impl HttpTransport for UreqTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let mut response = self
            .agent
            .get(url)
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| TransportError(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Parameters of one lookup. An empty or absent address means "my public address".
#[derive(Debug, Clone)]
pub struct LookupRequest {
    pub address: Option<String>,
    pub lang: String,
    pub fields: u64,
}

impl Default for LookupRequest {
    fn default() -> Self {
        LookupRequest {
            address: None,
            lang: DEFAULT_LANG.to_string(),
            fields: DEFAULT_FIELDS,
        }
    }
}

impl LookupRequest {
    pub fn for_address(address: impl Into<String>) -> Self {
        LookupRequest {
            address: Some(address.into()),
            ..Default::default()
        }
    }
}

pub struct LookupClient<T: HttpTransport = UreqTransport> {
    transport: T,
    base_url: String,
    public_ip_url: String,
    quota: QuotaTracker,
}

impl<T: HttpTransport> LookupClient<T> {
    pub fn new(
        transport: T,
        base_url: impl Into<String>,
        public_ip_url: impl Into<String>,
        quota: QuotaTracker,
    ) -> Self {
        LookupClient {
            transport,
            base_url: base_url.into(),
            public_ip_url: public_ip_url.into(),
            quota,
        }
    }

    pub fn quota(&self) -> &QuotaTracker {
        &self.quota
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Ask the "what is my IP" endpoint for the caller's public address.
    pub fn resolve_public_address(&self) -> Result<String, LookupError> {
        let network = |message: String| LookupError::Network {
            endpoint: self.public_ip_url.clone(),
            message,
        };
        let response = self
            .transport
            .get(&self.public_ip_url)
            .map_err(|e| network(e.to_string()))?;
        if response.status != 200 {
            return Err(network(format!("HTTP {}", response.status)));
        }
        let address = String::from_utf8_lossy(&response.body).trim().to_string();
        if address.is_empty() {
            return Err(network("empty response body".to_string()));
        }
        debug!("resolved public address {address}");
        Ok(address)
    }

    fn lookup_url(&self, address: &str, request: &LookupRequest) -> String {
        let lang = if LANG_TAG.is_match(&request.lang) {
            request.lang.as_str()
        } else {
            warn!("ignoring malformed language {:?}, using {DEFAULT_LANG}", request.lang);
            DEFAULT_LANG
        };
        format!(
            "{}/{}?fields={}&lang={}",
            self.base_url.trim_end_matches('/'),
            address,
            request.fields,
            lang
        )
    }

    /// Quota check, address resolution, request, quota update, decode.
    pub fn fetch(&mut self, request: &LookupRequest) -> Result<LookupResult, LookupError> {
        self.quota.check()?;

        let address = match request.address.as_deref().map(str::trim) {
            None | Some("") => self.resolve_public_address()?,
            Some(a) if validate_address(a) => a.to_string(),
            Some(a) => {
                return Err(LookupError::InvalidAddress {
                    address: a.to_string(),
                });
            }
        };

        let url = self.lookup_url(&address, request);
        debug!("GET {url}");
        let response = self
            .transport
            .get(&url)
            .map_err(|e| LookupError::Network {
                endpoint: self.base_url.clone(),
                message: e.to_string(),
            })?;

        let remaining = header_int(&response, REMAINING_HEADER);
        let ttl = header_int(&response, TTL_HEADER);
        let applied_ttl = self.quota.update(remaining, ttl);

        match response.status {
            200 => {}
            429 => {
                return Err(LookupError::RateLimitExceeded {
                    wait_seconds: applied_ttl as f64,
                });
            }
            status => return Err(LookupError::Remote { status }),
        }

        let payload = phpser::from_bytes(&response.body)?;
        let mut result = LookupResult::from_payload(&payload)?;
        // field masks without the query bit omit the echoed address
        if result.query.is_none() {
            result.query = Some(address.clone());
        }
        debug!("decoded {:?} result for {address}", result.status);
        Ok(result)
    }
}

fn header_int(response: &HttpResponse, name: &str) -> Option<i64> {
    let raw = response.header(name)?;
    match raw.trim().parse::<i64>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("ignoring unparseable {name} header: {raw:?}");
            None
        }
    }
}
