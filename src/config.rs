//! Runtime settings resolved from the environment, then overridden by CLI flags.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

use crate::cli::Args;
use crate::client::{
    DEFAULT_BASE_URL, DEFAULT_PUBLIC_IP_URL, DEFAULT_TIMEOUT_SECS, HttpTransport, LookupClient,
    UreqTransport,
};
use crate::history::DEFAULT_HISTORY_FILE;
use crate::quota::{DEFAULT_REMAINING, DEFAULT_TTL_SECONDS, QuotaTracker};

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub public_ip_url: String,
    pub timeout: Duration,
    pub quota_remaining: i64,
    pub quota_ttl_seconds: i64,
    pub history_path: PathBuf,
}

fn env_string(var: &str) -> Option<String> {
    env::var(var).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn env_parse<T: std::str::FromStr>(var: &str) -> Option<T> {
    env_string(var).and_then(|v| v.parse::<T>().ok())
}

/// `<data dir>/ip-tracker/ip_history.json`, or the working directory when no home exists.
pub fn default_history_path() -> PathBuf {
    ProjectDirs::from("", "", "ip-tracker")
        .map(|dirs| dirs.data_dir().join(DEFAULT_HISTORY_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_FILE))
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            base_url: DEFAULT_BASE_URL.to_string(),
            public_ip_url: DEFAULT_PUBLIC_IP_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            quota_remaining: DEFAULT_REMAINING,
            quota_ttl_seconds: DEFAULT_TTL_SECONDS,
            history_path: default_history_path(),
        }
    }
}

impl Settings {
    /// Defaults overridden by `IP_TRACKER_*` variables; unparseable values are ignored.
    pub fn from_env() -> Self {
        let defaults = Settings::default();
        Settings {
            base_url: env_string("IP_TRACKER_BASE_URL").unwrap_or(defaults.base_url),
            public_ip_url: env_string("IP_TRACKER_PUBLIC_IP_URL")
                .unwrap_or(defaults.public_ip_url),
            timeout: env_parse::<u64>("IP_TRACKER_TIMEOUT_SECS")
                .filter(|&s| s > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            quota_remaining: env_parse("IP_TRACKER_QUOTA_REMAINING")
                .unwrap_or(defaults.quota_remaining),
            quota_ttl_seconds: env_parse::<i64>("IP_TRACKER_QUOTA_TTL")
                .filter(|&s| s >= 0)
                .unwrap_or(defaults.quota_ttl_seconds),
            history_path: env_string("IP_TRACKER_HISTORY_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.history_path),
        }
    }

    /// Environment settings with command-line overrides applied.
    pub fn resolve(args: &Args) -> Self {
        let mut settings = Settings::from_env();
        if let Some(path) = &args.history_file {
            settings.history_path = path.clone();
        }
        if let Some(secs) = args.timeout.filter(|&s| s > 0) {
            settings.timeout = Duration::from_secs(secs);
        }
        settings
    }

    pub fn quota_tracker(&self) -> QuotaTracker {
        QuotaTracker::new(self.quota_remaining, self.quota_ttl_seconds)
    }

    pub fn client_with<T: HttpTransport>(&self, transport: T) -> LookupClient<T> {
        LookupClient::new(
            transport,
            self.base_url.clone(),
            self.public_ip_url.clone(),
            self.quota_tracker(),
        )
    }

    pub fn client(&self) -> LookupClient<UreqTransport> {
        self.client_with(UreqTransport::new(self.timeout))
    }
}
