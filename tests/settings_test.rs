use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serial_test::serial;

use ip_tracker::cli::Args;
use ip_tracker::client::{DEFAULT_BASE_URL, DEFAULT_PUBLIC_IP_URL};
use ip_tracker::config::Settings;
use ip_tracker::quota::{DEFAULT_REMAINING, DEFAULT_TTL_SECONDS};

const VARS: [&str; 6] = [
    "IP_TRACKER_BASE_URL",
    "IP_TRACKER_PUBLIC_IP_URL",
    "IP_TRACKER_TIMEOUT_SECS",
    "IP_TRACKER_QUOTA_REMAINING",
    "IP_TRACKER_QUOTA_TTL",
    "IP_TRACKER_HISTORY_PATH",
];

fn clear_env() {
    for var in VARS {
        unsafe { std::env::remove_var(var) };
    }
}

#[test]
#[serial]
fn defaults_without_environment() {
    clear_env();
    let settings = Settings::from_env();
    assert_eq!(settings.base_url, DEFAULT_BASE_URL);
    assert_eq!(settings.public_ip_url, DEFAULT_PUBLIC_IP_URL);
    assert_eq!(settings.timeout, Duration::from_secs(10));
    assert_eq!(settings.quota_remaining, DEFAULT_REMAINING);
    assert_eq!(settings.quota_ttl_seconds, DEFAULT_TTL_SECONDS);
    assert!(settings.history_path.ends_with("ip_history.json"));
}

#[test]
#[serial]
fn environment_overrides_and_bad_values_fall_back() {
    clear_env();
    unsafe {
        std::env::set_var("IP_TRACKER_BASE_URL", "http://localhost:8080/php/");
        std::env::set_var("IP_TRACKER_TIMEOUT_SECS", "3");
        std::env::set_var("IP_TRACKER_QUOTA_REMAINING", "150");
        std::env::set_var("IP_TRACKER_QUOTA_TTL", "not-a-number");
        std::env::set_var("IP_TRACKER_HISTORY_PATH", "/tmp/iptrack/h.json");
    }
    let settings = Settings::from_env();
    clear_env();

    assert_eq!(settings.base_url, "http://localhost:8080/php/");
    assert_eq!(settings.timeout, Duration::from_secs(3));
    assert_eq!(settings.quota_remaining, 150);
    assert_eq!(settings.quota_ttl_seconds, DEFAULT_TTL_SECONDS);
    assert_eq!(settings.history_path, PathBuf::from("/tmp/iptrack/h.json"));

    let tracker = settings.quota_tracker();
    assert_eq!(tracker.state().remaining, 150);
}

#[test]
#[serial]
fn cli_flags_win_over_environment() {
    clear_env();
    unsafe { std::env::set_var("IP_TRACKER_TIMEOUT_SECS", "3") };
    let args = Args::try_parse_from([
        "ip-tracker",
        "--history-file",
        "/tmp/elsewhere.json",
        "--timeout",
        "20",
    ])
    .unwrap();
    let settings = Settings::resolve(&args);
    clear_env();

    assert_eq!(settings.history_path, PathBuf::from("/tmp/elsewhere.json"));
    assert_eq!(settings.timeout, Duration::from_secs(20));
}
