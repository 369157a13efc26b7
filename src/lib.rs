//! # IP Tracker
//!
//! A personal IP geolocation lookup utility with a local lookup history.
//!
//! ## Overview
//!
//! The core is a rate-limited lookup client with write-through history
//! persistence:
//! - [`quota::QuotaTracker`] mirrors the allowance advertised by the lookup
//!   endpoint and refuses to send while it is spent
//! - [`client::LookupClient`] resolves the target address, issues the query and
//!   decodes the endpoint's serialized-map payload ([`phpser`])
//! - [`history::HistoryStore`] keeps the append-only log of successful lookups
//! - [`service::LookupService`] composes the three
//!
//! Everything else (report, map links, history summary, export) only reads
//! [`models::LookupResult`] and [`models::HistoryEntry`] values.
//!
//! ## Features
//!
//! - `colors` (default): Enables terminal color output via owo-colors

/// History aggregation for the summary printout
pub mod analysis;

/// Command-line argument parsing
pub mod cli;

/// Remote lookup client and HTTP transport
pub mod client;

/// Settings resolved from environment and CLI
pub mod config;

/// Console and JSON output
pub mod display;

/// Typed failures of the lookup core
pub mod error;

/// History export to JSON and CSV
pub mod export;

/// Append-only lookup history log
pub mod history;

/// Map-service links
pub mod maps;

/// Data models for lookup results, history entries and quota state
pub mod models;

/// Decoder for the lookup endpoint's serialized-map format
pub mod phpser;

/// Request quota tracking
pub mod quota;

/// Lookup orchestration
pub mod service;

/// Logging setup and small helpers
pub mod utils;

pub use error::{DecodeError, LookupError};
