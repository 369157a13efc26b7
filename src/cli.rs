use std::path::PathBuf;

use crate::client::{DEFAULT_FIELDS, DEFAULT_LANG};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportArg {
    Json,
    Csv,
}

#[derive(clap::Parser, Debug)]
#[command(name = "ip-tracker", version, about = "Look up IP geolocation and keep a local history")]
pub struct Args {
    /// IPv4 address to look up. Omit to look up your own public address
    pub address: Option<String>,

    /// Response language: en|de|es|pt-BR|fr|ja|zh-CN|ru
    #[arg(long, default_value = DEFAULT_LANG)]
    pub lang: String,

    /// Numeric field mask selecting which fields the service returns
    #[arg(long, default_value_t = DEFAULT_FIELDS)]
    pub fields: u64,

    /// History log location (defaults to the platform data directory)
    #[arg(long, env = "IP_TRACKER_HISTORY_PATH")]
    pub history_file: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Emit the lookup result as JSON instead of the colored report
    #[arg(long)]
    pub json: bool,

    /// List map links for the looked-up location
    #[arg(long)]
    pub links: bool,

    /// Summarize the lookup history (countries, recent lookups)
    #[arg(long)]
    pub analyze: bool,

    /// Export the full history: json|csv
    #[arg(long, value_enum)]
    pub export: Option<ExportArg>,

    /// Export destination (defaults to ip_history_export.<ext>)
    #[arg(long, requires = "export")]
    pub export_path: Option<PathBuf>,

    /// Start a fresh history log if the existing one cannot be read
    #[arg(long)]
    pub reset_history: bool,

    /// Skip the lookup and only work with the stored history
    #[arg(long)]
    pub no_lookup: bool,

    /// Debug mode: verbose logging on stderr
    #[arg(long, env = "IP_TRACKER_DEBUG")]
    pub debug: bool,
}

impl Args {
    pub fn parse() -> Self {
        <Args as clap::Parser>::parse()
    }
}
