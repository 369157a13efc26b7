use anyhow::{Context, Result};
#[cfg(feature = "colors")]
use owo_colors::OwoColorize;

use ip_tracker::analysis::HistorySummary;
use ip_tracker::cli::Args;
use ip_tracker::client::LookupRequest;
use ip_tracker::config::Settings;
#[cfg(not(feature = "colors"))]
use ip_tracker::display::color_shim::ColorizeShim;
use ip_tracker::display::{
    print_error, print_history_summary, print_json_output, print_map_links, print_report,
};
use ip_tracker::error::LookupError;
use ip_tracker::export::{ExportFormat, export_history};
use ip_tracker::history::HistoryStore;
use ip_tracker::service::LookupService;
use ip_tracker::utils::{init_logger, plural};

fn open_history(settings: &Settings, reset: bool) -> Result<HistoryStore> {
    match HistoryStore::open(&settings.history_path) {
        Ok(store) => Ok(store),
        Err(err @ LookupError::HistoryLoad { .. }) if reset => {
            log::warn!("{err}; starting a new history log");
            Ok(HistoryStore::reset(&settings.history_path)?)
        }
        Err(err) => Err(err).context("history log is unreadable; rerun with --reset-history to start over"),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.debug)?;

    let settings = Settings::resolve(&args);
    log::debug!("settings: {settings:?}");

    let history = open_history(&settings, args.reset_history)?;
    let mut service = LookupService::new(settings.client(), history);

    let mut failed = false;
    if !args.no_lookup {
        let request = LookupRequest {
            address: args.address.clone(),
            lang: args.lang.clone(),
            fields: args.fields,
        };
        match service.lookup(&request) {
            Ok(result) => {
                if args.json {
                    print_json_output(&result)?;
                } else {
                    print_report(&result);
                    if args.links {
                        println!();
                        print_map_links(&result);
                    }
                }
            }
            Err(err) => {
                print_error(&err);
                failed = true;
            }
        }
    }

    if args.analyze {
        println!();
        print_history_summary(&HistorySummary::from_entries(service.entries()));
    }

    if let Some(arg) = args.export {
        let format = ExportFormat::from(arg);
        let path = args
            .export_path
            .clone()
            .unwrap_or_else(|| format.default_path());
        if export_history(service.entries(), format, &path)? {
            println!(
                "{} Exported {} to {}",
                "✓".green().bold(),
                plural(service.entries().len(), "lookup"),
                path.display()
            );
        } else {
            println!("History is empty, nothing exported");
        }
    }

    if failed {
        std::process::exit(1);
    }
    Ok(())
}
