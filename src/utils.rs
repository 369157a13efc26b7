use std::io::Write;

use log::LevelFilter;

/// Level used when neither `--debug` nor `RUST_LOG` asks for more.
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Warn;

fn parse_bool_env(var: &str) -> bool {
    if let Ok(val) = std::env::var(var) {
        let trimmed = val.trim();
        trimmed == "1" || trimmed.eq_ignore_ascii_case("true")
    } else {
        false
    }
}

/// Initialize stderr logging. `RUST_LOG` is honoured; `debug` forces debug level for this crate.
pub fn init_logger(debug: bool) -> anyhow::Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(DEFAULT_LOG_LEVEL);
    builder.filter_module("ureq", LevelFilter::Warn);
    builder.filter_module("rustls", LevelFilter::Warn);
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    if debug || parse_bool_env("IP_TRACKER_DEBUG") {
        builder.filter_module("ip_tracker", LevelFilter::Debug);
    }
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} {:<5} {}: {}",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        )
    });
    builder.target(env_logger::Target::Stderr);
    builder.try_init()?;
    Ok(())
}

/// Singular/plural helper for console messages.
pub fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pluralizes() {
        assert_eq!(plural(1, "entry"), "1 entry");
        assert_eq!(plural(3, "lookup"), "3 lookups");
    }
}
