use env_logger::Builder;
use log::LevelFilter;
use std::env;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
        }
    }
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => log::Level::Trace,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Error => log::Level::Error,
        }
    }
}

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "warn";

/// Log target prefix of everything this crate emits.
const CRATE_TARGET: &str = "wander_client";

/// `RUST_LOG` directives as env_logger understands them; `verbose` adds debug output
/// for this crate on top.
fn logger_builder(rust_log: Option<&str>, verbose: bool) -> Builder {
    let mut builder = Builder::new();
    builder.parse_filters(rust_log.unwrap_or(DEFAULT_FILTER));
    if verbose {
        builder.filter_module(CRATE_TARGET, LevelFilter::Debug);
    }
    builder
}

/// Installs the `env_logger` backend.
pub fn init(verbose: bool) {
    let rust_log = env::var("RUST_LOG").ok();
    let _ = logger_builder(rust_log.as_deref(), verbose)
        .format_timestamp_millis()
        .try_init();
}
