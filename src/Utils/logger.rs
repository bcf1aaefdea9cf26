//! Terminal logging for the binary and the examples.
//!
//! The level is taken from the `KIREACT_LOG` environment variable (`error`, `warn`, `info`, `debug`,
//! `trace`, `off`), `info` when it is not set or not recognized.
use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

pub const LOG_ENV: &str = "KIREACT_LOG";

/// level named by the string, `Info` for anything unknown
pub fn level_from(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|v| v.trim().parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info)
}

/// Installs the terminal logger. A second call is harmless: the logger that is already installed
/// stays in place.
pub fn init_logger() {
    let level = level_from(std::env::var(LOG_ENV).ok().as_deref());
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Debug)
        .build();
    if TermLogger::init(level, config, TerminalMode::Mixed, ColorChoice::Auto).is_err() {
        log::debug!("logger already initialized");
    }
}
