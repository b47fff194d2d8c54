#![deny(missing_docs)]
//! Logging setup shared by the migration binary and the test suites.
//!
//! All library code logs through the `log` facade; this crate owns the
//! `simplelog` backends and nothing else.

use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// Where a migration run writes its log output.
pub enum LogDestination {
    /// Terminal only.
    Terminal,
    /// Terminal plus a log file at the given path.
    Both(&'static str),
}

/// Initializes the global logger for a migration run.
///
/// A failure to create the log file downgrades to terminal-only logging
/// rather than aborting the run.
pub fn initialize(destination: LogDestination) {
    let level = LevelFilter::Info;
    let config = build_config();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let LogDestination::Both(path) = destination {
        match File::create(Path::new(path)) {
            Ok(file) => loggers.push(WriteLogger::new(level, config, file)),
            Err(err) => eprintln!("Warning: could not create log file at {path}: {err}"),
        }
    }

    let _ = CombinedLogger::init(loggers);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
