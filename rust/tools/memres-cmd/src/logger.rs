//! Diagnostic logger writing `log` records to stderr.

use log::{LevelFilter, Log, Metadata, Record};

pub struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

/// Installs the logger; `verbose` counts `-v` flags (0: warnings, 1: debug, 2+: trace).
pub fn init(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}
