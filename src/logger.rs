use log::{Level, LevelFilter, Metadata, Record};
use std::io::Write;

static LOGGER: ConsoleLogger = ConsoleLogger;

/// Environment variable holding the maximum log level.
pub const LEVEL_VAR: &str = "SDIMG_LOG";

/// Installs the console logger.
///
/// The level comes from [`LEVEL_VAR`], falling back to `info` when it is unset or invalid.
pub fn init() {
    let level = std::env::var(LEVEL_VAR)
        .ok()
        .and_then(|value| value.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);

    // Only fails if a logger is already installed, which is fine.
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

struct ConsoleLogger;

impl ConsoleLogger {
    const fn severity(level: Level) -> &'static str {
        match level {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO ",
            Level::Warn => "WARN ",
            Level::Error => "ERROR",
        }
    }
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let mut stderr = std::io::stderr().lock();
            // Logging is best-effort.
            let _ = writeln!(
                stderr,
                "[{}] {}: {}",
                Self::severity(record.level()),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}
