/*!
 * Process logger.
 *
 * Coloured, timestamped lines on stderr, optionally mirrored without colour
 * to an append-only log file.
 */

use anyhow::{Context, Result, anyhow};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

static LOG_FILE: OnceCell<LogFile> = OnceCell::new();

/// Append-only log file
#[derive(Debug)]
pub struct LogFile {
    file: Mutex<File>,
}

impl LogFile {
    /// Open `path` for appending, creating it and its directory if needed
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        Ok(Self { file: Mutex::new(file) })
    }

    /// Write one line; write failures are dropped
    pub fn append(&self, line: &str) {
        let _ = writeln!(self.file.lock(), "{}", line);
    }
}

/// Mirror every log line to `path` from now on
pub fn attach_log_file(path: &Path) -> Result<()> {
    let file = LogFile::open(path)?;
    LOG_FILE
        .set(file)
        .map_err(|_| anyhow!("A log file is already attached"))
}

// @struct: Custom logger implementation
pub struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    pub fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger::new(level)))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI colour for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌", "1;31"),
            Level::Warn => ("🚧", "1;33"),
            Level::Info => ("", "1;32"),
            Level::Debug => ("🔍", "1;36"),
            Level::Trace => ("📋", "1;35"),
        }
    }
}

/// Uncoloured line written to the log file
pub fn file_line(timestamp: &str, level: Level, message: &str) -> String {
    format!("{} {:<5} {}", timestamp, level, message)
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now();
            let (emoji, colour) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                colour,
                now.format("%H:%M:%S.%3f"),
                emoji,
                record.args()
            );

            if let Some(file) = LOG_FILE.get() {
                let timestamp = now.format("%Y-%m-%d %H:%M:%S.%3f").to_string();
                file.append(&file_line(&timestamp, record.level(), &record.args().to_string()));
            }
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
        if let Some(file) = LOG_FILE.get() {
            let _ = file.file.lock().flush();
        }
    }
}
