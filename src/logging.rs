//! Explicit logging sink passed into every job.
//!
//! The CLI installs `env_logger` once at startup; jobs never reach for a
//! global logger configuration themselves. Each job receives a [`LogSink`]
//! that carries its own level filter and a bracketed scope prefix such as
//! `[train:0a1b2c:thumb]`, and forwards records to the `log` facade.

use std::fmt;
use std::io::Write;

use clap::ValueEnum;
use log::{Level, LevelFilter};

const TARGET: &str = "oidlabel";

/// Log level choices accepted on the command line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Critical,
    Error,
    Warning,
    Info,
    Debug,
}

impl LogLevel {
    /// Maps to the `log` crate filter. `log` has no critical level, so
    /// CRITICAL and ERROR both keep only errors.
    pub fn to_filter(self) -> LevelFilter {
        match self {
            LogLevel::Critical | LogLevel::Error => LevelFilter::Error,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
        }
    }
}

/// Installs `env_logger` as the `log` backend.
///
/// Output format is `<timestamp>\t<LEVEL>\t<message>`.
pub fn init(level: LogLevel) {
    let _ = env_logger::Builder::new()
        .filter_level(level.to_filter())
        .format(|buf, record| {
            writeln!(
                buf,
                "{}\t{}\t{}",
                buf.timestamp(),
                record.level(),
                record.args()
            )
        })
        .try_init();
}

/// A level-filtered, scoped handle on the log stream.
#[derive(Clone, Debug)]
pub struct LogSink {
    level: LevelFilter,
    scope: Vec<String>,
}

impl LogSink {
    pub fn new(level: LevelFilter) -> Self {
        Self {
            level,
            scope: Vec::new(),
        }
    }

    /// A sink that drops everything. Used by tests and library callers that
    /// do not want log output.
    pub fn silent() -> Self {
        Self::new(LevelFilter::Off)
    }

    /// Returns a child sink with one more scope segment.
    pub fn scoped(&self, segment: impl fmt::Display) -> Self {
        let mut scope = self.scope.clone();
        scope.push(segment.to_string());
        Self {
            level: self.level,
            scope,
        }
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    pub fn enabled(&self, level: Level) -> bool {
        level <= self.level
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Error, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Warn, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Info, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Debug, args);
    }

    fn emit(&self, level: Level, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        if self.scope.is_empty() {
            log::log!(target: TARGET, level, "{}", args);
        } else {
            log::log!(target: TARGET, level, "[{}] {}", self.scope.join(":"), args);
        }
    }

    /// The rendered scope prefix, without brackets.
    pub fn scope(&self) -> String {
        self.scope.join(":")
    }
}
