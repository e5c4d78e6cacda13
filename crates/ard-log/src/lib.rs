use std::path::PathBuf;

use chrono::{Datelike, Timelike};
// Re-export logging functions for convenience.
pub use log::*;
use log4rs::{
    append::{console::ConsoleAppender, file::FileAppender},
    config::{Appender, Logger, Root},
    encode::pattern::PatternEncoder,
    Config,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How logging should be set up for the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Logs below this level are discarded.
    pub filter: LevelFilter,
    /// Mirror logs to stdout.
    pub console: bool,
    /// Directory to write a timestamped log file into. `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    /// Route panic messages through the logger.
    pub capture_panics: bool,
}

#[derive(Debug, Error)]
pub enum LogInitError {
    #[error("unable to open log file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid logging configuration: {0}")]
    Config(String),
    #[error("a logger has already been installed")]
    AlreadyInitialized(#[from] SetLoggerError),
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: LevelFilter::Info,
            console: true,
            log_dir: Some(PathBuf::from("./logs")),
            capture_panics: true,
        }
    }
}

/// Initializes logging. Should be called before any other logging functions. Provided
/// `LevelFilter` will remove all logs below the provided level.
///
/// # Panics
/// Panics if logging could not be initialized. Use [`init_with`] to handle the error instead.
pub fn init(filter: LevelFilter) {
    let config = LogConfig {
        filter,
        ..Default::default()
    };

    if let Err(err) = init_with(&config) {
        panic!("unable to initialize logging: {err}");
    }
}

/// Initializes logging from a full configuration.
pub fn init_with(config: &LogConfig) -> Result<(), LogInitError> {
    let mut builder = Config::builder();
    let mut root = Root::builder();

    if config.console {
        let stdout = ConsoleAppender::builder().build();
        builder = builder.appender(Appender::builder().build("stdout", Box::new(stdout)));
        root = root.appender("stdout");
    }

    // Name of the file is based on the current time.
    if let Some(dir) = &config.log_dir {
        let now = chrono::Utc::now();
        let path = dir.join(format!(
            "{} {} {} {} {} {}.txt",
            now.year(),
            now.month(),
            now.day(),
            now.hour(),
            now.minute(),
            now.second()
        ));

        let log_file = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new("{d} - {m}{n}")))
            .build(path)?;

        builder = builder
            .appender(Appender::builder().build("log_file", Box::new(log_file)))
            .logger(
                Logger::builder()
                    .appender("log_file")
                    .additive(false)
                    .build("app::log_file", config.filter),
            );
        root = root.appender("log_file");
    }

    let log_config = builder
        .build(root.build(config.filter))
        .map_err(|err| LogInitError::Config(err.to_string()))?;

    log4rs::init_config(log_config)?;

    if config.capture_panics {
        log_panics::init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_defaults() {
        let config = LogConfig::default();
        assert_eq!(config.filter, LevelFilter::Info);
        assert!(config.console);
        assert!(config.log_dir.is_some());
    }

    /// Only one logger may exist per process, so both calls live in the same test.
    #[test]
    fn init_twice_is_an_error() {
        let config = LogConfig {
            filter: LevelFilter::Warn,
            console: false,
            log_dir: None,
            capture_panics: false,
        };

        assert!(init_with(&config).is_ok());
        assert!(matches!(
            init_with(&config),
            Err(LogInitError::AlreadyInitialized(_))
        ));
    }
}
