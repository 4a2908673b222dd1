use super::file_logging::{FileLoggingConfig, LogFilePath};
use super::format::LoggingFormat;
use crate::defaults::{APP_INSTALLER_LOG_DIR, APP_INSTALLER_LOG_FILENAME};
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use tracing::Level;
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::PrettyFields;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Environment variable overriding the configured level with any filter directive.
pub const LOG_LEVEL_ENV_VAR: &str = "LOG_LEVEL";

/// An enum representing possible errors during the logging initialization.
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("init logging error: `{0}`")]
    TryInitError(String),
    #[error("invalid logging file path: `{0}`")]
    InvalidFilePath(String),
    #[error("invalid logging directive: `{0}`")]
    InvalidDirective(String),
}

/// Defines the logging configuration of the installer.
#[derive(Debug, Deserialize, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default)]
    pub(crate) format: LoggingFormat,
    #[serde(default)]
    pub(crate) level: LogLevel,
    #[serde(default)]
    pub(crate) file: FileLoggingConfig,
}

pub type FileLoggerGuard = Option<WorkerGuard>;

impl LoggingConfig {
    pub fn with_level(self, level: Level) -> Self {
        Self {
            level: LogLevel(level),
            ..self
        }
    }

    /// Attempts to initialize the logging subscriber with the inner configuration.
    ///
    /// The returned guard must be kept alive while logging, file logs are flushed on drop.
    pub fn try_init(&self) -> Result<FileLoggerGuard, LoggingError> {
        let target = self.format.target;
        let timestamp_fmt = self.format.timestamp.0.clone();

        // Construct the file logging layer and its worker guard, only if file logging is enabled.
        let default_path = LogFilePath::new(
            PathBuf::from(APP_INSTALLER_LOG_DIR),
            PathBuf::from(APP_INSTALLER_LOG_FILENAME),
        );
        let (file_layer, guard) = match self.file.clone().setup(default_path)? {
            Some((file_writer, guard)) => {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(file_writer)
                    .with_ansi(false) // Disable colors for file
                    .with_target(target)
                    .with_timer(ChronoLocal::new(timestamp_fmt.clone()))
                    .fmt_fields(PrettyFields::new())
                    .with_filter(self.logging_filter()?);
                (Some(file_layer), Some(guard))
            }
            None => (None, None),
        };

        let console_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(self.format.ansi_colors)
            .with_target(target)
            .with_timer(ChronoLocal::new(timestamp_fmt))
            .fmt_fields(PrettyFields::new())
            .with_filter(self.logging_filter()?);

        // An `Option` of a layer is a layer too, so the file one can be left out at runtime.
        tracing_subscriber::Registry::default()
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .map_err(|_| {
                LoggingError::TryInitError(
                    "unable to set installer global logging subscriber".to_string(),
                )
            })?;

        debug!("Logging initialized successfully");
        Ok(guard)
    }

    fn logging_filter(&self) -> Result<EnvFilter, LoggingError> {
        Ok(EnvFilter::builder()
            .with_default_directive(self.crate_directive()?)
            .with_env_var(LOG_LEVEL_ENV_VAR)
            .from_env_lossy())
    }

    fn crate_directive(&self) -> Result<Directive, LoggingError> {
        let level = self.level.as_level().to_string().to_lowercase();
        let directive = format!("{}={level}", env!("CARGO_CRATE_NAME"));
        directive
            .parse::<Directive>()
            .map_err(|err| LoggingError::InvalidDirective(format!("{directive}: {err}")))
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub(crate) struct LogLevel(Level);

impl LogLevel {
    fn as_level(&self) -> Level {
        self.0
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        Self(Level::INFO)
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value_str = String::deserialize(deserializer)?;
        Level::from_str(&value_str)
            .map(LogLevel)
            .map_err(serde::de::Error::custom)
    }
}
