use super::config::LoggingError;
use serde::Deserialize;
use std::path::PathBuf;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};

#[derive(Debug, Deserialize, Default, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileLoggingConfig {
    #[serde(default)]
    pub(crate) enabled: bool,
    /// When missing, logs are written in the default log directory.
    #[serde(default)]
    pub(crate) path: Option<LogFilePath>,
}

impl FileLoggingConfig {
    pub(super) fn setup(
        self,
        default_path: LogFilePath,
    ) -> Result<Option<(NonBlocking, WorkerGuard)>, LoggingError> {
        if !self.enabled {
            return Ok(None);
        }

        let path = self.path.unwrap_or(default_path);
        std::fs::create_dir_all(&path.parent).map_err(|err| {
            LoggingError::InvalidFilePath(format!(
                "could not create log directory {}: {err}",
                path.parent.display()
            ))
        })?;
        let file_appender = tracing_appender::rolling::daily(path.parent, path.file_name);
        Ok(Some(tracing_appender::non_blocking(file_appender)))
    }
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(try_from = "PathBuf")]
pub(crate) struct LogFilePath {
    parent: PathBuf,
    file_name: PathBuf,
}

impl LogFilePath {
    pub fn new(parent: PathBuf, file_name: PathBuf) -> Self {
        Self { parent, file_name }
    }
}

impl TryFrom<PathBuf> for LogFilePath {
    type Error = LoggingError;

    fn try_from(value: PathBuf) -> Result<Self, Self::Error> {
        let parent = value
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .ok_or(LoggingError::InvalidFilePath(
                "file path provided must have a valid parent directory".into(),
            ))?
            .into();
        let file_name = value
            .file_name()
            .ok_or(LoggingError::InvalidFilePath(
                "file path provided must have a valid file name".into(),
            ))?
            .into();
        Ok(Self { parent, file_name })
    }
}
