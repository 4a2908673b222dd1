//! Configuration of an installation run.
//!
//! Values come from the command line and, optionally, from a YAML host configuration file
//! holding the settings that rarely change between runs on the same host. The command line
//! always wins.
use crate::defaults::{
    DEFAULT_EVENT_LOG_SOURCE, DEFAULT_INSTALL_ROOT, DEFAULT_RESTART_GRACE, DEFAULT_SERVICE_NAME,
};
use crate::logging::config::LoggingConfig;
use duration_str::deserialize_duration;
use serde::Deserialize;
use std::fmt::{self, Display};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{}`: {}", .0.display(), .1)]
    Read(PathBuf, io::Error),

    #[error("invalid config file `{}`: {}", .0.display(), .1)]
    Parse(PathBuf, serde_yaml::Error),

    #[error("the app folder name is required")]
    MissingAppFolderName,

    #[error("invalid app folder name `{0}`: it must be a single directory name")]
    InvalidAppFolderName(String),

    #[error("the restart command cannot be empty")]
    EmptyRestartCommand,

    #[error("could not determine the current directory: {0}")]
    CurrentDir(io::Error),
}

/// Name of the app directory, both in the source package and under the install root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppFolderName(String);

impl TryFrom<String> for AppFolderName {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let has_separator = value.contains(['/', '\\']);
        let mut components = Path::new(&value).components();
        let single_normal = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if has_separator || !single_normal {
            return Err(ConfigError::InvalidAppFolderName(value));
        }
        Ok(Self(value))
    }
}

impl AppFolderName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<Path> for AppFolderName {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl Display for AppFolderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub name: String,
    /// Program and arguments restarting the service, `None` uses the platform service control.
    pub restart_command: Option<Vec<String>>,
    pub restart_grace: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SERVICE_NAME.to_string(),
            restart_command: None,
            restart_grace: DEFAULT_RESTART_GRACE,
        }
    }
}

/// Everything an installation run needs.
#[derive(Debug, Clone, PartialEq)]
pub struct InstallerConfig {
    pub app_folder_name: AppFolderName,
    /// Directory containing the app folder to install.
    pub app_source_path: PathBuf,
    pub event_log_source: String,
    pub unblock_files: bool,
    /// Plugin directory of the agent, where the app folder is installed.
    pub install_root: PathBuf,
    pub service: ServiceConfig,
    pub log: LoggingConfig,
}

impl InstallerConfig {
    /// Configuration with every default applied, sourcing the app from the current directory.
    pub fn try_new(app_folder_name: AppFolderName) -> Result<Self, ConfigError> {
        Ok(Self {
            app_folder_name,
            app_source_path: std::env::current_dir().map_err(ConfigError::CurrentDir)?,
            event_log_source: DEFAULT_EVENT_LOG_SOURCE.to_string(),
            unblock_files: true,
            install_root: PathBuf::from(DEFAULT_INSTALL_ROOT),
            service: ServiceConfig::default(),
            log: LoggingConfig::default(),
        })
    }

    /// Applies the values set in the host configuration file.
    pub fn with_host_config(self, host_config: HostConfig) -> Self {
        let HostConfig {
            install_root,
            event_log_source,
            unblock_files,
            service,
            log,
        } = host_config;
        Self {
            install_root: install_root.unwrap_or(self.install_root),
            event_log_source: event_log_source.unwrap_or(self.event_log_source),
            unblock_files: unblock_files.unwrap_or(self.unblock_files),
            service: ServiceConfig {
                name: service.name.unwrap_or(self.service.name),
                restart_command: service.restart_command.or(self.service.restart_command),
                restart_grace: service
                    .restart_grace
                    .map(Duration::from)
                    .unwrap_or(self.service.restart_grace),
            },
            log: log.unwrap_or(self.log),
            ..self
        }
    }

    pub fn source_dir(&self) -> PathBuf {
        self.app_source_path.join(&self.app_folder_name)
    }

    pub fn target_dir(&self) -> PathBuf {
        self.install_root.join(&self.app_folder_name)
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct RestartGrace(#[serde(deserialize_with = "deserialize_duration")] Duration);

impl From<RestartGrace> for Duration {
    fn from(value: RestartGrace) -> Self {
        value.0
    }
}

/// Host settings read from the YAML configuration file. Every field is optional.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    #[serde(default)]
    pub install_root: Option<PathBuf>,
    #[serde(default)]
    pub event_log_source: Option<String>,
    #[serde(default)]
    pub unblock_files: Option<bool>,
    #[serde(default)]
    pub service: HostServiceConfig,
    #[serde(default)]
    pub log: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HostServiceConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub restart_command: Option<Vec<String>>,
    #[serde(default)]
    pub restart_grace: Option<RestartGrace>,
}

impl HostConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|err| ConfigError::Read(path.to_path_buf(), err))?;
        let host_config: Self = serde_yaml::from_str(&content)
            .map_err(|err| ConfigError::Parse(path.to_path_buf(), err))?;
        host_config.validate()?;
        Ok(host_config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self
            .service
            .restart_command
            .as_ref()
            .is_some_and(|command| command.is_empty())
        {
            return Err(ConfigError::EmptyRestartCommand);
        }
        Ok(())
    }
}
