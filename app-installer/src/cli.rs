pub mod error;
mod one_shot_operation;

use crate::config::{AppFolderName, ConfigError, HostConfig, InstallerConfig};
use clap::{ArgAction, Parser, builder::BoolishValueParser};
use error::CliError;
pub use one_shot_operation::OneShotCommand;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// What action was requested from the CLI?
#[derive(Debug)]
pub enum CliCommand {
    /// Install the app described by the config.
    Install(Box<InstallerConfig>),
    /// Do an "one-shot" operation and exit successfully.
    OneShot(OneShotCommand),
}

#[derive(Parser, Debug)]
#[command(author, about, long_about = None)] // Read from `Cargo.toml`
pub struct Cli {
    /// Prints the version of the installer and exits.
    #[arg(long)]
    version: bool,

    /// Name of the app folder, both in the source directory and in the agent apps directory.
    #[arg(
        long,
        env = "AGENT_APP_INSTALLER_APP_FOLDER_NAME",
        required_unless_present = "version"
    )]
    app_folder_name: Option<String>,

    /// Directory containing the app folder. Defaults to the current directory.
    #[arg(long, env = "AGENT_APP_INSTALLER_APP_SOURCE_PATH")]
    app_source_path: Option<PathBuf>,

    /// Source name of the reported events.
    #[arg(long, env = "AGENT_APP_INSTALLER_EVENT_LOG_SOURCE")]
    event_log_source: Option<String>,

    /// Whether quarantine flags are removed from the installed files.
    #[arg(
        long,
        env = "AGENT_APP_INSTALLER_UNBLOCK_FILES",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
    )]
    unblock_files: Option<bool>,

    /// Apps directory of the agent.
    #[arg(long, env = "AGENT_APP_INSTALLER_INSTALL_ROOT")]
    install_root: Option<PathBuf>,

    /// Service restarted after installing.
    #[arg(long, env = "AGENT_APP_INSTALLER_SERVICE_NAME")]
    service_name: Option<String>,

    /// Wait before restarting the service, e.g. `2s` or `500ms`.
    #[arg(long, env = "AGENT_APP_INSTALLER_RESTART_GRACE", value_parser = parse_duration_arg)]
    restart_grace: Option<Duration>,

    /// YAML file with the host settings.
    #[arg(long, env = "AGENT_APP_INSTALLER_CONFIG")]
    config: Option<PathBuf>,

    /// Logging level of the installer.
    #[arg(long, env = "AGENT_APP_INSTALLER_LOG_LEVEL")]
    log_level: Option<Level>,
}

// helper needed because the arguments from the duration_str's parse function and the one expected by the clap
// `value_parser` argument have incompatible lifetimes.
fn parse_duration_arg(arg: &str) -> Result<Duration, String> {
    duration_str::parse(arg)
}

impl Cli {
    /// Parses command line arguments and decides how the application runs
    pub fn init() -> Result<CliCommand, CliError> {
        Self::parse().into_command()
    }

    pub fn into_command(self) -> Result<CliCommand, CliError> {
        if self.version {
            return Ok(CliCommand::OneShot(OneShotCommand::PrintVersion));
        }
        Ok(CliCommand::Install(Box::new(self.into_config()?)))
    }

    /// Settings precedence: command line, then host config file, then defaults.
    fn into_config(self) -> Result<InstallerConfig, ConfigError> {
        let app_folder_name = self
            .app_folder_name
            .ok_or(ConfigError::MissingAppFolderName)
            .and_then(AppFolderName::try_from)?;

        let mut config = InstallerConfig::try_new(app_folder_name)?;
        if let Some(path) = &self.config {
            config = config.with_host_config(HostConfig::load(path)?);
        }

        if let Some(app_source_path) = self.app_source_path {
            config.app_source_path = app_source_path;
        }
        if let Some(event_log_source) = self.event_log_source {
            config.event_log_source = event_log_source;
        }
        if let Some(unblock_files) = self.unblock_files {
            config.unblock_files = unblock_files;
        }
        if let Some(install_root) = self.install_root {
            config.install_root = install_root;
        }
        if let Some(service_name) = self.service_name {
            config.service.name = service_name;
        }
        if let Some(restart_grace) = self.restart_grace {
            config.service.restart_grace = restart_grace;
        }
        if let Some(level) = self.log_level {
            config.log = config.log.with_level(level);
        }
        Ok(config)
    }
}
