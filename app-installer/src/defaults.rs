use std::time::Duration;

pub const DEFAULT_EVENT_LOG_SOURCE: &str = "AgentAppInstaller";

// Package layout
pub const PACKAGE_DEFAULT_DIR: &str = "default";
pub const VERSION_MARKER_SUFFIX: &str = ".version";

// Service
pub const DEFAULT_SERVICE_NAME: &str = "SplunkForwarder";
pub const DEFAULT_RESTART_GRACE: Duration = Duration::from_secs(2);
pub const SERVICE_NAME_PLACEHOLDER: &str = "{service}";

// Paths
cfg_if::cfg_if! {
    if #[cfg(target_family = "windows")] {
        pub const DEFAULT_INSTALL_ROOT: &str = r"C:\Program Files\SplunkUniversalForwarder\etc\apps";
        pub const APP_INSTALLER_LOG_DIR: &str = r"C:\ProgramData\AgentAppInstaller\logs";
    } else if #[cfg(target_os = "macos")] {
        pub const DEFAULT_INSTALL_ROOT: &str = "/Applications/SplunkForwarder/etc/apps";
        pub const APP_INSTALLER_LOG_DIR: &str = "/opt/homebrew/var/log/agent-app-installer";
    } else {
        pub const DEFAULT_INSTALL_ROOT: &str = "/opt/splunkforwarder/etc/apps";
        pub const APP_INSTALLER_LOG_DIR: &str = "/var/log/agent-app-installer";
    }
}

pub const APP_INSTALLER_LOG_FILENAME: &str = "agent-app-installer.log";

/// Command used to restart the agent service when no other is configured.
#[cfg(target_family = "unix")]
pub fn default_restart_command() -> Vec<String> {
    ["systemctl", "restart", SERVICE_NAME_PLACEHOLDER]
        .map(String::from)
        .to_vec()
}
