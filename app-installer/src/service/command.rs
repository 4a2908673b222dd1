use super::{ServiceError, ServiceManager};
use crate::defaults::SERVICE_NAME_PLACEHOLDER;
use std::process::Command;
use tracing::debug;

/// Restarts the service by running an external program.
///
/// Every `{service}` occurrence in the arguments is replaced by the service name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandServiceManager {
    program: String,
    args: Vec<String>,
}

#[cfg(target_family = "unix")]
impl Default for CommandServiceManager {
    fn default() -> Self {
        Self::new(crate::defaults::default_restart_command())
    }
}

impl CommandServiceManager {
    /// The first element is the program, the rest its arguments. An empty command runs nothing
    /// and always fails.
    pub fn new(command: Vec<String>) -> Self {
        let mut command = command.into_iter();
        Self {
            program: command.next().unwrap_or_default(),
            args: command.collect(),
        }
    }

    fn args_for(&self, service_name: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace(SERVICE_NAME_PLACEHOLDER, service_name))
            .collect()
    }

    fn command_line(&self, args: &[String]) -> String {
        std::iter::once(self.program.as_str())
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl ServiceManager for CommandServiceManager {
    fn restart(&self, service_name: &str) -> Result<(), ServiceError> {
        let args = self.args_for(service_name);
        let command_line = self.command_line(&args);
        if self.program.is_empty() {
            return Err(ServiceError::Control(
                "no restart command configured".to_string(),
            ));
        }

        debug!(command = %command_line, "restarting service");
        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|err| ServiceError::Spawn(command_line.clone(), err))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(ServiceError::CommandFailed {
                command: command_line,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}
