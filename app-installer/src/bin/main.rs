use agent_app_installer::cli::error::CliError;
use agent_app_installer::cli::{Cli, CliCommand};
use agent_app_installer::config::InstallerConfig;
use agent_app_installer::event::{EventLog, HostEventLog};
use agent_app_installer::logging::config::FileLoggerGuard;
use agent_app_installer::pipeline::AppInstaller;
use agent_app_installer::utils::binary_metadata::binary_metadata;
use std::process::ExitCode;
use tracing::{debug, info, warn};

fn main() -> ExitCode {
    let config = match Cli::init() {
        Ok(CliCommand::Install(config)) => config,
        // Installer command call was a "one-shot" operation. Exit successfully after performing.
        Ok(CliCommand::OneShot(op)) => {
            op.run_one_shot();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("{err}");
            return err.into();
        }
    };

    // Keep the file logger guard for the whole run, file logs are flushed when dropped.
    let _guard: FileLoggerGuard = match config.log.try_init() {
        Ok(guard) => guard,
        Err(err) => {
            let err = CliError::from(err);
            eprintln!("{err}");
            return err.into();
        }
    };

    run(&config)
}

fn run(config: &InstallerConfig) -> ExitCode {
    info!("{}", binary_metadata());

    let event_log = HostEventLog::new(config.event_log_source.as_str());
    if let Err(err) = event_log.register_source() {
        warn!("Events will only be logged: {err}");
    }

    let outcome = AppInstaller::from_config(config, event_log).run();
    debug!(?outcome, "installation run finished");

    ExitCode::from(&outcome)
}
