//! Restart of the agent service once new configuration is in place.
pub mod command;
#[cfg(target_family = "windows")]
pub mod windows;

use crate::event::{EventKind, EventLog};
use crate::package::installer::RestartEligibility;
use crate::report::InstallReport;
use std::thread::sleep;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("could not run `{0}`: {1}")]
    Spawn(String, std::io::Error),

    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("service control error: {0}")]
    Control(String),
}

/// Host process control for the agent service.
pub trait ServiceManager {
    fn restart(&self, service_name: &str) -> Result<(), ServiceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    NotAttempted,
    Attempted { succeeded: bool },
}

impl ReconcileOutcome {
    pub fn attempted(&self) -> bool {
        matches!(self, ReconcileOutcome::Attempted { .. })
    }
}

pub struct ServiceReconciler<S>
where
    S: ServiceManager,
{
    manager: S,
    service_name: String,
    grace_period: Duration,
}

impl<S> ServiceReconciler<S>
where
    S: ServiceManager,
{
    pub fn new(manager: S, service_name: impl Into<String>, grace_period: Duration) -> Self {
        Self {
            manager,
            service_name: service_name.into(),
            grace_period,
        }
    }

    /// Restarts the service when the install step allows it. A failed restart is a warning,
    /// the app stays installed and is picked up on the next service start.
    #[instrument(skip_all, fields(service = %self.service_name))]
    pub fn reconcile<E>(
        &self,
        eligibility: RestartEligibility,
        report: &mut InstallReport<E>,
    ) -> ReconcileOutcome
    where
        E: EventLog,
    {
        if eligibility == RestartEligibility::NotEligible {
            debug!("restart not eligible");
            return ReconcileOutcome::NotAttempted;
        }

        // Let pending filesystem writes settle before the agent reloads its configuration.
        if !self.grace_period.is_zero() {
            debug!(grace_period = ?self.grace_period, "waiting before restarting");
            sleep(self.grace_period);
        }

        match self.manager.restart(&self.service_name) {
            Ok(()) => {
                report.emit(
                    EventKind::RestartSucceeded,
                    format!("Service {} restarted", self.service_name),
                );
                ReconcileOutcome::Attempted { succeeded: true }
            }
            Err(err) => {
                report.emit(
                    EventKind::RestartFailed,
                    format!(
                        "Could not restart service {}, restart it manually: {err}",
                        self.service_name
                    ),
                );
                ReconcileOutcome::Attempted { succeeded: false }
            }
        }
    }
}

/// Service manager of the host platform.
pub enum HostServiceManager {
    Command(command::CommandServiceManager),
    #[cfg(target_family = "windows")]
    Windows(windows::WindowsServiceManager),
}

impl HostServiceManager {
    /// A configured restart command takes precedence over the platform service control.
    pub fn from_restart_command(restart_command: Option<Vec<String>>) -> Self {
        match restart_command {
            Some(command) => Self::Command(command::CommandServiceManager::new(command)),
            #[cfg(target_family = "windows")]
            None => Self::Windows(windows::WindowsServiceManager::default()),
            #[cfg(target_family = "unix")]
            None => Self::Command(command::CommandServiceManager::default()),
        }
    }
}

impl ServiceManager for HostServiceManager {
    fn restart(&self, service_name: &str) -> Result<(), ServiceError> {
        match self {
            Self::Command(manager) => manager.restart(service_name),
            #[cfg(target_family = "windows")]
            Self::Windows(manager) => manager.restart(service_name),
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::event::tests::RecordingEventLog;
    use mockall::{mock, predicate};
    use std::time::Instant;

    mock! {
        pub ServiceManager {}
        impl ServiceManager for ServiceManager {
            fn restart(&self, service_name: &str) -> Result<(), ServiceError>;
        }
    }

    impl MockServiceManager {
        pub fn should_restart(&mut self, service_name: &str) {
            self.expect_restart()
                .with(predicate::eq(service_name.to_string()))
                .once()
                .returning(|_| Ok(()));
        }

        pub fn should_not_restart(&mut self, service_name: &str) {
            self.expect_restart()
                .with(predicate::eq(service_name.to_string()))
                .once()
                .returning(|_| Err(ServiceError::Control("access denied".to_string())));
        }
    }

    #[test]
    fn test_not_eligible_is_not_restarted() {
        let mut manager = MockServiceManager::new();
        manager.expect_restart().never();

        let event_log = RecordingEventLog::default();
        let mut report = InstallReport::new(&event_log);
        let outcome = ServiceReconciler::new(manager, "SplunkForwarder", Duration::from_secs(60))
            .reconcile(RestartEligibility::NotEligible, &mut report);

        assert_eq!(outcome, ReconcileOutcome::NotAttempted);
        assert!(!outcome.attempted());
        assert!(event_log.kinds().is_empty());
    }

    #[test]
    fn test_restart_after_grace_period() {
        let mut manager = MockServiceManager::new();
        manager.should_restart("SplunkForwarder");

        let event_log = RecordingEventLog::default();
        let mut report = InstallReport::new(&event_log);
        let started = Instant::now();
        let outcome =
            ServiceReconciler::new(manager, "SplunkForwarder", Duration::from_millis(50))
                .reconcile(RestartEligibility::Eligible, &mut report);

        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(outcome, ReconcileOutcome::Attempted { succeeded: true });
        assert_eq!(event_log.kinds(), vec![EventKind::RestartSucceeded]);
        assert_eq!(report.warnings(), 0);
    }

    #[test]
    fn test_restart_failure_is_a_warning() {
        let mut manager = MockServiceManager::new();
        manager.should_not_restart("SplunkForwarder");

        let event_log = RecordingEventLog::default();
        let mut report = InstallReport::new(&event_log);
        let outcome = ServiceReconciler::new(manager, "SplunkForwarder", Duration::ZERO)
            .reconcile(RestartEligibility::Eligible, &mut report);

        assert_eq!(outcome, ReconcileOutcome::Attempted { succeeded: false });
        assert!(outcome.attempted());
        assert_eq!(report.warnings(), 1);
        assert_eq!(
            event_log.message(EventKind::RestartFailed),
            Some(
                "Could not restart service SplunkForwarder, restart it manually: service control error: access denied"
                    .to_string()
            )
        );
    }
}
