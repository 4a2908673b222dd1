//! Accounting of a single installation run.
use crate::event::{EventKind, EventLog, EventRecord, Severity};
use crate::package::installer::ReportedVersion;
use crate::sanitizer::SanitizeOutcome;
use std::process::ExitCode;

/// Writes the events of one run and keeps track of the warnings among them.
pub struct InstallReport<'a, E>
where
    E: EventLog,
{
    event_log: &'a E,
    warnings: usize,
}

impl<'a, E> InstallReport<'a, E>
where
    E: EventLog,
{
    pub fn new(event_log: &'a E) -> Self {
        Self {
            event_log,
            warnings: 0,
        }
    }

    /// Writes an event. Warning events are counted.
    pub fn emit(&mut self, kind: EventKind, message: impl Into<String>) {
        if kind.severity() == Severity::Warning {
            self.warnings += 1;
        }
        self.event_log.write(&EventRecord::new(kind, message));
    }

    /// Writes the error event followed by the generic installation failure one.
    pub fn fail(&mut self, kind: EventKind, message: impl Into<String>) {
        let message = message.into();
        self.event_log.write(&EventRecord::new(kind, message.as_str()));
        self.event_log.write(&EventRecord::new(
            EventKind::InstallFailed,
            format!("Installation failed: {message}"),
        ));
    }

    pub fn warnings(&self) -> usize {
        self.warnings
    }

    /// Writes the summary of the run.
    pub fn finalize(self) -> FinalStatus {
        if self.warnings == 0 {
            self.event_log.write(&EventRecord::new(
                EventKind::RunCompleteClean,
                "Installation run completed",
            ));
            FinalStatus::Ok
        } else {
            self.event_log.write(&EventRecord::new(
                EventKind::RunCompleteWithWarnings,
                format!(
                    "Installation run completed with {} warning(s)",
                    self.warnings
                ),
            ));
            FinalStatus::OkWithWarnings
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalStatus {
    Ok,
    OkWithWarnings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStatus {
    NotFound,
    AlreadyCurrent,
    Installed,
    UpgradeFailed,
}

/// Result of one installation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub status: InstallStatus,
    pub warnings: usize,
    pub restart_performed: bool,
    pub installed_version: Option<ReportedVersion>,
    pub sanitize: SanitizeOutcome,
    /// `None` when the run was aborted before the summary.
    pub summary: Option<FinalStatus>,
}

impl InstallOutcome {
    pub(crate) fn aborted(status: InstallStatus, warnings: usize) -> Self {
        Self {
            status,
            warnings,
            restart_performed: false,
            installed_version: None,
            sanitize: SanitizeOutcome::NotChecked,
            summary: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self.status,
            InstallStatus::AlreadyCurrent | InstallStatus::Installed
        )
    }
}

impl From<&InstallOutcome> for ExitCode {
    fn from(outcome: &InstallOutcome) -> Self {
        if outcome.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}
