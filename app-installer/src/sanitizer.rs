//! Clearing of the "downloaded from the internet" markers on installed files.
pub mod quarantine;

#[cfg(target_family = "unix")]
pub mod extended_attributes;
#[cfg(target_family = "windows")]
pub mod zone_identifier;

use crate::event::{EventKind, EventLog};
use crate::report::InstallReport;
use quarantine::{Quarantine, QuarantineScan};
use std::path::Path;
use tracing::{debug, instrument, warn};

cfg_if::cfg_if! {
    if #[cfg(target_family = "windows")] {
        pub type HostQuarantine = zone_identifier::ZoneIdentifierQuarantine;
    } else {
        pub type HostQuarantine = extended_attributes::ExtendedAttributesQuarantine;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizeOutcome {
    /// Files were not inspected, either because sanitizing is disabled or could not be done.
    NotChecked,
    Checked { flagged: usize, unblocked: usize },
}

pub struct ArtifactSanitizer<Q>
where
    Q: Quarantine,
{
    quarantine: Q,
    enabled: bool,
}

impl<Q> ArtifactSanitizer<Q>
where
    Q: Quarantine,
{
    pub fn new(quarantine: Q, enabled: bool) -> Self {
        Self {
            quarantine,
            enabled,
        }
    }

    /// Unblocks every quarantined file under `root`.
    ///
    /// Files that cannot be inspected do not stop the others from being unblocked. Any failure
    /// only raises one warning for the whole tree, files stay usable.
    #[instrument(skip_all, fields(root = %root.display()))]
    pub fn sanitize<E>(&self, root: &Path, report: &mut InstallReport<E>) -> SanitizeOutcome
    where
        E: EventLog,
    {
        if !self.enabled {
            report.emit(EventKind::UnblockSkipped, "Unblocking files is disabled");
            return SanitizeOutcome::NotChecked;
        }

        let QuarantineScan { flagged, errors } = match self.quarantine.list_quarantined(root) {
            Ok(scan) => scan,
            Err(err) => {
                report.emit(
                    EventKind::UnblockFailed,
                    format!("Could not look for blocked files in {}: {err}", root.display()),
                );
                return SanitizeOutcome::NotChecked;
            }
        };

        if flagged.is_empty() && errors.is_empty() {
            report.emit(
                EventKind::BlockedFilesNone,
                format!("No blocked files found in {}", root.display()),
            );
            return SanitizeOutcome::Checked {
                flagged: 0,
                unblocked: 0,
            };
        }

        if !flagged.is_empty() {
            report.emit(
                EventKind::BlockedFilesFound,
                format!(
                    "Found {} blocked file(s) in {}",
                    flagged.len(),
                    root.display()
                ),
            );
        }

        let mut failures = Vec::new();
        for file in &flagged {
            match self.quarantine.unquarantine(file) {
                Ok(()) => debug!(file = %file.display(), "file unblocked"),
                Err(err) => {
                    warn!(file = %file.display(), "could not unblock file: {err}");
                    failures.push(format!("{}: {err}", file.display()));
                }
            }
        }

        let unblocked = flagged.len() - failures.len();
        if failures.is_empty() && errors.is_empty() {
            report.emit(
                EventKind::UnblockSucceeded,
                format!("Unblocked {unblocked} file(s)"),
            );
        } else {
            let mut problems = Vec::new();
            if !errors.is_empty() {
                problems.push(format!(
                    "could not inspect {} file(s): {}",
                    errors.len(),
                    errors.join("; ")
                ));
            }
            if !failures.is_empty() {
                problems.push(format!(
                    "could not unblock {} of {} file(s): {}",
                    failures.len(),
                    flagged.len(),
                    failures.join("; ")
                ));
            }
            report.emit(
                EventKind::UnblockFailed,
                format!(
                    "Unblocked {unblocked} file(s) in {}, but {}",
                    root.display(),
                    problems.join(", and ")
                ),
            );
        }

        SanitizeOutcome::Checked {
            flagged: flagged.len(),
            unblocked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::tests::RecordingEventLog;
    use crate::sanitizer::quarantine::tests::MockQuarantine;
    use mockall::predicate;
    use std::io;
    use std::path::PathBuf;

    const ROOT: &str = "/apps/pluginA";

    #[test]
    fn test_disabled_does_not_look_at_files() {
        let mut quarantine = MockQuarantine::new();
        quarantine.expect_list_quarantined().never();

        let event_log = RecordingEventLog::default();
        let mut report = InstallReport::new(&event_log);
        let outcome =
            ArtifactSanitizer::new(quarantine, false).sanitize(Path::new(ROOT), &mut report);

        assert_eq!(outcome, SanitizeOutcome::NotChecked);
        assert_eq!(event_log.kinds(), vec![EventKind::UnblockSkipped]);
    }

    #[test]
    fn test_no_blocked_files_does_not_attempt_unblocking() {
        let mut quarantine = MockQuarantine::new();
        quarantine.should_list_quarantined(Path::new(ROOT), vec![]);
        quarantine.expect_unquarantine().never();

        let event_log = RecordingEventLog::default();
        let mut report = InstallReport::new(&event_log);
        let outcome =
            ArtifactSanitizer::new(quarantine, true).sanitize(Path::new(ROOT), &mut report);

        assert_eq!(
            outcome,
            SanitizeOutcome::Checked {
                flagged: 0,
                unblocked: 0
            }
        );
        assert_eq!(event_log.kinds(), vec![EventKind::BlockedFilesNone]);
        assert_eq!(report.warnings(), 0);
    }

    #[test]
    fn test_all_blocked_files_unblocked() {
        let files = vec![
            PathBuf::from("/apps/pluginA/default/inputs.conf"),
            PathBuf::from("/apps/pluginA/bin/script.ps1"),
        ];
        let mut quarantine = MockQuarantine::new();
        quarantine.should_list_quarantined(Path::new(ROOT), files.clone());
        for file in &files {
            quarantine.should_unquarantine(file);
        }

        let event_log = RecordingEventLog::default();
        let mut report = InstallReport::new(&event_log);
        let outcome =
            ArtifactSanitizer::new(quarantine, true).sanitize(Path::new(ROOT), &mut report);

        assert_eq!(
            outcome,
            SanitizeOutcome::Checked {
                flagged: 2,
                unblocked: 2
            }
        );
        assert_eq!(
            event_log.kinds(),
            vec![EventKind::BlockedFilesFound, EventKind::UnblockSucceeded]
        );
    }

    #[test]
    fn test_partial_unblock_failure_is_a_single_warning() {
        let files = vec![
            PathBuf::from("/apps/pluginA/default/inputs.conf"),
            PathBuf::from("/apps/pluginA/bin/script.ps1"),
            PathBuf::from("/apps/pluginA/bin/other.ps1"),
        ];
        let mut quarantine = MockQuarantine::new();
        quarantine.should_list_quarantined(Path::new(ROOT), files.clone());
        quarantine.should_unquarantine(&files[0]);
        quarantine
            .expect_unquarantine()
            .with(predicate::ne(files[0].clone()))
            .times(2)
            .returning(|_| Err(io::Error::from(io::ErrorKind::PermissionDenied)));

        let event_log = RecordingEventLog::default();
        let mut report = InstallReport::new(&event_log);
        let outcome =
            ArtifactSanitizer::new(quarantine, true).sanitize(Path::new(ROOT), &mut report);

        assert_eq!(
            outcome,
            SanitizeOutcome::Checked {
                flagged: 3,
                unblocked: 1
            }
        );
        assert_eq!(report.warnings(), 1);
        assert_eq!(event_log.count(EventKind::UnblockFailed), 1);
    }

    #[test]
    fn test_files_that_cannot_be_inspected_do_not_stop_unblocking() {
        let files = vec![
            PathBuf::from("/apps/pluginA/default/inputs.conf"),
            PathBuf::from("/apps/pluginA/bin/script.ps1"),
        ];
        let mut quarantine = MockQuarantine::new();
        quarantine.should_scan(
            Path::new(ROOT),
            QuarantineScan {
                flagged: files.clone(),
                errors: vec!["/apps/pluginA/default/a_bad.conf: permission denied".to_string()],
            },
        );
        for file in &files {
            quarantine.should_unquarantine(file);
        }

        let event_log = RecordingEventLog::default();
        let mut report = InstallReport::new(&event_log);
        let outcome =
            ArtifactSanitizer::new(quarantine, true).sanitize(Path::new(ROOT), &mut report);

        assert_eq!(
            outcome,
            SanitizeOutcome::Checked {
                flagged: 2,
                unblocked: 2
            }
        );
        assert_eq!(report.warnings(), 1);
        assert_eq!(
            event_log.kinds(),
            vec![EventKind::BlockedFilesFound, EventKind::UnblockFailed]
        );
        assert_eq!(
            event_log.message(EventKind::UnblockFailed),
            Some(
                "Unblocked 2 file(s) in /apps/pluginA, but could not inspect 1 file(s): \
                 /apps/pluginA/default/a_bad.conf: permission denied"
                    .to_string()
            )
        );
    }

    #[test]
    fn test_inspection_and_unblock_failures_are_a_single_warning() {
        let file = PathBuf::from("/apps/pluginA/bin/script.ps1");
        let mut quarantine = MockQuarantine::new();
        quarantine.should_scan(
            Path::new(ROOT),
            QuarantineScan {
                flagged: vec![file.clone()],
                errors: vec!["/apps/pluginA/default/a_bad.conf: permission denied".to_string()],
            },
        );
        quarantine
            .expect_unquarantine()
            .with(predicate::eq(file))
            .once()
            .returning(|_| Err(io::Error::from(io::ErrorKind::PermissionDenied)));

        let event_log = RecordingEventLog::default();
        let mut report = InstallReport::new(&event_log);
        let outcome =
            ArtifactSanitizer::new(quarantine, true).sanitize(Path::new(ROOT), &mut report);

        assert_eq!(
            outcome,
            SanitizeOutcome::Checked {
                flagged: 1,
                unblocked: 0
            }
        );
        assert_eq!(report.warnings(), 1);
        assert_eq!(event_log.count(EventKind::UnblockFailed), 1);
    }

    #[test]
    fn test_only_inspection_failures_are_a_warning() {
        let mut quarantine = MockQuarantine::new();
        quarantine.should_scan(
            Path::new(ROOT),
            QuarantineScan {
                flagged: vec![],
                errors: vec!["/apps/pluginA/default/a_bad.conf: permission denied".to_string()],
            },
        );
        quarantine.expect_unquarantine().never();

        let event_log = RecordingEventLog::default();
        let mut report = InstallReport::new(&event_log);
        let outcome =
            ArtifactSanitizer::new(quarantine, true).sanitize(Path::new(ROOT), &mut report);

        assert_eq!(
            outcome,
            SanitizeOutcome::Checked {
                flagged: 0,
                unblocked: 0
            }
        );
        assert_eq!(event_log.kinds(), vec![EventKind::UnblockFailed]);
        assert_eq!(report.warnings(), 1);
    }

    #[test]
    fn test_listing_failure_is_a_warning() {
        let mut quarantine = MockQuarantine::new();
        quarantine
            .expect_list_quarantined()
            .once()
            .returning(|_| Err(io::Error::from(io::ErrorKind::PermissionDenied)));

        let event_log = RecordingEventLog::default();
        let mut report = InstallReport::new(&event_log);
        let outcome =
            ArtifactSanitizer::new(quarantine, true).sanitize(Path::new(ROOT), &mut report);

        assert_eq!(outcome, SanitizeOutcome::NotChecked);
        assert_eq!(report.warnings(), 1);
    }
}
