use super::default_dir;
use super::version::{VersionId, VersionMarker, VersionProbe};
use crate::event::{EventKind, EventLog};
use crate::report::InstallReport;
use fs::{CopySummary, DirectoryCopier, FileDeleter, FileReader};
use std::fmt::{self, Display};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// What to copy where, and which markers become stale by doing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    pub name: String,
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    pub stale_markers: Vec<VersionMarker>,
}

/// Version reported after copying. Reading it back is informative only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportedVersion {
    Known(VersionId),
    Unknown,
}

impl Display for ReportedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportedVersion::Known(version) => Display::fmt(version, f),
            ReportedVersion::Unknown => f.write_str("unknown"),
        }
    }
}

#[derive(Debug)]
pub enum InstallStep {
    Installed {
        version: ReportedVersion,
        summary: CopySummary,
    },
    Failed {
        cause: io::Error,
    },
}

/// Whether the agent service may be restarted to pick up the new files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartEligibility {
    Eligible,
    NotEligible,
}

impl InstallStep {
    pub fn restart_eligibility(&self) -> RestartEligibility {
        match self {
            InstallStep::Installed { .. } => RestartEligibility::Eligible,
            InstallStep::Failed { .. } => RestartEligibility::NotEligible,
        }
    }
}

/// Copies an app into the agent installation tree.
pub struct PackageInstaller<F>
where
    F: FileReader + FileDeleter + DirectoryCopier,
{
    file_manager: Arc<F>,
    probe: VersionProbe<F>,
}

impl<F> PackageInstaller<F>
where
    F: FileReader + FileDeleter + DirectoryCopier,
{
    pub fn new(file_manager: Arc<F>) -> Self {
        Self {
            probe: VersionProbe::new(file_manager.clone()),
            file_manager,
        }
    }

    /// Overlays the source app on the target directory.
    ///
    /// Stale markers are removed first. Failing to remove one is only a warning since the
    /// copy overwrites the configuration anyway, and the next run tries again. A copy failure
    /// is reported as an installation failure.
    #[instrument(skip_all, fields(app = %plan.name))]
    pub fn install<E>(&self, plan: &InstallPlan, report: &mut InstallReport<E>) -> InstallStep
    where
        E: EventLog,
    {
        for stale_marker in &plan.stale_markers {
            self.remove_stale_marker(stale_marker, report);
        }

        let summary = match self
            .file_manager
            .copy_overlay(&plan.source_dir, &plan.target_dir)
        {
            Ok(summary) => summary,
            Err(cause) => {
                report.fail(
                    EventKind::CopyFailed,
                    format!(
                        "Could not copy app {} from {} to {}: {cause}",
                        plan.name,
                        plan.source_dir.display(),
                        plan.target_dir.display()
                    ),
                );
                return InstallStep::Failed { cause };
            }
        };
        debug!(
            files_copied = summary.files_copied,
            directories_created = summary.directories_created,
            "app copied"
        );

        let version = self.installed_version(plan);
        report.emit(
            EventKind::CopySucceeded,
            format!(
                "App {} version {version} installed into {}",
                plan.name,
                plan.target_dir.display()
            ),
        );
        InstallStep::Installed { version, summary }
    }

    fn remove_stale_marker<E>(&self, stale_marker: &VersionMarker, report: &mut InstallReport<E>)
    where
        E: EventLog,
    {
        match self.file_manager.delete(&stale_marker.path) {
            Ok(()) => report.emit(
                EventKind::StaleMarkerRemoved,
                format!(
                    "Removed version marker {} of the previous version {}",
                    stale_marker.path.display(),
                    stale_marker.version
                ),
            ),
            Err(err) => report.emit(
                EventKind::StaleMarkerRemovalFailed,
                format!(
                    "Could not remove version marker {} of the previous version {}: {err}",
                    stale_marker.path.display(),
                    stale_marker.version
                ),
            ),
        }
    }

    fn installed_version(&self, plan: &InstallPlan) -> ReportedVersion {
        match self.probe.probe(&default_dir(&plan.target_dir)) {
            Ok(Some(marker)) => ReportedVersion::Known(marker.version),
            Ok(None) => {
                warn!("no version marker found after copying");
                ReportedVersion::Unknown
            }
            Err(err) => {
                warn!("could not read the installed version: {err}");
                ReportedVersion::Unknown
            }
        }
    }
}
