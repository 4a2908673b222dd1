//! The installation run, from locating the app to restarting the agent.
use crate::config::InstallerConfig;
use crate::event::{EventKind, EventLog};
use crate::package::default_dir;
use crate::package::installer::{InstallPlan, InstallStep, PackageInstaller, ReportedVersion};
use crate::package::state::{self, InstallState};
use crate::package::version::{VersionId, VersionMarker, VersionProbe, VersionProbeError};
use crate::report::{InstallOutcome, InstallReport, InstallStatus};
use crate::sanitizer::quarantine::Quarantine;
use crate::sanitizer::{ArtifactSanitizer, HostQuarantine, SanitizeOutcome};
use crate::service::{HostServiceManager, ServiceManager, ServiceReconciler};
use fs::{DirectoryCopier, FileDeleter, FileReader, LocalFile};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Installs one app and restarts the agent when needed.
///
/// Every step hands its result to the next one: the install step decides whether a restart
/// is allowed and all warnings are counted by the [InstallReport] of the run.
pub struct AppInstaller<F, Q, S, E>
where
    F: FileReader + FileDeleter + DirectoryCopier,
    Q: Quarantine,
    S: ServiceManager,
    E: EventLog,
{
    app_name: String,
    source_dir: PathBuf,
    target_dir: PathBuf,
    probe: VersionProbe<F>,
    installer: PackageInstaller<F>,
    sanitizer: ArtifactSanitizer<Q>,
    reconciler: ServiceReconciler<S>,
    event_log: E,
}

impl<E> AppInstaller<LocalFile, HostQuarantine, HostServiceManager, E>
where
    E: EventLog,
{
    /// Installer working on the local host.
    pub fn from_config(config: &InstallerConfig, event_log: E) -> Self {
        let service_manager =
            HostServiceManager::from_restart_command(config.service.restart_command.clone());
        Self::new(
            config,
            Arc::new(LocalFile),
            HostQuarantine::default(),
            service_manager,
            event_log,
        )
    }
}

impl<F, Q, S, E> AppInstaller<F, Q, S, E>
where
    F: FileReader + FileDeleter + DirectoryCopier,
    Q: Quarantine,
    S: ServiceManager,
    E: EventLog,
{
    pub fn new(
        config: &InstallerConfig,
        file_manager: Arc<F>,
        quarantine: Q,
        service_manager: S,
        event_log: E,
    ) -> Self {
        Self {
            app_name: config.app_folder_name.to_string(),
            source_dir: config.source_dir(),
            target_dir: config.target_dir(),
            probe: VersionProbe::new(file_manager.clone()),
            installer: PackageInstaller::new(file_manager),
            sanitizer: ArtifactSanitizer::new(quarantine, config.unblock_files),
            reconciler: ServiceReconciler::new(
                service_manager,
                config.service.name.clone(),
                config.service.restart_grace,
            ),
            event_log,
        }
    }

    pub fn event_log(&self) -> &E {
        &self.event_log
    }

    #[instrument(skip_all, fields(app = %self.app_name))]
    pub fn run(&self) -> InstallOutcome {
        let mut report = InstallReport::new(&self.event_log);
        report.emit(
            EventKind::RunStarted,
            format!(
                "Installing app {} from {} into {}",
                self.app_name,
                self.source_dir.display(),
                self.target_dir.display()
            ),
        );

        let Some(source_version) = self.source_version(&mut report) else {
            return InstallOutcome::aborted(InstallStatus::NotFound, report.warnings());
        };

        let installed = match self.probe.markers(&default_dir(&self.target_dir)) {
            Ok(installed) => installed,
            Err(err) => {
                report.fail(
                    probe_failure_kind(&err),
                    format!(
                        "Could not determine the installed version of app {}: {err}",
                        self.app_name
                    ),
                );
                return Self::finish(report, InstallStatus::UpgradeFailed, None, false);
            }
        };

        let stale_markers = match state::resolve(&source_version, installed) {
            InstallState::SameVersion => {
                report.emit(
                    EventKind::AlreadyCurrent,
                    format!(
                        "App {} version {source_version} is already installed, nothing to do",
                        self.app_name
                    ),
                );
                let version = Some(ReportedVersion::Known(source_version));
                return Self::finish(report, InstallStatus::AlreadyCurrent, version, false);
            }
            InstallState::NotInstalled => {
                debug!("no installed version found");
                Vec::new()
            }
            InstallState::DifferentVersion { stale } => {
                let versions = stale
                    .iter()
                    .map(|marker| marker.version.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                report.emit(
                    EventKind::InstalledVersionDetected,
                    format!(
                        "App {} version {versions} is installed, upgrading to {source_version}",
                        self.app_name
                    ),
                );
                stale
            }
        };

        self.install(source_version, stale_markers, report)
    }

    /// Finds the version of the app to install. Failing to do so ends the run.
    fn source_version(&self, report: &mut InstallReport<E>) -> Option<VersionId> {
        if !self.source_dir.is_dir() {
            report.fail(
                EventKind::SourceNotFound,
                format!(
                    "App {} not found: {} is not a directory",
                    self.app_name,
                    self.source_dir.display()
                ),
            );
            return None;
        }

        let source_default_dir = default_dir(&self.source_dir);
        match self.probe.probe(&source_default_dir) {
            Ok(Some(VersionMarker { version, .. })) => {
                report.emit(
                    EventKind::VersionDetected,
                    format!(
                        "App {} version {version} found in {}",
                        self.app_name,
                        self.source_dir.display()
                    ),
                );
                Some(version)
            }
            Ok(None) => {
                report.fail(
                    EventKind::VersionMarkerNotFound,
                    format!(
                        "No version marker (*.version) found in {}",
                        source_default_dir.display()
                    ),
                );
                None
            }
            Err(err) => {
                report.fail(
                    probe_failure_kind(&err),
                    format!(
                        "Could not determine the version of app {}: {err}",
                        self.app_name
                    ),
                );
                None
            }
        }
    }

    fn install(
        &self,
        version: VersionId,
        stale_markers: Vec<VersionMarker>,
        mut report: InstallReport<E>,
    ) -> InstallOutcome {
        let plan = InstallPlan {
            name: self.app_name.clone(),
            source_dir: self.source_dir.clone(),
            target_dir: self.target_dir.clone(),
            stale_markers,
        };
        info!(%version, "installing app");

        let step = self.installer.install(&plan, &mut report);
        let eligibility = step.restart_eligibility();
        let (status, installed_version, sanitize) = match step {
            InstallStep::Installed { version, .. } => (
                InstallStatus::Installed,
                Some(version),
                self.sanitizer.sanitize(&self.target_dir, &mut report),
            ),
            InstallStep::Failed { .. } => {
                (InstallStatus::UpgradeFailed, None, SanitizeOutcome::NotChecked)
            }
        };

        let restart = self.reconciler.reconcile(eligibility, &mut report);

        InstallOutcome {
            sanitize,
            ..Self::finish(report, status, installed_version, restart.attempted())
        }
    }

    fn finish(
        report: InstallReport<E>,
        status: InstallStatus,
        installed_version: Option<ReportedVersion>,
        restart_performed: bool,
    ) -> InstallOutcome {
        let warnings = report.warnings();
        let summary = report.finalize();
        InstallOutcome {
            status,
            warnings,
            restart_performed,
            installed_version,
            sanitize: SanitizeOutcome::NotChecked,
            summary: Some(summary),
        }
    }
}

fn probe_failure_kind(err: &VersionProbeError) -> EventKind {
    match err {
        VersionProbeError::Ambiguous(_) => EventKind::AmbiguousVersionMarker,
        VersionProbeError::Read(..) => EventKind::VersionMarkerNotFound,
    }
}
