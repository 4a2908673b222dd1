//! Structured events reported while installing an app.
//!
//! Every notable step of an installation produces one [EventRecord]: a fixed numeric code and
//! severity per [EventKind] plus a human readable message. Records are handed to an [EventLog]
//! sink, which is the only place where they leave the process.
pub mod tracing_log;
#[cfg(target_family = "windows")]
pub mod windows;

use std::fmt::{self, Display};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    RunStarted,
    VersionDetected,
    InstalledVersionDetected,
    AlreadyCurrent,
    StaleMarkerRemoved,
    CopySucceeded,
    BlockedFilesFound,
    BlockedFilesNone,
    UnblockSucceeded,
    UnblockSkipped,
    RestartSucceeded,
    RunCompleteClean,
    StaleMarkerRemovalFailed,
    UnblockFailed,
    RestartFailed,
    RunCompleteWithWarnings,
    SourceNotFound,
    VersionMarkerNotFound,
    AmbiguousVersionMarker,
    CopyFailed,
    InstallFailed,
}

impl EventKind {
    /// Stable identifier of the event kind, used as event id by the host event log.
    pub const fn code(self) -> u32 {
        match self {
            EventKind::RunStarted => 1000,
            EventKind::VersionDetected => 1001,
            EventKind::InstalledVersionDetected => 1002,
            EventKind::AlreadyCurrent => 1003,
            EventKind::StaleMarkerRemoved => 1004,
            EventKind::CopySucceeded => 1005,
            EventKind::BlockedFilesFound => 1006,
            EventKind::BlockedFilesNone => 1007,
            EventKind::UnblockSucceeded => 1008,
            EventKind::UnblockSkipped => 1009,
            EventKind::RestartSucceeded => 1010,
            EventKind::RunCompleteClean => 1011,
            EventKind::StaleMarkerRemovalFailed => 2001,
            EventKind::UnblockFailed => 2002,
            EventKind::RestartFailed => 2003,
            EventKind::RunCompleteWithWarnings => 2004,
            EventKind::SourceNotFound => 3001,
            EventKind::VersionMarkerNotFound => 3002,
            EventKind::AmbiguousVersionMarker => 3003,
            EventKind::CopyFailed => 3004,
            EventKind::InstallFailed => 3999,
        }
    }

    pub const fn severity(self) -> Severity {
        match self.code() {
            1000..2000 => Severity::Info,
            2000..3000 => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub kind: EventKind,
    pub message: String,
}

impl EventRecord {
    pub fn new(kind: EventKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn code(&self) -> u32 {
        self.kind.code()
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

#[derive(Debug, Error)]
pub enum EventLogError {
    #[error("could not register event source `{0}`: {1}")]
    Registration(String, String),
}

/// Sink for [EventRecord]s.
pub trait EventLog {
    /// Makes the event source known to the sink. Calling it when the source already exists
    /// is a no-op.
    fn register_source(&self) -> Result<(), EventLogError>;

    /// Writes a record. Delivery problems are the sink's concern and never reach the caller.
    fn write(&self, record: &EventRecord);
}

cfg_if::cfg_if! {
    if #[cfg(target_family = "windows")] {
        pub type HostEventLog = windows::WindowsEventLog;
    } else {
        pub type HostEventLog = tracing_log::TracingEventLog;
    }
}
