use super::tracing_log::TracingEventLog;
use super::{EventLog, EventLogError, EventRecord, Severity};
use std::ffi::OsStr;
use std::os::windows::ffi::OsStrExt;
use std::ptr;
use tracing::{debug, warn};
use windows_sys::Win32::Foundation::GetLastError;
use windows_sys::Win32::System::EventLog::{
    DeregisterEventSource, EVENTLOG_ERROR_TYPE, EVENTLOG_INFORMATION_TYPE, EVENTLOG_WARNING_TYPE,
    RegisterEventSourceW, ReportEventW,
};
use winreg::RegKey;
use winreg::enums::{HKEY_LOCAL_MACHINE, KEY_READ};

const APPLICATION_LOG_KEY_PATH: &str =
    "SYSTEM\\CurrentControlSet\\Services\\EventLog\\Application";
const EVENT_MESSAGE_FILE: &str = "Microsoft.NET\\Framework\\v4.0.30319\\EventLogMessages.dll";
// Error, warning and information.
const TYPES_SUPPORTED: u32 = 7;

/// [EventLog] reporting into the Windows Application event log. Every record is also traced.
#[derive(Debug, Clone)]
pub struct WindowsEventLog {
    tracing: TracingEventLog,
}

impl WindowsEventLog {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            tracing: TracingEventLog::new(source),
        }
    }

    fn source(&self) -> &str {
        self.tracing.source()
    }

    fn report(&self, record: &EventRecord) -> Result<(), String> {
        let source = to_wide(self.source());
        let message = to_wide(&record.message);
        let event_type = match record.severity() {
            Severity::Info => EVENTLOG_INFORMATION_TYPE,
            Severity::Warning => EVENTLOG_WARNING_TYPE,
            Severity::Error => EVENTLOG_ERROR_TYPE,
        };

        unsafe {
            // https://learn.microsoft.com/en-us/windows/win32/api/winbase/nf-winbase-registereventsourcew
            let handle = RegisterEventSourceW(ptr::null(), source.as_ptr());
            if handle.is_null() {
                return Err(format!("RegisterEventSourceW failed: {}", GetLastError()));
            }

            let strings = [message.as_ptr()];
            let reported = ReportEventW(
                handle,
                event_type,
                0,
                record.code(),
                ptr::null_mut(),
                strings.len() as u16,
                0,
                strings.as_ptr(),
                ptr::null(),
            );
            let report_error = GetLastError();
            DeregisterEventSource(handle);

            if reported == 0 {
                return Err(format!("ReportEventW failed: {report_error}"));
            }
        }
        Ok(())
    }
}

impl EventLog for WindowsEventLog {
    fn register_source(&self) -> Result<(), EventLogError> {
        self.tracing.register_source()?;

        let key_path = format!("{APPLICATION_LOG_KEY_PATH}\\{}", self.source());
        let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
        if hklm.open_subkey_with_flags(&key_path, KEY_READ).is_ok() {
            debug!(source = self.source(), "event source already registered");
            return Ok(());
        }

        let registration_error = |err: std::io::Error| {
            EventLogError::Registration(self.source().into(), err.to_string())
        };
        let (source_key, _) = hklm.create_subkey(&key_path).map_err(registration_error)?;
        let system_root = std::env::var("SystemRoot").unwrap_or_else(|_| r"C:\Windows".into());
        source_key
            .set_value(
                "EventMessageFile",
                &format!("{system_root}\\{EVENT_MESSAGE_FILE}"),
            )
            .map_err(registration_error)?;
        source_key
            .set_value("TypesSupported", &TYPES_SUPPORTED)
            .map_err(registration_error)?;

        debug!(source = self.source(), "event source registered");
        Ok(())
    }

    fn write(&self, record: &EventRecord) {
        self.tracing.write(record);
        if let Err(err) = self.report(record) {
            warn!(
                source = self.source(),
                event_code = record.code(),
                "could not write to the Windows event log: {err}"
            );
        }
    }
}

fn to_wide(value: &str) -> Vec<u16> {
    OsStr::new(value).encode_wide().chain(Some(0)).collect()
}
