use super::{EventLog, EventLogError, EventRecord, Severity};
use tracing::{debug, error, info, warn};

/// [EventLog] writing every record through `tracing`, so they end up wherever logging is
/// configured to go.
#[derive(Debug, Clone)]
pub struct TracingEventLog {
    source: String,
}

impl TracingEventLog {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl EventLog for TracingEventLog {
    fn register_source(&self) -> Result<(), EventLogError> {
        debug!(source = %self.source, "event source ready");
        Ok(())
    }

    fn write(&self, record: &EventRecord) {
        let code = record.code();
        match record.severity() {
            Severity::Info => info!(source = %self.source, event_code = code, "{}", record.message),
            Severity::Warning => {
                warn!(source = %self.source, event_code = code, "{}", record.message)
            }
            Severity::Error => {
                error!(source = %self.source, event_code = code, "{}", record.message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_records_are_traced_with_their_code() {
        let event_log = TracingEventLog::new("AgentAppInstaller");
        event_log.register_source().unwrap();

        event_log.write(&EventRecord::new(
            EventKind::RestartFailed,
            "could not restart service",
        ));

        assert!(logs_contain("event_code=2003"));
        assert!(logs_contain("could not restart service"));
        assert!(logs_contain("WARN"));
    }
}
