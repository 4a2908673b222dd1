use super::{ServiceError, ServiceManager};
use std::thread::sleep;
use std::time::Duration;
use tracing::{debug, info};
use windows_service::service::{ServiceAccess, ServiceState};
use windows_service::service_manager::{
    ServiceManager as WinServiceManager, ServiceManagerAccess,
};
use windows_sys::Win32::Foundation::ERROR_SERVICE_DOES_NOT_EXIST;

const STOP_POLL_RETRIES: u32 = 30;
const STOP_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Restarts the service through the Windows Service Control Manager.
#[derive(Debug, Clone)]
pub struct WindowsServiceManager {
    stop_poll_retries: u32,
    stop_poll_interval: Duration,
}

impl Default for WindowsServiceManager {
    fn default() -> Self {
        Self {
            stop_poll_retries: STOP_POLL_RETRIES,
            stop_poll_interval: STOP_POLL_INTERVAL,
        }
    }
}

impl ServiceManager for WindowsServiceManager {
    fn restart(&self, service_name: &str) -> Result<(), ServiceError> {
        let service_manager =
            WinServiceManager::local_computer(None::<&str>, ServiceManagerAccess::CONNECT)
                .map_err(|err| {
                    ServiceError::Control(format!(
                        "could not interact with the Windows Service manager: {err}"
                    ))
                })?;

        let service_access =
            ServiceAccess::QUERY_STATUS | ServiceAccess::STOP | ServiceAccess::START;
        let service = match service_manager.open_service(service_name, service_access) {
            Ok(service) => service,
            Err(windows_service::Error::Winapi(err))
                if err.raw_os_error() == Some(ERROR_SERVICE_DOES_NOT_EXIST as i32) =>
            {
                return Err(ServiceError::Control(format!(
                    "service '{service_name}' does not exist"
                )));
            }
            Err(err) => {
                return Err(ServiceError::Control(format!(
                    "could not open the '{service_name}' service: {err}"
                )));
            }
        };

        let status = service.query_status().map_err(|err| {
            ServiceError::Control(format!("error checking the '{service_name}' status: {err}"))
        })?;
        if status.current_state != ServiceState::Stopped {
            info!("Stopping '{service_name}' service");
            service.stop().map_err(|err| {
                ServiceError::Control(format!("error stopping '{service_name}' service: {err}"))
            })?;
            self.wait_until_stopped(service_name, || {
                service.query_status().map(|status| status.current_state)
            })?;
        }

        info!("Starting '{service_name}' service");
        service.start::<&str>(&[]).map_err(|err| {
            ServiceError::Control(format!("error starting '{service_name}' service: {err}"))
        })
    }
}

impl WindowsServiceManager {
    fn wait_until_stopped<Q>(&self, service_name: &str, query_state: Q) -> Result<(), ServiceError>
    where
        Q: Fn() -> windows_service::Result<ServiceState>,
    {
        for _ in 0..self.stop_poll_retries {
            match query_state() {
                Ok(ServiceState::Stopped) => {
                    debug!("Service '{service_name}' stopped");
                    return Ok(());
                }
                Ok(state) => debug!(?state, "waiting for service '{service_name}' to stop"),
                Err(err) => {
                    return Err(ServiceError::Control(format!(
                        "error checking the '{service_name}' status: {err}"
                    )));
                }
            }
            sleep(self.stop_poll_interval);
        }
        Err(ServiceError::Control(format!(
            "timeout waiting for the '{service_name}' service to stop"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::cell::Cell;

    fn fast_polling() -> WindowsServiceManager {
        WindowsServiceManager {
            stop_poll_retries: 3,
            stop_poll_interval: Duration::ZERO,
        }
    }

    #[test]
    fn test_wait_until_stopped() {
        let polls = Cell::new(0);
        let result = fast_polling().wait_until_stopped("SplunkForwarder", || {
            polls.set(polls.get() + 1);
            if polls.get() < 2 {
                Ok(ServiceState::StopPending)
            } else {
                Ok(ServiceState::Stopped)
            }
        });
        assert!(result.is_ok());
        assert_eq!(polls.get(), 2);
    }

    #[test]
    fn test_wait_until_stopped_times_out() {
        let result = fast_polling()
            .wait_until_stopped("SplunkForwarder", || Ok(ServiceState::StopPending));
        assert_matches!(result, Err(ServiceError::Control(msg)) => {
            assert!(msg.contains("timeout"));
        });
    }

    #[test]
    fn test_missing_service_fails() {
        let result = WindowsServiceManager::default().restart("surely-not-an-installed-service");
        assert!(result.is_err());
    }
}
