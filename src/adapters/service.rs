//! Service-manager adapter.

use std::process::Command;

use thiserror::Error;

/// Why a service start attempt did not succeed.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The service manager itself could not be invoked.
    #[error("failed to invoke service manager: {0}")]
    Spawn(String),
    /// The service manager ran and reported failure; the status is propagated
    /// as the bootstrapper's own exit code.
    #[error("service manager exited with status {0}")]
    Failed(i32),
}

pub trait ServiceController: Send + Sync {
    /// Attempt to start the named service.
    ///
    /// # Errors
    ///
    /// Returns a `ServiceError` when the manager cannot be invoked or reports
    /// a non-zero status.
    fn start(&self, service: &str) -> Result<(), ServiceError>;
}

/// Production controller: invokes `service <name> start`.
#[derive(Debug, Copy, Clone, Default)]
pub struct SysvController;

impl ServiceController for SysvController {
    fn start(&self, service: &str) -> Result<(), ServiceError> {
        let status = Command::new("service")
            .arg(service)
            .arg("start")
            .status()
            .map_err(|e| ServiceError::Spawn(e.to_string()))?;
        if status.success() {
            Ok(())
        } else {
            // A killed-by-signal child has no code; report it as 1.
            Err(ServiceError::Failed(status.code().unwrap_or(1)))
        }
    }
}
