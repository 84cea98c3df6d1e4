//! Bootstrap run modes and outcome report.

use super::storage::StorageClass;
use crate::api::errors::{exit_code_for, ErrorId};

/// Whether a bootstrap run performs real side effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootstrapMode {
    /// Emit facts only; no flag-file write, no service start.
    DryRun,
    /// Real run, as executed at package install time.
    Commit,
}

/// Outcome of a bootstrap run.
///
/// A degraded storage classification is not an error (the service later runs
/// with default arguments); only a failed service-start attempt lands in
/// `errors` and turns the process exit status non-zero.
#[derive(Clone, Debug, Default)]
pub struct BootstrapReport {
    /// Storage classification, `None` when the probe failed.
    pub storage: Option<StorageClass>,
    /// Whether the flag file was (re)written during this run.
    pub flag_written: bool,
    /// Whether a service start was attempted (liveness marker present).
    pub start_attempted: bool,
    /// Whether the attempted start succeeded.
    pub service_started: bool,
    /// Exit status reported by the service manager, when it ran and failed.
    pub service_exit_code: Option<i32>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub duration_ms: u64,
}

impl BootstrapReport {
    /// Process exit status for this run: 0 on normal completion including the
    /// degraded-classification path; the service manager's own status (or a
    /// stable fallback) when the start attempt failed.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.errors.is_empty() {
            return 0;
        }
        match self.service_exit_code {
            Some(code) if code != 0 => code,
            _ => exit_code_for(ErrorId::E_SERVICE_START),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_report_exits_zero() {
        assert_eq!(BootstrapReport::default().exit_code(), 0);
    }

    #[test]
    fn degraded_probe_still_exits_zero() {
        let report = BootstrapReport {
            warnings: vec!["storage type could not be determined".into()],
            ..Default::default()
        };
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn failed_start_propagates_service_manager_status() {
        let report = BootstrapReport {
            start_attempted: true,
            service_exit_code: Some(7),
            errors: vec!["service manager exited with status 7".into()],
            ..Default::default()
        };
        assert_eq!(report.exit_code(), 7);
    }

    #[test]
    fn failed_spawn_uses_stable_fallback() {
        let report = BootstrapReport {
            start_attempted: true,
            errors: vec!["failed to invoke service manager".into()],
            ..Default::default()
        };
        assert_eq!(report.exit_code(), exit_code_for(ErrorId::E_SERVICE_START));
    }
}
