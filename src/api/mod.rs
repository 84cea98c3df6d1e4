// Facade for the bootstrap API; the run logic lives in submodules.

use crate::adapters::{BlockDeviceInspector, LsblkInspector, ServiceController, SysvController};
use crate::logging::{AuditSink, FactsEmitter};
use crate::policy::Policy;
use crate::types::{BootstrapMode, BootstrapReport};

mod bootstrap;
pub mod errors;

/// The storage-aware service bootstrapper.
///
/// Runs once, non-interactively, at package install time. Construction wires
/// the two observability sinks and the policy; the OS-facing adapters default
/// to the production implementations and can be swapped for tests.
pub struct Bootstrapper<E: FactsEmitter, A: AuditSink> {
    pub(crate) facts: E,
    pub(crate) audit: A,
    pub(crate) policy: Policy,
    pub(crate) inspector: Box<dyn BlockDeviceInspector>,
    pub(crate) service: Box<dyn ServiceController>,
}

impl<E: FactsEmitter, A: AuditSink> Bootstrapper<E, A> {
    pub fn new(facts: E, audit: A, policy: Policy) -> Self {
        Self {
            facts,
            audit,
            policy,
            inspector: Box::new(LsblkInspector),
            service: Box::new(SysvController),
        }
    }

    #[must_use]
    pub fn with_inspector(mut self, inspector: Box<dyn BlockDeviceInspector>) -> Self {
        self.inspector = inspector;
        self
    }

    #[must_use]
    pub fn with_controller(mut self, service: Box<dyn ServiceController>) -> Self {
        self.service = service;
        self
    }

    /// Execute the bootstrap sequence: storage classification, flag-file
    /// persistence, then the marker-gated service start.
    ///
    /// Failures short of a failed start attempt degrade to warnings; see
    /// `BootstrapReport::exit_code` for the process status contract.
    pub fn run(&self, mode: BootstrapMode) -> BootstrapReport {
        bootstrap::run(self, mode)
    }
}
