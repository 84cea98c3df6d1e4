//! Install-time bootstrap hook for the event database service.
//!
//! Invoked with no arguments as the final step of package installation.
//! Diagnostics go to stdout; the exit status is 0 on normal completion
//! (including the degraded could-not-classify-storage path) and non-zero only
//! when the service-start attempt itself fails.

use log::Level;

use evtbox::logging::{AuditSink, NullSink};
use evtbox::policy::Policy;
use evtbox::types::BootstrapMode;
use evtbox::Bootstrapper;

/// Human-readable diagnostics on stdout, level-tagged above Info.
struct ConsoleAudit;

impl AuditSink for ConsoleAudit {
    fn log(&self, level: Level, msg: &str) {
        match level {
            Level::Error | Level::Warn => println!("{level}: {msg}"),
            Level::Info => println!("{msg}"),
            Level::Debug | Level::Trace => {}
        }
    }
}

fn main() {
    // Structured facts are discarded here: stdout stays human-readable for
    // the package manager's transcript.
    let boot = Bootstrapper::new(NullSink, ConsoleAudit, Policy::default());
    let report = boot.run(BootstrapMode::Commit);
    std::process::exit(report.exit_code());
}
