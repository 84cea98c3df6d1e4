//! Filesystem artifacts the bootstrapper reads and writes.

pub mod flagfile;

use std::path::Path;

pub use flagfile::{load_daemon_args, write_daemon_args, DaemonArgs};

/// Whether the coordination daemon's liveness marker is present.
///
/// The marker is owned by the parent framework; its mere existence means the
/// framework is currently running.
#[must_use]
pub fn liveness_marker_present(path: &Path) -> bool {
    path.exists()
}
