//! The daemon-argument flag file.
//!
//! A one-line key-value file, `DAEMON_ARGS="--flash_memory"`, written by the
//! bootstrapper on flash detection and read by the service's startup wrapper
//! on every subsequent start. Absence of the file means "no extra arguments".

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::constants::{DAEMON_ARGS_KEY, FLASH_MEMORY_OPT, TMP_SUFFIX};
use crate::types::{Error, ErrorKind, Result};

/// Recognized daemon arguments. The flag file holds at most one option today.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DaemonArgs {
    /// Treat underlying storage as flash memory: the store suppresses
    /// systematic flushes on write.
    pub flash_memory: bool,
}

impl DaemonArgs {
    /// Argument vector form, as passed on the daemon command line.
    #[must_use]
    pub fn to_argv(self) -> Vec<String> {
        let mut argv = Vec::new();
        if self.flash_memory {
            argv.push(FLASH_MEMORY_OPT.to_string());
        }
        argv
    }

    /// Parse an argument string. Unrecognized tokens are ignored with a
    /// warning rather than rejected, so an old flag file never blocks a start.
    #[must_use]
    pub fn parse_argv(s: &str) -> Self {
        let mut args = Self::default();
        for tok in s.split_whitespace() {
            if tok == FLASH_MEMORY_OPT {
                args.flash_memory = true;
            } else {
                log::warn!("ignoring unrecognized daemon argument: {tok}");
            }
        }
        args
    }
}

/// Write the flag file, replacing any previous content (overwrite, never
/// append). Staged through a temporary sibling and renamed into place so a
/// concurrent reader never sees a torn file.
///
/// # Errors
///
/// Returns an `Io` error when the file cannot be staged or renamed.
pub fn write_daemon_args(path: &Path, args: DaemonArgs) -> Result<()> {
    let fname = path
        .file_name()
        .ok_or_else(|| Error {
            kind: ErrorKind::InvalidInput,
            msg: format!("flag path has no file name: {}", path.display()),
        })?
        .to_string_lossy();
    let tmp = path.with_file_name(format!(".{fname}{TMP_SUFFIX}"));

    let io_err = |e: std::io::Error| Error {
        kind: ErrorKind::Io,
        msg: e.to_string(),
    };
    let line = format!("{DAEMON_ARGS_KEY}=\"{}\"\n", args.to_argv().join(" "));
    let mut f = File::create(&tmp).map_err(io_err)?;
    f.write_all(line.as_bytes()).map_err(io_err)?;
    f.sync_all().map_err(io_err)?;
    drop(f);
    fs::rename(&tmp, path).map_err(io_err)
}

/// Read the flag file back into `DaemonArgs`.
///
/// A missing file is not an error: it is equivalent to default arguments.
/// Lines other than the `DAEMON_ARGS` entry (comments, blanks) are skipped.
///
/// # Errors
///
/// Returns an `Io` error for any failure other than the file not existing.
pub fn load_daemon_args(path: &Path) -> Result<DaemonArgs> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(DaemonArgs::default()),
        Err(e) => {
            return Err(Error {
                kind: ErrorKind::Io,
                msg: e.to_string(),
            })
        }
    };
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(value) = line.strip_prefix(DAEMON_ARGS_KEY).and_then(|r| r.strip_prefix('=')) {
            let value = value.trim().trim_matches('"');
            return Ok(DaemonArgs::parse_argv(value));
        }
    }
    Ok(DaemonArgs::default())
}
