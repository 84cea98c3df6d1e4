//! Shared crate-wide constants for evtbox.
//!
//! Centralizes magic values and default paths used across modules.
//! Adjusting these here will propagate through the crate.

use std::time::Duration;

/// Name of the event database service, as known to the system service manager.
pub const SERVICE_NAME: &str = "evtbox-evtdb";

/// Default location of the daemon-argument flag file written by the
/// bootstrapper and read by the service's startup wrapper.
pub const DEFAULT_FLAG_PATH: &str = "/etc/default/evtbox-evtdb";

/// Default location of the coordination daemon's liveness marker. The marker
/// is externally owned; evtbox only tests for its existence.
pub const DEFAULT_MARKER_PATH: &str = "/var/run/evtbox/core.pid";

/// Default home directory of the file-based event store.
pub const DEFAULT_STORE_HOME: &str = "/var/db/evtbox/events";

/// Key used in the flag file; the value is the argument string passed to the
/// daemon on start, e.g. `DAEMON_ARGS="--flash_memory"`.
pub const DAEMON_ARGS_KEY: &str = "DAEMON_ARGS";

/// The single recognized daemon option, meaning "treat underlying storage as
/// flash memory" (suppresses systematic flushes in the store).
pub const FLASH_MEMORY_OPT: &str = "--flash_memory";

/// Device-name prefix identifying flash-card/MMC-type block devices.
/// Matching is prefix-based and case-sensitive on purpose; other removable
/// bus types are not special-cased.
pub const FLASH_DEVICE_PREFIX: &str = "mmc";

/// Mount point inspected by the bootstrapper.
pub const ROOT_MOUNT_POINT: &str = "/";

/// Extension of the daily event log files, named `YYMMDD.evt-log`.
pub const EVENT_FILE_EXT: &str = ".evt-log";

/// Field separator inside event log records.
pub const FIELD_SEP: char = '\t';

/// Minimum interval between physical flushes when flash memory support is
/// declared. Frequent flushes wear SD cards out; losing a couple of hours of
/// events on power loss beats corrupting the whole card.
pub const MAX_FLUSH_AGE: Duration = Duration::from_secs(2 * 3600);

/// Temporary filename suffix used when staging an atomic flag-file replace.
pub const TMP_SUFFIX: &str = ".evtbox.tmp";

/// Lock file name guarding a channel directory against concurrent writers.
pub const STORE_LOCK_FILE: &str = ".evtbox.lock";

/// UUIDv5 namespace tag for deterministic bootstrap IDs.
pub const NS_TAG: &str = "https://evtbox/bootstrap";
