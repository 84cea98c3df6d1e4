#![forbid(unsafe_code)]
//! evtbox: storage-aware bootstrap and file-based event storage for
//! building-automation boxes.
//!
//! Two halves live here:
//! - The install-time bootstrapper: classifies the root filesystem's backing
//!   block device, persists a daemon-argument flag file when flash-card
//!   storage is detected, and starts the event database service only when the
//!   coordination daemon's liveness marker is present.
//! - The event store consumed by that service: one plain-text log file per
//!   day and per channel, with a write-flush throttle that is the downstream
//!   effect of the `--flash_memory` flag.
//!
//! External tooling (block-device listing, service manager) is reached through
//! adapter traits so the decision logic stays testable without a real OS.

pub mod constants;
pub mod adapters;
pub mod api;
pub mod db;
pub mod fs;
pub mod logging;
pub mod policy;
pub mod store;
pub mod types;

pub use api::*;
