//! Policy: the externally-owned resources and knobs a bootstrap run binds to.
//!
//! The flag file and the liveness marker are ambient global state on a real
//! box; modeling them as policy fields keeps the bootstrap logic testable
//! against sandbox roots.

use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_FLAG_PATH, DEFAULT_MARKER_PATH, DEFAULT_STORE_HOME, SERVICE_NAME,
};
use crate::types::Channel;

/// The service the bootstrapper conditionally starts, and the coordination
/// daemon's liveness marker gating that start.
#[derive(Clone, Debug)]
pub struct ServicePolicy {
    pub name: String,
    pub marker_path: PathBuf,
}

/// Where the daemon-argument flag file lives.
#[derive(Clone, Debug)]
pub struct FlagPolicy {
    pub path: PathBuf,
}

/// Event store layout.
#[derive(Clone, Debug)]
pub struct StorePolicy {
    pub home: PathBuf,
    pub channels: Vec<Channel>,
}

#[derive(Clone, Debug)]
pub struct Policy {
    pub service: ServicePolicy,
    pub flag: FlagPolicy,
    pub store: StorePolicy,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            service: ServicePolicy {
                name: SERVICE_NAME.to_string(),
                marker_path: PathBuf::from(DEFAULT_MARKER_PATH),
            },
            flag: FlagPolicy {
                path: PathBuf::from(DEFAULT_FLAG_PATH),
            },
            store: StorePolicy {
                home: PathBuf::from(DEFAULT_STORE_HOME),
                channels: Channel::all().to_vec(),
            },
        }
    }
}

impl Policy {
    /// Production defaults with every path re-rooted under `root`.
    /// Intended for sandboxed runs and tests.
    #[must_use]
    pub fn rooted(root: &Path) -> Self {
        let p = Self::default();
        let reroot = |abs: &Path| {
            let rel: PathBuf = abs.components().skip(1).collect();
            root.join(rel)
        };
        Self {
            service: ServicePolicy {
                name: p.service.name,
                marker_path: reroot(&p.service.marker_path),
            },
            flag: FlagPolicy {
                path: reroot(&p.flag.path),
            },
            store: StorePolicy {
                home: reroot(&p.store.home),
                channels: p.store.channels,
            },
        }
    }
}
