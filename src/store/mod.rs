//! Event persistence layer.
//!
//! Access goes through the `EventsDao` trait so the database container and
//! the query surface stay independent of the storage strategy underneath.

pub mod fsys;

use std::path::PathBuf;

use time::{Date, OffsetDateTime};

pub use fsys::FsysDao;

use crate::fs::DaemonArgs;
use crate::types::{Result, TimedEvent};

/// Options shared by store implementations.
#[derive(Clone, Debug)]
pub struct StoreOptions {
    /// Home directory holding one subdirectory per channel.
    pub home: PathBuf,
    /// Suppress systematic flushes on write (flash-card storage).
    pub flash_memory: bool,
    /// Refuse inserts and require the home to pre-exist.
    pub readonly: bool,
}

impl StoreOptions {
    #[must_use]
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            flash_memory: false,
            readonly: false,
        }
    }

    /// Derive options from the daemon arguments the bootstrapper persisted.
    #[must_use]
    pub fn from_daemon_args(home: impl Into<PathBuf>, args: DaemonArgs) -> Self {
        Self {
            flash_memory: args.flash_memory,
            ..Self::new(home)
        }
    }

    #[must_use]
    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }
}

/// Query criteria on the variable identity. Empty filter matches everything.
#[derive(Clone, Debug, Default)]
pub struct EventFilter {
    pub var_type: Option<String>,
    pub var_name: Option<String>,
}

impl EventFilter {
    pub(crate) fn matches(&self, event: &TimedEvent) -> bool {
        if let Some(vt) = &self.var_type {
            if &event.var_type != vt {
                return false;
            }
        }
        if let Some(vn) = &self.var_name {
            if &event.var_name != vn {
                return false;
            }
        }
        true
    }
}

/// Inclusive time span for range queries; open on either end.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimeSpan {
    pub from: Option<OffsetDateTime>,
    pub to: Option<OffsetDateTime>,
}

impl TimeSpan {
    pub(crate) fn contains(&self, ts: OffsetDateTime) -> bool {
        if let Some(from) = self.from {
            if ts < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if ts > to {
                return false;
            }
        }
        true
    }
}

/// Data-access object for one event channel.
///
/// `open` must be called before inserting; queries work on a closed DAO as
/// they read the day files directly.
pub trait EventsDao: Send {
    /// Open the store for this channel, acquiring the writer lock when not
    /// readonly. Opening an already-open DAO does nothing.
    fn open(&mut self) -> Result<()>;

    /// Flush and close. Closing a closed DAO does nothing.
    fn close(&mut self) -> Result<()>;

    /// Flush pending writes so concurrent readers see up-to-date data.
    fn flush(&mut self) -> Result<()>;

    /// Append one event.
    fn insert_event(&mut self, event: &TimedEvent) -> Result<()>;

    /// Days for which events exist, sorted ascending, optionally restricted
    /// to a `(year, month)` pair.
    fn available_days(&self, month: Option<(i32, u8)>) -> Result<Vec<Date>>;

    /// Events recorded on `day`, in file order, after filtering.
    fn events_for_day(&self, day: Date, filter: &EventFilter) -> Result<Vec<TimedEvent>>;

    /// Events within `span`, in chronological file order, after filtering.
    fn events(&self, span: &TimeSpan, filter: &EventFilter) -> Result<Vec<TimedEvent>>;
}
