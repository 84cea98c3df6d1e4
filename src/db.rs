//! Events-database container.
//!
//! Hosts one DAO per event channel so the different streams stay separated,
//! and routes inserts and queries to the right one. The container does not
//! implement storage itself; see the `store` module for that.

use time::Date;

use crate::store::{EventFilter, EventsDao, TimeSpan};
use crate::types::{Channel, Error, ErrorKind, Result, TimedEvent};

pub struct EventsDatabase {
    objects: Vec<(Channel, Box<dyn EventsDao>)>,
}

impl EventsDatabase {
    /// Build a container from `(channel, DAO)` pairs.
    ///
    /// # Errors
    ///
    /// Returns a `Policy` error when no DAO is provided or a channel appears
    /// twice.
    pub fn new(daos: Vec<(Channel, Box<dyn EventsDao>)>) -> Result<Self> {
        if daos.is_empty() {
            return Err(Error {
                kind: ErrorKind::Policy,
                msg: "no DAO provided".to_string(),
            });
        }
        for (i, (ch, _)) in daos.iter().enumerate() {
            if daos.iter().skip(i + 1).any(|(other, _)| other == ch) {
                return Err(Error {
                    kind: ErrorKind::Policy,
                    msg: format!("duplicate DAO for channel {ch}"),
                });
            }
        }
        Ok(Self { objects: daos })
    }

    #[must_use]
    pub fn channels(&self) -> Vec<Channel> {
        self.objects.iter().map(|(ch, _)| *ch).collect()
    }

    fn dao(&self, channel: Channel) -> Result<&dyn EventsDao> {
        self.objects
            .iter()
            .find(|(ch, _)| *ch == channel)
            .map(|(_, dao)| dao.as_ref())
            .ok_or_else(|| unknown_channel(channel))
    }

    fn dao_mut(&mut self, channel: Channel) -> Result<&mut Box<dyn EventsDao>> {
        self.objects
            .iter_mut()
            .find(|(ch, _)| *ch == channel)
            .map(|(_, dao)| dao)
            .ok_or_else(|| unknown_channel(channel))
    }

    /// Open every hosted DAO. Fails fast on the first error.
    pub fn open_all(&mut self) -> Result<()> {
        for (ch, dao) in &mut self.objects {
            log::info!("opening event store for channel {ch}");
            dao.open()?;
        }
        Ok(())
    }

    /// Close every hosted DAO, best effort; the first error is reported after
    /// all DAOs have been visited.
    pub fn close_all(&mut self) -> Result<()> {
        let mut first_err = None;
        for (_, dao) in &mut self.objects {
            if let Err(e) = dao.close() {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            None => Ok(()),
            Some(e) => Err(e),
        }
    }

    /// Flush pending writes on every channel, e.g. before an on-demand read
    /// by another process.
    pub fn flush_all(&mut self) -> Result<()> {
        for (_, dao) in &mut self.objects {
            dao.flush()?;
        }
        Ok(())
    }

    /// Record one event on its channel.
    pub fn record(&mut self, channel: Channel, event: &TimedEvent) -> Result<()> {
        log::debug!(
            "recording event: channel={channel} var_type={} var_name={}",
            event.var_type,
            event.var_name
        );
        self.dao_mut(channel)?.insert_event(event)
    }

    /// Days with events on `channel`, sorted ascending.
    pub fn available_days(&self, channel: Channel, month: Option<(i32, u8)>) -> Result<Vec<Date>> {
        self.dao(channel)?.available_days(month)
    }

    /// Events recorded on `channel` during `day`.
    pub fn events_for_day(
        &self,
        channel: Channel,
        day: Date,
        filter: &EventFilter,
    ) -> Result<Vec<TimedEvent>> {
        self.dao(channel)?.events_for_day(day, filter)
    }

    /// Events recorded on `channel` within `span`.
    pub fn events(
        &self,
        channel: Channel,
        span: &TimeSpan,
        filter: &EventFilter,
    ) -> Result<Vec<TimedEvent>> {
        self.dao(channel)?.events(span, filter)
    }
}

fn unknown_channel(channel: Channel) -> Error {
    Error {
        kind: ErrorKind::Policy,
        msg: format!("no DAO hosted for channel {channel}"),
    }
}
