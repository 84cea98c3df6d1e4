//! File-based event store.
//!
//! Events land in plain tabulated text files, one per day, named
//! `YYMMDD.evt-log` under `<home>/<channel>/`. A record is five tab-separated
//! fields: timestamp (`YYMMDD-HHMMSS.ffffff`, UTC), variable type, variable
//! name, value in JSON notation, and the remaining payload as a JSON object.
//!
//! Flush policy is where the bootstrapper's flash detection lands: without
//! flash support every insert flushes; with it, flushes happen at most every
//! `MAX_FLUSH_AGE` so the block driver can batch physical writes.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use fs2::FileExt;
use serde_json::Value;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use crate::constants::{EVENT_FILE_EXT, FIELD_SEP, MAX_FLUSH_AGE, STORE_LOCK_FILE};
use crate::types::{Channel, Error, ErrorKind, Result, TimedEvent};

use super::{EventFilter, EventsDao, StoreOptions, TimeSpan};

struct DayWriter {
    day: Date,
    out: BufWriter<File>,
}

pub struct FsysDao {
    channel: Channel,
    dir: PathBuf,
    flash_memory: bool,
    readonly: bool,
    opened: bool,
    writer: Option<DayWriter>,
    lock: Option<File>,
    last_flush: Option<Instant>,
}

impl FsysDao {
    /// Create a DAO for `channel` under `options.home`.
    ///
    /// In write mode the home and channel directories are created on the fly;
    /// in readonly mode the home must already exist.
    ///
    /// # Errors
    ///
    /// Returns an error when the home is missing in readonly mode, is not a
    /// directory, or cannot be created.
    pub fn new(channel: Channel, options: &StoreOptions) -> Result<Self> {
        let home = &options.home;
        if home.exists() {
            if !home.is_dir() {
                return Err(Error {
                    kind: ErrorKind::InvalidInput,
                    msg: format!("path is not a directory: {}", home.display()),
                });
            }
        } else if options.readonly {
            return Err(Error {
                kind: ErrorKind::Io,
                msg: format!("path not found: {}", home.display()),
            });
        } else {
            std::fs::create_dir_all(home).map_err(|e| Error {
                kind: ErrorKind::Io,
                msg: e.to_string(),
            })?;
        }

        let dir = home.join(channel.as_str());
        if !options.readonly && !dir.exists() {
            std::fs::create_dir(&dir).map_err(|e| Error {
                kind: ErrorKind::Io,
                msg: e.to_string(),
            })?;
        }

        if options.flash_memory {
            log::warn!(
                "flash memory support declared: systematic flush on write will be disabled"
            );
        }

        Ok(Self {
            channel,
            dir,
            flash_memory: options.flash_memory,
            readonly: options.readonly,
            opened: false,
            writer: None,
            lock: None,
            last_flush: None,
        })
    }

    fn path_for_day(&self, day: Date) -> PathBuf {
        self.dir.join(format!(
            "{:02}{:02}{:02}{EVENT_FILE_EXT}",
            day.year().rem_euclid(100),
            u8::from(day.month()),
            day.day(),
        ))
    }

    fn flush_writer(&mut self) -> Result<()> {
        if let Some(w) = self.writer.as_mut() {
            w.out.flush().map_err(|e| Error {
                kind: ErrorKind::Io,
                msg: e.to_string(),
            })?;
            self.last_flush = Some(Instant::now());
        }
        Ok(())
    }

    /// Whether the flush throttle allows skipping the post-insert flush.
    fn flush_due(&self) -> bool {
        if !self.flash_memory {
            return true;
        }
        match self.last_flush {
            None => true,
            Some(at) => at.elapsed() >= MAX_FLUSH_AGE,
        }
    }
}

impl EventsDao for FsysDao {
    fn open(&mut self) -> Result<()> {
        if self.opened {
            log::warn!("event store for channel {} already open", self.channel);
            return Ok(());
        }
        if !self.readonly {
            let lock = OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(self.dir.join(STORE_LOCK_FILE))
                .map_err(|e| Error {
                    kind: ErrorKind::Io,
                    msg: e.to_string(),
                })?;
            lock.try_lock_exclusive().map_err(|_| Error {
                kind: ErrorKind::Policy,
                msg: format!(
                    "event store for channel {} is locked by another writer",
                    self.channel
                ),
            })?;
            self.lock = Some(lock);
        }
        self.opened = true;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if !self.opened {
            return Ok(());
        }
        self.flush_writer()?;
        self.writer = None;
        if let Some(lock) = self.lock.take() {
            let _ = lock.unlock();
        }
        self.opened = false;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.writer.is_some() {
            self.flush_writer()?;
            log::info!("on-demand data flush executed");
        } else {
            log::info!("nothing to flush (no file currently in write mode)");
        }
        Ok(())
    }

    fn insert_event(&mut self, event: &TimedEvent) -> Result<()> {
        if self.readonly {
            let msg = "event store opened readonly".to_string();
            log::error!("{msg}");
            return Err(Error {
                kind: ErrorKind::Policy,
                msg,
            });
        }
        if !self.opened {
            return Err(Error {
                kind: ErrorKind::Policy,
                msg: "event store not open".to_string(),
            });
        }
        for (label, field) in [("var_type", &event.var_type), ("var_name", &event.var_name)] {
            if field.is_empty() || field.contains(['\t', '\n']) {
                return Err(Error {
                    kind: ErrorKind::InvalidInput,
                    msg: format!("invalid {label}: {field:?}"),
                });
            }
        }

        let ts = event.timestamp.to_offset(UtcOffset::UTC);
        let day = ts.date();
        if self.writer.as_ref().map(|w| w.day) != Some(day) {
            self.flush_writer()?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.path_for_day(day))
                .map_err(|e| Error {
                    kind: ErrorKind::Io,
                    msg: e.to_string(),
                })?;
            self.writer = Some(DayWriter {
                day,
                out: BufWriter::new(file),
            });
        }

        let record = format_record(&ts, event)?;
        if let Some(w) = self.writer.as_mut() {
            w.out.write_all(record.as_bytes()).map_err(|e| Error {
                kind: ErrorKind::Io,
                msg: e.to_string(),
            })?;
        }

        if self.flush_due() {
            self.flush_writer()?;
        }
        Ok(())
    }

    fn available_days(&self, month: Option<(i32, u8)>) -> Result<Vec<Date>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error {
                    kind: ErrorKind::Io,
                    msg: e.to_string(),
                })
            }
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|n| n.ends_with(EVENT_FILE_EXT))
            .collect();
        names.sort();

        let mut days = Vec::new();
        for name in names {
            let Some(day) = parse_day_filename(&name) else {
                log::warn!("ignoring unrecognized file in event store: {name}");
                continue;
            };
            if let Some((year, mm)) = month {
                let year = if year < 100 { year + 2000 } else { year };
                if day.year() != year || u8::from(day.month()) != mm {
                    continue;
                }
            }
            days.push(day);
        }
        Ok(days)
    }

    fn events_for_day(&self, day: Date, filter: &EventFilter) -> Result<Vec<TimedEvent>> {
        let path = self.path_for_day(day);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no event file for {day}: {}", path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                log::warn!("cannot read event file {}: {e}", path.display());
                return Ok(Vec::new());
            }
        };

        let mut out = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let rec_num = idx + 1;
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    log::warn!("stopping read of {} at record {rec_num}: {e}", path.display());
                    break;
                }
            };
            match parse_record(&line) {
                Ok(event) => {
                    if filter.matches(&event) {
                        out.push(event);
                    }
                }
                Err(e) => {
                    log::warn!("ignoring corrupted event ([rec:{rec_num}] {line}): {e}");
                }
            }
        }
        Ok(out)
    }

    fn events(&self, span: &TimeSpan, filter: &EventFilter) -> Result<Vec<TimedEvent>> {
        let from_day = span.from.map(|t| t.to_offset(UtcOffset::UTC).date());
        let to_day = span.to.map(|t| t.to_offset(UtcOffset::UTC).date());

        let mut out = Vec::new();
        for day in self.available_days(None)? {
            if from_day.is_some_and(|d| day < d) || to_day.is_some_and(|d| day > d) {
                continue;
            }
            for event in self.events_for_day(day, filter)? {
                if span.contains(event.timestamp) {
                    out.push(event);
                }
            }
        }
        Ok(out)
    }
}

impl Drop for FsysDao {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

fn format_record(ts: &OffsetDateTime, event: &TimedEvent) -> Result<String> {
    let value = serde_json::to_string(&event.value).map_err(|e| Error {
        kind: ErrorKind::InvalidInput,
        msg: format!("unserializable value: {e}"),
    })?;
    let extra = serde_json::to_string(&event.extra).map_err(|e| Error {
        kind: ErrorKind::InvalidInput,
        msg: format!("unserializable payload: {e}"),
    })?;
    Ok(format!(
        "{ts}{sep}{vt}{sep}{vn}{sep}{value}{sep}{extra}\n",
        ts = format_ts(ts),
        sep = FIELD_SEP,
        vt = event.var_type,
        vn = event.var_name,
    ))
}

fn parse_record(line: &str) -> Result<TimedEvent> {
    let parse_err = |msg: String| Error {
        kind: ErrorKind::Parse,
        msg,
    };
    let fields: Vec<&str> = line.trim_end().split(FIELD_SEP).collect();
    let [ts, var_type, var_name, value, extra] = fields.as_slice() else {
        return Err(parse_err(format!("expected 5 fields, got {}", fields.len())));
    };
    let timestamp = parse_ts(ts)?;
    // Values are stored in JSON notation; tolerate bare strings from older
    // producers.
    let value: Value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String((*value).to_string()));
    let extra: serde_json::Map<String, Value> = serde_json::from_str(extra)
        .map_err(|e| parse_err(format!("malformed event data: {e}")))?;
    Ok(TimedEvent::new(timestamp, *var_type, *var_name, value, extra))
}

fn format_ts(ts: &OffsetDateTime) -> String {
    format!(
        "{:02}{:02}{:02}-{:02}{:02}{:02}.{:06}",
        ts.year().rem_euclid(100),
        u8::from(ts.month()),
        ts.day(),
        ts.hour(),
        ts.minute(),
        ts.second(),
        ts.microsecond(),
    )
}

/// Parse a `YYMMDD-HHMMSS.ffffff` record timestamp. Truncated subsecond
/// digits are zero-padded, as older writers emitted fewer than six.
fn parse_ts(s: &str) -> Result<OffsetDateTime> {
    let parse_err = |msg: String| Error {
        kind: ErrorKind::Parse,
        msg,
    };
    let padded = format!("{s:0<20}");
    if padded.len() != 20
        || padded.as_bytes()[6] != b'-'
        || padded.as_bytes()[13] != b'.'
        || !padded.is_ascii()
    {
        return Err(parse_err(format!("malformed timestamp: {s}")));
    }
    let num = |range: std::ops::Range<usize>| -> Result<u32> {
        padded[range]
            .parse()
            .map_err(|_| parse_err(format!("malformed timestamp: {s}")))
    };
    let comp_err = |e: time::error::ComponentRange| parse_err(format!("invalid timestamp {s}: {e}"));

    let year = 2000 + num(0..2)? as i32;
    let month = Month::try_from(num(2..4)? as u8).map_err(comp_err)?;
    let date = Date::from_calendar_date(year, month, num(4..6)? as u8).map_err(comp_err)?;
    let time = Time::from_hms_micro(
        num(7..9)? as u8,
        num(9..11)? as u8,
        num(11..13)? as u8,
        num(14..20)?,
    )
    .map_err(comp_err)?;
    Ok(PrimitiveDateTime::new(date, time).assume_utc())
}

fn parse_day_filename(name: &str) -> Option<Date> {
    let stem = name.strip_suffix(EVENT_FILE_EXT)?;
    if stem.len() != 6 || !stem.is_ascii() {
        return None;
    }
    let year = 2000 + stem[0..2].parse::<i32>().ok()?;
    let month = Month::try_from(stem[2..4].parse::<u8>().ok()?).ok()?;
    let day = stem[4..6].parse::<u8>().ok()?;
    Date::from_calendar_date(year, month, day).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn timestamp_round_trip() {
        let ts = datetime!(2012-12-31 23:59:58.123456 UTC);
        let s = format_ts(&ts);
        assert_eq!(s, "121231-235958.123456");
        assert_eq!(parse_ts(&s).unwrap(), ts);
    }

    #[test]
    fn truncated_subseconds_are_padded() {
        let ts = parse_ts("130101-000000.5").unwrap();
        assert_eq!(ts.microsecond(), 500_000);
    }

    #[test]
    fn malformed_timestamps_are_rejected() {
        for s in ["", "garbage", "1301010-00000.0", "1313 01-000000.0"] {
            assert!(parse_ts(s).is_err(), "{s}");
        }
    }

    #[test]
    fn day_filenames_round_trip() {
        assert_eq!(
            parse_day_filename("121231.evt-log"),
            Some(datetime!(2012-12-31 0:00 UTC).date())
        );
        assert_eq!(parse_day_filename("121331.evt-log"), None);
        assert_eq!(parse_day_filename("not-a-day.evt-log"), None);
        assert_eq!(parse_day_filename("121231.other"), None);
    }

    #[test]
    fn record_round_trip() {
        let mut extra = serde_json::Map::new();
        extra.insert("unit".into(), json!("degC"));
        let event = TimedEvent::new(
            datetime!(2013-06-01 12:00:00.250 UTC),
            "temperature",
            "kitchen_temp",
            json!(21.5),
            extra,
        );
        let line = format_record(&event.timestamp, &event).unwrap();
        let parsed = parse_record(line.trim_end()).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn bare_string_values_are_tolerated() {
        let parsed = parse_record("130601-120000.000000\ttemperature\tkitchen\traw\t{}").unwrap();
        assert_eq!(parsed.value, json!("raw"));
    }

    #[test]
    fn short_records_are_corrupted() {
        assert!(parse_record("130601-120000.000000\ttemperature\tkitchen").is_err());
    }
}
