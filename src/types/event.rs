//! Timed events as recorded by the store.

use serde_json::{Map, Value};
use time::OffsetDateTime;

use super::errors::{Error, ErrorKind, Result};

/// A single recorded observation: a timestamped value for a named variable,
/// plus any additional payload fields the producer attached.
///
/// The value is a first-class field; everything else from the producer's
/// payload is kept verbatim in `extra`.
#[derive(Clone, Debug, PartialEq)]
pub struct TimedEvent {
    /// Event timestamp, UTC.
    pub timestamp: OffsetDateTime,
    /// Variable type, e.g. `temperature`.
    pub var_type: String,
    /// Variable name, e.g. `kitchen_temp`.
    pub var_name: String,
    /// The observed value.
    pub value: Value,
    /// Additional payload fields (units, quality flags, ...).
    pub extra: Map<String, Value>,
}

impl TimedEvent {
    #[must_use]
    pub fn new(
        timestamp: OffsetDateTime,
        var_type: impl Into<String>,
        var_name: impl Into<String>,
        value: Value,
        extra: Map<String, Value>,
    ) -> Self {
        Self {
            timestamp,
            var_type: var_type.into(),
            var_name: var_name.into(),
            value,
            extra,
        }
    }

    /// Build an event from a milliseconds-since-epoch timestamp, the form used
    /// on the event bus.
    ///
    /// # Errors
    ///
    /// Returns an error if `msecs` is outside the representable range.
    pub fn from_millis(
        msecs: i64,
        var_type: impl Into<String>,
        var_name: impl Into<String>,
        value: Value,
        extra: Map<String, Value>,
    ) -> Result<Self> {
        let ts = OffsetDateTime::from_unix_timestamp_nanos(i128::from(msecs) * 1_000_000)
            .map_err(|e| Error {
                kind: ErrorKind::InvalidInput,
                msg: format!("timestamp out of range ({msecs} ms): {e}"),
            })?;
        Ok(Self::new(ts, var_type, var_name, value, extra))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_millis_maps_to_utc() {
        let ev = TimedEvent::from_millis(
            1_356_912_000_500,
            "temperature",
            "kitchen_temp",
            json!(21.5),
            Map::new(),
        )
        .unwrap();
        assert_eq!(ev.timestamp.unix_timestamp(), 1_356_912_000);
        assert_eq!(ev.timestamp.millisecond(), 500);
    }
}
