//! Event channels.
//!
//! Channels keep the different event streams separated on disk and on the
//! query surface: sensor readings, system monitoring, and framework-internal
//! events each get their own store directory.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::errors::{Error, ErrorKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Sensor,
    Sysmon,
    Framework,
}

impl Channel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Channel::Sensor => "sensor",
            Channel::Sysmon => "sysmon",
            Channel::Framework => "framework",
        }
    }

    /// All known channels, in stable order.
    #[must_use]
    pub const fn all() -> [Channel; 3] {
        [Channel::Sensor, Channel::Sysmon, Channel::Framework]
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = Error;

    /// Parse a channel name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sensor" => Ok(Channel::Sensor),
            "sysmon" => Ok(Channel::Sysmon),
            "framework" => Ok(Channel::Framework),
            _ => Err(Error {
                kind: ErrorKind::Parse,
                msg: format!("invalid channel name: {s}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("SENSOR".parse::<Channel>().unwrap(), Channel::Sensor);
        assert_eq!("sysmon".parse::<Channel>().unwrap(), Channel::Sysmon);
        assert_eq!("Framework".parse::<Channel>().unwrap(), Channel::Framework);
    }

    #[test]
    fn rejects_unknown_names() {
        assert!("syslog".parse::<Channel>().is_err());
        assert!("".parse::<Channel>().is_err());
    }
}
