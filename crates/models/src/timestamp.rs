use std::fmt;

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Persisted, sortable timestamp format.
pub const VOTE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Local wall-clock time a vote was recorded, second precision.
///
/// Serialized as `YYYY-MM-DD HH:MM:SS` so the ledger stays human readable and
/// lexical order matches chronological order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VoteTimestamp(NaiveDateTime);

impl VoteTimestamp {
    pub fn now() -> Self {
        let now = Local::now().naive_local();
        Self(now.with_nanosecond(0).unwrap_or(now))
    }

    pub fn parse(s: &str) -> Result<Self, chrono::ParseError> {
        NaiveDateTime::parse_from_str(s.trim(), VOTE_TIMESTAMP_FORMAT).map(Self)
    }
}

impl From<NaiveDateTime> for VoteTimestamp {
    fn from(value: NaiveDateTime) -> Self {
        Self(value.with_nanosecond(0).unwrap_or(value))
    }
}

impl fmt::Display for VoteTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(VOTE_TIMESTAMP_FORMAT))
    }
}

impl Serialize for VoteTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VoteTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        VoteTimestamp::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_as_sortable_string() {
        let ts = VoteTimestamp::parse("2024-04-19 09:05:07").unwrap();
        assert_eq!(ts.to_string(), "2024-04-19 09:05:07");
        assert_eq!(serde_json::to_string(&ts).unwrap(), "\"2024-04-19 09:05:07\"");
    }

    #[test]
    fn rejects_other_formats() {
        assert!(VoteTimestamp::parse("2024-04-19T09:05:07Z").is_err());
        assert!(serde_json::from_str::<VoteTimestamp>("\"yesterday\"").is_err());
    }

    #[test]
    fn now_has_second_precision() {
        let ts = VoteTimestamp::now();
        let again = VoteTimestamp::parse(&ts.to_string()).unwrap();
        assert_eq!(ts, again);
    }
}
