use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::{format_description, Duration, OffsetDateTime, UtcOffset};

use crate::error::ConfigError;

/// Timestamp guaranteed to be UTC.
///
/// The upstream API reports datetimes as ISO-8601 with arbitrary offsets
/// (`2024-01-01T08:00:00+08:00`); parsing normalizes them to UTC so that
/// bookmark comparisons are total. Query parameters use the API's
/// seconds-precision form via [`format_query`](Self::format_query).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDateTime(OffsetDateTime);

impl UtcDateTime {
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    /// Parses an ISO-8601 datetime with a timezone offset and normalizes to UTC.
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let parsed =
            OffsetDateTime::parse(input, &Rfc3339).map_err(|_| ConfigError::InvalidTimestamp {
                value: input.to_owned(),
            })?;

        Ok(Self(parsed.to_offset(UtcOffset::UTC)))
    }

    pub fn from_offset_datetime(value: OffsetDateTime) -> Self {
        Self(value.to_offset(UtcOffset::UTC))
    }

    pub fn into_inner(self) -> OffsetDateTime {
        self.0
    }

    pub fn plus_seconds(self, seconds: i64) -> Self {
        Self(self.0 + Duration::seconds(seconds))
    }

    pub fn format_rfc3339(self) -> String {
        self.0
            .format(&Rfc3339)
            .expect("UtcDateTime must be RFC3339 formattable")
    }

    /// Seconds-precision `YYYY-MM-DDTHH:MM:SSZ` form used in query parameters.
    pub fn format_query(self) -> String {
        let format = format_description::parse("[year]-[month]-[day]T[hour]:[minute]:[second]Z")
            .expect("static query format is valid");
        self.0
            .format(&format)
            .expect("UtcDateTime must be formattable at seconds precision")
    }
}

impl Display for UtcDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_rfc3339())
    }
}

impl Serialize for UtcDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_rfc3339())
    }
}

impl<'de> Deserialize<'de> for UtcDateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_utc_timestamp() {
        let parsed = UtcDateTime::parse("2024-01-01T00:00:00Z").expect("must parse");
        assert_eq!(parsed.format_query(), "2024-01-01T00:00:00Z");
    }

    #[test]
    fn normalizes_offset_to_utc() {
        let parsed = UtcDateTime::parse("2024-01-01T08:00:00+08:00").expect("must parse");
        assert_eq!(parsed.format_query(), "2024-01-01T00:00:00Z");
    }

    #[test]
    fn rejects_timestamp_without_offset() {
        let err = UtcDateTime::parse("2024-01-01T00:00:00").expect_err("must fail");
        assert!(matches!(err, ConfigError::InvalidTimestamp { .. }));
    }

    #[test]
    fn plus_seconds_advances_across_minute_boundary() {
        let parsed = UtcDateTime::parse("2024-01-01T00:00:59Z").expect("must parse");
        assert_eq!(parsed.plus_seconds(1).format_query(), "2024-01-01T00:01:00Z");
    }

    #[test]
    fn query_format_drops_subseconds() {
        let parsed = UtcDateTime::parse("2024-01-01T00:00:00.750Z").expect("must parse");
        assert_eq!(parsed.format_query(), "2024-01-01T00:00:00Z");
    }
}
