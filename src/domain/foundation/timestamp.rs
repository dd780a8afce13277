//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Checks if this timestamp is after another.
    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Returns a new timestamp offset by the given number of minutes.
    pub fn plus_minutes(&self, minutes: i64) -> Self {
        Self(self.0 + Duration::minutes(minutes))
    }

    /// Returns a new timestamp moved back by the given number of minutes.
    pub fn minus_minutes(&self, minutes: i64) -> Self {
        Self(self.0 - Duration::minutes(minutes))
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn timestamp_now_creates_current_time() {
        let before = Utc::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts.as_datetime() >= &before);
        assert!(ts.as_datetime() <= &after);
    }

    #[test]
    fn plus_and_minus_minutes_are_inverse() {
        let ts = Timestamp::now();
        assert_eq!(ts.plus_minutes(90).minus_minutes(90), ts);
        assert!(ts.plus_minutes(1).is_after(&ts));
        assert!(ts.minus_minutes(1).is_before(&ts));
    }

    #[test]
    fn timestamp_deserializes_from_json() {
        let json = "\"2024-01-15T10:30:00Z\"";
        let ts: Timestamp = serde_json::from_str(json).unwrap();

        assert_eq!(ts.as_datetime().year(), 2024);
    }
}
