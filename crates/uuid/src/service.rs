//! Implementation of event identifiers.

use crate::{UuidError, UuidResult};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%.3f";

/// A UUID held in canonical form (32 lowercase hex characters, no hyphens).
///
/// Externally supplied values must already be canonical; [`EventUuid::parse`] does not
/// normalise hyphenated or uppercase input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventUuid(Uuid);

impl Default for EventUuid {
    fn default() -> Self {
        Self::new()
    }
}

impl EventUuid {
    /// Generates a new random (v4) UUID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and parses a UUID string that must already be canonical.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is not in canonical form.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if !Self::is_canonical(input) {
            return Err(UuidError::InvalidInput(format!(
                "UUID must be 32 lowercase hex characters without hyphens, got: '{}'",
                input
            )));
        }
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| UuidError::InvalidInput(e.to_string()))
    }

    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Returns true if `input` is exactly 32 lowercase hex characters.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }
}

impl fmt::Display for EventUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for EventUuid {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventUuid::parse(s)
    }
}

/// A time-prefixed event identifier.
///
/// Ordering compares the timestamp first and the UUID second, which matches the textual
/// ordering of the rendered form.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimestampId {
    timestamp: DateTime<Utc>,
    uuid: EventUuid,
}

impl TimestampId {
    /// Builds an id from parts. The timestamp is truncated to millisecond precision so that
    /// rendering and re-parsing yields an equal value.
    pub fn new(timestamp: DateTime<Utc>, uuid: EventUuid) -> Self {
        Self {
            timestamp: truncate_to_millis(timestamp),
            uuid,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn uuid(&self) -> &EventUuid {
        &self.uuid
    }
}

fn truncate_to_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ts.timestamp_millis()).unwrap_or(ts)
}

impl FromStr for TimestampId {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ts_str, uuid_str) = s.split_once('-').ok_or_else(|| {
            UuidError::InvalidInput(format!("Invalid timestamp id format: '{}'", s))
        })?;

        let ts_no_z = ts_str.strip_suffix('Z').ok_or_else(|| {
            UuidError::InvalidInput(format!("Timestamp must end with 'Z': '{}'", ts_str))
        })?;

        let naive = NaiveDateTime::parse_from_str(ts_no_z, TIMESTAMP_FORMAT).map_err(|e| {
            UuidError::InvalidInput(format!("Invalid timestamp format '{}': {}", ts_str, e))
        })?;

        let timestamp = DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc);
        let uuid = EventUuid::parse(uuid_str)?;

        Ok(Self::new(timestamp, uuid))
    }
}

impl fmt::Display for TimestampId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}Z-{}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.uuid
        )
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for TimestampId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TimestampId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Hands out strictly increasing [`TimestampId`]s.
///
/// If the clock reading is not later than the last id issued, the new id is placed 1 ms after
/// it instead.
#[derive(Clone, Debug, Default)]
pub struct TimestampIdGenerator {
    last: Option<TimestampId>,
}

impl TimestampIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates the next id using the current wall clock.
    pub fn next_id(&mut self) -> TimestampId {
        self.next_at(Utc::now())
    }

    /// Generates the next id using `now` as the clock reading.
    pub fn next_at(&mut self, now: DateTime<Utc>) -> TimestampId {
        let now = truncate_to_millis(now);
        let timestamp = match &self.last {
            Some(prev) if now <= prev.timestamp => prev.timestamp + Duration::milliseconds(1),
            _ => now,
        };
        let id = TimestampId::new(timestamp, EventUuid::new());
        self.last = Some(id.clone());
        id
    }

    /// Records an id issued elsewhere (for example one loaded from a snapshot) so that later
    /// ids sort after it.
    pub fn observe(&mut self, id: &TimestampId) {
        let newer = match &self.last {
            Some(last) => id > last,
            None => true,
        };
        if newer {
            self.last = Some(id.clone());
        }
    }

    pub fn last(&self) -> Option<&TimestampId> {
        self.last.as_ref()
    }
}
