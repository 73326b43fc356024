//! Identifiers for ward events.
//!
//! Audit records (assignments, transfers, discharges) and vitals observations are keyed by a
//! [`TimestampId`]: a millisecond UTC timestamp followed by a canonical UUID.
//!
//! ## Canonical UUID form
//! - Length: 32
//! - Characters: `0-9` and `a-f` only
//! - Example: `550e8400e29b41d4a716446655440000`
//!
//! ## Timestamp id form
//! `YYYYMMDDTHHMMSS.mmmZ-<canonical uuid>`, for example
//! `20240115T103000.000Z-550e8400e29b41d4a716446655440000`.
//!
//! Ids handed out by one [`TimestampIdGenerator`] are strictly increasing, so sorting by id is
//! the same as sorting by the order in which events were recorded, even when the wall clock
//! stalls or steps backwards.

mod service;

pub use service::{EventUuid, TimestampId, TimestampIdGenerator, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
