//! # Ward Core
//!
//! Core business logic for hospital room and bed occupancy.
//!
//! This crate holds the ward model and the operations that move patients through it:
//! - Directory store of floors, rooms and beds, patients and staff
//! - Occupancy ledger: derived room status and census figures
//! - Assignment, transfer (with confirmation), discharge (checklist gated) and vitals recording
//! - Append-only audit trail, keyed by time-ordered event ids
//! - YAML dataset loading and snapshotting
//!
//! **No API concerns**: HTTP servers and command-line handling belong in `api-rest`, `ward-run`
//! and `ward-cli`.

mod labels;

pub mod config;
pub mod constants;
pub mod dataset;
pub mod directory;
pub mod error;
pub mod events;
pub mod occupancy;
pub mod operations;
pub mod patient;
pub mod room;
pub mod shared;
pub mod validation;
pub mod ward;

#[cfg(test)]
mod testing;

pub use config::CoreConfig;
pub use directory::{Directory, Floor, Staff, StaffRole};
pub use error::{EntityKind, Unavailable, WardError, WardResult};
pub use events::WardEvent;
pub use occupancy::{Census, RoomStatus, RoomSummary};
pub use patient::{Patient, PatientFilter, PatientStatus};
pub use room::{Bed, Room, RoomCondition, RoomType};
pub use shared::SharedWard;
pub use ward::{Command, Ward};

pub use ward_types::{BedId, FloorId, NonEmptyText, PatientId, RoomId, StaffId};
pub use ward_uuid::TimestampId;
