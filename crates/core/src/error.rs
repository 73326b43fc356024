use crate::labels::text_enum;
use crate::operations::discharge::ChecklistItem;
use crate::operations::vitals::VitalsFlag;
use ward_types::{BedId, PatientId, RoomId};

text_enum! {
    /// The kind of record a failed lookup was looking for.
    pub enum EntityKind ("entity kind") {
        Patient => "patient",
        Room => "room",
        Bed => "bed",
        Staff => "staff",
        Floor => "floor",
        Transfer => "transfer",
    }
}

text_enum! {
    /// Why a destination room or bed cannot take a patient.
    pub enum Unavailable ("unavailability reason") {
        Maintenance => "under-maintenance",
        Cleaning => "being-cleaned",
        NoBeds => "no-beds",
        Full => "full",
        BedOccupied => "bed-occupied",
        SameAsSource => "same-as-source",
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WardError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },
    #[error("bed {bed} is already occupied by {occupant}")]
    BedOccupied { bed: BedId, occupant: PatientId },
    #[error("patient {patient} already occupies bed {bed}; use a transfer instead")]
    PatientAlreadyAssigned { patient: PatientId, bed: BedId },
    #[error("patient {0} does not occupy a bed")]
    PatientNotAssigned(PatientId),
    #[error("destination {room} is unavailable: {reason}")]
    DestinationUnavailable { room: RoomId, reason: Unavailable },
    #[error("discharge checklist incomplete, missing: {}", join(.missing))]
    ChecklistIncomplete { missing: Vec<ChecklistItem> },
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
    #[error("room {0} still has occupants")]
    RoomNotEmpty(RoomId),
    #[error("vital signs outside reference range: {}", join(.0))]
    VitalsOutOfRange(Vec<VitalsFlag>),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid dataset: {0}")]
    Dataset(String),
    #[error("failed to read ward file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write ward file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("ward state lock poisoned")]
    LockPoisoned,
}

pub type WardResult<T> = std::result::Result<T, WardError>;

impl WardError {
    pub(crate) fn not_found(kind: EntityKind, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<ward_types::IdError> for WardError {
    fn from(err: ward_types::IdError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<ward_types::TextError> for WardError {
    fn from(err: ward_types::TextError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<ward_uuid::UuidError> for WardError {
    fn from(err: ward_uuid::UuidError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}
