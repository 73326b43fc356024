//! Audit trail records.
//!
//! Every successful mutation of a [`Ward`](crate::Ward) appends exactly one [`WardEvent`]. Records
//! are immutable once appended. Each carries a [`TimestampId`], which is both its identifier and
//! its time of occurrence.

use crate::labels::text_enum;
use crate::operations::discharge::CompletedChecklist;
use crate::operations::vitals::VitalsObservation;
use crate::patient::PatientStatus;
use crate::room::RoomCondition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ward_types::{BedId, NonEmptyText, PatientId, RoomId, StaffId};
use ward_uuid::TimestampId;

/// A place a patient can be: a bed, and the department it was recorded under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub department: String,
    pub bed: BedId,
}

impl Location {
    pub fn room(&self) -> &RoomId {
        self.bed.room()
    }
}

text_enum! {
    pub enum AssignmentType ("assignment type") {
        Admission => "admission",
        Transfer => "transfer",
        Readmission => "readmission",
    }
}

text_enum! {
    pub enum TransferReason ("transfer reason") {
        SpecializedCare => "specialized-care",
        StepDown => "step-down",
        Isolation => "isolation",
        BedAvailability => "bed-availability",
        PatientRequest => "patient-request",
        MedicalNecessity => "medical-necessity",
        DischargePlanning => "discharge-planning",
        Other => "other",
    }
}

text_enum! {
    pub enum TransferType ("transfer type") {
        Internal => "internal",
        External => "external",
    }
}

text_enum! {
    pub enum Urgency ("urgency") {
        Routine => "routine",
        Urgent => "urgent",
        Emergency => "emergency",
    }
}

text_enum! {
    pub enum TransferStatus ("transfer status") {
        Pending => "pending",
        Completed => "completed",
    }
}

text_enum! {
    pub enum DischargeType ("discharge type") {
        Routine => "routine",
        /// Against medical advice.
        Ama => "ama",
        TransferOut => "transfer-out",
        Expired => "expired",
        Eloped => "eloped",
    }
}

text_enum! {
    pub enum DischargeDestination ("discharge destination") {
        Home => "home",
        HomeHealth => "home-health",
        SkilledNursing => "skilled-nursing",
        Rehabilitation => "rehabilitation",
        AnotherHospital => "another-hospital",
        Hospice => "hospice",
    }
}

text_enum! {
    pub enum TransportType ("transport type") {
        Wheelchair => "wheelchair",
        Ambulance => "ambulance",
        MedicalTransport => "medical-transport",
        FamilyPickup => "family-pickup",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub id: TimestampId,
    pub patient: PatientId,
    pub name: NonEmptyText,
    pub status: PatientStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientUpdated {
    pub id: TimestampId,
    pub patient: PatientId,
    /// Names of the fields that changed.
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub id: TimestampId,
    pub actor: StaffId,
    pub patient: PatientId,
    pub assignment_type: AssignmentType,
    pub to: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub id: TimestampId,
    pub patient: PatientId,
    pub from: Location,
    pub to: Location,
    pub reason: TransferReason,
    pub transfer_type: TransferType,
    pub urgency: Urgency,
    pub requested_by: StaffId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<StaffId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Confirmation that a pending transfer has been carried out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferCompletion {
    pub id: TimestampId,
    pub transfer: TimestampId,
    pub actor: StaffId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DischargeRecord {
    pub id: TimestampId,
    pub patient: PatientId,
    /// The bed released, if the patient held one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Location>,
    pub discharge_type: DischargeType,
    pub destination: DischargeDestination,
    pub physician: StaffId,
    pub final_diagnosis: NonEmptyText,
    #[serde(default)]
    pub medications: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_appointment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<TransportType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub checklist: CompletedChecklist,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomConditionChange {
    pub id: TimestampId,
    pub room: RoomId,
    pub from: RoomCondition,
    pub to: RoomCondition,
    pub actor: StaffId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum WardEvent {
    Registered(RegistrationRecord),
    PatientUpdated(PatientUpdated),
    Assigned(AssignmentRecord),
    Transferred(TransferRecord),
    TransferCompleted(TransferCompletion),
    Discharged(DischargeRecord),
    RoomConditionChanged(RoomConditionChange),
    VitalsRecorded(VitalsObservation),
}

impl WardEvent {
    pub fn id(&self) -> &TimestampId {
        match self {
            WardEvent::Registered(r) => &r.id,
            WardEvent::PatientUpdated(r) => &r.id,
            WardEvent::Assigned(r) => &r.id,
            WardEvent::Transferred(r) => &r.id,
            WardEvent::TransferCompleted(r) => &r.id,
            WardEvent::Discharged(r) => &r.id,
            WardEvent::RoomConditionChanged(r) => &r.id,
            WardEvent::VitalsRecorded(r) => &r.id,
        }
    }

    pub fn at(&self) -> DateTime<Utc> {
        self.id().timestamp()
    }

    /// The patient the event concerns, if any.
    pub fn patient(&self) -> Option<&PatientId> {
        match self {
            WardEvent::Registered(r) => Some(&r.patient),
            WardEvent::PatientUpdated(r) => Some(&r.patient),
            WardEvent::Assigned(r) => Some(&r.patient),
            WardEvent::Transferred(r) => Some(&r.patient),
            WardEvent::Discharged(r) => Some(&r.patient),
            WardEvent::VitalsRecorded(r) => Some(&r.patient),
            WardEvent::TransferCompleted(_) | WardEvent::RoomConditionChanged(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            WardEvent::Registered(_) => "registered",
            WardEvent::PatientUpdated(_) => "patient-updated",
            WardEvent::Assigned(_) => "assigned",
            WardEvent::Transferred(_) => "transferred",
            WardEvent::TransferCompleted(_) => "transfer-completed",
            WardEvent::Discharged(_) => "discharged",
            WardEvent::RoomConditionChanged(_) => "room-condition-changed",
            WardEvent::VitalsRecorded(_) => "vitals-recorded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{bed, pid, staff};
    use ward_uuid::TimestampIdGenerator;

    #[test]
    fn events_serialise_with_kind_tag() {
        let mut ids = TimestampIdGenerator::new();
        let event = WardEvent::Assigned(AssignmentRecord {
            id: ids.next_id(),
            actor: staff("N001"),
            patient: pid("P099"),
            assignment_type: AssignmentType::Admission,
            to: Location {
                department: "General Medicine".into(),
                bed: bed("A-201-1"),
            },
            notes: None,
        });

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "assigned");
        assert_eq!(json["assignment_type"], "admission");
        assert_eq!(json["to"]["bed"], "A-201-1");
        assert!(json.get("notes").is_none());

        let back: WardEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.kind(), "assigned");
        assert_eq!(back.patient(), Some(&pid("P099")));
    }

    #[test]
    fn location_exposes_room() {
        let loc = Location {
            department: "ICU".into(),
            bed: bed("ICU-2-1"),
        };
        assert_eq!(loc.room().as_str(), "ICU-2");
    }

    #[test]
    fn discharge_type_accepts_uppercase_ama() {
        assert_eq!("AMA".parse::<DischargeType>().unwrap(), DischargeType::Ama);
    }
}
