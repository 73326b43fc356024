//! Shared fixtures for unit tests.
//!
//! The fixture ward has two floors and four rooms:
//!
//! | room  | floor  | beds | state                          |
//! |-------|--------|------|--------------------------------|
//! | REC-1 | ground | 0    | reception                      |
//! | A-201 | first  | 1    | empty                          |
//! | A-202 | first  | 2    | P001 in bed 1                  |
//! | ICU-1 | first  | 1    | under maintenance              |
//!
//! Patients: P001 admitted, P002 discharged, P003 and P099 outpatients.
//! Staff: D001 (doctor), N001 (nurse).

use crate::directory::{Directory, Floor, Staff, StaffRole};
use crate::events::{
    AssignmentType, DischargeDestination, DischargeType, TransferReason, TransferType, Urgency,
};
use crate::operations::assignment::AssignmentRequest;
use crate::operations::discharge::{CompletedChecklist, DischargeRequest};
use crate::operations::transfer::TransferRequest;
use crate::patient::{Gender, Patient, PatientStatus};
use crate::room::{Room, RoomCondition, RoomType};
use crate::Ward;
use ward_types::{BedId, FloorId, NonEmptyText, PatientId, RoomId, StaffId};

pub(crate) fn pid(id: &str) -> PatientId {
    PatientId::parse(id).unwrap()
}

pub(crate) fn room_id(id: &str) -> RoomId {
    RoomId::parse(id).unwrap()
}

pub(crate) fn bed(id: &str) -> BedId {
    BedId::parse(id).unwrap()
}

pub(crate) fn floor(id: &str) -> FloorId {
    FloorId::parse(id).unwrap()
}

pub(crate) fn staff(id: &str) -> StaffId {
    StaffId::parse(id).unwrap()
}

pub(crate) fn sample_patient(id: &str, name: &str) -> Patient {
    Patient {
        id: pid(id),
        name: NonEmptyText::new(name).unwrap(),
        age: 40,
        gender: Gender::Other,
        phone: Some("555-0101".into()),
        email: None,
        address: None,
        emergency_contact: None,
        blood_group: None,
        allergies: vec![],
        conditions: vec![],
        status: PatientStatus::Outpatient,
        department: None,
        bed: None,
        attending: None,
        admitted_at: None,
        discharged_at: None,
    }
}

fn room(id: &str, kind: RoomType, department: &str, on: &str, capacity: u16) -> Room {
    Room::new(room_id(id), kind, department, floor(on), capacity).unwrap()
}

pub(crate) fn fixture_ward() -> Ward {
    let mut dir = Directory::new("Test Hospital");
    for (id, name) in [("ground", "Ground Floor"), ("first", "First Floor")] {
        dir.add_floor(Floor {
            id: floor(id),
            name: NonEmptyText::new(name).unwrap(),
            description: None,
        })
        .unwrap();
    }
    dir.add_room(room("REC-1", RoomType::Reception, "Front Desk", "ground", 0))
        .unwrap();
    dir.add_room(room("A-201", RoomType::Private, "General Medicine", "first", 1))
        .unwrap();
    dir.add_room(room("A-202", RoomType::SemiPrivate, "Cardiology", "first", 2))
        .unwrap();
    dir.add_room(
        room("ICU-1", RoomType::Icu, "Intensive Care", "first", 1)
            .with_condition(RoomCondition::Maintenance),
    )
    .unwrap();

    for (id, name, role, department) in [
        ("D001", "Dr. Sarah Wilson", StaffRole::Doctor, "Cardiology"),
        ("N001", "Nurse Emily Brown", StaffRole::Nurse, "General Medicine"),
    ] {
        dir.add_staff(Staff {
            id: staff(id),
            name: NonEmptyText::new(name).unwrap(),
            role,
            department: department.into(),
        })
        .unwrap();
    }

    let mut admitted = sample_patient("P001", "John Doe");
    admitted.status = PatientStatus::Admitted;
    admitted.department = Some("Cardiology".into());
    admitted.bed = Some(bed("A-202-1"));
    admitted.attending = Some(staff("D001"));
    dir.add_patient(admitted).unwrap();

    let mut discharged = sample_patient("P002", "Mary Major");
    discharged.status = PatientStatus::Discharged;
    dir.add_patient(discharged).unwrap();

    dir.add_patient(sample_patient("P003", "Robert Brown")).unwrap();
    dir.add_patient(sample_patient("P099", "Jane Smith")).unwrap();

    Ward::new(dir)
}

pub(crate) fn assign_request(patient: &str, to: &str) -> AssignmentRequest {
    let bed = bed(to);
    AssignmentRequest {
        patient: pid(patient),
        room: bed.room().clone(),
        bed,
        assignment_type: AssignmentType::Admission,
        actor: staff("N001"),
        notes: None,
    }
}

pub(crate) fn transfer_request(patient: &str, to_room: &str) -> TransferRequest {
    TransferRequest {
        patient: pid(patient),
        department: None,
        room: room_id(to_room),
        bed: None,
        reason: TransferReason::BedAvailability,
        transfer_type: TransferType::Internal,
        urgency: Urgency::Routine,
        requested_by: staff("D001"),
        approved_by: None,
        notes: None,
    }
}

pub(crate) fn discharge_request(patient: &str, checklist: CompletedChecklist) -> DischargeRequest {
    DischargeRequest {
        patient: pid(patient),
        discharge_type: DischargeType::Routine,
        destination: DischargeDestination::Home,
        physician: staff("D001"),
        final_diagnosis: NonEmptyText::new("Community-acquired pneumonia").unwrap(),
        medications: vec!["Amoxicillin 500mg".into()],
        follow_up_instructions: None,
        follow_up_appointment: None,
        transport: None,
        notes: None,
        checklist,
    }
}
