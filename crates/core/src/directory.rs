//! Directory store.
//!
//! Canonical records for floors, rooms and beds, patients and staff. Lookups by unknown id fail
//! with [`WardError::NotFound`]. Occupancy is held on both sides of the relationship (the bed's
//! occupant and the patient's bed) and every mutation here keeps the two in step.

use crate::error::EntityKind;
use crate::labels::text_enum;
use crate::patient::{Patient, PatientFilter, PatientStatus};
use crate::room::{Bed, Room, RoomCondition};
use crate::{WardError, WardResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ward_types::{BedId, FloorId, NonEmptyText, PatientId, RoomId, StaffId};

text_enum! {
    pub enum StaffRole ("staff role") {
        Doctor => "doctor",
        Nurse => "nurse",
        Admin => "admin",
        Pharmacist => "pharmacist",
        Receptionist => "receptionist",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Floor {
    pub id: FloorId,
    pub name: NonEmptyText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Staff {
    pub id: StaffId,
    pub name: NonEmptyText,
    pub role: StaffRole,
    pub department: String,
}

#[derive(Debug, Clone, Default)]
pub struct Directory {
    hospital_name: String,
    floors: Vec<Floor>,
    rooms: BTreeMap<RoomId, Room>,
    patients: BTreeMap<PatientId, Patient>,
    staff: BTreeMap<StaffId, Staff>,
}

impl Directory {
    pub fn new(hospital_name: impl Into<String>) -> Self {
        Self {
            hospital_name: hospital_name.into(),
            ..Self::default()
        }
    }

    pub fn hospital_name(&self) -> &str {
        &self.hospital_name
    }

    pub(crate) fn set_hospital_name(&mut self, name: impl Into<String>) {
        self.hospital_name = name.into();
    }

    pub fn add_floor(&mut self, floor: Floor) -> WardResult<()> {
        if self.floors.iter().any(|f| f.id == floor.id) {
            return Err(WardError::InvalidInput(format!("duplicate floor id: {}", floor.id)));
        }
        self.floors.push(floor);
        Ok(())
    }

    /// Adds a room. Its floor must already be known and the room must be empty.
    pub fn add_room(&mut self, room: Room) -> WardResult<()> {
        self.get_floor(&room.floor)?;
        if self.rooms.contains_key(&room.id) {
            return Err(WardError::InvalidInput(format!("duplicate room id: {}", room.id)));
        }
        if room.occupant_count() > 0 {
            return Err(WardError::InvalidInput(format!(
                "room {} must be added without occupants",
                room.id
            )));
        }
        self.rooms.insert(room.id.clone(), room);
        Ok(())
    }

    pub fn add_staff(&mut self, member: Staff) -> WardResult<()> {
        if self.staff.contains_key(&member.id) {
            return Err(WardError::InvalidInput(format!("duplicate staff id: {}", member.id)));
        }
        self.staff.insert(member.id.clone(), member);
        Ok(())
    }

    /// Adds a patient record. If the record names a bed, the bed is occupied as part of the
    /// insert, subject to the same rules as an assignment.
    pub fn add_patient(&mut self, patient: Patient) -> WardResult<()> {
        if self.patients.contains_key(&patient.id) {
            return Err(WardError::InvalidInput(format!(
                "duplicate patient id: {}",
                patient.id
            )));
        }
        if let Some(attending) = &patient.attending {
            self.get_staff(attending)?;
        }
        if let Some(problem) = status_bed_mismatch(&patient) {
            return Err(WardError::InvalidInput(problem));
        }
        if let Some(bed_id) = &patient.bed {
            let room = self.get_room(bed_id.room())?;
            if room.condition != RoomCondition::InService {
                return Err(WardError::InvalidInput(format!(
                    "room {} is flagged {} and cannot hold patients",
                    room.id, room.condition
                )));
            }
            let bed = self.get_bed(bed_id)?;
            if let Some(occupant) = bed.occupant() {
                return Err(WardError::BedOccupied {
                    bed: bed_id.clone(),
                    occupant: occupant.clone(),
                });
            }
            self.set_bed_occupant(bed_id, Some(patient.id.clone()))?;
        }
        self.patients.insert(patient.id.clone(), patient);
        Ok(())
    }

    pub fn get_floor(&self, id: &FloorId) -> WardResult<&Floor> {
        self.floors
            .iter()
            .find(|f| &f.id == id)
            .ok_or_else(|| WardError::not_found(EntityKind::Floor, id))
    }

    pub fn get_room(&self, id: &RoomId) -> WardResult<&Room> {
        tracing::debug!(room = %id, "room lookup");
        self.rooms
            .get(id)
            .ok_or_else(|| WardError::not_found(EntityKind::Room, id))
    }

    pub fn get_bed(&self, id: &BedId) -> WardResult<&Bed> {
        self.get_room(id.room())?
            .bed(id)
            .ok_or_else(|| WardError::not_found(EntityKind::Bed, id))
    }

    pub fn get_patient(&self, id: &PatientId) -> WardResult<&Patient> {
        tracing::debug!(patient = %id, "patient lookup");
        self.patients
            .get(id)
            .ok_or_else(|| WardError::not_found(EntityKind::Patient, id))
    }

    pub fn get_staff(&self, id: &StaffId) -> WardResult<&Staff> {
        self.staff
            .get(id)
            .ok_or_else(|| WardError::not_found(EntityKind::Staff, id))
    }

    /// Floors in the order they were added.
    pub fn list_floors(&self) -> &[Floor] {
        &self.floors
    }

    /// Rooms ordered by id, optionally restricted to one floor.
    pub fn list_rooms(&self, floor: Option<&FloorId>) -> Vec<&Room> {
        self.rooms
            .values()
            .filter(|r| floor.map_or(true, |f| &r.floor == f))
            .collect()
    }

    /// Rooms matching the search box: id, type, department or an occupant's name.
    pub fn search_rooms(&self, floor: Option<&FloorId>, needle: &str) -> Vec<&Room> {
        let lowered = needle.trim().to_lowercase();
        self.list_rooms(floor)
            .into_iter()
            .filter(|room| {
                room.matches_search(&lowered)
                    || room.occupants().any(|id| {
                        self.patients
                            .get(id)
                            .is_some_and(|p| p.name.as_str().to_lowercase().contains(&lowered))
                    })
            })
            .collect()
    }

    pub fn list_patients(&self, filter: &PatientFilter) -> Vec<&Patient> {
        self.patients.values().filter(|p| filter.matches(p)).collect()
    }

    /// Staff ordered by id, optionally restricted to one role.
    pub fn list_staff(&self, role: Option<StaffRole>) -> Vec<&Staff> {
        self.staff
            .values()
            .filter(|s| role.map_or(true, |r| s.role == r))
            .collect()
    }

    /// Patients currently holding a bed.
    pub fn active_admissions(&self, search: Option<&str>) -> Vec<&Patient> {
        self.patients
            .values()
            .filter(|p| p.is_admitted())
            .filter(|p| search.map_or(true, |s| p.matches_search(s)))
            .collect()
    }

    /// The next free `P###` identifier: one past the highest numbered patient.
    ///
    /// # Errors
    ///
    /// Returns `WardError::InvalidInput` once the highest number is `u32::MAX`.
    pub fn next_patient_id(&self) -> WardResult<PatientId> {
        let highest = self
            .patients
            .keys()
            .filter_map(PatientId::number)
            .max()
            .unwrap_or(0);
        let next = highest.checked_add(1).ok_or_else(|| {
            WardError::InvalidInput(format!("patient numbers exhausted after P{highest}"))
        })?;
        Ok(PatientId::numbered(next))
    }

    /// Verifies that bed occupants and patient bed references agree, that no room holds more
    /// occupants than beds, and that flagged rooms are empty.
    pub fn check_invariants(&self) -> WardResult<()> {
        for room in self.rooms.values() {
            if room.occupant_count() > room.capacity() {
                return Err(WardError::Dataset(format!(
                    "room {} holds more occupants than beds",
                    room.id
                )));
            }
            if room.condition != RoomCondition::InService && room.occupant_count() > 0 {
                return Err(WardError::Dataset(format!(
                    "room {} is flagged {} but has occupants",
                    room.id, room.condition
                )));
            }
            for bed in room.beds() {
                let Some(occupant) = bed.occupant() else {
                    continue;
                };
                let holds = self
                    .patients
                    .get(occupant)
                    .is_some_and(|p| p.bed.as_ref() == Some(&bed.id));
                if !holds {
                    return Err(WardError::Dataset(format!(
                        "bed {} names {occupant} but the patient record disagrees",
                        bed.id
                    )));
                }
            }
        }
        for patient in self.patients.values() {
            if let Some(problem) = status_bed_mismatch(patient) {
                return Err(WardError::Dataset(problem));
            }
            let Some(bed_id) = &patient.bed else {
                continue;
            };
            let occupant = self.get_bed(bed_id)?.occupant();
            if occupant != Some(&patient.id) {
                return Err(WardError::Dataset(format!(
                    "patient {} references bed {bed_id} which does not list them",
                    patient.id
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn patient_mut(&mut self, id: &PatientId) -> WardResult<&mut Patient> {
        self.patients
            .get_mut(id)
            .ok_or_else(|| WardError::not_found(EntityKind::Patient, id))
    }

    pub(crate) fn room_mut(&mut self, id: &RoomId) -> WardResult<&mut Room> {
        self.rooms
            .get_mut(id)
            .ok_or_else(|| WardError::not_found(EntityKind::Room, id))
    }

    fn set_bed_occupant(&mut self, bed: &BedId, occupant: Option<PatientId>) -> WardResult<()> {
        self.room_mut(bed.room())?
            .bed_mut(bed)
            .ok_or_else(|| WardError::not_found(EntityKind::Bed, bed))?
            .set_occupant(occupant);
        Ok(())
    }

    /// Moves `patient` into `to`, releasing whatever bed they held. Callers have already checked
    /// that `to` is free; both sides of the relationship change together.
    pub(crate) fn move_patient(
        &mut self,
        patient: &PatientId,
        to: Option<&BedId>,
    ) -> WardResult<()> {
        let from = self.get_patient(patient)?.bed.clone();
        if let Some(to) = to {
            self.get_bed(to)?;
        }
        if let Some(from) = &from {
            self.set_bed_occupant(from, None)?;
        }
        if let Some(to) = to {
            self.set_bed_occupant(to, Some(patient.clone()))?;
        }
        self.patient_mut(patient)?.bed = to.cloned();
        Ok(())
    }
}

/// Only admitted and emergency patients may hold a bed, and an admitted patient must hold one.
fn status_bed_mismatch(patient: &Patient) -> Option<String> {
    match (&patient.bed, patient.status) {
        (Some(bed), PatientStatus::Outpatient | PatientStatus::Discharged) => Some(format!(
            "{} patient {} cannot hold bed {bed}",
            patient.status, patient.id
        )),
        (None, PatientStatus::Admitted) => Some(format!(
            "admitted patient {} has no bed",
            patient.id
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{bed, fixture_ward, floor, pid, room_id, sample_patient};

    #[test]
    fn unknown_ids_are_not_found() {
        let ward = fixture_ward();
        let dir = ward.directory();
        assert!(matches!(
            dir.get_patient(&pid("P999")),
            Err(WardError::NotFound { kind: EntityKind::Patient, .. })
        ));
        assert!(matches!(
            dir.get_room(&room_id("Z-1")),
            Err(WardError::NotFound { kind: EntityKind::Room, .. })
        ));
        assert!(matches!(
            dir.get_bed(&bed("A-201-9")),
            Err(WardError::NotFound { kind: EntityKind::Bed, .. })
        ));
    }

    #[test]
    fn rooms_filter_by_floor() {
        let ward = fixture_ward();
        let dir = ward.directory();
        let ground: Vec<_> = dir
            .list_rooms(Some(&floor("ground")))
            .iter()
            .map(|r| r.id.to_string())
            .collect();
        assert_eq!(ground, vec!["REC-1"]);
        assert_eq!(dir.list_rooms(None).len(), 4);
    }

    #[test]
    fn room_search_matches_occupant_name() {
        let ward = fixture_ward();
        let hits: Vec<_> = ward
            .directory()
            .search_rooms(None, "john")
            .iter()
            .map(|r| r.id.to_string())
            .collect();
        assert_eq!(hits, vec!["A-202"]);
    }

    #[test]
    fn active_admissions_only_lists_bed_holders() {
        let ward = fixture_ward();
        let ids: Vec<_> = ward
            .directory()
            .active_admissions(None)
            .iter()
            .map(|p| p.id.to_string())
            .collect();
        assert_eq!(ids, vec!["P001"]);
    }

    #[test]
    fn next_patient_id_follows_highest_number() {
        let ward = fixture_ward();
        assert_eq!(ward.directory().next_patient_id().unwrap(), pid("P100"));
    }

    #[test]
    fn next_patient_id_fails_at_the_last_number() {
        let mut ward = fixture_ward();
        let dir = ward.directory_mut();
        dir.add_patient(sample_patient("P4294967295", "Last Number")).unwrap();
        let err = dir.next_patient_id().unwrap_err();
        assert!(matches!(err, WardError::InvalidInput(ref msg) if msg.contains("exhausted")));
    }

    #[test]
    fn add_patient_rejects_bed_for_outpatient() {
        let mut ward = fixture_ward();
        let mut p = sample_patient("P050", "Ann Lee");
        p.bed = Some(bed("A-201-1"));
        let err = ward.directory_mut().add_patient(p).unwrap_err();
        assert!(matches!(err, WardError::InvalidInput(ref msg) if msg.contains("outpatient")));
        assert!(ward.directory().get_bed(&bed("A-201-1")).unwrap().is_free());
    }

    #[test]
    fn add_patient_rejects_admitted_without_bed() {
        let mut ward = fixture_ward();
        let mut p = sample_patient("P050", "Ann Lee");
        p.status = PatientStatus::Admitted;
        let err = ward.directory_mut().add_patient(p).unwrap_err();
        assert!(matches!(err, WardError::InvalidInput(ref msg) if msg.contains("no bed")));
    }

    #[test]
    fn add_patient_allows_emergency_with_or_without_bed() {
        let mut ward = fixture_ward();
        let dir = ward.directory_mut();
        let mut walk_in = sample_patient("P050", "Ann Lee");
        walk_in.status = PatientStatus::Emergency;
        dir.add_patient(walk_in).unwrap();

        let mut bedded = sample_patient("P051", "Tom Reed");
        bedded.status = PatientStatus::Emergency;
        bedded.bed = Some(bed("A-201-1"));
        dir.add_patient(bedded).unwrap();
        dir.check_invariants().unwrap();
    }

    #[test]
    fn add_patient_with_bed_occupies_it() {
        let mut ward = fixture_ward();
        let dir = ward.directory_mut();
        let mut p = sample_patient("P050", "Ann Lee");
        p.status = PatientStatus::Admitted;
        p.bed = Some(bed("A-202-2"));
        dir.add_patient(p).unwrap();

        assert_eq!(dir.get_bed(&bed("A-202-2")).unwrap().occupant(), Some(&pid("P050")));
        dir.check_invariants().unwrap();
    }

    #[test]
    fn add_patient_rejects_taken_bed() {
        let mut ward = fixture_ward();
        let mut p = sample_patient("P050", "Ann Lee");
        p.status = PatientStatus::Admitted;
        p.bed = Some(bed("A-202-1"));
        let err = ward.directory_mut().add_patient(p).unwrap_err();
        assert!(matches!(err, WardError::BedOccupied { .. }));
    }

    #[test]
    fn add_patient_rejects_flagged_room() {
        let mut ward = fixture_ward();
        let mut p = sample_patient("P050", "Ann Lee");
        p.status = PatientStatus::Admitted;
        p.bed = Some(bed("ICU-1-1"));
        assert!(ward.directory_mut().add_patient(p).is_err());
    }

    #[test]
    fn move_patient_keeps_both_sides_in_step() {
        let mut ward = fixture_ward();
        let dir = ward.directory_mut();
        dir.move_patient(&pid("P001"), Some(&bed("A-201-1"))).unwrap();

        assert!(dir.get_bed(&bed("A-202-1")).unwrap().is_free());
        assert_eq!(dir.get_bed(&bed("A-201-1")).unwrap().occupant(), Some(&pid("P001")));
        assert_eq!(dir.get_patient(&pid("P001")).unwrap().bed, Some(bed("A-201-1")));
        dir.check_invariants().unwrap();

        dir.move_patient(&pid("P001"), None).unwrap();
        assert!(dir.get_bed(&bed("A-201-1")).unwrap().is_free());
        assert_eq!(dir.get_patient(&pid("P001")).unwrap().bed, None);
    }

    #[test]
    fn staff_filter_by_role() {
        let ward = fixture_ward();
        let doctors = ward.directory().list_staff(Some(StaffRole::Doctor));
        assert_eq!(doctors.len(), 1);
        assert_eq!(doctors[0].id.as_str(), "D001");
    }
}
