//! Registration, demographic edits and room condition flags.

use super::log_rejection;
use crate::events::{PatientUpdated, RegistrationRecord, RoomConditionChange, WardEvent};
use crate::patient::{NewPatient, Patient, PatientStatus, PatientUpdate};
use crate::room::RoomCondition;
use crate::validation::{clean_text, normalise_list, push_unique, validate_email};
use crate::{Ward, WardError, WardResult};
use ward_types::{PatientId, RoomId, StaffId};

const MAX_AGE: u16 = 150;

fn check_age(age: u16) -> WardResult<()> {
    if age > MAX_AGE {
        return Err(WardError::InvalidInput(format!(
            "age must be at most {MAX_AGE}, got {age}"
        )));
    }
    Ok(())
}

fn clean_email(email: Option<String>) -> WardResult<Option<String>> {
    let email = clean_text("email", email)?;
    if let Some(email) = &email {
        validate_email(email)?;
    }
    Ok(email)
}

impl Ward {
    /// Registers a new patient under the next free `P###` id.
    pub fn register_patient(&mut self, new: NewPatient) -> WardResult<Patient> {
        log_rejection("register-patient", self.try_register_patient(new))
    }

    fn try_register_patient(&mut self, new: NewPatient) -> WardResult<Patient> {
        check_age(new.age)?;
        let id = self.directory().next_patient_id()?;
        let patient = Patient {
            id,
            name: new.name,
            age: new.age,
            gender: new.gender,
            phone: clean_text("phone", new.phone)?,
            email: clean_email(new.email)?,
            address: clean_text("address", new.address)?,
            emergency_contact: clean_text("emergency_contact", new.emergency_contact)?,
            blood_group: new.blood_group,
            allergies: normalise_list(new.allergies),
            conditions: normalise_list(new.conditions),
            status: if new.emergency {
                PatientStatus::Emergency
            } else {
                PatientStatus::Outpatient
            },
            department: clean_text("department", new.department)?,
            bed: None,
            attending: None,
            admitted_at: None,
            discharged_at: None,
        };

        let id = self.next_event_id();
        self.directory_mut().add_patient(patient.clone())?;
        tracing::info!(patient = %patient.id, status = %patient.status, "patient registered");
        self.push_event(WardEvent::Registered(RegistrationRecord {
            id,
            patient: patient.id.clone(),
            name: patient.name.clone(),
            status: patient.status,
        }));
        Ok(patient)
    }

    /// Applies an edit-patient form. Records an event only if something changed.
    pub fn update_patient(&mut self, id: &PatientId, update: PatientUpdate) -> WardResult<Patient> {
        log_rejection("update-patient", self.try_update_patient(id, update))
    }

    fn try_update_patient(&mut self, id: &PatientId, update: PatientUpdate) -> WardResult<Patient> {
        let mut patient = self.directory().get_patient(id)?.clone();
        let mut changed: Vec<String> = Vec::new();

        macro_rules! set {
            ($field:ident, $value:expr) => {{
                let value = $value;
                if patient.$field != value {
                    patient.$field = value;
                    changed.push(stringify!($field).to_owned());
                }
            }};
        }

        if let Some(name) = update.name {
            set!(name, name);
        }
        if let Some(age) = update.age {
            check_age(age)?;
            set!(age, age);
        }
        if let Some(gender) = update.gender {
            set!(gender, gender);
        }
        if let Some(blood_group) = update.blood_group {
            set!(blood_group, Some(blood_group));
        }
        // For the contact fields `Some("")` clears the value.
        if update.phone.is_some() {
            set!(phone, clean_text("phone", update.phone)?);
        }
        if update.email.is_some() {
            set!(email, clean_email(update.email)?);
        }
        if update.address.is_some() {
            set!(address, clean_text("address", update.address)?);
        }
        if update.emergency_contact.is_some() {
            set!(emergency_contact, clean_text("emergency_contact", update.emergency_contact)?);
        }

        let mut allergies_changed = false;
        for allergy in &update.remove_allergies {
            let before = patient.allergies.len();
            patient.allergies.retain(|a| a != allergy.trim());
            allergies_changed |= patient.allergies.len() != before;
        }
        for allergy in &update.add_allergies {
            allergies_changed |= push_unique(&mut patient.allergies, allergy);
        }
        if allergies_changed {
            changed.push("allergies".into());
        }

        let mut conditions_changed = false;
        for condition in &update.remove_conditions {
            let before = patient.conditions.len();
            patient.conditions.retain(|c| c != condition.trim());
            conditions_changed |= patient.conditions.len() != before;
        }
        for condition in &update.add_conditions {
            conditions_changed |= push_unique(&mut patient.conditions, condition);
        }
        if conditions_changed {
            changed.push("conditions".into());
        }

        if changed.is_empty() {
            return Ok(patient);
        }

        let event_id = self.next_event_id();
        *self.directory_mut().patient_mut(id)? = patient.clone();
        tracing::info!(patient = %id, fields = ?changed, "patient updated");
        self.push_event(WardEvent::PatientUpdated(PatientUpdated {
            id: event_id,
            patient: id.clone(),
            fields: changed,
        }));
        Ok(patient)
    }

    /// Flags a room as in service, under maintenance, or being cleaned.
    ///
    /// # Errors
    ///
    /// `RoomNotEmpty` when taking an occupied room out of service; `InvalidTransition` when the
    /// room already has that condition.
    pub fn set_room_condition(
        &mut self,
        room: &RoomId,
        condition: RoomCondition,
        actor: &StaffId,
    ) -> WardResult<RoomConditionChange> {
        log_rejection(
            "set-room-condition",
            self.try_set_room_condition(room, condition, actor),
        )
    }

    fn try_set_room_condition(
        &mut self,
        room: &RoomId,
        condition: RoomCondition,
        actor: &StaffId,
    ) -> WardResult<RoomConditionChange> {
        self.directory().get_staff(actor)?;
        let current = self.directory().get_room(room)?;
        let from = current.condition;
        if from == condition {
            return Err(WardError::InvalidTransition(format!(
                "room {room} is already {condition}"
            )));
        }
        if condition != RoomCondition::InService && current.occupant_count() > 0 {
            return Err(WardError::RoomNotEmpty(room.clone()));
        }

        let change = RoomConditionChange {
            id: self.next_event_id(),
            room: room.clone(),
            from,
            to: condition,
            actor: actor.clone(),
        };
        self.directory_mut().room_mut(room)?.condition = condition;
        tracing::info!(room = %room, from = %from, to = %condition, "room condition changed");
        self.push_event(WardEvent::RoomConditionChanged(change.clone()));
        Ok(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::occupancy::RoomStatus;
    use crate::patient::Gender;
    use crate::testing::{fixture_ward, pid, room_id, sample_patient, staff};
    use ward_types::NonEmptyText;

    fn new_patient() -> NewPatient {
        NewPatient {
            name: NonEmptyText::new("Sarah Connor").unwrap(),
            age: 38,
            gender: Gender::Female,
            phone: Some(" +1 555 0100 ".into()),
            email: Some("sarah@example.com".into()),
            address: None,
            emergency_contact: Some("".into()),
            blood_group: None,
            allergies: vec!["Latex".into(), "latex".into(), " Latex".into()],
            conditions: vec![],
            department: Some("Emergency".into()),
            emergency: true,
        }
    }

    #[test]
    fn registration_allocates_next_id() {
        let mut ward = fixture_ward();
        let patient = ward.register_patient(new_patient()).unwrap();

        assert_eq!(patient.id, pid("P100"));
        assert_eq!(patient.status, PatientStatus::Emergency);
        assert_eq!(patient.phone.as_deref(), Some("+1 555 0100"));
        assert_eq!(patient.emergency_contact, None);
        assert_eq!(patient.allergies, vec!["Latex", "latex"]);
        assert!(ward.directory().get_patient(&pid("P100")).is_ok());
        assert_eq!(ward.audit().len(), 1);
    }

    #[test]
    fn registration_rejects_bad_email() {
        let mut ward = fixture_ward();
        let mut new = new_patient();
        new.email = Some("not-an-email".into());
        assert!(matches!(
            ward.register_patient(new),
            Err(WardError::InvalidInput(_))
        ));
        assert!(ward.audit().is_empty());
    }

    #[test]
    fn registration_fails_once_numbers_run_out() {
        let mut ward = fixture_ward();
        ward.directory_mut()
            .add_patient(sample_patient("P4294967295", "Last Number"))
            .unwrap();
        assert!(matches!(
            ward.register_patient(new_patient()),
            Err(WardError::InvalidInput(_))
        ));
        assert!(ward.audit().is_empty());
    }

    #[test]
    fn update_edits_lists_and_clears_contact_fields() {
        let mut ward = fixture_ward();
        let update = PatientUpdate {
            phone: Some("".into()),
            add_allergies: vec!["Iodine".into(), "Penicillin".into()],
            remove_allergies: vec!["Penicillin".into()],
            add_conditions: vec!["Hypertension".into()],
            ..PatientUpdate::default()
        };
        let patient = ward.update_patient(&pid("P001"), update).unwrap();

        assert_eq!(patient.phone, None);
        assert_eq!(patient.allergies, vec!["Iodine", "Penicillin"]);
        assert_eq!(patient.conditions, vec!["Hypertension"]);
        match ward.audit().last() {
            Some(WardEvent::PatientUpdated(u)) => {
                assert_eq!(u.fields, vec!["phone", "allergies", "conditions"]);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn update_without_changes_records_nothing() {
        let mut ward = fixture_ward();
        ward.update_patient(&pid("P001"), PatientUpdate::default()).unwrap();
        assert!(ward.audit().is_empty());
    }

    #[test]
    fn occupied_room_cannot_go_out_of_service() {
        let mut ward = fixture_ward();
        let err = ward
            .set_room_condition(&room_id("A-202"), RoomCondition::Cleaning, &staff("N001"))
            .unwrap_err();
        assert!(matches!(err, WardError::RoomNotEmpty(_)));
    }

    #[test]
    fn condition_drives_room_status() {
        let mut ward = fixture_ward();
        ward.set_room_condition(&room_id("A-201"), RoomCondition::Cleaning, &staff("N001"))
            .unwrap();
        assert_eq!(
            ward.directory().get_room(&room_id("A-201")).unwrap().status(),
            RoomStatus::Cleaning
        );

        ward.set_room_condition(&room_id("ICU-1"), RoomCondition::InService, &staff("N001"))
            .unwrap();
        assert_eq!(
            ward.directory().get_room(&room_id("ICU-1")).unwrap().status(),
            RoomStatus::Available
        );
        assert!(matches!(
            ward.set_room_condition(&room_id("ICU-1"), RoomCondition::InService, &staff("N001")),
            Err(WardError::InvalidTransition(_))
        ));
    }
}
