//! Discharge and its completion checklist.
//!
//! A discharge can only be requested with a [`CompletedChecklist`], and the only way to obtain
//! one is [`DischargeChecklist::complete`]. An incomplete checklist therefore never reaches the
//! operation.

use super::log_rejection;
use crate::directory::StaffRole;
use crate::events::{
    DischargeDestination, DischargeRecord, DischargeType, Location, TransportType, WardEvent,
};
use crate::labels::text_enum;
use crate::patient::PatientStatus;
use crate::validation::{clean_text, normalise_list};
use crate::{Ward, WardError, WardResult};
use serde::{Deserialize, Serialize};
use ward_types::{NonEmptyText, PatientId, StaffId};

text_enum! {
    /// A checklist item that must be ticked before discharge.
    pub enum ChecklistItem ("checklist item") {
        PatientEducation => "patient-education",
        MedicationReconciliation => "medication-reconciliation",
        SummaryProvided => "summary-provided",
    }
}

/// The discharge checklist as ticked on the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DischargeChecklist {
    pub patient_education: bool,
    pub medication_reconciliation: bool,
    pub summary_provided: bool,
    /// Informational only.
    pub follow_up_scheduled: bool,
}

impl DischargeChecklist {
    pub fn all_required() -> Self {
        Self {
            patient_education: true,
            medication_reconciliation: true,
            summary_provided: true,
            follow_up_scheduled: false,
        }
    }

    /// Required items that are not ticked, in form order.
    pub fn missing(&self) -> Vec<ChecklistItem> {
        let mut missing = Vec::new();
        if !self.patient_education {
            missing.push(ChecklistItem::PatientEducation);
        }
        if !self.medication_reconciliation {
            missing.push(ChecklistItem::MedicationReconciliation);
        }
        if !self.summary_provided {
            missing.push(ChecklistItem::SummaryProvided);
        }
        missing
    }

    /// # Errors
    ///
    /// `ChecklistIncomplete` naming every unticked required item.
    pub fn complete(self) -> WardResult<CompletedChecklist> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(WardError::ChecklistIncomplete { missing });
        }
        Ok(CompletedChecklist(self))
    }
}

/// A checklist with every required item ticked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DischargeChecklist", into = "DischargeChecklist")]
pub struct CompletedChecklist(DischargeChecklist);

impl CompletedChecklist {
    pub fn follow_up_scheduled(&self) -> bool {
        self.0.follow_up_scheduled
    }
}

impl TryFrom<DischargeChecklist> for CompletedChecklist {
    type Error = WardError;

    fn try_from(checklist: DischargeChecklist) -> Result<Self, Self::Error> {
        checklist.complete()
    }
}

impl From<CompletedChecklist> for DischargeChecklist {
    fn from(checklist: CompletedChecklist) -> Self {
        checklist.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DischargeRequest {
    pub patient: PatientId,
    pub discharge_type: DischargeType,
    pub destination: DischargeDestination,
    pub physician: StaffId,
    pub final_diagnosis: NonEmptyText,
    #[serde(default)]
    pub medications: Vec<String>,
    #[serde(default)]
    pub follow_up_instructions: Option<String>,
    #[serde(default)]
    pub follow_up_appointment: Option<String>,
    #[serde(default)]
    pub transport: Option<TransportType>,
    #[serde(default)]
    pub notes: Option<String>,
    pub checklist: CompletedChecklist,
}

impl Ward {
    /// Ends a patient's admission: releases their bed (if any) and marks them discharged.
    ///
    /// The record stays in the directory; the patient drops out of
    /// [`Directory::active_admissions`](crate::Directory::active_admissions).
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown patient or physician.
    /// - `InvalidInput` if the physician is not a doctor.
    /// - `InvalidTransition` unless the patient is `admitted` or `emergency`.
    pub fn discharge(&mut self, request: DischargeRequest) -> WardResult<DischargeRecord> {
        log_rejection("discharge", self.try_discharge(request))
    }

    fn try_discharge(&mut self, request: DischargeRequest) -> WardResult<DischargeRecord> {
        let DischargeRequest {
            patient,
            discharge_type,
            destination,
            physician,
            final_diagnosis,
            medications,
            follow_up_instructions,
            follow_up_appointment,
            transport,
            notes,
            checklist,
        } = request;

        let dir = self.directory();
        let doctor = dir.get_staff(&physician)?;
        if doctor.role != StaffRole::Doctor {
            return Err(WardError::InvalidInput(format!(
                "{physician} is a {}, not a doctor",
                doctor.role
            )));
        }
        let current = dir.get_patient(&patient)?;
        if !matches!(current.status, PatientStatus::Admitted | PatientStatus::Emergency) {
            return Err(WardError::InvalidTransition(format!(
                "patient {patient} is {} and cannot be discharged",
                current.status
            )));
        }
        let from = match &current.bed {
            Some(bed) => Some(Location {
                department: match &current.department {
                    Some(d) => d.clone(),
                    None => dir.get_room(bed.room())?.department.clone(),
                },
                bed: bed.clone(),
            }),
            None => None,
        };
        let follow_up_instructions = clean_text("follow_up_instructions", follow_up_instructions)?;
        let follow_up_appointment = clean_text("follow_up_appointment", follow_up_appointment)?;
        let notes = clean_text("notes", notes)?;

        let id = self.next_event_id();
        let at = id.timestamp();
        let dir = self.directory_mut();
        dir.move_patient(&patient, None)?;
        let record = dir.patient_mut(&patient)?;
        record.status = PatientStatus::Discharged;
        record.discharged_at = Some(at);

        let discharge = DischargeRecord {
            id,
            patient,
            from,
            discharge_type,
            destination,
            physician,
            final_diagnosis,
            medications: normalise_list(medications),
            follow_up_instructions,
            follow_up_appointment,
            transport,
            notes,
            checklist,
        };
        tracing::info!(
            patient = %discharge.patient,
            kind = %discharge.discharge_type,
            destination = %discharge.destination,
            "patient discharged"
        );
        self.push_event(WardEvent::Discharged(discharge.clone()));
        Ok(discharge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assign_request, bed, discharge_request, fixture_ward, pid, staff};

    #[test]
    fn checklist_reports_missing_items() {
        let checklist = DischargeChecklist {
            patient_education: true,
            ..DischargeChecklist::default()
        };
        let err = checklist.complete().unwrap_err();
        assert!(matches!(
            err,
            WardError::ChecklistIncomplete { ref missing } if missing == &[
                ChecklistItem::MedicationReconciliation,
                ChecklistItem::SummaryProvided,
            ]
        ));
    }

    #[test]
    fn follow_up_is_not_required() {
        let checklist = DischargeChecklist::all_required().complete().unwrap();
        assert!(!checklist.follow_up_scheduled());
    }

    #[test]
    fn incomplete_checklist_does_not_deserialize() {
        let json = serde_json::json!({
            "patient_education": true,
            "medication_reconciliation": false,
            "summary_provided": true,
        });
        let err = serde_json::from_value::<CompletedChecklist>(json).unwrap_err();
        assert!(err.to_string().contains("medication-reconciliation"));

        let json = serde_json::json!({
            "patient_education": true,
            "medication_reconciliation": true,
            "summary_provided": true,
        });
        assert!(serde_json::from_value::<CompletedChecklist>(json).is_ok());
    }

    #[test]
    fn discharge_blocked_until_checklist_complete_then_leaves_admissions() {
        let mut ward = fixture_ward();
        ward.assign(assign_request("P099", "A-201-1")).unwrap();

        let ticked = DischargeChecklist {
            patient_education: true,
            summary_provided: true,
            ..DischargeChecklist::default()
        };
        assert!(matches!(
            ticked.complete(),
            Err(WardError::ChecklistIncomplete { .. })
        ));
        assert!(ward
            .directory()
            .active_admissions(None)
            .iter()
            .any(|p| p.id == pid("P099")));

        let checklist = DischargeChecklist {
            medication_reconciliation: true,
            ..ticked
        }
        .complete()
        .unwrap();
        let record = ward.discharge(discharge_request("P099", checklist)).unwrap();

        assert_eq!(record.from.map(|l| l.bed), Some(bed("A-201-1")));
        let dir = ward.directory();
        assert!(!dir.active_admissions(None).iter().any(|p| p.id == pid("P099")));
        let patient = dir.get_patient(&pid("P099")).unwrap();
        assert_eq!(patient.status, PatientStatus::Discharged);
        assert!(patient.discharged_at.is_some());
        assert!(dir.get_bed(&bed("A-201-1")).unwrap().is_free());
    }

    #[test]
    fn discharging_twice_is_an_invalid_transition() {
        let mut ward = fixture_ward();
        let checklist = DischargeChecklist::all_required().complete().unwrap();
        ward.discharge(discharge_request("P001", checklist)).unwrap();
        let err = ward.discharge(discharge_request("P001", checklist)).unwrap_err();
        assert!(matches!(err, WardError::InvalidTransition(_)));
    }

    #[test]
    fn physician_must_be_a_doctor() {
        let mut ward = fixture_ward();
        let checklist = DischargeChecklist::all_required().complete().unwrap();
        let mut request = discharge_request("P001", checklist);
        request.physician = staff("N001");
        assert!(matches!(ward.discharge(request), Err(WardError::InvalidInput(_))));
        assert_eq!(
            ward.directory().get_patient(&pid("P001")).unwrap().bed,
            Some(bed("A-202-1"))
        );
    }
}
