//! Placing an unassigned patient into a bed.

use super::log_rejection;
use crate::error::Unavailable;
use crate::events::{AssignmentRecord, AssignmentType, Location, WardEvent};
use crate::patient::PatientStatus;
use crate::room::RoomCondition;
use crate::validation::clean_text;
use crate::{Ward, WardError, WardResult};
use serde::{Deserialize, Serialize};
use ward_types::{BedId, PatientId, RoomId, StaffId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRequest {
    pub patient: PatientId,
    pub room: RoomId,
    pub bed: BedId,
    pub assignment_type: AssignmentType,
    pub actor: StaffId,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Ward {
    /// Puts a patient who holds no bed into `request.bed`.
    ///
    /// The patient becomes `admitted` under the room's department. A discharged patient may be
    /// assigned again; that starts a new admission.
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown patient, room, bed or actor.
    /// - `InvalidInput` if the bed is not in `request.room`.
    /// - `PatientAlreadyAssigned` if the patient already holds a bed.
    /// - `DestinationUnavailable` if the room is under maintenance or being cleaned.
    /// - `BedOccupied` if someone else holds the bed.
    pub fn assign(&mut self, request: AssignmentRequest) -> WardResult<AssignmentRecord> {
        log_rejection("assign", self.try_assign(request))
    }

    fn try_assign(&mut self, request: AssignmentRequest) -> WardResult<AssignmentRecord> {
        let AssignmentRequest {
            patient,
            room,
            bed,
            assignment_type,
            actor,
            notes,
        } = request;

        let dir = self.directory();
        dir.get_staff(&actor)?;
        let current = dir.get_patient(&patient)?;
        let target_room = dir.get_room(&room)?;
        if bed.room() != &room {
            return Err(WardError::InvalidInput(format!(
                "bed {bed} does not belong to room {room}"
            )));
        }
        let target_bed = dir.get_bed(&bed)?;
        if let Some(held) = &current.bed {
            return Err(WardError::PatientAlreadyAssigned {
                patient,
                bed: held.clone(),
            });
        }
        match target_room.condition {
            RoomCondition::Maintenance => {
                return Err(WardError::DestinationUnavailable {
                    room,
                    reason: Unavailable::Maintenance,
                })
            }
            RoomCondition::Cleaning => {
                return Err(WardError::DestinationUnavailable {
                    room,
                    reason: Unavailable::Cleaning,
                })
            }
            RoomCondition::InService => {}
        }
        if let Some(occupant) = target_bed.occupant() {
            return Err(WardError::BedOccupied {
                bed,
                occupant: occupant.clone(),
            });
        }
        let notes = clean_text("notes", notes)?;
        let department = target_room.department.clone();

        let id = self.next_event_id();
        let at = id.timestamp();
        let dir = self.directory_mut();
        dir.move_patient(&patient, Some(&bed))?;
        let record = dir.patient_mut(&patient)?;
        record.status = PatientStatus::Admitted;
        record.department = Some(department.clone());
        record.admitted_at = Some(at);
        record.discharged_at = None;

        let assignment = AssignmentRecord {
            id,
            actor,
            patient,
            assignment_type,
            to: Location { department, bed },
            notes,
        };
        tracing::info!(
            patient = %assignment.patient,
            bed = %assignment.to.bed,
            kind = %assignment.assignment_type,
            "patient assigned"
        );
        self.push_event(WardEvent::Assigned(assignment.clone()));
        Ok(assignment)
    }
}
