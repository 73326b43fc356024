//! Moving an assigned patient to another bed, and confirming the move.

use super::log_rejection;
use crate::error::{EntityKind, Unavailable};
use crate::events::{
    Location, TransferCompletion, TransferReason, TransferRecord, TransferStatus, TransferType,
    Urgency, WardEvent,
};
use crate::room::RoomCondition;
use crate::validation::clean_text;
use crate::{Ward, WardError, WardResult};
use serde::{Deserialize, Serialize};
use ward_types::{BedId, PatientId, RoomId, StaffId};
use ward_uuid::TimestampId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub patient: PatientId,
    /// Department to record the patient under; the destination room's department if omitted.
    #[serde(default)]
    pub department: Option<String>,
    pub room: RoomId,
    /// A specific bed, or the room's lowest-numbered free bed if omitted.
    #[serde(default)]
    pub bed: Option<BedId>,
    pub reason: TransferReason,
    pub transfer_type: TransferType,
    pub urgency: Urgency,
    pub requested_by: StaffId,
    #[serde(default)]
    pub approved_by: Option<StaffId>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Ward {
    /// Moves a patient from their current bed to a bed in `request.room`.
    ///
    /// Source release and destination occupancy happen in one step. The new record starts
    /// `pending` until [`Ward::complete_transfer`] confirms it.
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown patient, room, bed or staff member.
    /// - `PatientNotAssigned` if the patient holds no bed.
    /// - `InvalidInput` if the bed is not in `request.room`.
    /// - `DestinationUnavailable` if the room is flagged, has no free bed, the chosen bed is
    ///   taken, or the destination is the patient's current bed.
    pub fn transfer(&mut self, request: TransferRequest) -> WardResult<TransferRecord> {
        log_rejection("transfer", self.try_transfer(request))
    }

    fn try_transfer(&mut self, request: TransferRequest) -> WardResult<TransferRecord> {
        let TransferRequest {
            patient,
            department,
            room,
            bed,
            reason,
            transfer_type,
            urgency,
            requested_by,
            approved_by,
            notes,
        } = request;

        let dir = self.directory();
        dir.get_staff(&requested_by)?;
        if let Some(approver) = &approved_by {
            dir.get_staff(approver)?;
        }
        let current = dir.get_patient(&patient)?;
        let source_bed = current
            .bed
            .clone()
            .ok_or_else(|| WardError::PatientNotAssigned(patient.clone()))?;
        let source_department = match &current.department {
            Some(d) => d.clone(),
            None => dir.get_room(source_bed.room())?.department.clone(),
        };
        let target_room = dir.get_room(&room)?;

        let unavailable = |reason| WardError::DestinationUnavailable {
            room: room.clone(),
            reason,
        };
        match target_room.condition {
            RoomCondition::Maintenance => return Err(unavailable(Unavailable::Maintenance)),
            RoomCondition::Cleaning => return Err(unavailable(Unavailable::Cleaning)),
            RoomCondition::InService => {}
        }
        if target_room.capacity() == 0 {
            return Err(unavailable(Unavailable::NoBeds));
        }
        let target_bed = match bed {
            Some(bed) => {
                if bed.room() != &room {
                    return Err(WardError::InvalidInput(format!(
                        "bed {bed} does not belong to room {room}"
                    )));
                }
                let chosen = dir.get_bed(&bed)?;
                if bed == source_bed {
                    return Err(unavailable(Unavailable::SameAsSource));
                }
                if chosen.occupant().is_some() {
                    return Err(unavailable(Unavailable::BedOccupied));
                }
                bed
            }
            None => target_room
                .first_free_bed()
                .map(|b| b.id.clone())
                .ok_or_else(|| unavailable(Unavailable::Full))?,
        };
        let department = match clean_text("department", department)? {
            Some(d) => d,
            None => target_room.department.clone(),
        };
        let notes = clean_text("notes", notes)?;

        let id = self.next_event_id();
        let dir = self.directory_mut();
        dir.move_patient(&patient, Some(&target_bed))?;
        dir.patient_mut(&patient)?.department = Some(department.clone());

        let record = TransferRecord {
            id,
            patient,
            from: Location {
                department: source_department,
                bed: source_bed,
            },
            to: Location {
                department,
                bed: target_bed,
            },
            reason,
            transfer_type,
            urgency,
            requested_by,
            approved_by,
            notes,
        };
        tracing::info!(
            patient = %record.patient,
            from = %record.from.bed,
            to = %record.to.bed,
            urgency = %record.urgency,
            "patient transferred"
        );
        self.push_event(WardEvent::Transferred(record.clone()));
        Ok(record)
    }

    /// Confirms that a pending transfer has been carried out.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown transfer or actor, `InvalidTransition` if the transfer is
    /// already completed.
    pub fn complete_transfer(
        &mut self,
        transfer: &TimestampId,
        actor: &StaffId,
    ) -> WardResult<TransferCompletion> {
        log_rejection("complete-transfer", self.try_complete_transfer(transfer, actor))
    }

    fn try_complete_transfer(
        &mut self,
        transfer: &TimestampId,
        actor: &StaffId,
    ) -> WardResult<TransferCompletion> {
        self.directory().get_staff(actor)?;
        if self.transfer_status(transfer)? == TransferStatus::Completed {
            return Err(WardError::InvalidTransition(format!(
                "transfer {transfer} is already completed"
            )));
        }
        let completion = TransferCompletion {
            id: self.next_event_id(),
            transfer: transfer.clone(),
            actor: actor.clone(),
        };
        tracing::info!(transfer = %transfer, actor = %actor, "transfer completed");
        self.push_event(WardEvent::TransferCompleted(completion.clone()));
        Ok(completion)
    }

    pub fn find_transfer(&self, transfer: &TimestampId) -> WardResult<&TransferRecord> {
        self.audit()
            .iter()
            .find_map(|e| match e {
                WardEvent::Transferred(t) if &t.id == transfer => Some(t),
                _ => None,
            })
            .ok_or_else(|| WardError::not_found(EntityKind::Transfer, transfer))
    }

    /// `pending` until a completion event names the transfer.
    pub fn transfer_status(&self, transfer: &TimestampId) -> WardResult<TransferStatus> {
        self.find_transfer(transfer)?;
        let completed = self.audit().iter().any(|e| {
            matches!(e, WardEvent::TransferCompleted(c) if &c.transfer == transfer)
        });
        Ok(if completed {
            TransferStatus::Completed
        } else {
            TransferStatus::Pending
        })
    }
}
