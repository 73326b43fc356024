//! The ward: directory store, audit trail and event id source in one value.

use crate::directory::Directory;
use crate::events::WardEvent;
use crate::operations::assignment::AssignmentRequest;
use crate::operations::discharge::DischargeRequest;
use crate::operations::transfer::TransferRequest;
use crate::operations::vitals::{VitalsPolicy, VitalsRequest};
use crate::patient::{NewPatient, PatientUpdate};
use crate::room::RoomCondition;
use crate::WardResult;
use serde::{Deserialize, Serialize};
use ward_types::{PatientId, RoomId, StaffId};
use ward_uuid::{TimestampId, TimestampIdGenerator};

/// A single ward mutation, as accepted by [`Ward::apply`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum Command {
    Register(NewPatient),
    UpdatePatient {
        patient: PatientId,
        update: PatientUpdate,
    },
    Assign(AssignmentRequest),
    Transfer(TransferRequest),
    CompleteTransfer {
        transfer: TimestampId,
        actor: StaffId,
    },
    Discharge(DischargeRequest),
    RecordVitals(VitalsRequest),
    SetRoomCondition {
        room: RoomId,
        condition: RoomCondition,
        actor: StaffId,
    },
}

#[derive(Debug, Clone)]
pub struct Ward {
    directory: Directory,
    events: Vec<WardEvent>,
    ids: TimestampIdGenerator,
    vitals_policy: VitalsPolicy,
}

impl Ward {
    pub fn new(directory: Directory) -> Self {
        Self {
            directory,
            events: Vec::new(),
            ids: TimestampIdGenerator::new(),
            vitals_policy: VitalsPolicy::default(),
        }
    }

    /// Rebuilds a ward from a directory and a previously recorded audit trail. New event ids
    /// are issued after the latest one in `events`.
    pub fn with_history(directory: Directory, events: Vec<WardEvent>) -> Self {
        let mut ward = Self::new(directory);
        for event in &events {
            ward.ids.observe(event.id());
        }
        ward.events = events;
        ward
    }

    pub fn with_vitals_policy(mut self, policy: VitalsPolicy) -> Self {
        self.vitals_policy = policy;
        self
    }

    pub fn vitals_policy(&self) -> VitalsPolicy {
        self.vitals_policy
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub(crate) fn directory_mut(&mut self) -> &mut Directory {
        &mut self.directory
    }

    /// Every event recorded so far, oldest first.
    pub fn audit(&self) -> &[WardEvent] {
        &self.events
    }

    /// Events concerning one patient, oldest first.
    pub fn patient_history(&self, patient: &PatientId) -> WardResult<Vec<&WardEvent>> {
        self.directory.get_patient(patient)?;
        Ok(self
            .events
            .iter()
            .filter(|e| e.patient() == Some(patient))
            .collect())
    }

    /// Runs one command and returns the events it appended.
    pub fn apply(&mut self, command: Command) -> WardResult<Vec<WardEvent>> {
        let before = self.events.len();
        match command {
            Command::Register(new) => {
                self.register_patient(new)?;
            }
            Command::UpdatePatient { patient, update } => {
                self.update_patient(&patient, update)?;
            }
            Command::Assign(request) => {
                self.assign(request)?;
            }
            Command::Transfer(request) => {
                self.transfer(request)?;
            }
            Command::CompleteTransfer { transfer, actor } => {
                self.complete_transfer(&transfer, &actor)?;
            }
            Command::Discharge(request) => {
                self.discharge(request)?;
            }
            Command::RecordVitals(request) => {
                self.record_vitals(request)?;
            }
            Command::SetRoomCondition {
                room,
                condition,
                actor,
            } => {
                self.set_room_condition(&room, condition, &actor)?;
            }
        }
        Ok(self.events[before..].to_vec())
    }

    pub(crate) fn next_event_id(&mut self) -> TimestampId {
        self.ids.next_id()
    }

    pub(crate) fn push_event(&mut self, event: WardEvent) {
        self.events.push(event);
    }
}
