//! Request and query types for the REST endpoints.
//!
//! Identifiers and enum values arrive as plain strings and are parsed here, so malformed input
//! surfaces as a `422` with the parser's message rather than a generic body rejection.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use ward_core::operations::assignment::AssignmentRequest;
use ward_core::operations::discharge::{DischargeChecklist, DischargeRequest};
use ward_core::operations::transfer::TransferRequest;
use ward_core::operations::vitals::{VitalsPayload, VitalsRequest};
use ward_core::patient::{NewPatient, PatientUpdate};
use ward_core::{NonEmptyText, PatientId, WardError};

pub(crate) fn parse<T>(value: &str) -> Result<T, ApiError>
where
    T: FromStr,
    T::Err: Into<WardError>,
{
    value.parse::<T>().map_err(|e| ApiError(e.into()))
}

pub(crate) fn parse_opt<T>(value: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: FromStr,
    T::Err: Into<WardError>,
{
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(parse)
        .transpose()
}

fn text(value: &str) -> Result<NonEmptyText, ApiError> {
    NonEmptyText::new(value).map_err(|e| ApiError(e.into()))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RoomsQuery {
    /// Floor id, e.g. `first`.
    pub floor: Option<String>,
    /// Case-insensitive match on room id, type, department or occupant name.
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CensusQuery {
    pub floor: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PatientsQuery {
    /// One of `admitted`, `outpatient`, `discharged`, `emergency`.
    pub status: Option<String>,
    pub department: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StaffQuery {
    /// One of `doctor`, `nurse`, `admin`, `pharmacist`, `receptionist`.
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuditQuery {
    /// Restrict to events concerning one patient.
    pub patient: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RoomConditionReq {
    /// One of `in-service`, `maintenance`, `cleaning`.
    pub condition: String,
    pub actor: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterPatientReq {
    pub name: String,
    pub age: u16,
    pub gender: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub blood_group: Option<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<String>,
    pub department: Option<String>,
    #[serde(default)]
    pub emergency: bool,
}

impl RegisterPatientReq {
    pub fn into_new_patient(self) -> Result<NewPatient, ApiError> {
        Ok(NewPatient {
            name: text(&self.name)?,
            age: self.age,
            gender: parse(&self.gender)?,
            phone: self.phone,
            email: self.email,
            address: self.address,
            emergency_contact: self.emergency_contact,
            blood_group: parse_opt(self.blood_group.as_deref())?,
            allergies: self.allergies,
            conditions: self.conditions,
            department: self.department,
            emergency: self.emergency,
        })
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdatePatientReq {
    pub name: Option<String>,
    pub age: Option<u16>,
    pub gender: Option<String>,
    /// An empty string clears the field.
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub blood_group: Option<String>,
    pub add_allergies: Vec<String>,
    pub remove_allergies: Vec<String>,
    pub add_conditions: Vec<String>,
    pub remove_conditions: Vec<String>,
}

impl UpdatePatientReq {
    pub fn into_update(self) -> Result<PatientUpdate, ApiError> {
        Ok(PatientUpdate {
            name: self.name.as_deref().map(text).transpose()?,
            age: self.age,
            gender: parse_opt(self.gender.as_deref())?,
            phone: self.phone,
            email: self.email,
            address: self.address,
            emergency_contact: self.emergency_contact,
            blood_group: parse_opt(self.blood_group.as_deref())?,
            add_allergies: self.add_allergies,
            remove_allergies: self.remove_allergies,
            add_conditions: self.add_conditions,
            remove_conditions: self.remove_conditions,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignReq {
    pub patient: String,
    pub room: String,
    pub bed: String,
    /// One of `admission`, `transfer`, `readmission`.
    pub assignment_type: String,
    pub actor: String,
    pub notes: Option<String>,
}

impl AssignReq {
    pub fn into_request(self) -> Result<AssignmentRequest, ApiError> {
        Ok(AssignmentRequest {
            patient: parse(&self.patient)?,
            room: parse(&self.room)?,
            bed: parse(&self.bed)?,
            assignment_type: parse(&self.assignment_type)?,
            actor: parse(&self.actor)?,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferReq {
    pub patient: String,
    pub department: Option<String>,
    pub room: String,
    /// Omit to take the room's first free bed.
    pub bed: Option<String>,
    pub reason: String,
    pub transfer_type: String,
    /// One of `routine`, `urgent`, `emergency`.
    pub urgency: String,
    pub requested_by: String,
    pub approved_by: Option<String>,
    pub notes: Option<String>,
}

impl TransferReq {
    pub fn into_request(self) -> Result<TransferRequest, ApiError> {
        Ok(TransferRequest {
            patient: parse(&self.patient)?,
            department: self.department,
            room: parse(&self.room)?,
            bed: parse_opt(self.bed.as_deref())?,
            reason: parse(&self.reason)?,
            transfer_type: parse(&self.transfer_type)?,
            urgency: parse(&self.urgency)?,
            requested_by: parse(&self.requested_by)?,
            approved_by: parse_opt(self.approved_by.as_deref())?,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CompleteTransferReq {
    pub actor: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct ChecklistReq {
    pub patient_education: bool,
    pub medication_reconciliation: bool,
    pub summary_provided: bool,
    pub follow_up_scheduled: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DischargeReq {
    pub patient: String,
    /// One of `routine`, `ama`, `transfer-out`, `expired`, `eloped`.
    pub discharge_type: String,
    pub destination: String,
    pub physician: String,
    pub final_diagnosis: String,
    #[serde(default)]
    pub medications: Vec<String>,
    pub follow_up_instructions: Option<String>,
    pub follow_up_appointment: Option<String>,
    pub transport: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub checklist: ChecklistReq,
}

impl DischargeReq {
    /// Fails with `ChecklistIncomplete` before anything else is looked at.
    pub fn into_request(self) -> Result<DischargeRequest, ApiError> {
        let checklist = DischargeChecklist {
            patient_education: self.checklist.patient_education,
            medication_reconciliation: self.checklist.medication_reconciliation,
            summary_provided: self.checklist.summary_provided,
            follow_up_scheduled: self.checklist.follow_up_scheduled,
        }
        .complete()?;
        Ok(DischargeRequest {
            patient: parse(&self.patient)?,
            discharge_type: parse(&self.discharge_type)?,
            destination: parse(&self.destination)?,
            physician: parse(&self.physician)?,
            final_diagnosis: text(&self.final_diagnosis)?,
            medications: self.medications,
            follow_up_instructions: self.follow_up_instructions,
            follow_up_appointment: self.follow_up_appointment,
            transport: parse_opt(self.transport.as_deref())?,
            notes: self.notes,
            checklist,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordVitalsReq {
    pub recorder: String,
    /// Temperature `{value, unit}`, blood pressure `{systolic, diastolic}`, heart rate,
    /// respiratory rate, oxygen saturation, pain score (0-10), weight, height, notes.
    #[schema(value_type = Object)]
    pub payload: VitalsPayload,
}

impl RecordVitalsReq {
    pub fn into_request(self, patient: PatientId) -> Result<VitalsRequest, ApiError> {
        Ok(VitalsRequest {
            patient,
            recorder: parse(&self.recorder)?,
            payload: self.payload,
        })
    }
}
