//! Patient records.
//!
//! A [`Patient`] is owned by the [`Directory`](crate::Directory). Callers only ever see shared
//! references; the bed, status and admission timestamps change through ward operations
//! (assignment, transfer, discharge), and demographic fields through
//! [`Ward::update_patient`](crate::Ward::update_patient).

use crate::labels::text_enum;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ward_types::{BedId, NonEmptyText, PatientId, StaffId};

text_enum! {
    /// Where a patient is in their care episode.
    pub enum PatientStatus ("patient status") {
        Admitted => "admitted",
        Outpatient => "outpatient",
        Discharged => "discharged",
        Emergency => "emergency",
    }
}

text_enum! {
    pub enum Gender ("gender") {
        Male => "male",
        Female => "female",
        Other => "other",
    }
}

text_enum! {
    /// ABO/Rh blood group.
    pub enum BloodGroup ("blood group") {
        APositive => "A+",
        ANegative => "A-",
        BPositive => "B+",
        BNegative => "B-",
        AbPositive => "AB+",
        AbNegative => "AB-",
        OPositive => "O+",
        ONegative => "O-",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Patient {
    pub id: PatientId,
    pub name: NonEmptyText,
    pub age: u16,
    pub gender: Gender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<BloodGroup>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<String>,
    pub status: PatientStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// The bed the patient currently occupies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bed: Option<BedId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attending: Option<StaffId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admitted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discharged_at: Option<DateTime<Utc>>,
}

impl Patient {
    /// True while the patient holds a bed, i.e. is part of the active-admissions view.
    pub fn is_admitted(&self) -> bool {
        self.bed.is_some() && self.status != PatientStatus::Discharged
    }

    /// Case-insensitive substring match over name, id and department, as used by the
    /// patient and admission search boxes.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.as_str().to_lowercase().contains(&needle)
            || self.id.as_str().to_lowercase().contains(&needle)
            || self
                .department
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
            || self
                .bed
                .as_ref()
                .is_some_and(|b| b.to_string().to_lowercase().contains(&needle))
    }
}

/// Criteria for [`Directory::list_patients`](crate::Directory::list_patients). Empty criteria
/// match every patient.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientFilter {
    pub search: Option<String>,
    pub status: Option<PatientStatus>,
    pub department: Option<String>,
}

impl PatientFilter {
    pub fn matches(&self, patient: &Patient) -> bool {
        if let Some(status) = self.status {
            if patient.status != status {
                return false;
            }
        }
        if let Some(department) = &self.department {
            let same = patient
                .department
                .as_deref()
                .is_some_and(|d| d.eq_ignore_ascii_case(department.trim()));
            if !same {
                return false;
            }
        }
        match self.search.as_deref() {
            Some(needle) => patient.matches_search(needle),
            None => true,
        }
    }
}

/// Details captured when registering a new patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPatient {
    pub name: NonEmptyText,
    pub age: u16,
    pub gender: Gender,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub blood_group: Option<BloodGroup>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub department: Option<String>,
    /// Arrivals through the emergency department start as `emergency`; everyone else as
    /// `outpatient`.
    #[serde(default)]
    pub emergency: bool,
}

/// Changes from the edit-patient form.
///
/// `None` leaves a field untouched. For the optional contact fields, `Some("")` clears the
/// value. Allergy and condition edits are applied removals first, then additions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientUpdate {
    pub name: Option<NonEmptyText>,
    pub age: Option<u16>,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub blood_group: Option<BloodGroup>,
    pub add_allergies: Vec<String>,
    pub remove_allergies: Vec<String>,
    pub add_conditions: Vec<String>,
    pub remove_conditions: Vec<String>,
}
