//! Vital-signs observations.
//!
//! Observations are appended to the audit trail and never change occupancy. Each numeric
//! reading is compared with an adult reference range; what happens to an out-of-range reading
//! depends on the ward's [`VitalsPolicy`].

use super::log_rejection;
use crate::constants::{
    DIASTOLIC_RANGE, HEART_RATE_RANGE, MAX_PAIN_SCORE, OXYGEN_SATURATION_RANGE,
    RESPIRATORY_RATE_RANGE, SYSTOLIC_RANGE, TEMPERATURE_C_RANGE, TEMPERATURE_F_RANGE,
};
use crate::events::WardEvent;
use crate::labels::text_enum;
use crate::validation::clean_text;
use crate::{Ward, WardError, WardResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ward_types::{PatientId, StaffId};
use ward_uuid::TimestampId;

text_enum! {
    pub enum TemperatureUnit ("temperature unit") {
        Fahrenheit => "F",
        Celsius => "C",
    }
}

text_enum! {
    pub enum VitalSign ("vital sign") {
        Temperature => "temperature",
        Systolic => "systolic",
        Diastolic => "diastolic",
        HeartRate => "heart-rate",
        RespiratoryRate => "respiratory-rate",
        OxygenSaturation => "oxygen-saturation",
    }
}

text_enum! {
    /// What to do with a reading outside its reference range.
    pub enum VitalsPolicy ("vitals policy") {
        /// Record the observation with the reading flagged.
        Flag => "flag",
        /// Refuse the observation.
        Reject => "reject",
    }
}

impl Default for VitalsPolicy {
    fn default() -> Self {
        Self::Flag
    }
}

text_enum! {
    pub enum FlagDirection ("flag direction") {
        Low => "low",
        High => "high",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub value: f64,
    pub unit: TemperatureUnit,
}

impl Temperature {
    fn range(&self) -> (f64, f64) {
        match self.unit {
            TemperatureUnit::Fahrenheit => TEMPERATURE_F_RANGE,
            TemperatureUnit::Celsius => TEMPERATURE_C_RANGE,
        }
    }
}

/// Blood pressure in mmHg, written `systolic/diastolic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodPressure {
    pub systolic: u16,
    pub diastolic: u16,
}

impl FromStr for BloodPressure {
    type Err = WardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            WardError::InvalidInput(format!(
                "blood pressure must be 'systolic/diastolic', got '{s}'"
            ))
        };
        let (systolic, diastolic) = s.trim().split_once('/').ok_or_else(invalid)?;
        Ok(Self {
            systolic: systolic.trim().parse().map_err(|_| invalid())?,
            diastolic: diastolic.trim().parse().map_err(|_| invalid())?,
        })
    }
}

impl fmt::Display for BloodPressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.systolic, self.diastolic)
    }
}

/// The readings captured on the record-vitals form. Every field is optional, but at least one
/// measurement must be present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VitalsPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Temperature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<BloodPressure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respiratory_rate: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oxygen_saturation: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pain_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl VitalsPayload {
    fn has_measurement(&self) -> bool {
        self.temperature.is_some()
            || self.blood_pressure.is_some()
            || self.heart_rate.is_some()
            || self.respiratory_rate.is_some()
            || self.oxygen_saturation.is_some()
            || self.pain_score.is_some()
            || self.weight_kg.is_some()
            || self.height_cm.is_some()
    }

    /// Rejects readings that cannot be physical measurements.
    fn validate(&self) -> WardResult<()> {
        if !self.has_measurement() {
            return Err(WardError::InvalidInput("no vital signs recorded".into()));
        }
        if let Some(pain) = self.pain_score {
            if pain > MAX_PAIN_SCORE {
                return Err(WardError::InvalidInput(format!(
                    "pain score must be between 0 and {MAX_PAIN_SCORE}, got {pain}"
                )));
            }
        }
        if let Some(spo2) = self.oxygen_saturation {
            if spo2 > 100 {
                return Err(WardError::InvalidInput(format!(
                    "oxygen saturation cannot exceed 100%, got {spo2}"
                )));
            }
        }
        if let Some(bp) = self.blood_pressure {
            if bp.diastolic == 0 || bp.systolic <= bp.diastolic {
                return Err(WardError::InvalidInput(format!(
                    "systolic pressure must exceed diastolic, got {bp}"
                )));
            }
        }
        let positive = [
            ("temperature", self.temperature.map(|t| t.value)),
            ("weight_kg", self.weight_kg),
            ("height_cm", self.height_cm),
        ];
        for (field, value) in positive {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    return Err(WardError::InvalidInput(format!(
                        "{field} must be a positive number, got {v}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Readings outside their reference range, in form order.
    pub fn flags(&self) -> Vec<VitalsFlag> {
        let mut readings: Vec<(VitalSign, f64, (f64, f64))> = Vec::new();
        if let Some(t) = self.temperature {
            readings.push((VitalSign::Temperature, t.value, t.range()));
        }
        if let Some(bp) = self.blood_pressure {
            readings.push((VitalSign::Systolic, f64::from(bp.systolic), SYSTOLIC_RANGE));
            readings.push((VitalSign::Diastolic, f64::from(bp.diastolic), DIASTOLIC_RANGE));
        }
        if let Some(hr) = self.heart_rate {
            readings.push((VitalSign::HeartRate, f64::from(hr), HEART_RATE_RANGE));
        }
        if let Some(rr) = self.respiratory_rate {
            readings.push((VitalSign::RespiratoryRate, f64::from(rr), RESPIRATORY_RATE_RANGE));
        }
        if let Some(spo2) = self.oxygen_saturation {
            readings.push((VitalSign::OxygenSaturation, f64::from(spo2), OXYGEN_SATURATION_RANGE));
        }
        readings
            .into_iter()
            .filter_map(|(sign, value, (low, high))| {
                let direction = if value < low {
                    FlagDirection::Low
                } else if value > high {
                    FlagDirection::High
                } else {
                    return None;
                };
                Some(VitalsFlag {
                    sign,
                    value,
                    low,
                    high,
                    direction,
                })
            })
            .collect()
    }
}

/// A reading outside its reference range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalsFlag {
    pub sign: VitalSign,
    pub value: f64,
    pub low: f64,
    pub high: f64,
    pub direction: FlagDirection,
}

impl fmt::Display for VitalsFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} is {} (reference {}-{})",
            self.sign, self.value, self.direction, self.low, self.high
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalsObservation {
    pub id: TimestampId,
    pub patient: PatientId,
    pub recorder: StaffId,
    pub payload: VitalsPayload,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<VitalsFlag>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalsRequest {
    pub patient: PatientId,
    pub recorder: StaffId,
    pub payload: VitalsPayload,
}

impl Ward {
    /// Appends an observation to the patient's chart.
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown patient or recorder.
    /// - `InvalidInput` for an empty payload or impossible readings (pain above 10, SpO2 above
    ///   100, non-positive measurements).
    /// - `VitalsOutOfRange` when a reading is out of range and the policy is
    ///   [`VitalsPolicy::Reject`].
    pub fn record_vitals(&mut self, request: VitalsRequest) -> WardResult<VitalsObservation> {
        log_rejection("record-vitals", self.try_record_vitals(request))
    }

    fn try_record_vitals(&mut self, request: VitalsRequest) -> WardResult<VitalsObservation> {
        let VitalsRequest {
            patient,
            recorder,
            mut payload,
        } = request;

        self.directory().get_patient(&patient)?;
        self.directory().get_staff(&recorder)?;
        payload.validate()?;
        payload.notes = clean_text("notes", payload.notes)?;

        let flags = payload.flags();
        if !flags.is_empty() && self.vitals_policy() == VitalsPolicy::Reject {
            return Err(WardError::VitalsOutOfRange(flags));
        }

        let observation = VitalsObservation {
            id: self.next_event_id(),
            patient,
            recorder,
            payload,
            flags,
        };
        if observation.flags.is_empty() {
            tracing::info!(patient = %observation.patient, "vitals recorded");
        } else {
            tracing::warn!(
                patient = %observation.patient,
                flagged = observation.flags.len(),
                "vitals recorded outside reference range"
            );
        }
        self.push_event(WardEvent::VitalsRecorded(observation.clone()));
        Ok(observation)
    }

    /// A patient's observations, newest first.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown patient.
    pub fn chart(&self, patient: &PatientId) -> WardResult<Vec<&VitalsObservation>> {
        self.directory().get_patient(patient)?;
        Ok(self
            .audit()
            .iter()
            .rev()
            .filter_map(|e| match e {
                WardEvent::VitalsRecorded(v) if &v.patient == patient => Some(v),
                _ => None,
            })
            .collect())
    }
}
