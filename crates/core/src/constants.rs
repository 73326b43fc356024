//! Constants used throughout the ward core crate.

/// Environment variable naming a YAML dataset to load instead of the bundled seed.
pub const DATASET_ENV: &str = "WARD_DATASET";

/// Environment variable selecting how out-of-range vital signs are handled (`flag` or `reject`).
pub const VITALS_POLICY_ENV: &str = "WARD_VITALS_POLICY";

/// Environment variable overriding the hospital display name.
pub const HOSPITAL_NAME_ENV: &str = "WARD_HOSPITAL_NAME";

/// Hospital name used when neither the dataset nor the environment provides one.
pub const DEFAULT_HOSPITAL_NAME: &str = "General Hospital";

/// Bundled seed dataset, mirroring the demo data the dashboard ships with.
pub const BUNDLED_DATASET: &str = include_str!("../data/seed.yaml");

/// Highest pain score on the 0-10 numeric rating scale.
pub const MAX_PAIN_SCORE: u8 = 10;

/// Longest free-text note accepted on any record.
pub const MAX_NOTE_LEN: usize = 2_000;

// Adult reference ranges used to flag vital signs. Inclusive bounds.

/// Body temperature, degrees Fahrenheit.
pub const TEMPERATURE_F_RANGE: (f64, f64) = (95.0, 100.4);

/// Body temperature, degrees Celsius.
pub const TEMPERATURE_C_RANGE: (f64, f64) = (35.0, 38.0);

/// Systolic blood pressure, mmHg.
pub const SYSTOLIC_RANGE: (f64, f64) = (90.0, 140.0);

/// Diastolic blood pressure, mmHg.
pub const DIASTOLIC_RANGE: (f64, f64) = (60.0, 90.0);

/// Heart rate, beats per minute.
pub const HEART_RATE_RANGE: (f64, f64) = (60.0, 100.0);

/// Respiratory rate, breaths per minute.
pub const RESPIRATORY_RATE_RANGE: (f64, f64) = (12.0, 20.0);

/// Peripheral oxygen saturation, percent.
pub const OXYGEN_SATURATION_RANGE: (f64, f64) = (95.0, 100.0);
