//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the core. Binaries
//! read the environment; the core only sees the resolved values.

use crate::operations::vitals::VitalsPolicy;
use crate::{dataset, Ward, WardError, WardResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug, Default)]
pub struct CoreConfig {
    dataset_path: Option<PathBuf>,
    vitals_policy: VitalsPolicy,
    hospital_name: Option<String>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `dataset_path` of `None` selects the bundled seed. `hospital_name` of `None` keeps the
    /// dataset's own name, or [`DEFAULT_HOSPITAL_NAME`](crate::constants::DEFAULT_HOSPITAL_NAME)
    /// if it has none.
    pub fn new(
        dataset_path: Option<PathBuf>,
        vitals_policy: VitalsPolicy,
        hospital_name: Option<String>,
    ) -> WardResult<Self> {
        if let Some(path) = &dataset_path {
            if path.as_os_str().is_empty() {
                return Err(WardError::InvalidInput("dataset path cannot be empty".into()));
            }
        }
        if hospital_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(WardError::InvalidInput("hospital name cannot be empty".into()));
        }

        Ok(Self {
            dataset_path,
            vitals_policy,
            hospital_name,
        })
    }

    pub fn dataset_path(&self) -> Option<&Path> {
        self.dataset_path.as_deref()
    }

    pub fn vitals_policy(&self) -> VitalsPolicy {
        self.vitals_policy
    }

    pub fn hospital_name(&self) -> Option<&str> {
        self.hospital_name.as_deref()
    }

    /// Loads the configured dataset and applies the configured policy and name.
    pub fn load_ward(&self) -> WardResult<Ward> {
        let ward = match &self.dataset_path {
            Some(path) => dataset::load_file(path)?,
            None => dataset::bundled()?,
        };
        let mut ward = ward.with_vitals_policy(self.vitals_policy);
        if let Some(name) = &self.hospital_name {
            ward.directory_mut().set_hospital_name(name.trim());
        }
        Ok(ward)
    }
}

/// Parse the vitals policy from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`VitalsPolicy::Flag`].
pub fn vitals_policy_from_env_value(value: Option<String>) -> WardResult<VitalsPolicy> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value.map(|v| v.parse::<VitalsPolicy>()).transpose()?;

    Ok(parsed.unwrap_or_default())
}

/// Parse an optional dataset path; empty/whitespace means "use the bundled seed".
pub fn dataset_path_from_env_value(value: Option<String>) -> Option<PathBuf> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Parse an optional hospital name override; empty/whitespace means "no override".
pub fn hospital_name_from_env_value(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vitals_policy_defaults_to_flag() {
        assert_eq!(vitals_policy_from_env_value(None).unwrap(), VitalsPolicy::Flag);
        assert_eq!(
            vitals_policy_from_env_value(Some("  ".into())).unwrap(),
            VitalsPolicy::Flag
        );
        assert_eq!(
            vitals_policy_from_env_value(Some("Reject".into())).unwrap(),
            VitalsPolicy::Reject
        );
        assert!(vitals_policy_from_env_value(Some("ignore".into())).is_err());
    }

    #[test]
    fn blank_dataset_path_means_bundled() {
        assert_eq!(dataset_path_from_env_value(Some(" ".into())), None);
        assert_eq!(
            dataset_path_from_env_value(Some("/tmp/ward.yaml".into())),
            Some(PathBuf::from("/tmp/ward.yaml"))
        );
    }

    #[test]
    fn empty_hospital_name_is_rejected() {
        assert!(CoreConfig::new(None, VitalsPolicy::Flag, Some("  ".into())).is_err());
    }

    #[test]
    fn load_ward_applies_overrides() {
        let config = CoreConfig::new(
            None,
            VitalsPolicy::Reject,
            Some("St. Mary's Hospital".into()),
        )
        .unwrap();
        let ward = config.load_ward().unwrap();
        assert_eq!(ward.vitals_policy(), VitalsPolicy::Reject);
        assert_eq!(ward.directory().hospital_name(), "St. Mary's Hospital");
    }

    #[test]
    fn load_ward_reads_configured_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ward.yaml");
        let seed = CoreConfig::default().load_ward().unwrap();
        dataset::save_file(&seed, &path).unwrap();

        let config = CoreConfig::new(Some(path), VitalsPolicy::Flag, None).unwrap();
        let ward = config.load_ward().unwrap();
        assert_eq!(
            ward.directory().list_rooms(None).len(),
            seed.directory().list_rooms(None).len()
        );
    }
}
