// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! JSON configuration for the per-call option structs.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{BuildOptions, ErrorPolicy, LoadOptions, MergeOptions, Tolerance, UpdateOptions};

/// Error type for config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error while reading.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization/deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Knobs shared by build, update, load and merge.
///
/// Every field is optional in JSON; missing fields take their defaults.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OifitsConfig {
    /// Reaction to data errors.
    pub error_policy: ErrorPolicy,
    /// Collection revision to force on update.
    pub force_revision: Option<u32>,
    /// Slack for merge comparisons.
    pub tolerance: Tolerance,
    /// Report unresolved ARRAY names as warnings.
    pub warn_unresolved_array: bool,
}

impl Default for OifitsConfig {
    fn default() -> Self {
        Self {
            error_policy: ErrorPolicy::default(),
            force_revision: None,
            tolerance: Tolerance::default(),
            warn_unresolved_array: true,
        }
    }
}

impl OifitsConfig {
    /// Parse a JSON document.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ConfigError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Read and parse a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let bytes = std::fs::read(path)?;
        Self::from_json_slice(&bytes)
    }

    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Options for [`crate::build`].
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            policy: self.error_policy,
            ..BuildOptions::default()
        }
    }

    /// Options for [`crate::Collection::update`].
    pub fn update_options(&self) -> UpdateOptions {
        UpdateOptions {
            policy: self.error_policy,
            force_revision: self.force_revision,
            force: false,
            warn_unresolved_array: self.warn_unresolved_array,
        }
    }

    /// Options for [`crate::load`].
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            policy: self.error_policy,
            update: self.update_options(),
        }
    }

    /// Options for [`crate::merge`].
    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            tolerance: self.tolerance,
            load: self.load_options(),
            update: self.update_options(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = OifitsConfig::from_json_slice(b"{}").unwrap();
        assert_eq!(config, OifitsConfig::default());
        assert!(config.update_options().warn_unresolved_array);
    }

    #[test]
    fn options_follow_the_config() {
        let json = br#"{
            "error_policy": "stop",
            "force_revision": 2,
            "tolerance": { "relative": 1e-6 },
            "warn_unresolved_array": false
        }"#;
        let config = OifitsConfig::from_json_slice(json).unwrap();
        let merge = config.merge_options();
        assert_eq!(merge.load.policy, ErrorPolicy::Stop);
        assert_eq!(merge.update.force_revision, Some(2));
        assert!(!merge.update.warn_unresolved_array);
        assert_eq!(merge.tolerance, Tolerance::new(0.0, 1e-6));
        assert!(config.build_options().apply_defaults);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let err = OifitsConfig::from_json_slice(br#"{"error_policy":"panic"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Serde(_)));
    }

    #[test]
    fn json_round_trips() {
        let config = OifitsConfig {
            force_revision: Some(1),
            ..OifitsConfig::default()
        };
        let back = OifitsConfig::from_json_slice(config.to_json().unwrap().as_bytes()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = OifitsConfig::from_path("/nonexistent/oifits.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
