// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Transformer configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! duplicate_policy = "reject"
//! check_shapes = true
//! log_summary = true
//! ```

use crate::{DuplicatePolicy, TransformError};
use std::path::Path;

/// Configuration for the [`crate::ModelTransformer`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TransformerConfig {
    /// What to do when a storage key is registered again with a different
    /// instance: `"reject"` or `"merge"` (keep the first instance).
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
    /// Reject bias/weight replacements whose shape differs from the original.
    #[serde(default = "default_true")]
    pub check_shapes: bool,
    /// Log the [`crate::TransformStats`] summary after each transform.
    #[serde(default = "default_true")]
    pub log_summary: bool,
}

fn default_true() -> bool {
    true
}

impl TransformerConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, TransformError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TransformError::ConfigError(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, TransformError> {
        toml::from_str(toml_str)
            .map_err(|e| TransformError::ConfigError(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, TransformError> {
        toml::to_string_pretty(self)
            .map_err(|e| TransformError::ConfigError(format!("TOML serialise error: {e}")))
    }
}

impl Default for TransformerConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Reject,
            check_shapes: true,
            log_summary: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let c = TransformerConfig::default();
        assert_eq!(c.duplicate_policy, DuplicatePolicy::Reject);
        assert!(c.check_shapes);
        assert!(c.log_summary);
    }

    #[test]
    fn test_from_toml() {
        let c = TransformerConfig::from_toml(
            r#"
duplicate_policy = "merge"
check_shapes = false
"#,
        )
        .unwrap();
        assert_eq!(c.duplicate_policy, DuplicatePolicy::Merge);
        assert!(!c.check_shapes);
        assert!(c.log_summary);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(TransformerConfig::from_toml("").unwrap(), TransformerConfig::default());
    }

    #[test]
    fn test_bad_policy() {
        let err = TransformerConfig::from_toml(r#"duplicate_policy = "ignore""#).unwrap_err();
        assert!(matches!(err, TransformError::ConfigError(_)));
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let c = TransformerConfig {
            duplicate_policy: DuplicatePolicy::Merge,
            ..Default::default()
        };
        let back = TransformerConfig::from_toml(&c.to_toml().unwrap()).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_from_missing_file() {
        let err = TransformerConfig::from_file(Path::new("/nonexistent/xform.toml")).unwrap_err();
        assert!(matches!(err, TransformError::ConfigError(_)));
    }
}
