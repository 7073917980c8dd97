// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Shared module registry: "register once, attach many".
//!
//! Modules are stored per [`CompressionModuleType`] under their storage key.
//! Registering the same `Arc` twice is a reuse. Registering a *different*
//! instance under a used key is a conflict, resolved by [`DuplicatePolicy`].

use crate::TransformError;
use std::collections::BTreeMap;
use std::sync::Arc;
use transform_commands::{CompressionModuleType, TransformFn};

/// How to resolve a second, different instance under a used storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Fail with [`TransformError::StorageKeyConflict`].
    #[default]
    Reject,
    /// Keep the first instance and attach it in place of the new one.
    Merge,
}

/// Outcome of [`SharedModuleRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The key was new; the instance is now stored.
    Inserted,
    /// The same instance was already stored under the key.
    Reused,
    /// A different instance was stored; the first one was kept.
    Merged,
}

/// Storage of shared functions keyed by module type and storage key.
#[derive(Debug, Clone, Default)]
pub struct SharedModuleRegistry {
    modules: BTreeMap<(CompressionModuleType, String), Arc<dyn TransformFn>>,
}

impl SharedModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `module` under `key`, enforcing one instance per key.
    pub fn register(
        &mut self,
        module_type: CompressionModuleType,
        key: &str,
        module: &Arc<dyn TransformFn>,
        policy: DuplicatePolicy,
    ) -> Result<Registration, TransformError> {
        match self.modules.get(&(module_type, key.to_string())) {
            None => {
                self.modules
                    .insert((module_type, key.to_string()), Arc::clone(module));
                Ok(Registration::Inserted)
            }
            Some(existing) if Arc::ptr_eq(existing, module) => Ok(Registration::Reused),
            Some(_) => match policy {
                DuplicatePolicy::Reject => Err(TransformError::StorageKeyConflict {
                    key: key.to_string(),
                    module_type,
                }),
                DuplicatePolicy::Merge => {
                    tracing::warn!(
                        "storage key '{key}' in {module_type} already bound; keeping the first instance"
                    );
                    Ok(Registration::Merged)
                }
            },
        }
    }

    /// Returns the instance stored under `key`.
    pub fn get(&self, module_type: CompressionModuleType, key: &str) -> Option<&Arc<dyn TransformFn>> {
        self.modules.get(&(module_type, key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Registered keys of one module type, sorted.
    pub fn keys(&self, module_type: CompressionModuleType) -> Vec<&str> {
        self.modules
            .keys()
            .filter(|(t, _)| *t == module_type)
            .map(|(_, k)| k.as_str())
            .collect()
    }
}
