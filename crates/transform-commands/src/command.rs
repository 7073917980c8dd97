// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Command variants.
//!
//! [`Command`] is a closed sum type. An executor matches on it exhaustively
//! to decide how each edit is applied to the live model:
//!
//! ```text
//! Command::Value            set a bias or weight read at a layer target
//! Command::Insertion        attach a function at one target point
//! Command::SharedInsertion  register one function under a storage key and
//!                           attach it at every listed target point
//! ```
//!
//! Commands own their target points and payloads. They are never mutated
//! after construction.

use crate::{CommandError, TargetPoint, Tensor, TransformFn, TransformationPriority};
use std::sync::Arc;

/// Which parameter a [`ValueCommand`] replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Bias,
    Weight,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bias => "bias",
            Self::Weight => "weight",
        }
    }
}

/// Where a shared function is stored in the executor's module container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionModuleType {
    /// Activation quantizers shared between attachment points.
    ExternalQuantizer,
    /// Any other shared operation.
    ExternalOp,
}

impl CompressionModuleType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExternalQuantizer => "external_quantizer",
            Self::ExternalOp => "external_op",
        }
    }
}

impl std::fmt::Display for CompressionModuleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Value replacement ──────────────────────────────────────────────

/// Replace the bias or weight read at `target_point` with `value`.
///
/// Application has "set" semantics: applying the same command twice leaves
/// the model in the same state as applying it once.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueCommand {
    target_point: TargetPoint,
    value: Tensor,
    kind: ValueKind,
}

impl ValueCommand {
    pub fn new(target_point: TargetPoint, value: Tensor, kind: ValueKind) -> Self {
        Self {
            target_point,
            value,
            kind,
        }
    }

    pub fn target_point(&self) -> &TargetPoint {
        &self.target_point
    }

    pub fn value(&self) -> &Tensor {
        &self.value
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }
}

// ── Single-point insertion ─────────────────────────────────────────

/// Insert `transform_fn` at a single target point.
#[derive(Debug, Clone)]
pub struct InsertionCommand {
    target_point: TargetPoint,
    transform_fn: Arc<dyn TransformFn>,
    priority: TransformationPriority,
}

impl InsertionCommand {
    pub fn new(
        target_point: TargetPoint,
        transform_fn: Arc<dyn TransformFn>,
        priority: TransformationPriority,
    ) -> Self {
        Self {
            target_point,
            transform_fn,
            priority,
        }
    }

    pub fn target_point(&self) -> &TargetPoint {
        &self.target_point
    }

    pub fn transform_fn(&self) -> &Arc<dyn TransformFn> {
        &self.transform_fn
    }

    pub fn priority(&self) -> TransformationPriority {
        self.priority
    }
}

impl PartialEq for InsertionCommand {
    fn eq(&self, other: &Self) -> bool {
        self.target_point == other.target_point
            && Arc::ptr_eq(&self.transform_fn, &other.transform_fn)
            && self.priority == other.priority
    }
}

// ── Shared insertion ───────────────────────────────────────────────

/// Register `transform_fn` once under `storage_key` and attach that single
/// instance at every target point.
///
/// Target points form a set: duplicates passed to [`new`](Self::new) are
/// dropped, first occurrence wins.
#[derive(Debug, Clone)]
pub struct SharedInsertionCommand {
    target_points: Vec<TargetPoint>,
    transform_fn: Arc<dyn TransformFn>,
    storage_key: String,
    module_type: CompressionModuleType,
    priority: TransformationPriority,
}

impl SharedInsertionCommand {
    /// Creates a shared insertion. At least one target point is required.
    pub fn new(
        target_points: Vec<TargetPoint>,
        transform_fn: Arc<dyn TransformFn>,
        storage_key: impl Into<String>,
        module_type: CompressionModuleType,
        priority: TransformationPriority,
    ) -> Result<Self, CommandError> {
        let storage_key = storage_key.into();
        if target_points.is_empty() {
            return Err(CommandError::NoTargetPoints { storage_key });
        }
        let mut unique: Vec<TargetPoint> = Vec::with_capacity(target_points.len());
        for tp in target_points {
            if !unique.contains(&tp) {
                unique.push(tp);
            }
        }
        Ok(Self {
            target_points: unique,
            transform_fn,
            storage_key,
            module_type,
            priority,
        })
    }

    /// A shared insertion attached at a single point.
    pub(crate) fn singleton(
        target_point: TargetPoint,
        transform_fn: Arc<dyn TransformFn>,
        storage_key: String,
        module_type: CompressionModuleType,
        priority: TransformationPriority,
    ) -> Self {
        Self {
            target_points: vec![target_point],
            transform_fn,
            storage_key,
            module_type,
            priority,
        }
    }

    pub fn target_points(&self) -> &[TargetPoint] {
        &self.target_points
    }

    pub fn transform_fn(&self) -> &Arc<dyn TransformFn> {
        &self.transform_fn
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn module_type(&self) -> CompressionModuleType {
        self.module_type
    }

    pub fn priority(&self) -> TransformationPriority {
        self.priority
    }
}

impl PartialEq for SharedInsertionCommand {
    fn eq(&self, other: &Self) -> bool {
        self.target_points == other.target_points
            && Arc::ptr_eq(&self.transform_fn, &other.transform_fn)
            && self.storage_key == other.storage_key
            && self.module_type == other.module_type
            && self.priority == other.priority
    }
}

// ── Command ────────────────────────────────────────────────────────

/// One graph edit, to be applied by an executor.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Value(ValueCommand),
    Insertion(InsertionCommand),
    SharedInsertion(SharedInsertionCommand),
}

impl Command {
    /// Ordering key at a shared location. Value replacements always run at
    /// the default level.
    pub fn priority(&self) -> TransformationPriority {
        match self {
            Self::Value(_) => TransformationPriority::DefaultPriority,
            Self::Insertion(cmd) => cmd.priority(),
            Self::SharedInsertion(cmd) => cmd.priority(),
        }
    }

    /// Every target point this command touches.
    pub fn target_points(&self) -> &[TargetPoint] {
        match self {
            Self::Value(cmd) => std::slice::from_ref(&cmd.target_point),
            Self::Insertion(cmd) => std::slice::from_ref(&cmd.target_point),
            Self::SharedInsertion(cmd) => cmd.target_points(),
        }
    }

    /// Short label for logs.
    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::Value(cmd) => match cmd.kind {
                ValueKind::Bias => "bias_correction",
                ValueKind::Weight => "weight_update",
            },
            Self::Insertion(_) => "insertion",
            Self::SharedInsertion(_) => "shared_insertion",
        }
    }

    /// Payload-free, serializable description of this command.
    pub fn describe(&self) -> CommandSummary {
        let (storage_key, module_type, payload) = match self {
            Self::Value(cmd) => (
                None,
                None,
                format!("{} tensor {:?}", cmd.kind.as_str(), cmd.value.shape()),
            ),
            Self::Insertion(cmd) => (None, None, cmd.transform_fn.name().to_string()),
            Self::SharedInsertion(cmd) => (
                Some(cmd.storage_key.clone()),
                Some(cmd.module_type),
                cmd.transform_fn.name().to_string(),
            ),
        };
        CommandSummary {
            kind: self.kind_str(),
            target_points: self.target_points().to_vec(),
            priority: self.priority(),
            storage_key,
            module_type,
            payload,
        }
    }
}

impl From<ValueCommand> for Command {
    fn from(cmd: ValueCommand) -> Self {
        Self::Value(cmd)
    }
}

impl From<InsertionCommand> for Command {
    fn from(cmd: InsertionCommand) -> Self {
        Self::Insertion(cmd)
    }
}

impl From<SharedInsertionCommand> for Command {
    fn from(cmd: SharedInsertionCommand) -> Self {
        Self::SharedInsertion(cmd)
    }
}

/// Serializable view of a [`Command`] without its payload.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CommandSummary {
    pub kind: &'static str,
    pub target_points: Vec<TargetPoint>,
    pub priority: TransformationPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_type: Option<CompressionModuleType>,
    pub payload: String,
}
