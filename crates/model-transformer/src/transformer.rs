// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Applies a transformation layout to a model state.
//!
//! ```text
//! TransformationLayout ──ordered()──▶ commands by priority
//!                                        │
//!        staged copy of ModelState ◀─────┘ apply one by one
//!                │
//!                └── all succeeded ──▶ replaces the caller's state
//! ```
//!
//! A failing command leaves the caller's state untouched.

use crate::{Hook, ModelState, TransformError, TransformStats, TransformerConfig};
use std::time::Instant;
use transform_commands::{
    Command, InsertionCommand, SharedInsertionCommand, TargetType, Tensor, ValueCommand,
    ValueKind,
};

/// The executor for transformation commands.
#[derive(Debug, Clone, Default)]
pub struct ModelTransformer {
    config: TransformerConfig,
}

impl ModelTransformer {
    pub fn new(config: TransformerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransformerConfig {
        &self.config
    }

    /// Applies every command of `layout` to `state` in priority order.
    pub fn transform(
        &self,
        state: &mut ModelState,
        layout: &transform_commands::TransformationLayout,
    ) -> Result<TransformStats, TransformError> {
        let start = Instant::now();
        tracing::info!(
            "applying {} commands to '{}' (duplicate policy: {:?})",
            layout.len(),
            state.name(),
            self.config.duplicate_policy,
        );

        let mut staged = state.clone();
        let mut stats = TransformStats::default();
        for command in layout.ordered() {
            tracing::debug!(
                "{} at {:?} ({})",
                command.kind_str(),
                command
                    .target_points()
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>(),
                command.priority(),
            );
            match command {
                Command::Value(cmd) => self.apply_value(&mut staged, cmd, &mut stats)?,
                Command::Insertion(cmd) => self.apply_insertion(&mut staged, cmd, &mut stats)?,
                Command::SharedInsertion(cmd) => self.apply_shared(&mut staged, cmd, &mut stats)?,
            }
        }

        *state = staged;
        stats.total_duration = start.elapsed();
        if self.config.log_summary {
            tracing::info!("{}", stats.summary());
        }
        Ok(stats)
    }

    fn apply_value(
        &self,
        state: &mut ModelState,
        cmd: &ValueCommand,
        stats: &mut TransformStats,
    ) -> Result<(), TransformError> {
        let tp = cmd.target_point();
        if tp.target_type() != TargetType::Layer {
            return Err(TransformError::UnsupportedTarget {
                kind: "value replacement",
                target: tp.to_string(),
            });
        }

        let node_name = tp.target_node_name();
        let parameter = cmd.kind().as_str();
        let node = state.node_mut(node_name)?;
        let slot = match cmd.kind() {
            ValueKind::Bias => &mut node.bias,
            ValueKind::Weight => &mut node.weight,
        };
        let current = slot.as_ref().ok_or_else(|| TransformError::MissingParameter {
            node: node_name.to_string(),
            parameter,
        })?;
        if self.config.check_shapes {
            check_shape(node_name, parameter, current, cmd.value())?;
        }

        *slot = Some(cmd.value().clone());
        stats.value_commands += 1;
        Ok(())
    }

    fn apply_insertion(
        &self,
        state: &mut ModelState,
        cmd: &InsertionCommand,
        stats: &mut TransformStats,
    ) -> Result<(), TransformError> {
        let tp = cmd.target_point();
        let node = state.node_mut(tp.target_node_name())?;
        if tp.is_weight_target() && node.weight.is_none() {
            return Err(TransformError::MissingParameter {
                node: tp.target_node_name().to_string(),
                parameter: "weight",
            });
        }

        state.attach(tp, Hook::Local(cmd.transform_fn().clone()));
        stats.insertion_commands += 1;
        stats.attachments += 1;
        Ok(())
    }

    fn apply_shared(
        &self,
        state: &mut ModelState,
        cmd: &SharedInsertionCommand,
        stats: &mut TransformStats,
    ) -> Result<(), TransformError> {
        // Every target must resolve before anything is registered.
        for tp in cmd.target_points() {
            if tp.is_weight_target() {
                return Err(TransformError::UnsupportedTarget {
                    kind: "shared insertion",
                    target: tp.to_string(),
                });
            }
            state.node_mut(tp.target_node_name())?;
        }

        let registration = state.registry_mut().register(
            cmd.module_type(),
            cmd.storage_key(),
            cmd.transform_fn(),
            self.config.duplicate_policy,
        )?;
        stats.record_registration(registration);

        for tp in cmd.target_points() {
            let hook = Hook::Shared {
                module_type: cmd.module_type(),
                storage_key: cmd.storage_key().to_string(),
            };
            if state.attach(tp, hook) {
                stats.attachments += 1;
            } else {
                stats.duplicate_attachments += 1;
            }
        }
        stats.shared_commands += 1;
        Ok(())
    }
}

fn check_shape(
    node: &str,
    parameter: &'static str,
    current: &Tensor,
    replacement: &Tensor,
) -> Result<(), TransformError> {
    if current.shape() != replacement.shape() {
        return Err(TransformError::ShapeMismatch {
            node: node.to_string(),
            parameter,
            expected: current.shape().to_vec(),
            actual: replacement.shape().to_vec(),
        });
    }
    Ok(())
}
