// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Command factory.
//!
//! Pure constructors that turn a graph node or target point plus a payload
//! into a correctly shaped [`Command`]. None of them touch the graph, and all
//! of them are safe to call from any number of threads at once.

use crate::{
    Command, CommandError, CompressionModuleType, InsertionCommand, QuantizerId,
    SharedInsertionCommand, TargetPoint, Tensor, TransformFn, TransformationPriority,
    ValueCommand, ValueKind,
};
use graph_ir::NodeDef;
use std::sync::Arc;

/// Creates a bias correction command for `node`.
///
/// The bias is addressed through the node's [`Layer`](crate::TargetType::Layer)
/// target, the same address a weight update for that node uses.
///
/// Fails with [`CommandError::MissingBias`] if the node has no bias.
pub fn create_bias_correction_command(
    node: &NodeDef,
    bias_value: Tensor,
) -> Result<ValueCommand, CommandError> {
    if !node.has_bias() {
        return Err(CommandError::MissingBias {
            node: node.node_name.clone(),
        });
    }
    let target_point = TargetPoint::layer(node.node_name.as_str())?;
    tracing::debug!("bias correction for '{}'", node.node_name);
    Ok(ValueCommand::new(target_point, bias_value, ValueKind::Bias))
}

/// Creates a weight update command for `node`.
///
/// Fails with [`CommandError::MissingWeight`] if the node owns no weight.
pub fn create_command_to_update_weight(
    node: &NodeDef,
    weight_value: Tensor,
) -> Result<ValueCommand, CommandError> {
    if !node.is_weighted() {
        return Err(CommandError::MissingWeight {
            node: node.node_name.clone(),
        });
    }
    let target_point = TargetPoint::layer(node.node_name.as_str())?;
    tracing::debug!("weight update for '{}'", node.node_name);
    Ok(ValueCommand::new(target_point, weight_value, ValueKind::Weight))
}

/// Creates the command that inserts `quantizer` at `target_point`.
///
/// - Weight targets get a plain [`InsertionCommand`]: a weight tensor has a
///   single owner, so its quantizer is never shared.
/// - Every other target gets a [`SharedInsertionCommand`] holding just this
///   point, keyed by the [`QuantizerId`] of `(node, port)`. Requests for the
///   same producing edge therefore collide on one key and the executor
///   registers a single quantizer for all of them.
///
/// Both variants run at [`TransformationPriority::QuantizationPriority`].
pub fn create_quantizer_insertion_command(
    target_point: &TargetPoint,
    quantizer: Arc<dyn TransformFn>,
) -> Command {
    if target_point.is_weight_target() {
        tracing::debug!("weight quantizer insertion at {target_point}");
        return InsertionCommand::new(
            target_point.clone(),
            quantizer,
            TransformationPriority::QuantizationPriority,
        )
        .into();
    }

    let storage_key = QuantizerId::for_target_point(target_point).storage_key();
    tracing::debug!("shared quantizer insertion at {target_point} under '{storage_key}'");
    SharedInsertionCommand::singleton(
        target_point.clone(),
        quantizer,
        storage_key,
        CompressionModuleType::ExternalQuantizer,
        TransformationPriority::QuantizationPriority,
    )
    .into()
}
