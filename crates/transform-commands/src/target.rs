// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Target points: immutable addresses of edit locations in a graph.
//!
//! A target point names a node by its stable `node_name` and says which part
//! of the node an edit touches. Only input-edge targets carry a port; every
//! other target type rejects one at construction time.

use crate::CommandError;
use std::fmt;

/// What kind of location a [`TargetPoint`] addresses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    /// The whole operation (its parameters are reached through the layer).
    Layer,
    /// The weight tensor owned by an operation.
    OperationWithWeights,
    /// An input edge of an operation, selected by input port.
    #[serde(alias = "input")]
    OperatorPreHook,
    /// The output of an operation.
    #[serde(alias = "output")]
    OperatorPostHook,
    /// Before the whole layer runs.
    PreLayerOperation,
    /// After the whole layer runs.
    PostLayerOperation,
}

impl TargetType {
    /// Returns `true` if this target type is addressed by an input port.
    pub fn requires_input_port(self) -> bool {
        matches!(self, Self::OperatorPreHook)
    }

    /// Returns a human-readable label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Layer => "layer",
            Self::OperationWithWeights => "operation_with_weights",
            Self::OperatorPreHook => "operator_pre_hook",
            Self::OperatorPostHook => "operator_post_hook",
            Self::PreLayerOperation => "pre_layer_operation",
            Self::PostLayerOperation => "post_layer_operation",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable address of a location in the graph.
///
/// Equality, hashing, and ordering are by value: two target points with the
/// same fields refer to the same location.
///
/// # Examples
/// ```
/// use transform_commands::{TargetPoint, TargetType};
///
/// let tp = TargetPoint::new(TargetType::OperatorPreHook, "conv2", Some(1)).unwrap();
/// assert_eq!(tp.input_port_id(), Some(1));
///
/// // A layer target ignores ports, so supplying one is an error.
/// assert!(TargetPoint::new(TargetType::Layer, "conv2", Some(1)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawTargetPoint")]
pub struct TargetPoint {
    target_type: TargetType,
    target_node_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    input_port_id: Option<usize>,
}

impl TargetPoint {
    /// Creates a target point, rejecting fields the target type does not use.
    pub fn new(
        target_type: TargetType,
        target_node_name: impl Into<String>,
        input_port_id: Option<usize>,
    ) -> Result<Self, CommandError> {
        let target_node_name = target_node_name.into();
        if target_node_name.is_empty() {
            return Err(CommandError::EmptyNodeName);
        }
        match (target_type.requires_input_port(), input_port_id) {
            (true, None) => Err(CommandError::MissingInputPort {
                target_type,
                node: target_node_name,
            }),
            (false, Some(_)) => Err(CommandError::UnexpectedInputPort {
                target_type,
                node: target_node_name,
            }),
            _ => Ok(Self {
                target_type,
                target_node_name,
                input_port_id,
            }),
        }
    }

    /// Whole-layer target.
    pub fn layer(node_name: impl Into<String>) -> Result<Self, CommandError> {
        Self::new(TargetType::Layer, node_name, None)
    }

    /// Weight tensor of an operation.
    pub fn weights(node_name: impl Into<String>) -> Result<Self, CommandError> {
        Self::new(TargetType::OperationWithWeights, node_name, None)
    }

    /// Input edge `port` of an operation.
    pub fn pre_hook(node_name: impl Into<String>, port: usize) -> Result<Self, CommandError> {
        Self::new(TargetType::OperatorPreHook, node_name, Some(port))
    }

    /// Output of an operation.
    pub fn post_hook(node_name: impl Into<String>) -> Result<Self, CommandError> {
        Self::new(TargetType::OperatorPostHook, node_name, None)
    }

    pub fn target_type(&self) -> TargetType {
        self.target_type
    }

    pub fn target_node_name(&self) -> &str {
        &self.target_node_name
    }

    pub fn input_port_id(&self) -> Option<usize> {
        self.input_port_id
    }

    /// Returns `true` if this target addresses an operation's weights.
    pub fn is_weight_target(&self) -> bool {
        self.target_type == TargetType::OperationWithWeights
    }
}

impl fmt::Display for TargetPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.target_type, self.target_node_name)?;
        if let Some(port) = self.input_port_id {
            write!(f, "[{port}]")?;
        }
        Ok(())
    }
}

/// Unchecked wire form; deserialization funnels through [`TargetPoint::new`].
#[derive(serde::Deserialize)]
struct RawTargetPoint {
    target_type: TargetType,
    target_node_name: String,
    #[serde(default)]
    input_port_id: Option<usize>,
}

impl TryFrom<RawTargetPoint> for TargetPoint {
    type Error = CommandError;

    fn try_from(raw: RawTargetPoint) -> Result<Self, Self::Error> {
        Self::new(raw.target_type, raw.target_node_name, raw.input_port_id)
    }
}
