// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for command construction.
//!
//! Every variant is a caller contract violation. Nothing here is transient,
//! so nothing is retried.

use crate::TargetType;

/// Errors raised while constructing target points, payloads, or commands.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// A target point was built without a node name.
    #[error("target point requires a non-empty node name")]
    EmptyNodeName,

    /// An input port was given for a target type that does not address ports.
    #[error("target type {target_type} does not take an input port (node '{node}')")]
    UnexpectedInputPort { target_type: TargetType, node: String },

    /// An input-edge target was built without an input port.
    #[error("target type {target_type} requires an input port (node '{node}')")]
    MissingInputPort { target_type: TargetType, node: String },

    /// Bias correction was requested for a node without a bias.
    #[error("node '{node}' has no bias to correct")]
    MissingBias { node: String },

    /// A weight update was requested for a node without weights.
    #[error("node '{node}' has no weight to update")]
    MissingWeight { node: String },

    /// A shared insertion was built without any target point.
    #[error("shared insertion '{storage_key}' has no target points")]
    NoTargetPoints { storage_key: String },

    /// A quantizer configuration is out of range.
    #[error("invalid quantizer: {0}")]
    InvalidQuantizer(String),

    /// A tensor shape whose element count overflows `usize`.
    #[error("tensor shape {shape:?} has too many elements")]
    ShapeOverflow { shape: Vec<usize> },

    /// A tensor payload does not match its declared shape.
    #[error("tensor shape holds {expected} elements, got {actual} values")]
    InvalidTensor { expected: usize, actual: usize },
}
