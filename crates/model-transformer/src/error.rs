// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for applying commands to a model state.

use transform_commands::CompressionModuleType;

/// Errors that can occur while transforming a model state.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// A command addressed a node that is not in the model.
    #[error("unknown node '{node}'")]
    UnknownNode { node: String },

    /// A command addressed a parameter the node does not have.
    #[error("node '{node}' has no {parameter}")]
    MissingParameter {
        node: String,
        parameter: &'static str,
    },

    /// A replacement value does not match the parameter it replaces.
    #[error("{parameter} of '{node}' has shape {expected:?}, replacement has {actual:?}")]
    ShapeMismatch {
        node: String,
        parameter: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// A command kind cannot be applied at this target.
    #[error("{kind} cannot be applied at {target}")]
    UnsupportedTarget { kind: &'static str, target: String },

    /// A different function instance was registered under a used key.
    #[error("storage key '{key}' in {module_type} is already bound to another instance")]
    StorageKeyConflict {
        key: String,
        module_type: CompressionModuleType,
    },

    /// A hook referenced a storage key that was never registered.
    #[error("no module registered under '{key}' in {module_type}")]
    UnknownStorageKey {
        key: String,
        module_type: CompressionModuleType,
    },

    /// Command construction failed.
    #[error("command error: {0}")]
    Command(#[from] transform_commands::CommandError),

    /// Graph loading failed.
    #[error("graph error: {0}")]
    Graph(#[from] graph_ir::GraphError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}
