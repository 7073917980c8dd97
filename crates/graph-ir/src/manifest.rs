// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! JSON graph manifest parsing.
//!
//! # Format
//! ```json
//! {
//!   "name": "conv-block",
//!   "nodes": [
//!     { "name": "input", "type": "input" },
//!     { "name": "conv1", "type": "conv2d", "weight_shape": [16, 3, 3, 3], "bias": true },
//!     { "name": "relu1", "type": "relu" }
//!   ],
//!   "edges": [
//!     { "from": "input", "to": "conv1" },
//!     { "from": "conv1", "to": "relu1", "input_port": 0 }
//!   ]
//! }
//! ```
//!
//! Edges address nodes by name; ports default to 0.

use crate::{GraphError, OperatorMetatype};
use std::collections::HashSet;
use std::path::Path;

/// Top-level graph manifest.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GraphManifest {
    /// Human-readable graph name.
    pub name: String,
    /// Node entries, in id order.
    pub nodes: Vec<ManifestNode>,
    /// Edge entries.
    #[serde(default)]
    pub edges: Vec<ManifestEdge>,
}

/// A single node entry in the manifest.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ManifestNode {
    /// Unique node name.
    pub name: String,
    /// Metatype string (e.g., `"conv2d"`, `"linear"`).
    #[serde(rename = "type")]
    pub node_type: String,
    /// Shape of the weight tensor, for weight-bearing operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_shape: Option<Vec<usize>>,
    /// Whether the operation has a bias.
    #[serde(default)]
    pub bias: bool,
}

/// A single edge entry in the manifest.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ManifestEdge {
    /// Producer node name.
    pub from: String,
    /// Consumer node name.
    pub to: String,
    /// Output port on the producer.
    #[serde(default)]
    pub output_port: usize,
    /// Input port on the consumer.
    #[serde(default)]
    pub input_port: usize,
}

impl GraphManifest {
    /// Loads a manifest from a JSON file path.
    pub fn from_file(path: &Path) -> Result<Self, GraphError> {
        let content = std::fs::read_to_string(path)?;
        let manifest: Self = serde_json::from_str(&content)?;
        Ok(manifest)
    }

    /// Parses a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        let manifest: Self = serde_json::from_str(json)?;
        Ok(manifest)
    }

    /// Validates that the manifest is internally consistent.
    ///
    /// Checks:
    /// - At least one node is defined.
    /// - All node type strings are recognised.
    /// - No duplicate node names.
    /// - Every edge endpoint names a declared node.
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.nodes.is_empty() {
            return Err(GraphError::InvalidGraph(
                "manifest contains no nodes".into(),
            ));
        }

        let mut seen_names = HashSet::new();
        for node in &self.nodes {
            if !seen_names.insert(node.name.as_str()) {
                return Err(GraphError::InvalidNode {
                    node: node.name.clone(),
                    detail: "duplicate node name".into(),
                });
            }

            let metatype = OperatorMetatype::from_str_loose(&node.node_type).ok_or_else(|| {
                GraphError::InvalidNode {
                    node: node.name.clone(),
                    detail: format!("unrecognised node type '{}'", node.node_type),
                }
            })?;

            if node.weight_shape.is_some() && !metatype.is_weighted() {
                tracing::warn!(
                    "node '{}' of type '{}' declares a weight shape that will be ignored",
                    node.name,
                    metatype,
                );
            }
        }

        for edge in &self.edges {
            for endpoint in [&edge.from, &edge.to] {
                if !seen_names.contains(endpoint.as_str()) {
                    return Err(GraphError::UnknownNode {
                        name: endpoint.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
