// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Graph loading from JSON manifests.

use crate::{graph, ComputeGraph, EdgeDef, GraphError, GraphManifest, NodeDef, OperatorMetatype};
use std::collections::HashMap;
use std::path::Path;

/// Loads a graph from disk into a validated [`ComputeGraph`].
///
/// # Example
/// ```no_run
/// use graph_ir::GraphLoader;
/// use std::path::Path;
///
/// let graph = GraphLoader::load(Path::new("./graphs/conv-block.json")).unwrap();
/// println!("Loaded {} nodes", graph.num_nodes());
/// ```
pub struct GraphLoader;

impl GraphLoader {
    /// Loads and validates a graph from a manifest file.
    pub fn load(path: &Path) -> Result<ComputeGraph<graph::Validated>, GraphError> {
        let manifest = GraphManifest::from_file(path)?;
        tracing::info!("loaded manifest '{}' from {}", manifest.name, path.display());
        Self::from_manifest(&manifest)
    }

    /// Builds and validates a graph from an in-memory manifest.
    ///
    /// Steps:
    /// 1. Validate the manifest.
    /// 2. Assign node ids in declaration order.
    /// 3. Resolve edge endpoints by name.
    /// 4. Construct and validate the [`ComputeGraph`].
    pub fn from_manifest(
        manifest: &GraphManifest,
    ) -> Result<ComputeGraph<graph::Validated>, GraphError> {
        manifest.validate()?;

        let mut ids = HashMap::with_capacity(manifest.nodes.len());
        let mut nodes = Vec::with_capacity(manifest.nodes.len());
        for (i, mn) in manifest.nodes.iter().enumerate() {
            let metatype = OperatorMetatype::from_str_loose(&mn.node_type).ok_or_else(|| {
                GraphError::InvalidNode {
                    node: mn.name.clone(),
                    detail: format!("unrecognised node type '{}'", mn.node_type),
                }
            })?;

            let mut node = NodeDef::new(i, mn.name.clone(), metatype);
            if metatype.is_weighted() {
                node.weight_shape = mn.weight_shape.clone();
            }
            node.has_bias = mn.bias;
            ids.insert(mn.name.as_str(), i);
            nodes.push(node);
        }

        let mut edges = Vec::with_capacity(manifest.edges.len());
        for me in &manifest.edges {
            let lookup = |name: &str| {
                ids.get(name).copied().ok_or_else(|| GraphError::UnknownNode {
                    name: name.to_string(),
                })
            };
            edges.push(EdgeDef {
                from: lookup(&me.from)?,
                to: lookup(&me.to)?,
                output_port: me.output_port,
                input_port: me.input_port,
            });
        }

        ComputeGraph::new(manifest.name.clone(), nodes, edges).validate()
    }
}
