// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Computation graph: operations connected by port-addressed edges.
//!
//! # Type-State Pattern
//!
//! ```text
//! ComputeGraph<Loaded>     nodes and edges parsed, not yet checked.
//!       │  .validate()
//!       ▼
//! ComputeGraph<Validated>  names unique, edges well-formed, ready for passes.
//! ```
//!
//! Lookups by name and port are only offered on the validated graph, so a
//! pass can never address a node in a graph whose names might collide.

use crate::{EdgeDef, GraphError, NodeDef};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Largest element count a parameter tensor may declare: the number of `f32`
/// values that fit in a single allocation.
pub const MAX_TENSOR_ELEMENTS: usize = isize::MAX as usize / std::mem::size_of::<f32>();

// ── Type-state markers ─────────────────────────────────────────────

/// Marker: graph has been loaded but not validated.
#[derive(Debug, Clone)]
pub struct Loaded;

/// Marker: graph has been validated.
#[derive(Debug, Clone)]
pub struct Validated;

/// Sealed trait for graph states.
pub trait GraphState: fmt::Debug + Clone {}
impl GraphState for Loaded {}
impl GraphState for Validated {}

// ── ComputeGraph ───────────────────────────────────────────────────

/// A computation graph. `S` encodes the validation state at compile time.
#[derive(Debug, Clone)]
pub struct ComputeGraph<S: GraphState = Loaded> {
    /// Human-readable graph name.
    pub name: String,
    /// Nodes, indexed by `node_id`.
    pub nodes: Vec<NodeDef>,
    /// Directed edges between node ports.
    pub edges: Vec<EdgeDef>,
    by_name: HashMap<String, usize>,
    _state: std::marker::PhantomData<S>,
}

// ── Loaded state ───────────────────────────────────────────────────

impl ComputeGraph<Loaded> {
    /// Creates a new graph in the `Loaded` state.
    pub fn new(name: String, nodes: Vec<NodeDef>, edges: Vec<EdgeDef>) -> Self {
        Self {
            name,
            nodes,
            edges,
            by_name: HashMap::new(),
            _state: std::marker::PhantomData,
        }
    }

    /// Validates the graph and transitions to the `Validated` state.
    ///
    /// # Checks
    /// - The graph is non-empty.
    /// - Node ids are consecutive starting from 0.
    /// - Node names are non-empty and unique.
    /// - Only weight-bearing nodes declare a bias, and their weight has a
    ///   leading (output-channel) dimension to size it.
    /// - Weight shapes hold at most [`MAX_TENSOR_ELEMENTS`] elements.
    /// - Edges reference existing nodes and are not self-loops.
    /// - Each consumer input port is fed by at most one edge.
    pub fn validate(self) -> Result<ComputeGraph<Validated>, GraphError> {
        if self.nodes.is_empty() {
            return Err(GraphError::InvalidGraph(
                "graph contains no nodes".into(),
            ));
        }

        let mut by_name = HashMap::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            if node.node_id != i {
                return Err(GraphError::InvalidNode {
                    node: node.node_name.clone(),
                    detail: format!("expected id {i}, got {}", node.node_id),
                });
            }
            if node.node_name.is_empty() {
                return Err(GraphError::InvalidNode {
                    node: format!("#{i}"),
                    detail: "node name is empty".into(),
                });
            }
            if by_name.insert(node.node_name.clone(), i).is_some() {
                return Err(GraphError::InvalidNode {
                    node: node.node_name.clone(),
                    detail: "duplicate node name".into(),
                });
            }
            if node.has_bias && !node.is_weighted() {
                return Err(GraphError::InvalidNode {
                    node: node.node_name.clone(),
                    detail: "bias declared on a node without weights".into(),
                });
            }
            if node.has_bias && node.bias_len().is_none() {
                return Err(GraphError::InvalidNode {
                    node: node.node_name.clone(),
                    detail: "bias declared on a rank-0 weight".into(),
                });
            }
            if let Some(shape) = &node.weight_shape {
                match node.weight_elements() {
                    Some(n) if n <= MAX_TENSOR_ELEMENTS => {}
                    _ => {
                        return Err(GraphError::InvalidNode {
                            node: node.node_name.clone(),
                            detail: format!("weight shape {shape:?} is too large"),
                        })
                    }
                }
            }
        }

        let mut fed_ports = HashSet::with_capacity(self.edges.len());
        for edge in &self.edges {
            for id in [edge.from, edge.to] {
                if id >= self.nodes.len() {
                    return Err(GraphError::InvalidGraph(format!(
                        "edge {} -> {} references missing node {id}",
                        edge.from, edge.to,
                    )));
                }
            }
            if edge.from == edge.to {
                return Err(GraphError::InvalidGraph(format!(
                    "self-loop on node '{}'",
                    self.nodes[edge.from].node_name,
                )));
            }
            if !fed_ports.insert((edge.to, edge.input_port)) {
                return Err(GraphError::InvalidNode {
                    node: self.nodes[edge.to].node_name.clone(),
                    detail: format!("input port {} has more than one producer", edge.input_port),
                });
            }
        }

        let weighted = self.nodes.iter().filter(|n| n.is_weighted()).count();
        tracing::debug!(
            "validated graph '{}': {} nodes ({} weighted), {} edges",
            self.name,
            self.nodes.len(),
            weighted,
            self.edges.len(),
        );

        Ok(ComputeGraph {
            name: self.name,
            nodes: self.nodes,
            edges: self.edges,
            by_name,
            _state: std::marker::PhantomData,
        })
    }
}

// ── Validated state ────────────────────────────────────────────────

impl ComputeGraph<Validated> {
    /// Returns the total number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the total number of edges.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Returns an iterator over the nodes in id order.
    pub fn iter_nodes(&self) -> impl Iterator<Item = &NodeDef> {
        self.nodes.iter()
    }

    /// Returns a node by id.
    pub fn node(&self, id: usize) -> Option<&NodeDef> {
        self.nodes.get(id)
    }

    /// Returns a node by its unique name.
    pub fn node_by_name(&self, name: &str) -> Result<&NodeDef, GraphError> {
        self.by_name
            .get(name)
            .map(|&id| &self.nodes[id])
            .ok_or_else(|| GraphError::UnknownNode {
                name: name.to_string(),
            })
    }

    /// Returns the edges feeding into node `id`, ordered by input port.
    pub fn input_edges(&self, id: usize) -> Vec<&EdgeDef> {
        let mut edges: Vec<_> = self.edges.iter().filter(|e| e.to == id).collect();
        edges.sort_by_key(|e| e.input_port);
        edges
    }

    /// Returns the edges leaving node `id`.
    pub fn output_edges(&self, id: usize) -> Vec<&EdgeDef> {
        self.edges.iter().filter(|e| e.from == id).collect()
    }

    /// Returns the consumers of `output_port` on node `id` as `(node, input_port)`.
    pub fn consumers_of(&self, id: usize, output_port: usize) -> Vec<(&NodeDef, usize)> {
        self.edges
            .iter()
            .filter(|e| e.from == id && e.output_port == output_port)
            .map(|e| (&self.nodes[e.to], e.input_port))
            .collect()
    }

    /// Returns the weight-bearing nodes in id order.
    pub fn weighted_nodes(&self) -> impl Iterator<Item = &NodeDef> {
        self.nodes.iter().filter(|n| n.is_weighted())
    }

    /// Returns a summary string describing the graph.
    pub fn summary(&self) -> String {
        let weighted = self.weighted_nodes().count();
        let with_bias = self.nodes.iter().filter(|n| n.has_bias()).count();
        format!(
            "Graph '{}': {} nodes ({} weighted, {} with bias), {} edges",
            self.name,
            self.num_nodes(),
            weighted,
            with_bias,
            self.num_edges(),
        )
    }
}

// ── Shared implementations ─────────────────────────────────────────

impl<S: GraphState> fmt::Display for ComputeGraph<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ComputeGraph '{}' ({} nodes):", self.name, self.nodes.len())?;
        for node in &self.nodes {
            writeln!(f, "  {}", node.summary())?;
        }
        Ok(())
    }
}
