// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! In-memory model state: per-node parameters and attached hooks.

use crate::{SharedModuleRegistry, TransformError};
use graph_ir::{graph::Validated, ComputeGraph, OperatorMetatype};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use transform_commands::{CompressionModuleType, TargetPoint, Tensor, TransformFn};

/// A function attached at a target point.
#[derive(Debug, Clone)]
pub enum Hook {
    /// An instance owned by this attachment alone.
    Local(Arc<dyn TransformFn>),
    /// A reference to a module in the [`SharedModuleRegistry`].
    Shared {
        module_type: CompressionModuleType,
        storage_key: String,
    },
}

/// Parameters of one node.
#[derive(Debug, Clone)]
pub struct NodeState {
    pub metatype: OperatorMetatype,
    pub weight: Option<Tensor>,
    pub bias: Option<Tensor>,
}

/// The live model a [`crate::ModelTransformer`] writes to.
///
/// Parameters start zero-initialised from the graph's declared shapes.
#[derive(Debug, Clone)]
pub struct ModelState {
    name: String,
    nodes: HashMap<String, NodeState>,
    hooks: BTreeMap<TargetPoint, Vec<Hook>>,
    registry: SharedModuleRegistry,
}

impl ModelState {
    /// Builds a fresh state for every node of `graph`.
    pub fn from_graph(graph: &ComputeGraph<Validated>) -> Self {
        let nodes = graph
            .iter_nodes()
            .map(|node| {
                let weight = node
                    .weight_shape
                    .as_ref()
                    .filter(|_| node.is_weighted())
                    .map(|shape| Tensor::zeros(shape.clone()));
                let bias = node.bias_len().map(|len| Tensor::zeros(vec![len]));
                (
                    node.node_name.clone(),
                    NodeState {
                        metatype: node.metatype,
                        weight,
                        bias,
                    },
                )
            })
            .collect();

        Self {
            name: graph.name.clone(),
            nodes,
            hooks: BTreeMap::new(),
            registry: SharedModuleRegistry::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node(&self, name: &str) -> Option<&NodeState> {
        self.nodes.get(name)
    }

    pub fn weight(&self, name: &str) -> Option<&Tensor> {
        self.nodes.get(name).and_then(|n| n.weight.as_ref())
    }

    pub fn bias(&self, name: &str) -> Option<&Tensor> {
        self.nodes.get(name).and_then(|n| n.bias.as_ref())
    }

    /// Hooks at `target_point`, in attach order.
    pub fn hooks_at(&self, target_point: &TargetPoint) -> &[Hook] {
        self.hooks
            .get(target_point)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total number of hook attachments across all target points.
    pub fn num_attachments(&self) -> usize {
        self.hooks.values().map(Vec::len).sum()
    }

    pub fn registry(&self) -> &SharedModuleRegistry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut SharedModuleRegistry {
        &mut self.registry
    }

    pub(crate) fn node_mut(&mut self, name: &str) -> Result<&mut NodeState, TransformError> {
        self.nodes
            .get_mut(name)
            .ok_or_else(|| TransformError::UnknownNode {
                node: name.to_string(),
            })
    }

    /// Appends a hook. A shared key already attached at the same point is
    /// not attached again; returns `false` in that case.
    pub(crate) fn attach(&mut self, target_point: &TargetPoint, hook: Hook) -> bool {
        let hooks = self.hooks.entry(target_point.clone()).or_default();
        if let Hook::Shared {
            module_type,
            storage_key,
        } = &hook
        {
            let already = hooks.iter().any(|h| {
                matches!(h, Hook::Shared { module_type: t, storage_key: k }
                    if t == module_type && k == storage_key)
            });
            if already {
                return false;
            }
        }
        hooks.push(hook);
        true
    }

    /// Runs the hooks at `target_point` over `input`, in attach order.
    pub fn run_hooks(&self, target_point: &TargetPoint, input: &Tensor) -> Result<Tensor, TransformError> {
        let mut out = input.clone();
        for hook in self.hooks_at(target_point) {
            let module = match hook {
                Hook::Local(module) => module,
                Hook::Shared {
                    module_type,
                    storage_key,
                } => self.registry.get(*module_type, storage_key).ok_or_else(|| {
                    TransformError::UnknownStorageKey {
                        key: storage_key.clone(),
                        module_type: *module_type,
                    }
                })?,
            };
            out = module.forward(&out);
        }
        Ok(out)
    }
}
