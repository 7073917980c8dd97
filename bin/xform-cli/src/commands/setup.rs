// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Quantization setup files and the layout built from them.
//!
//! # Format
//! ```json
//! {
//!   "quantizer": { "num_bits": 8, "mode": "symmetric", "scale": 0.05 },
//!   "weights": ["conv1", "conv2"],
//!   "activations": [
//!     { "node": "conv2", "port": 0 },
//!     { "node": "relu1" }
//!   ],
//!   "bias_corrections": [{ "node": "conv1", "values": [0.1, -0.2] }],
//!   "weight_updates": [{ "node": "fc", "values": [1.0, 0.5, 0.25, 0.0] }]
//! }
//! ```
//!
//! An activation entry with a port targets that input edge; without a port it
//! targets the node's output. Each weight entry gets its own quantizer
//! instance, as does each distinct activation storage key; entries that map to
//! the same key share one. Value entries are flat and take their shape from
//! the graph.

use anyhow::Context;
use graph_ir::{graph::Validated, ComputeGraph};
use std::collections::hash_map::{Entry, HashMap};
use std::path::Path;
use std::sync::Arc;
use transform_commands::{
    create_bias_correction_command, create_command_to_update_weight,
    create_quantizer_insertion_command, FakeQuantizer, QuantizerConfig, QuantizerId, TargetPoint,
    Tensor, TransformFn, TransformationLayout,
};

#[derive(Debug, Clone, serde::Deserialize)]
pub struct QuantizationSetup {
    #[serde(default)]
    pub quantizer: QuantizerConfig,
    #[serde(default)]
    pub weights: Vec<String>,
    #[serde(default)]
    pub activations: Vec<ActivationEntry>,
    #[serde(default)]
    pub bias_corrections: Vec<ValueEntry>,
    #[serde(default)]
    pub weight_updates: Vec<ValueEntry>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ActivationEntry {
    pub node: String,
    #[serde(default)]
    pub port: Option<usize>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ValueEntry {
    pub node: String,
    pub values: Vec<f32>,
}

impl QuantizationSetup {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read setup '{}'", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("cannot parse setup '{}'", path.display()))
    }

    /// Builds the command layout, checking every node against `graph`.
    pub fn build_layout(&self, graph: &ComputeGraph<Validated>) -> anyhow::Result<TransformationLayout> {
        let mut layout = TransformationLayout::new();

        for entry in &self.bias_corrections {
            let node = graph.node_by_name(&entry.node)?;
            let len = node.bias_len().unwrap_or(entry.values.len());
            let bias = Tensor::new(vec![len], entry.values.clone())?;
            layout.register(create_bias_correction_command(node, bias)?);
        }

        for entry in &self.weight_updates {
            let node = graph.node_by_name(&entry.node)?;
            let shape = node
                .weight_shape
                .clone()
                .unwrap_or_else(|| vec![entry.values.len()]);
            let weight = Tensor::new(shape, entry.values.clone())?;
            layout.register(create_command_to_update_weight(node, weight)?);
        }

        for name in &self.weights {
            let node = graph.node_by_name(name)?;
            anyhow::ensure!(node.is_weighted(), "node '{name}' has no weight to quantize");
            let quantizer: Arc<dyn TransformFn> = Arc::new(FakeQuantizer::new(self.quantizer.clone())?);
            layout.register(create_quantizer_insertion_command(
                &TargetPoint::weights(name.as_str())?,
                quantizer,
            ));
        }

        let mut activation_quantizers: HashMap<String, Arc<dyn TransformFn>> = HashMap::new();
        for entry in &self.activations {
            let node = graph.node_by_name(&entry.node)?;
            let target = match entry.port {
                Some(port) => {
                    anyhow::ensure!(
                        graph.input_edges(node.node_id).iter().any(|e| e.input_port == port),
                        "node '{}' has no input port {port}",
                        entry.node,
                    );
                    TargetPoint::pre_hook(entry.node.as_str(), port)?
                }
                None => TargetPoint::post_hook(entry.node.as_str())?,
            };
            let quantizer = match activation_quantizers
                .entry(QuantizerId::for_target_point(&target).storage_key())
            {
                Entry::Occupied(slot) => slot.get().clone(),
                Entry::Vacant(slot) => {
                    let quantizer: Arc<dyn TransformFn> =
                        Arc::new(FakeQuantizer::new(self.quantizer.clone())?);
                    slot.insert(quantizer).clone()
                }
            };
            layout.register(create_quantizer_insertion_command(&target, quantizer));
        }

        tracing::info!(
            "built {} commands ({} storage keys)",
            layout.len(),
            layout.storage_keys().len(),
        );
        Ok(layout)
    }
}
