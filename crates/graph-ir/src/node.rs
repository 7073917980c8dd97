// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Node and edge definitions for the computation graph.
//!
//! A [`NodeDef`] carries the node's stable name and the layout of its
//! parameters (whether it owns a weight tensor, and whether it has a bias).
//! Parameter *data* is never stored here; the executor owns it.

/// The kind of operation a node performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorMetatype {
    /// Graph input placeholder.
    Input,
    /// Graph output placeholder.
    Output,
    /// 2-D convolution.
    Conv2d,
    /// Fully connected layer.
    Linear,
    /// Batch normalization.
    BatchNorm,
    /// Embedding lookup table.
    Embedding,
    /// Matrix multiplication of two activations.
    MatMul,
    /// Elementwise addition.
    Add,
    /// Rectified linear unit.
    Relu,
    /// Gaussian error linear unit.
    Gelu,
    /// Softmax over the last dimension.
    Softmax,
    /// Layer normalization.
    LayerNorm,
    /// Shape-only reinterpretation.
    Reshape,
}

impl OperatorMetatype {
    /// Parses a metatype from a manifest string.
    ///
    /// Accepts snake_case names and the usual framework aliases
    /// (`"conv"`, `"fc"`, `"bn"`, `"ln"`).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "input" | "nncf_model_input" | "placeholder" => Some(Self::Input),
            "output" | "nncf_model_output" => Some(Self::Output),
            "conv2d" | "conv" => Some(Self::Conv2d),
            "linear" | "fc" | "dense" | "gemm" => Some(Self::Linear),
            "batch_norm" | "batchnorm" | "bn" => Some(Self::BatchNorm),
            "embedding" | "embed" => Some(Self::Embedding),
            "matmul" | "mat_mul" | "bmm" => Some(Self::MatMul),
            "add" | "sum" => Some(Self::Add),
            "relu" => Some(Self::Relu),
            "gelu" => Some(Self::Gelu),
            "softmax" => Some(Self::Softmax),
            "layer_norm" | "layernorm" | "ln" => Some(Self::LayerNorm),
            "reshape" | "view" | "flatten" => Some(Self::Reshape),
            _ => None,
        }
    }

    /// Returns a human-readable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
            Self::Conv2d => "conv2d",
            Self::Linear => "linear",
            Self::BatchNorm => "batch_norm",
            Self::Embedding => "embedding",
            Self::MatMul => "matmul",
            Self::Add => "add",
            Self::Relu => "relu",
            Self::Gelu => "gelu",
            Self::Softmax => "softmax",
            Self::LayerNorm => "layer_norm",
            Self::Reshape => "reshape",
        }
    }

    /// Returns `true` for operations that own a weight tensor.
    pub fn is_weighted(&self) -> bool {
        matches!(
            self,
            Self::Conv2d | Self::Linear | Self::BatchNorm | Self::Embedding | Self::LayerNorm
        )
    }
}

impl std::fmt::Display for OperatorMetatype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single operation in the computation graph.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NodeDef {
    /// Position of the node in the graph's node list (0-based).
    pub node_id: usize,
    /// Stable, unique name (e.g., `"ResNet/Conv2d[conv1]/conv2d_0"`).
    pub node_name: String,
    /// The kind of operation.
    pub metatype: OperatorMetatype,
    /// Shape of the weight tensor, if the operation owns one.
    pub weight_shape: Option<Vec<usize>>,
    /// Whether the operation has a bias parameter.
    pub has_bias: bool,
}

impl NodeDef {
    /// Creates a node without parameters.
    pub fn new(node_id: usize, node_name: impl Into<String>, metatype: OperatorMetatype) -> Self {
        Self {
            node_id,
            node_name: node_name.into(),
            metatype,
            weight_shape: None,
            has_bias: false,
        }
    }

    /// Attaches a weight tensor of the given shape.
    pub fn with_weight(mut self, shape: Vec<usize>) -> Self {
        self.weight_shape = Some(shape);
        self
    }

    /// Marks the node as having a bias.
    pub fn with_bias(mut self) -> Self {
        self.has_bias = true;
        self
    }

    /// Returns `true` if this node owns a weight tensor.
    pub fn is_weighted(&self) -> bool {
        self.metatype.is_weighted() && self.weight_shape.is_some()
    }

    /// Returns `true` if this node has a bias parameter.
    pub fn has_bias(&self) -> bool {
        self.has_bias
    }

    /// Number of bias elements: the output-channel dimension of the weight.
    pub fn bias_len(&self) -> Option<usize> {
        if !self.has_bias {
            return None;
        }
        self.weight_shape
            .as_ref()
            .and_then(|s| s.first().copied())
    }

    /// Number of weight elements, or `None` if the node has no weight or the
    /// product of its dimensions overflows `usize`.
    pub fn weight_elements(&self) -> Option<usize> {
        self.weight_shape
            .as_ref()?
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
    }

    /// Returns a concise summary string for display.
    pub fn summary(&self) -> String {
        let weight = match &self.weight_shape {
            Some(shape) => format!("weight {shape:?}"),
            None => "no weight".to_string(),
        };
        let bias = if self.has_bias { ", bias" } else { "" };
        format!(
            "[{}] {} ({}): {weight}{bias}",
            self.node_id, self.node_name, self.metatype
        )
    }
}

/// A directed edge from a producer's output port to a consumer's input port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct EdgeDef {
    /// Producer node id.
    pub from: usize,
    /// Consumer node id.
    pub to: usize,
    /// Output port on the producer.
    pub output_port: usize,
    /// Input port on the consumer.
    pub input_port: usize,
}

impl EdgeDef {
    /// Creates an edge between port 0 of `from` and `input_port` of `to`.
    pub fn new(from: usize, to: usize, input_port: usize) -> Self {
        Self {
            from,
            to,
            output_port: 0,
            input_port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metatype_from_str() {
        assert_eq!(OperatorMetatype::from_str_loose("conv"), Some(OperatorMetatype::Conv2d));
        assert_eq!(OperatorMetatype::from_str_loose("FC"), Some(OperatorMetatype::Linear));
        assert_eq!(OperatorMetatype::from_str_loose("bn"), Some(OperatorMetatype::BatchNorm));
        assert_eq!(OperatorMetatype::from_str_loose("view"), Some(OperatorMetatype::Reshape));
        assert_eq!(OperatorMetatype::from_str_loose("bogus"), None);
    }

    #[test]
    fn test_metatype_display() {
        assert_eq!(format!("{}", OperatorMetatype::BatchNorm), "batch_norm");
        assert_eq!(format!("{}", OperatorMetatype::Conv2d), "conv2d");
    }

    #[test]
    fn test_is_weighted() {
        let conv = NodeDef::new(0, "conv", OperatorMetatype::Conv2d).with_weight(vec![8, 3, 3, 3]);
        assert!(conv.is_weighted());

        // A weighted metatype without a declared weight shape is not weight-bearing.
        let bare = NodeDef::new(1, "conv_bare", OperatorMetatype::Conv2d);
        assert!(!bare.is_weighted());

        let relu = NodeDef::new(2, "relu", OperatorMetatype::Relu).with_weight(vec![1]);
        assert!(!relu.is_weighted());
    }

    #[test]
    fn test_bias_len() {
        let fc = NodeDef::new(0, "fc", OperatorMetatype::Linear)
            .with_weight(vec![10, 64])
            .with_bias();
        assert_eq!(fc.bias_len(), Some(10));

        let no_bias = NodeDef::new(1, "fc2", OperatorMetatype::Linear).with_weight(vec![10, 64]);
        assert_eq!(no_bias.bias_len(), None);
    }

    #[test]
    fn test_summary() {
        let fc = NodeDef::new(3, "head/fc", OperatorMetatype::Linear)
            .with_weight(vec![10, 64])
            .with_bias();
        let s = fc.summary();
        assert!(s.contains("[3]"));
        assert!(s.contains("linear"));
        assert!(s.contains("bias"));
    }

    #[test]
    fn test_serde_roundtrip() {
        let node = NodeDef::new(0, "conv", OperatorMetatype::Conv2d).with_weight(vec![4, 1, 3, 3]);
        let json = serde_json::to_string(&node).unwrap();
        let back: NodeDef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_weight_elements() {
        let conv = NodeDef::new(0, "conv", OperatorMetatype::Conv2d).with_weight(vec![4, 3, 3, 3]);
        assert_eq!(conv.weight_elements(), Some(108));
        assert_eq!(NodeDef::new(1, "relu", OperatorMetatype::Relu).weight_elements(), None);

        let huge = NodeDef::new(2, "fc", OperatorMetatype::Linear).with_weight(vec![usize::MAX, 2]);
        assert_eq!(huge.weight_elements(), None);
    }
}
