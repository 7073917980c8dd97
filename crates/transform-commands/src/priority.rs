// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Transformation priorities.
//!
//! When several commands touch the same location, the executor applies them
//! in ascending priority ordinal. Commands with equal ordinals keep the order
//! in which they were registered (see [`crate::TransformationLayout::ordered`]).

use std::cmp::Ordering;

/// Ordinal levels that order command application at a shared location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformationPriority {
    /// Priority of value replacements and unprioritised insertions.
    #[default]
    DefaultPriority,
    /// Observers collecting full-precision statistics.
    Fp32TensorStatisticsObservation,
    /// Pruning masks.
    PruningPriority,
    /// Sparsification masks.
    SparsificationPriority,
    /// Quantizer insertion; runs after every other level.
    QuantizationPriority,
}

impl TransformationPriority {
    /// All levels in ascending ordinal order.
    pub const ALL: [Self; 5] = [
        Self::DefaultPriority,
        Self::Fp32TensorStatisticsObservation,
        Self::PruningPriority,
        Self::SparsificationPriority,
        Self::QuantizationPriority,
    ];

    /// Returns the numeric ordinal of this level.
    pub fn ordinal(self) -> u32 {
        match self {
            Self::DefaultPriority => 0,
            Self::Fp32TensorStatisticsObservation => 1,
            Self::PruningPriority => 2,
            Self::SparsificationPriority => 3,
            Self::QuantizationPriority => 11,
        }
    }

    /// Returns a human-readable label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DefaultPriority => "default",
            Self::Fp32TensorStatisticsObservation => "fp32_tensor_statistics_observation",
            Self::PruningPriority => "pruning",
            Self::SparsificationPriority => "sparsification",
            Self::QuantizationPriority => "quantization",
        }
    }
}

impl PartialOrd for TransformationPriority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TransformationPriority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordinal().cmp(&other.ordinal())
    }
}

impl std::fmt::Display for TransformationPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
