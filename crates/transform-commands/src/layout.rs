// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Transformation layout: the collection of commands handed to an executor.

use crate::{Command, CommandSummary};

/// An ordered collection of commands.
///
/// Commands are kept in registration order. [`ordered`](Self::ordered)
/// returns them sorted by priority ordinal, ascending; commands with equal
/// priority keep their registration order.
#[derive(Debug, Clone, Default)]
pub struct TransformationLayout {
    commands: Vec<Command>,
}

impl TransformationLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a command.
    pub fn register(&mut self, command: impl Into<Command>) {
        self.commands.push(command.into());
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Iterates in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// Commands in application order.
    pub fn ordered(&self) -> Vec<&Command> {
        let mut ordered: Vec<&Command> = self.commands.iter().collect();
        // `sort_by_key` is stable, which gives the registration-order tiebreak.
        ordered.sort_by_key(|c| c.priority());
        ordered
    }

    /// Distinct storage keys of shared insertions, in first-seen order.
    pub fn storage_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for command in &self.commands {
            if let Command::SharedInsertion(cmd) = command {
                if !keys.contains(&cmd.storage_key()) {
                    keys.push(cmd.storage_key());
                }
            }
        }
        keys
    }

    /// Payload-free summaries in application order.
    pub fn summaries(&self) -> Vec<CommandSummary> {
        self.ordered().into_iter().map(Command::describe).collect()
    }
}

impl Extend<Command> for TransformationLayout {
    fn extend<I: IntoIterator<Item = Command>>(&mut self, iter: I) {
        self.commands.extend(iter);
    }
}

impl FromIterator<Command> for TransformationLayout {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        Self {
            commands: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        create_quantizer_insertion_command, FakeQuantizer, InsertionCommand, QuantizerConfig,
        TargetPoint, Tensor, TransformFn, TransformationPriority, ValueCommand, ValueKind,
    };
    use proptest::prelude::*;
    use std::sync::Arc;

    fn quantizer() -> Arc<dyn TransformFn> {
        Arc::new(FakeQuantizer::new(QuantizerConfig::default()).unwrap())
    }

    fn insertion(node: &str, priority: TransformationPriority) -> Command {
        InsertionCommand::new(TargetPoint::post_hook(node).unwrap(), quantizer(), priority).into()
    }

    #[test]
    fn test_empty() {
        let layout = TransformationLayout::new();
        assert!(layout.is_empty());
        assert!(layout.ordered().is_empty());
    }

    #[test]
    fn test_quantization_runs_after_value_updates() {
        let mut layout = TransformationLayout::new();
        layout.register(create_quantizer_insertion_command(
            &TargetPoint::weights("conv").unwrap(),
            quantizer(),
        ));
        layout.register(ValueCommand::new(
            TargetPoint::layer("conv").unwrap(),
            Tensor::zeros(vec![4]),
            ValueKind::Bias,
        ));

        let kinds: Vec<_> = layout.ordered().iter().map(|c| c.kind_str()).collect();
        assert_eq!(kinds, vec!["bias_correction", "insertion"]);
    }

    #[test]
    fn test_ties_keep_registration_order() {
        let mut layout = TransformationLayout::new();
        for node in ["c", "a", "b"] {
            layout.register(insertion(node, TransformationPriority::QuantizationPriority));
        }
        layout.register(insertion("z", TransformationPriority::PruningPriority));

        let order: Vec<_> = layout
            .ordered()
            .iter()
            .map(|c| c.target_points()[0].target_node_name().to_string())
            .collect();
        assert_eq!(order, vec!["z", "c", "a", "b"]);
    }

    #[test]
    fn test_storage_keys_deduplicated() {
        let mut layout = TransformationLayout::new();
        for _ in 0..2 {
            layout.register(create_quantizer_insertion_command(
                &TargetPoint::pre_hook("N3", 1).unwrap(),
                quantizer(),
            ));
        }
        layout.register(create_quantizer_insertion_command(
            &TargetPoint::post_hook("N4").unwrap(),
            quantizer(),
        ));
        assert_eq!(layout.len(), 3);
        assert_eq!(layout.storage_keys(), vec!["N3|INPUT1", "N4|OUTPUT"]);
    }

    #[test]
    fn test_summaries_follow_application_order() {
        let layout: TransformationLayout = vec![
            insertion("q", TransformationPriority::QuantizationPriority),
            insertion("s", TransformationPriority::SparsificationPriority),
        ]
        .into_iter()
        .collect();
        let summaries = layout.summaries();
        assert_eq!(summaries[0].priority, TransformationPriority::SparsificationPriority);
        assert_eq!(summaries[1].priority, TransformationPriority::QuantizationPriority);
    }

    proptest! {
        /// Ordered output is sorted by priority and stable within a level.
        #[test]
        fn ordered_is_stable_priority_sort(levels in proptest::collection::vec(0usize..5, 0..32)) {
            let layout: TransformationLayout = levels
                .iter()
                .enumerate()
                .map(|(i, &lvl)| insertion(&format!("n{i}"), TransformationPriority::ALL[lvl]))
                .collect();

            let ordered = layout.ordered();
            prop_assert_eq!(ordered.len(), levels.len());
            for pair in ordered.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                prop_assert!(a.priority() <= b.priority());
                if a.priority() == b.priority() {
                    let idx = |c: &Command| -> usize {
                        c.target_points()[0].target_node_name()[1..].parse().unwrap()
                    };
                    prop_assert!(idx(a) < idx(b));
                }
            }
        }
    }
}
