// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: graph → command factory → layout → executor.
//!
//! These tests exercise the complete flow from a JSON graph manifest to a
//! transformed model state, proving the three crates compose and that the
//! storage-key contract holds end-to-end.

use graph_ir::{graph::Validated, ComputeGraph, GraphLoader, GraphManifest};
use model_transformer::{Hook, ModelState, ModelTransformer, TransformerConfig};
use std::sync::Arc;
use transform_commands::{
    create_bias_correction_command, create_command_to_update_weight,
    create_quantizer_insertion_command, Command, CompressionModuleType, FakeQuantizer,
    QuantizerConfig, QuantizerId, TargetPoint, TargetType, Tensor, TransformFn,
    TransformationLayout, TransformationPriority, ValueKind,
};

// ── Helpers ────────────────────────────────────────────────────

const MANIFEST: &str = r#"{
    "name": "residual-block",
    "nodes": [
        { "name": "input", "type": "input" },
        { "name": "N1", "type": "conv2d", "weight_shape": [4, 3, 3, 3], "bias": true },
        { "name": "relu", "type": "relu" },
        { "name": "N2", "type": "conv2d", "weight_shape": [4, 4, 3, 3] },
        { "name": "N3", "type": "add" },
        { "name": "output", "type": "output" }
    ],
    "edges": [
        { "from": "input", "to": "N1" },
        { "from": "N1", "to": "relu" },
        { "from": "relu", "to": "N2" },
        { "from": "relu", "to": "N3", "input_port": 0 },
        { "from": "N2", "to": "N3", "input_port": 1 },
        { "from": "N3", "to": "output" }
    ]
}"#;

fn graph() -> ComputeGraph<Validated> {
    let manifest = GraphManifest::from_json(MANIFEST).unwrap();
    GraphLoader::from_manifest(&manifest).unwrap()
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("model_transformer=debug")
        .with_test_writer()
        .try_init();
}

fn quantizer(scale: f32) -> Arc<dyn TransformFn> {
    Arc::new(
        FakeQuantizer::new(QuantizerConfig {
            scale,
            ..Default::default()
        })
        .unwrap(),
    )
}

// ── Scenarios ──────────────────────────────────────────────────

#[test]
fn test_weight_update_scenario() {
    let g = graph();
    let w = Tensor::filled(vec![4, 3, 3, 3], 0.1);
    let cmd = create_command_to_update_weight(g.node_by_name("N1").unwrap(), w.clone()).unwrap();

    assert_eq!(cmd.target_point().target_type(), TargetType::Layer);
    assert_eq!(cmd.target_point().target_node_name(), "N1");
    assert_eq!(cmd.target_point().input_port_id(), None);
    assert_eq!(cmd.value(), &w);

    let mut state = ModelState::from_graph(&g);
    let mut layout = TransformationLayout::new();
    layout.register(cmd);
    ModelTransformer::default().transform(&mut state, &layout).unwrap();
    assert_eq!(state.weight("N1"), Some(&w));
}

#[test]
fn test_shared_insertion_scenario() {
    let tp = TargetPoint::new(TargetType::OperatorPreHook, "N2", Some(0)).unwrap();
    let q = quantizer(1.0);
    let Command::SharedInsertion(cmd) = create_quantizer_insertion_command(&tp, q.clone()) else {
        panic!("activation targets must produce a shared insertion");
    };

    assert_eq!(cmd.target_points(), std::slice::from_ref(&tp));
    assert!(Arc::ptr_eq(cmd.transform_fn(), &q));
    let expected_key = QuantizerId::NonWeight {
        target_node_name: "N2".into(),
        input_port_id: Some(0),
    }
    .storage_key();
    assert_eq!(cmd.storage_key(), expected_key);
    assert_eq!(cmd.module_type(), CompressionModuleType::ExternalQuantizer);
    assert_eq!(cmd.priority(), TransformationPriority::QuantizationPriority);
}

#[test]
fn test_identical_targets_merge_into_one_module() {
    let g = graph();
    let q = quantizer(0.5);
    let mut layout = TransformationLayout::new();
    for _ in 0..2 {
        let tp = TargetPoint::pre_hook("N3", 1).unwrap();
        layout.register(create_quantizer_insertion_command(&tp, q.clone()));
    }
    assert_eq!(layout.storage_keys(), vec!["N3|INPUT1"]);

    let mut state = ModelState::from_graph(&g);
    let stats = ModelTransformer::default().transform(&mut state, &layout).unwrap();
    assert_eq!(stats.shared_commands, 2);
    assert_eq!(stats.modules_registered, 1);
    assert_eq!(state.registry().len(), 1);

    let tp = TargetPoint::pre_hook("N3", 1).unwrap();
    assert!(matches!(
        state.hooks_at(&tp),
        [Hook::Shared { storage_key, .. }] if storage_key == "N3|INPUT1"
    ));
}

// ── Full pipeline ──────────────────────────────────────────────

#[test]
fn test_full_quantization_pass() {
    init_logging();
    let g = graph();
    let q_act = quantizer(0.5);
    let mut layout = TransformationLayout::new();

    // Weight quantizers: one private instance per weighted node.
    for node in g.weighted_nodes() {
        let tp = TargetPoint::weights(node.node_name.as_str()).unwrap();
        layout.register(create_quantizer_insertion_command(&tp, quantizer(0.125)));
    }
    // Activation quantizers on every input edge.
    for node in g.iter_nodes() {
        for edge in g.input_edges(node.node_id) {
            let tp = TargetPoint::pre_hook(node.node_name.as_str(), edge.input_port).unwrap();
            layout.register(create_quantizer_insertion_command(&tp, q_act.clone()));
        }
    }
    // A bias correction, registered last but applied first.
    let n1 = g.node_by_name("N1").unwrap();
    layout.register(create_bias_correction_command(n1, Tensor::filled(vec![4], 0.3)).unwrap());

    let ordered = layout.ordered();
    assert!(matches!(ordered[0], Command::Value(v) if v.kind() == ValueKind::Bias));
    assert!(ordered[1..]
        .iter()
        .all(|c| c.priority() == TransformationPriority::QuantizationPriority));

    let mut state = ModelState::from_graph(&g);
    let stats = ModelTransformer::new(TransformerConfig::default())
        .transform(&mut state, &layout)
        .unwrap();

    assert_eq!(stats.value_commands, 1);
    assert_eq!(stats.insertion_commands, 2);
    assert_eq!(stats.shared_commands, g.num_edges());
    assert_eq!(stats.modules_registered, g.num_edges());
    assert_eq!(state.num_attachments(), 2 + g.num_edges());
    assert_eq!(state.bias("N1").unwrap().values(), &[0.3; 4]);

    // The weight quantizer at N2 is private and quantizes on a 1/8 grid.
    let w_out = state
        .run_hooks(&TargetPoint::weights("N2").unwrap(), &Tensor::from_vec_1d(vec![0.2]))
        .unwrap();
    assert_eq!(w_out.values(), &[0.25]);

    // The activation quantizer at N3's second input uses the shared instance.
    let a_out = state
        .run_hooks(&TargetPoint::pre_hook("N3", 1).unwrap(), &Tensor::from_vec_1d(vec![0.7]))
        .unwrap();
    assert_eq!(a_out.values(), &[0.5]);
}

#[test]
fn test_transform_is_repeatable() {
    let g = graph();
    let q = quantizer(1.0);
    let mut layout = TransformationLayout::new();
    layout.register(create_quantizer_insertion_command(
        &TargetPoint::post_hook("relu").unwrap(),
        q,
    ));
    layout.register(
        create_command_to_update_weight(
            g.node_by_name("N2").unwrap(),
            Tensor::filled(vec![4, 4, 3, 3], 1.0),
        )
        .unwrap(),
    );

    let transformer = ModelTransformer::default();
    let mut state = ModelState::from_graph(&g);
    transformer.transform(&mut state, &layout).unwrap();
    let attachments = state.num_attachments();

    // Re-applying the same layout neither duplicates hooks nor changes values.
    let stats = transformer.transform(&mut state, &layout).unwrap();
    assert_eq!(state.num_attachments(), attachments);
    assert_eq!(stats.modules_reused, 1);
    assert_eq!(stats.duplicate_attachments, 1);
    assert_eq!(state.weight("N2").unwrap().values()[0], 1.0);
}
