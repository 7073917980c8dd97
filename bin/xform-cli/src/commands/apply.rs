// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `xform apply` command: apply the layout to a fresh model state.

use super::setup::QuantizationSetup;
use model_transformer::{ModelState, ModelTransformer, TransformerConfig};
use std::path::PathBuf;

pub fn execute(
    graph_path: PathBuf,
    setup_path: PathBuf,
    config_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = match config_path {
        Some(path) => TransformerConfig::from_file(&path)?,
        None => TransformerConfig::default(),
    };

    let graph = graph_ir::GraphLoader::load(&graph_path)?;
    let setup = QuantizationSetup::from_file(&setup_path)?;
    let layout = setup.build_layout(&graph)?;

    let mut state = ModelState::from_graph(&graph);
    let stats = ModelTransformer::new(config).transform(&mut state, &layout)?;

    println!("  {}", graph.summary());
    println!("  {}", stats.summary());
    println!();
    println!("  Shared modules:");
    for kind in [
        transform_commands::CompressionModuleType::ExternalQuantizer,
        transform_commands::CompressionModuleType::ExternalOp,
    ] {
        for key in state.registry().keys(kind) {
            println!("   {kind}: {key}");
        }
    }
    Ok(())
}
