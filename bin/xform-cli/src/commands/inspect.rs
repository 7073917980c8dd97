// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `xform inspect` command: display graph structure and parameter layout.

use super::truncate;
use std::path::PathBuf;

pub fn execute(graph_path: PathBuf) -> anyhow::Result<()> {
    let graph = graph_ir::GraphLoader::load(&graph_path).map_err(|e| {
        anyhow::anyhow!("failed to load graph from '{}': {e}", graph_path.display())
    })?;

    println!("  {}", graph.summary());
    println!();

    // ── Nodes ──────────────────────────────────────────────────
    println!(
        "  {:<4} {:<36} {:<12} {:<18} {:>5}",
        "Id", "Name", "Type", "Weight", "Bias",
    );
    println!("  {}", "-".repeat(80));
    for node in graph.iter_nodes() {
        let weight = node
            .weight_shape
            .as_ref()
            .map(|s| format!("{s:?}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<4} {:<36} {:<12} {:<18} {:>5}",
            node.node_id,
            truncate(&node.node_name, 36),
            node.metatype.as_str(),
            weight,
            if node.has_bias() { "yes" } else { "-" },
        );
    }
    println!();

    // ── Edges ──────────────────────────────────────────────────
    println!("  Edges:");
    for edge in &graph.edges {
        let from = graph.node(edge.from).map_or("?", |n| n.node_name.as_str());
        let to = graph.node(edge.to).map_or("?", |n| n.node_name.as_str());
        println!("   {from}:{} -> {to}:{}", edge.output_port, edge.input_port);
    }
    println!();
    Ok(())
}
