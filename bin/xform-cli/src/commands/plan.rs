// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `xform plan` command: print the command layout in application order.

use super::setup::QuantizationSetup;
use std::path::PathBuf;

pub fn execute(graph_path: PathBuf, setup_path: PathBuf) -> anyhow::Result<()> {
    let graph = graph_ir::GraphLoader::load(&graph_path)?;
    let setup = QuantizationSetup::from_file(&setup_path)?;
    let layout = setup.build_layout(&graph)?;

    println!("{}", serde_json::to_string_pretty(&layout.summaries())?);
    Ok(())
}
