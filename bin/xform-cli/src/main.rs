// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # xform
//!
//! Command-line interface for planning and applying graph transformations.
//!
//! ## Usage
//! ```bash
//! # Inspect a graph manifest
//! xform inspect --graph ./graphs/conv-block.json
//!
//! # Print the ordered command layout for a quantization setup
//! xform plan --graph ./graphs/conv-block.json --setup ./setups/int8.json
//!
//! # Apply the layout to a fresh model state
//! xform apply --graph ./graphs/conv-block.json --setup ./setups/int8.json --config xform.toml
//! ```

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "xform",
    about = "Plan and apply quantizer insertion and parameter updates on computation graphs",
    version,
    author
)]
struct Cli {
    /// Path to a TOML transformer configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print nodes, parameters, and edges of a graph manifest.
    Inspect {
        /// Path to the graph manifest (JSON).
        #[arg(short, long)]
        graph: PathBuf,
    },

    /// Build commands from a quantization setup and print them in application order.
    Plan {
        /// Path to the graph manifest (JSON).
        #[arg(short, long)]
        graph: PathBuf,

        /// Path to the quantization setup (JSON).
        #[arg(short, long)]
        setup: PathBuf,
    },

    /// Build commands and apply them to a fresh model state.
    Apply {
        /// Path to the graph manifest (JSON).
        #[arg(short, long)]
        graph: PathBuf,

        /// Path to the quantization setup (JSON).
        #[arg(short, long)]
        setup: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Inspect { graph } => commands::inspect::execute(graph),
        Commands::Plan { graph, setup } => commands::plan::execute(graph, setup),
        Commands::Apply { graph, setup } => commands::apply::execute(graph, setup, cli.config),
    }
}
