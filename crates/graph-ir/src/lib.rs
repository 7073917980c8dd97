// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # graph-ir
//!
//! A minimal computation-graph IR for the transformation passes.
//!
//! The command layer never walks the graph itself; it only needs stable node
//! names and enough type information to tell weight-bearing operations from
//! the rest. This crate provides exactly that:
//!
//! - [`OperatorMetatype`]: the kind of operation a node performs.
//! - [`NodeDef`]: a node with its unique name and parameter layout.
//! - [`EdgeDef`]: a producer output port wired to a consumer input port.
//! - [`ComputeGraph`]: nodes and edges with a **type-state pattern**
//!   (`Loaded` → `Validated`).
//! - [`GraphLoader`] / [`GraphManifest`]: JSON graph descriptors.
//!
//! # Example
//! ```no_run
//! use graph_ir::GraphLoader;
//! use std::path::Path;
//!
//! let graph = GraphLoader::load(Path::new("./graphs/resnet-block.json")).unwrap();
//! println!("{}", graph.summary());
//! for node in graph.weighted_nodes() {
//!     println!("  {}", node.summary());
//! }
//! ```

mod error;
pub mod graph;
mod loader;
pub(crate) mod manifest;
mod node;

pub use error::GraphError;
pub use graph::ComputeGraph;
pub use loader::GraphLoader;
pub use manifest::{GraphManifest, ManifestEdge, ManifestNode};
pub use node::{EdgeDef, NodeDef, OperatorMetatype};
