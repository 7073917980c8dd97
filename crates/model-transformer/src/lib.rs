// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-transformer
//!
//! A reference executor for transformation commands.
//!
//! The executor takes:
//! - A [`ModelState`] built from a validated `ComputeGraph`: per-node
//!   parameters plus a table of hooks attached at target points.
//! - A `TransformationLayout` of commands from `transform-commands`.
//!
//! It applies the commands in priority order and is the only writer of model
//! state. Shared insertions go through a [`SharedModuleRegistry`] that
//! registers each storage key once and attaches that single instance at
//! every requested point.
//!
//! # Example
//! ```no_run
//! use model_transformer::{ModelState, ModelTransformer, TransformerConfig};
//! use transform_commands::TransformationLayout;
//! use graph_ir::GraphLoader;
//! use std::path::Path;
//!
//! let graph = GraphLoader::load(Path::new("./graphs/conv-block.json")).unwrap();
//! let mut state = ModelState::from_graph(&graph);
//! let layout = TransformationLayout::new();
//! let stats = ModelTransformer::new(TransformerConfig::default())
//!     .transform(&mut state, &layout)
//!     .unwrap();
//! println!("{}", stats.summary());
//! ```

mod config;
mod error;
mod model_state;
mod registry;
mod stats;
mod transformer;

pub use config::TransformerConfig;
pub use error::TransformError;
pub use model_state::{Hook, ModelState, NodeState};
pub use registry::{DuplicatePolicy, Registration, SharedModuleRegistry};
pub use stats::TransformStats;
pub use transformer::ModelTransformer;
