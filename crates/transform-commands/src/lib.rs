// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # transform-commands
//!
//! Describes localized edits to a computation graph as immutable command
//! values, without touching the graph at description time.
//!
//! - [`TargetPoint`]: where an edit applies (target type, node name, port).
//! - [`TransformationPriority`]: the order in which edits at one location run.
//! - [`Command`]: what the edit is. Value replacement for biases and weights,
//!   single-point function insertion, or shared insertion of one function
//!   registered under a [`storage key`](QuantizerId::storage_key).
//! - [`factory`]: pure constructors that pick the right command variant.
//! - [`TransformationLayout`]: an ordered collection of commands handed to an
//!   executor.
//!
//! # Command Variants
//!
//! | Variant | Payload | Priority |
//! |---|---|---|
//! | [`ValueCommand`] | [`Tensor`] (bias or weight) | `DefaultPriority` |
//! | [`InsertionCommand`] | `Arc<dyn TransformFn>` at one point | per command |
//! | [`SharedInsertionCommand`] | one `Arc<dyn TransformFn>` at many points | per command |
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use transform_commands::{
//!     create_quantizer_insertion_command, Command, FakeQuantizer, QuantizerConfig,
//!     TargetPoint, TransformationLayout,
//! };
//!
//! let quantizer = Arc::new(FakeQuantizer::new(QuantizerConfig::default()).unwrap());
//! let target = TargetPoint::pre_hook("conv2", 0).unwrap();
//!
//! let mut layout = TransformationLayout::new();
//! layout.register(create_quantizer_insertion_command(&target, quantizer));
//!
//! match &layout.ordered()[0] {
//!     Command::SharedInsertion(cmd) => assert_eq!(cmd.storage_key(), "conv2|INPUT0"),
//!     other => panic!("unexpected command {other:?}"),
//! }
//! ```

mod command;
mod error;
pub mod factory;
mod layout;
mod priority;
mod quantizer_id;
mod target;
mod tensor;
mod transform_fn;

pub use command::{
    Command, CommandSummary, CompressionModuleType, InsertionCommand, SharedInsertionCommand,
    ValueCommand, ValueKind,
};
pub use error::CommandError;
pub use factory::{
    create_bias_correction_command, create_command_to_update_weight,
    create_quantizer_insertion_command,
};
pub use layout::TransformationLayout;
pub use priority::TransformationPriority;
pub use quantizer_id::QuantizerId;
pub use target::{TargetPoint, TargetType};
pub use tensor::Tensor;
pub use transform_fn::{FakeQuantizer, QuantizationMode, QuantizerConfig, TransformFn};
