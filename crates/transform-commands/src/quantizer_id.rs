// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Quantizer identities and the storage keys derived from them.
//!
//! A storage key is a pure string function of a target's node name and input
//! port. Two requests for the same `(node, port)` always produce the same key,
//! in any process and in any call order, so an executor can deduplicate
//! shared functions by key alone.
//!
//! # Key Format
//!
//! | Identity | Key |
//! |---|---|
//! | weight of `conv1` | `conv1|WEIGHT` |
//! | output of `relu1` | `relu1|OUTPUT` |
//! | input port 1 of `add` | `add|INPUT1` |
//!
//! The text after the last `|` is always one of the fixed suffixes, so the
//! node name can be recovered unambiguously and distinct `(node, port)` pairs
//! never share a key, even when node names themselves contain `|`.

use crate::TargetPoint;
use std::fmt;

const WEIGHT_SUFFIX: &str = "WEIGHT";
const OUTPUT_SUFFIX: &str = "OUTPUT";
const INPUT_PREFIX: &str = "INPUT";

/// Identity of a quantizer in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QuantizerId {
    /// Quantizer of an operation's weight tensor.
    Weight { target_node_name: String },
    /// Quantizer of an activation: an input edge when a port is given,
    /// otherwise the operation's output.
    NonWeight {
        target_node_name: String,
        input_port_id: Option<usize>,
    },
}

impl QuantizerId {
    /// Identity of the quantizer that would sit at `target_point`.
    pub fn for_target_point(target_point: &TargetPoint) -> Self {
        let target_node_name = target_point.target_node_name().to_string();
        if target_point.is_weight_target() {
            Self::Weight { target_node_name }
        } else {
            Self::NonWeight {
                target_node_name,
                input_port_id: target_point.input_port_id(),
            }
        }
    }

    pub fn target_node_name(&self) -> &str {
        match self {
            Self::Weight { target_node_name } | Self::NonWeight { target_node_name, .. } => {
                target_node_name
            }
        }
    }

    /// The deterministic storage key for this identity.
    pub fn storage_key(&self) -> String {
        self.to_string()
    }

    /// Parses a key produced by [`storage_key`](Self::storage_key).
    pub fn parse_storage_key(key: &str) -> Option<Self> {
        let (node, suffix) = key.rsplit_once('|')?;
        if node.is_empty() {
            return None;
        }
        let target_node_name = node.to_string();
        match suffix {
            WEIGHT_SUFFIX => Some(Self::Weight { target_node_name }),
            OUTPUT_SUFFIX => Some(Self::NonWeight {
                target_node_name,
                input_port_id: None,
            }),
            _ => {
                let digits = suffix.strip_prefix(INPUT_PREFIX)?;
                // Reject forms like "INPUT+1" or "INPUT01" that would not round-trip.
                if digits.is_empty()
                    || !digits.bytes().all(|b| b.is_ascii_digit())
                    || (digits.len() > 1 && digits.starts_with('0'))
                {
                    return None;
                }
                Some(Self::NonWeight {
                    target_node_name,
                    input_port_id: Some(digits.parse().ok()?),
                })
            }
        }
    }
}

impl fmt::Display for QuantizerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weight { target_node_name } => write!(f, "{target_node_name}|{WEIGHT_SUFFIX}"),
            Self::NonWeight {
                target_node_name,
                input_port_id: None,
            } => write!(f, "{target_node_name}|{OUTPUT_SUFFIX}"),
            Self::NonWeight {
                target_node_name,
                input_port_id: Some(port),
            } => write!(f, "{target_node_name}|{INPUT_PREFIX}{port}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_key_formats() {
        let w = QuantizerId::for_target_point(&TargetPoint::weights("conv1").unwrap());
        assert_eq!(w.storage_key(), "conv1|WEIGHT");

        let out = QuantizerId::for_target_point(&TargetPoint::post_hook("relu1").unwrap());
        assert_eq!(out.storage_key(), "relu1|OUTPUT");

        let input = QuantizerId::for_target_point(&TargetPoint::pre_hook("add", 1).unwrap());
        assert_eq!(input.storage_key(), "add|INPUT1");
    }

    #[test]
    fn test_same_address_same_key() {
        let a = QuantizerId::for_target_point(&TargetPoint::pre_hook("N3", 1).unwrap());
        let b = QuantizerId::for_target_point(&TargetPoint::pre_hook("N3", 1).unwrap());
        assert_eq!(a.storage_key(), b.storage_key());
    }

    #[test]
    fn test_pipe_in_node_name_does_not_collide() {
        // "a" at port 0 vs a node literally named "a|INPUT0" at its output.
        let a = QuantizerId::NonWeight {
            target_node_name: "a".into(),
            input_port_id: Some(0),
        };
        let b = QuantizerId::NonWeight {
            target_node_name: "a|INPUT0".into(),
            input_port_id: None,
        };
        assert_ne!(a.storage_key(), b.storage_key());
        assert_eq!(QuantizerId::parse_storage_key(&b.storage_key()), Some(b));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(QuantizerId::parse_storage_key("no_separator"), None);
        assert_eq!(QuantizerId::parse_storage_key("|OUTPUT"), None);
        assert_eq!(QuantizerId::parse_storage_key("n|INPUT"), None);
        assert_eq!(QuantizerId::parse_storage_key("n|INPUT01"), None);
        assert_eq!(QuantizerId::parse_storage_key("n|INPUT+1"), None);
        assert_eq!(QuantizerId::parse_storage_key("n|BIAS"), None);
    }

    fn node_name() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9_./|\\[\\]]{1,24}"
    }

    fn non_weight_id() -> impl Strategy<Value = QuantizerId> {
        (node_name(), proptest::option::of(0usize..8)).prop_map(|(name, port)| {
            QuantizerId::NonWeight {
                target_node_name: name,
                input_port_id: port,
            }
        })
    }

    proptest! {
        /// Keys are injective over (node, port).
        #[test]
        fn storage_key_injective(a in non_weight_id(), b in non_weight_id()) {
            prop_assert_eq!(a == b, a.storage_key() == b.storage_key());
        }

        /// Every key parses back to the identity it came from.
        #[test]
        fn storage_key_parses_back(id in non_weight_id()) {
            prop_assert_eq!(QuantizerId::parse_storage_key(&id.storage_key()), Some(id));
        }
    }
}
