// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Transformation statistics.

use crate::Registration;
use std::time::Duration;

/// Counters collected while applying a layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct TransformStats {
    /// Bias and weight replacements applied.
    pub value_commands: usize,
    /// Single-point insertions applied.
    pub insertion_commands: usize,
    /// Shared insertions applied.
    pub shared_commands: usize,
    /// Storage keys registered for the first time.
    pub modules_registered: usize,
    /// Shared insertions that found their own instance already registered.
    pub modules_reused: usize,
    /// Shared insertions whose instance was replaced by the first one.
    pub modules_merged: usize,
    /// Hooks attached.
    pub attachments: usize,
    /// Shared attachments skipped because the key was already at the point.
    pub duplicate_attachments: usize,
    /// Wall-clock time of the whole transform.
    pub total_duration: Duration,
}

impl TransformStats {
    /// Records the outcome of one shared-module registration.
    pub fn record_registration(&mut self, registration: Registration) {
        match registration {
            Registration::Inserted => self.modules_registered += 1,
            Registration::Reused => self.modules_reused += 1,
            Registration::Merged => self.modules_merged += 1,
        }
    }

    /// Total number of commands applied.
    pub fn total_commands(&self) -> usize {
        self.value_commands + self.insertion_commands + self.shared_commands
    }

    /// Returns a human-readable summary suitable for CLI output.
    pub fn summary(&self) -> String {
        format!(
            "Transform: {} commands ({} value, {} insertion, {} shared) in {:.2}ms, \
             {} modules registered ({} reused, {} merged), \
             {} hooks attached ({} duplicates skipped)",
            self.total_commands(),
            self.value_commands,
            self.insertion_commands,
            self.shared_commands,
            self.total_duration.as_secs_f64() * 1000.0,
            self.modules_registered,
            self.modules_reused,
            self.modules_merged,
            self.attachments,
            self.duplicate_attachments,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_registration() {
        let mut s = TransformStats::default();
        s.record_registration(Registration::Inserted);
        s.record_registration(Registration::Reused);
        s.record_registration(Registration::Reused);
        s.record_registration(Registration::Merged);
        assert_eq!(s.modules_registered, 1);
        assert_eq!(s.modules_reused, 2);
        assert_eq!(s.modules_merged, 1);
    }

    #[test]
    fn test_summary() {
        let s = TransformStats {
            value_commands: 2,
            insertion_commands: 1,
            shared_commands: 3,
            attachments: 4,
            ..Default::default()
        };
        assert_eq!(s.total_commands(), 6);
        let text = s.summary();
        assert!(text.contains("6 commands"));
        assert!(text.contains("4 hooks attached"));
    }
}
