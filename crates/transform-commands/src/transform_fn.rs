// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Insertable transformation functions.
//!
//! Insertion commands carry their payload as `Arc<dyn TransformFn>`. The
//! command layer treats the payload as opaque; only the executor calls
//! [`TransformFn::forward`]. Payload identity is the `Arc` allocation, which
//! is what a shared-module registry compares when the same storage key is
//! registered twice.

use crate::{CommandError, Tensor};
use std::fmt;

/// A callable that can be attached at a target point.
pub trait TransformFn: fmt::Debug + Send + Sync {
    /// Short name used in logs and summaries.
    fn name(&self) -> &str;

    /// Applies the transformation to an activation or weight tensor.
    fn forward(&self, input: &Tensor) -> Tensor;
}

/// Integer grid used by a [`FakeQuantizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantizationMode {
    /// Grid centred on zero; the zero point is always 0.
    #[default]
    Symmetric,
    /// Unsigned grid shifted by a zero point.
    Asymmetric,
}

/// Parameters of a fake quantizer.
///
/// `scale` and `zero_point` come from a calibration algorithm outside this
/// crate; they are taken as given.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QuantizerConfig {
    /// Bit width of the integer grid.
    #[serde(default = "default_num_bits")]
    pub num_bits: u32,
    /// Symmetric or asymmetric grid.
    #[serde(default)]
    pub mode: QuantizationMode,
    /// Signed grid (symmetric mode only).
    #[serde(default = "default_true")]
    pub signed: bool,
    /// Step between adjacent grid values.
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// Grid value representing real zero (asymmetric mode only).
    #[serde(default)]
    pub zero_point: i32,
}

fn default_num_bits() -> u32 {
    8
}

fn default_true() -> bool {
    true
}

fn default_scale() -> f32 {
    1.0
}

impl Default for QuantizerConfig {
    fn default() -> Self {
        Self {
            num_bits: default_num_bits(),
            mode: QuantizationMode::Symmetric,
            signed: true,
            scale: default_scale(),
            zero_point: 0,
        }
    }
}

impl QuantizerConfig {
    /// Supported bit widths.
    pub const NUM_BITS: std::ops::RangeInclusive<u32> = 2..=16;

    /// Returns the inclusive `(min, max)` integer range of the grid.
    ///
    /// Fails if `num_bits` is outside [`NUM_BITS`](Self::NUM_BITS).
    pub fn level_range(&self) -> Result<(i64, i64), CommandError> {
        if !Self::NUM_BITS.contains(&self.num_bits) {
            return Err(CommandError::InvalidQuantizer(format!(
                "num_bits must be in {:?}, got {}",
                Self::NUM_BITS,
                self.num_bits
            )));
        }
        let levels = 1i64 << self.num_bits;
        Ok(match self.mode {
            QuantizationMode::Symmetric if self.signed => (-(levels / 2), levels / 2 - 1),
            _ => (0, levels - 1),
        })
    }

    /// Checks bit width, scale, and zero point.
    pub fn validate(&self) -> Result<(), CommandError> {
        let (lo, hi) = self.level_range()?;
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(CommandError::InvalidQuantizer(format!(
                "scale must be positive and finite, got {}",
                self.scale
            )));
        }
        let zp = i64::from(self.zero_point);
        match self.mode {
            QuantizationMode::Symmetric if zp != 0 => Err(CommandError::InvalidQuantizer(
                "symmetric quantizers have a zero point of 0".into(),
            )),
            QuantizationMode::Asymmetric if !(lo..=hi).contains(&zp) => {
                Err(CommandError::InvalidQuantizer(format!(
                    "zero point {zp} outside grid [{lo}, {hi}]"
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Quantize-dequantize with fixed parameters.
#[derive(Debug, Clone)]
pub struct FakeQuantizer {
    config: QuantizerConfig,
    levels: (i64, i64),
}

impl FakeQuantizer {
    /// Creates a quantizer after validating its configuration.
    pub fn new(config: QuantizerConfig) -> Result<Self, CommandError> {
        config.validate()?;
        let levels = config.level_range()?;
        Ok(Self { config, levels })
    }

    pub fn config(&self) -> &QuantizerConfig {
        &self.config
    }

    /// Rounds a single value onto the grid and maps it back to real space.
    pub fn fake_quantize(&self, x: f32) -> f32 {
        let (lo, hi) = self.levels;
        let zp = self.config.zero_point as f32;
        let q = ((x / self.config.scale).round() + zp).clamp(lo as f32, hi as f32);
        (q - zp) * self.config.scale
    }
}

impl TransformFn for FakeQuantizer {
    fn name(&self) -> &str {
        "fake_quantizer"
    }

    fn forward(&self, input: &Tensor) -> Tensor {
        input.map(|x| self.fake_quantize(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(mode: QuantizationMode, signed: bool, scale: f32, zero_point: i32) -> QuantizerConfig {
        QuantizerConfig {
            num_bits: 8,
            mode,
            signed,
            scale,
            zero_point,
        }
    }

    #[test]
    fn test_level_range() {
        assert_eq!(QuantizerConfig::default().level_range().unwrap(), (-128, 127));
        assert_eq!(
            config(QuantizationMode::Symmetric, false, 1.0, 0).level_range().unwrap(),
            (0, 255)
        );
        assert_eq!(
            config(QuantizationMode::Asymmetric, true, 1.0, 0).level_range().unwrap(),
            (0, 255)
        );
    }

    #[test]
    fn test_level_range_rejects_wide_grids() {
        for num_bits in [0, 1, 17, 63, 64, 200] {
            let c = QuantizerConfig {
                num_bits,
                ..Default::default()
            };
            assert!(matches!(c.level_range(), Err(CommandError::InvalidQuantizer(_))));
            assert!(FakeQuantizer::new(c).is_err());
        }
    }

    #[test]
    fn test_validate() {
        QuantizerConfig::default().validate().unwrap();

        let bad_bits = QuantizerConfig {
            num_bits: 1,
            ..Default::default()
        };
        assert!(bad_bits.validate().is_err());

        let bad_scale = config(QuantizationMode::Symmetric, true, 0.0, 0);
        assert!(bad_scale.validate().is_err());

        let bad_zp = config(QuantizationMode::Symmetric, true, 1.0, 3);
        assert!(bad_zp.validate().is_err());

        let zp_out_of_grid = config(QuantizationMode::Asymmetric, false, 1.0, 300);
        assert!(zp_out_of_grid.validate().is_err());
    }

    #[test]
    fn test_symmetric_fake_quantize() {
        let fq = FakeQuantizer::new(config(QuantizationMode::Symmetric, true, 0.5, 0)).unwrap();
        assert_eq!(fq.fake_quantize(0.74), 0.5);
        assert_eq!(fq.fake_quantize(-0.76), -1.0);
        // Clamped to 127 * 0.5.
        assert_eq!(fq.fake_quantize(1000.0), 63.5);
        assert_eq!(fq.fake_quantize(-1000.0), -64.0);
    }

    #[test]
    fn test_asymmetric_fake_quantize() {
        let fq = FakeQuantizer::new(config(QuantizationMode::Asymmetric, false, 1.0, 10)).unwrap();
        assert_eq!(fq.fake_quantize(3.2), 3.0);
        // Grid bottom is 0, which maps back to -10.
        assert_eq!(fq.fake_quantize(-50.0), -10.0);
    }

    #[test]
    fn test_forward_preserves_shape() {
        let fq = FakeQuantizer::new(QuantizerConfig::default()).unwrap();
        let input = Tensor::new(vec![2, 2], vec![0.4, 1.6, -2.5, 300.0]).unwrap();
        let out = fq.forward(&input);
        assert_eq!(out.shape(), &[2, 2]);
        assert_eq!(out.values(), &[0.0, 2.0, -3.0, 127.0]);
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let c: QuantizerConfig = serde_json::from_str(r#"{ "scale": 0.25 }"#).unwrap();
        assert_eq!(c.num_bits, 8);
        assert_eq!(c.mode, QuantizationMode::Symmetric);
        assert!(c.signed);
        assert_eq!(c.scale, 0.25);
    }
}
