// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Immutable tensor payload for value-replacement commands.
//!
//! The command layer never inspects payload contents. `Tensor` exists so a
//! bias or weight can travel inside a command by value and be cloned cheaply
//! into every place that needs it.

use crate::CommandError;
use std::sync::Arc;

/// A reference-counted, immutable `f32` tensor stored in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Vec<usize>,
    values: Arc<[f32]>,
}

impl Tensor {
    /// Creates a tensor, checking that `values` fills `shape` exactly.
    ///
    /// # Examples
    /// ```
    /// use transform_commands::Tensor;
    /// let t = Tensor::new(vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
    /// assert_eq!(t.num_elements(), 4);
    /// assert!(Tensor::new(vec![2, 2], vec![1.0]).is_err());
    /// ```
    pub fn new(shape: Vec<usize>, values: Vec<f32>) -> Result<Self, CommandError> {
        let expected = num_elements(&shape).ok_or_else(|| CommandError::ShapeOverflow {
            shape: shape.clone(),
        })?;
        if values.len() != expected {
            return Err(CommandError::InvalidTensor {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            shape,
            values: values.into(),
        })
    }

    /// Creates a 1-D tensor from a vector.
    pub fn from_vec_1d(values: Vec<f32>) -> Self {
        Self {
            shape: vec![values.len()],
            values: values.into(),
        }
    }

    /// Creates a tensor filled with `value`.
    ///
    /// # Panics
    /// If the element count of `shape` overflows `usize`. Shapes taken from a
    /// validated graph never do.
    pub fn filled(shape: Vec<usize>, value: f32) -> Self {
        let n = num_elements(&shape).unwrap_or_else(|| panic!("tensor shape {shape:?} overflows"));
        Self {
            shape,
            values: vec![value; n].into(),
        }
    }

    /// Creates a tensor filled with zeros.
    pub fn zeros(shape: Vec<usize>) -> Self {
        Self::filled(shape, 0.0)
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Total number of elements. A rank-0 tensor holds one element.
    pub fn num_elements(&self) -> usize {
        self.values.len()
    }

    /// Builds a tensor of the same shape by mapping every element.
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Self {
        Self {
            shape: self.shape.clone(),
            values: self.values.iter().map(|&v| f(v)).collect(),
        }
    }
}

fn num_elements(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_len() {
        let err = Tensor::new(vec![3, 2], vec![0.0; 5]).unwrap_err();
        assert_eq!(err, CommandError::InvalidTensor { expected: 6, actual: 5 });
    }

    #[test]
    fn test_new_rejects_overflowing_shape() {
        let err = Tensor::new(vec![usize::MAX, 2], vec![]).unwrap_err();
        assert_eq!(err, CommandError::ShapeOverflow { shape: vec![usize::MAX, 2] });
    }

    #[test]
    fn test_scalar() {
        let t = Tensor::new(vec![], vec![7.0]).unwrap();
        assert_eq!(t.num_elements(), 1);
    }

    #[test]
    fn test_filled_and_zeros() {
        assert_eq!(Tensor::filled(vec![2], 1.5).values(), &[1.5, 1.5]);
        assert_eq!(Tensor::zeros(vec![2, 3]).num_elements(), 6);
    }

    #[test]
    fn test_clone_shares_storage() {
        let t = Tensor::from_vec_1d(vec![1.0, 2.0]);
        let u = t.clone();
        assert!(std::ptr::eq(t.values().as_ptr(), u.values().as_ptr()));
        assert_eq!(t, u);
    }

    #[test]
    fn test_map() {
        let t = Tensor::from_vec_1d(vec![1.0, -2.0]).map(f32::abs);
        assert_eq!(t.values(), &[1.0, 2.0]);
        assert_eq!(t.shape(), &[2]);
    }
}
