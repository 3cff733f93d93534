// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Softmax over the last axis.

use crate::{Tensor, TensorError, TensorView};

/// Computes softmax along the last dimension, row by row.
///
/// The row maximum is subtracted before exponentiation, so rows holding the
/// large negative finite mask sentinel next to ordinary scores stay finite,
/// with negligible mass on the sentinel entries.
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] if input and output shapes differ.
pub fn softmax(input: &TensorView<'_>, output: &mut Tensor) -> Result<(), TensorError> {
    if input.shape() != output.shape() {
        return Err(TensorError::ShapeMismatch {
            op: "softmax",
            lhs: input.shape().clone(),
            rhs: output.shape().clone(),
        });
    }

    let last_dim = match input.shape().last_dim() {
        Some(0) => return Ok(()),
        Some(d) => d,
        None => {
            output.as_f32_slice_mut()[0] = 1.0;
            return Ok(());
        }
    };

    let src = input.as_f32_slice();
    let dst = output.as_f32_slice_mut();

    for (row_src, row_dst) in src.chunks(last_dim).zip(dst.chunks_mut(last_dim)) {
        let max_val = row_src.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        let mut sum = 0.0f32;
        for (d, &s) in row_dst.iter_mut().zip(row_src) {
            let e = (s - max_val).exp();
            *d = e;
            sum += e;
        }

        if sum > 0.0 {
            let inv_sum = 1.0 / sum;
            row_dst.iter_mut().for_each(|d| *d *= inv_sum);
        }
    }

    Ok(())
}

impl Tensor {
    /// Allocating form of [`softmax`].
    pub fn softmax(&self) -> Result<Tensor, TensorError> {
        let mut out = Tensor::zeros(self.shape().clone());
        softmax(&self.view(), &mut out)?;
        Ok(out)
    }
}
