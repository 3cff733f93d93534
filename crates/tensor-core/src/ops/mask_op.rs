// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Length-based sequence masking.

use crate::{Tensor, TensorError, TensorView};

/// Overwrites positions at or beyond each sequence's valid length.
///
/// `input` has shape `[N, ..., L]`; `lengths` holds `N` values (shape `[N]`
/// or `[N, 1]`). For batch entry `n`, every element whose last-axis index is
/// `>= lengths[n]` is set to `value`; everything else is copied unchanged.
/// Lengths are stored as `f32` and truncated toward zero; lengths past `L`
/// mask nothing.
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] if `lengths` does not hold one
/// value per leading index, or if `output` differs in shape from `input`.
pub fn sequence_mask(
    input: &TensorView<'_>,
    lengths: &TensorView<'_>,
    value: f32,
    output: &mut Tensor,
) -> Result<(), TensorError> {
    if input.shape() != output.shape() {
        return Err(TensorError::ShapeMismatch {
            op: "sequence_mask (output)",
            lhs: input.shape().clone(),
            rhs: output.shape().clone(),
        });
    }

    let batch = input.shape().dim(0).unwrap_or(0);
    if input.shape().rank() < 2 || lengths.shape().num_elements() != batch {
        return Err(TensorError::ShapeMismatch {
            op: "sequence_mask (lengths)",
            lhs: input.shape().clone(),
            rhs: lengths.shape().clone(),
        });
    }

    let last = input.shape().last_dim().unwrap_or(0);
    let per_batch = if batch == 0 {
        0
    } else {
        input.shape().num_elements() / batch
    };

    let src = input.as_f32_slice();
    let dst = output.as_f32_slice_mut();
    dst.copy_from_slice(src);
    if last == 0 || per_batch == 0 {
        return Ok(());
    }

    for (slab, &len) in dst.chunks_mut(per_batch).zip(lengths.as_f32_slice()) {
        let valid = len.max(0.0) as usize;
        if valid >= last {
            continue;
        }
        for row in slab.chunks_mut(last) {
            row[valid..].iter_mut().for_each(|v| *v = value);
        }
    }
    Ok(())
}

impl Tensor {
    /// Allocating form of [`sequence_mask`].
    pub fn sequence_mask(&self, lengths: &Tensor, value: f32) -> Result<Tensor, TensorError> {
        let mut out = Tensor::zeros(self.shape().clone());
        sequence_mask(&self.view(), &lengths.view(), value, &mut out)?;
        Ok(out)
    }
}
