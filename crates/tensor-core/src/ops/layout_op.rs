// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Layout operations: axis permutation and last-axis splitting.

use crate::{Shape, Tensor, TensorError, TensorView};

/// Writes `input` with its axes reordered by `axes` into `output`.
///
/// `axes[i]` names the input axis that becomes output axis `i`, so
/// `permute(x, [0, 2, 1, 3])` swaps the two middle axes of a rank-4 tensor.
///
/// # Errors
/// * [`TensorError::InvalidAxis`] if `axes` is not a permutation of
///   `0..rank`.
/// * [`TensorError::ShapeMismatch`] if `output` does not have the permuted
///   shape.
pub fn permute(
    input: &TensorView<'_>,
    axes: &[usize],
    output: &mut Tensor,
) -> Result<(), TensorError> {
    let expected_shape = permuted_shape(input.shape(), axes)?;
    if output.shape() != &expected_shape {
        return Err(TensorError::ShapeMismatch {
            op: "permute (output)",
            lhs: expected_shape,
            rhs: output.shape().clone(),
        });
    }

    let in_strides = input.shape().strides();
    // Stride in the input buffer for each output axis.
    let src_strides: Vec<usize> = axes.iter().map(|&a| in_strides[a]).collect();
    let out_dims = expected_shape.dims();
    let rank = out_dims.len();

    let src = input.as_f32_slice();
    let dst = output.as_f32_slice_mut();
    let mut index = vec![0usize; rank];
    let mut offset = 0usize;

    for d in dst.iter_mut() {
        *d = src[offset];
        // Odometer increment over the output index.
        for axis in (0..rank).rev() {
            index[axis] += 1;
            offset += src_strides[axis];
            if index[axis] < out_dims[axis] {
                break;
            }
            offset -= src_strides[axis] * index[axis];
            index[axis] = 0;
        }
    }
    Ok(())
}

/// Splits the last axis into `parts` equal chunks, writing one tensor per
/// chunk into `outputs` in order.
///
/// For `[..., parts * d]` each output is `[..., d]`.
///
/// # Errors
/// * [`TensorError::InvalidArgument`] if the last axis is not divisible by
///   `parts` or `outputs.len() != parts`.
/// * [`TensorError::ShapeMismatch`] if an output has the wrong shape.
pub fn split_last(
    input: &TensorView<'_>,
    parts: usize,
    outputs: &mut [Tensor],
) -> Result<(), TensorError> {
    let last = input.shape().last_dim().unwrap_or(0);
    if parts == 0 || last % parts != 0 || outputs.len() != parts {
        return Err(TensorError::InvalidArgument {
            op: "split_last",
            detail: format!(
                "cannot split last axis of {} into {parts} parts ({} outputs given)",
                input.shape(),
                outputs.len()
            ),
        });
    }

    let chunk = last / parts;
    let expected_shape = input.shape().with_last_dim(chunk);
    for out in outputs.iter() {
        if out.shape() != &expected_shape {
            return Err(TensorError::ShapeMismatch {
                op: "split_last (output)",
                lhs: expected_shape,
                rhs: out.shape().clone(),
            });
        }
    }
    if chunk == 0 {
        return Ok(());
    }

    let src = input.as_f32_slice();
    for (p, out) in outputs.iter_mut().enumerate() {
        let dst = out.as_f32_slice_mut();
        for (row_dst, row_src) in dst.chunks_mut(chunk).zip(src.chunks(last)) {
            row_dst.copy_from_slice(&row_src[p * chunk..(p + 1) * chunk]);
        }
    }
    Ok(())
}

fn permuted_shape(shape: &Shape, axes: &[usize]) -> Result<Shape, TensorError> {
    let rank = shape.rank();
    let mut seen = vec![false; rank];
    for &a in axes {
        if a >= rank || seen[a] {
            return Err(TensorError::InvalidAxis {
                op: "permute",
                axis: a,
                rank,
            });
        }
        seen[a] = true;
    }
    if axes.len() != rank {
        return Err(TensorError::InvalidArgument {
            op: "permute",
            detail: format!("expected {rank} axes, got {}", axes.len()),
        });
    }
    Ok(Shape::new(axes.iter().map(|&a| shape.dims()[a]).collect()))
}

impl Tensor {
    /// Allocating form of [`permute`].
    pub fn permute(&self, axes: &[usize]) -> Result<Tensor, TensorError> {
        let mut out = Tensor::zeros(permuted_shape(self.shape(), axes)?);
        permute(&self.view(), axes, &mut out)?;
        Ok(out)
    }

    /// Allocating form of [`split_last`].
    pub fn split_last(&self, parts: usize) -> Result<Vec<Tensor>, TensorError> {
        let last = self.shape().last_dim().unwrap_or(0);
        let chunk = if parts == 0 { 0 } else { last / parts };
        let mut outs: Vec<Tensor> = (0..parts)
            .map(|_| Tensor::zeros(self.shape().with_last_dim(chunk)))
            .collect();
        split_last(&self.view(), parts, &mut outs)?;
        Ok(outs)
    }
}
