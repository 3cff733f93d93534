// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Fully-connected (affine) operation.

use super::matmul_op::matmul_f32_transposed;
use crate::{Shape, Tensor, TensorError, TensorView};

/// Computes `output = input · weightᵀ + bias`.
///
/// * `input`  — `[N, in]`.
/// * `weight` — `[out, in]`, stored output-major.
/// * `bias`   — `[out]`.
/// * `output` — pre-allocated `[N, out]`.
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] if any operand disagrees.
pub fn fully_connected(
    input: &TensorView<'_>,
    weight: &TensorView<'_>,
    bias: &TensorView<'_>,
    output: &mut Tensor,
) -> Result<(), TensorError> {
    let x = input.shape();
    let w = weight.shape();
    if x.rank() != 2 || w.rank() != 2 || x.dims()[1] != w.dims()[1] {
        return Err(TensorError::ShapeMismatch {
            op: "fully_connected",
            lhs: x.clone(),
            rhs: w.clone(),
        });
    }

    let (rows, in_dim) = (x.dims()[0], x.dims()[1]);
    let out_dim = w.dims()[0];

    if bias.shape() != &Shape::vector(out_dim) {
        return Err(TensorError::ShapeMismatch {
            op: "fully_connected (bias)",
            lhs: Shape::vector(out_dim),
            rhs: bias.shape().clone(),
        });
    }

    let expected_shape = Shape::matrix(rows, out_dim);
    if output.shape() != &expected_shape {
        return Err(TensorError::ShapeMismatch {
            op: "fully_connected (output)",
            lhs: expected_shape,
            rhs: output.shape().clone(),
        });
    }

    let dst = output.as_f32_slice_mut();
    matmul_f32_transposed(
        input.as_f32_slice(),
        weight.as_f32_slice(),
        dst,
        rows,
        in_dim,
        out_dim,
    );

    let b = bias.as_f32_slice();
    for row in dst.chunks_mut(out_dim.max(1)) {
        for (v, bj) in row.iter_mut().zip(b) {
            *v += bj;
        }
    }
    Ok(())
}

impl Tensor {
    /// Allocating form of [`fully_connected`].
    pub fn fully_connected(&self, weight: &Tensor, bias: &Tensor) -> Result<Tensor, TensorError> {
        let rows = self.shape().dim(0).unwrap_or(0);
        let out_dim = weight.shape().dim(0).unwrap_or(0);
        let mut out = Tensor::zeros(Shape::matrix(rows, out_dim));
        fully_connected(&self.view(), &weight.view(), &bias.view(), &mut out)?;
        Ok(out)
    }
}
