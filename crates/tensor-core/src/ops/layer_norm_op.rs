// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Layer normalization and per-row moments.

use crate::{Shape, Tensor, TensorError, TensorView};

/// Applies layer normalization over the last dimension:
///
/// `output = gamma * (x - mean) / sqrt(var + eps) + beta`
///
/// where `var` is the population variance (mean of squared deviations).
///
/// # Arguments
/// * `input`  — the input tensor (any rank ≥ 1, normalised over last dim).
/// * `gamma`  — scale parameter, 1-D with length equal to the last dimension.
/// * `beta`   — shift parameter, 1-D with length equal to the last dimension.
/// * `eps`    — small constant for numerical stability (typically 1e-5).
/// * `output` — pre-allocated output tensor (same shape as `input`).
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] if shapes are incompatible.
pub fn layer_norm(
    input: &TensorView<'_>,
    gamma: &TensorView<'_>,
    beta: &TensorView<'_>,
    eps: f32,
    output: &mut Tensor,
) -> Result<(), TensorError> {
    if input.shape() != output.shape() {
        return Err(TensorError::ShapeMismatch {
            op: "layer_norm (input vs output)",
            lhs: input.shape().clone(),
            rhs: output.shape().clone(),
        });
    }

    let Some(last_dim) = input.shape().last_dim() else {
        return Err(TensorError::ShapeMismatch {
            op: "layer_norm (scalar input)",
            lhs: input.shape().clone(),
            rhs: gamma.shape().clone(),
        });
    };

    for (name, param) in [("layer_norm (gamma)", gamma), ("layer_norm (beta)", beta)] {
        if param.shape() != &Shape::vector(last_dim) {
            return Err(TensorError::ShapeMismatch {
                op: name,
                lhs: param.shape().clone(),
                rhs: input.shape().clone(),
            });
        }
    }
    if last_dim == 0 {
        return Ok(());
    }

    let g = gamma.as_f32_slice();
    let b = beta.as_f32_slice();
    let src = input.as_f32_slice();
    let dst = output.as_f32_slice_mut();

    for (row_src, row_dst) in src.chunks(last_dim).zip(dst.chunks_mut(last_dim)) {
        let (mean, var) = row_moments(row_src);
        let inv_std = 1.0 / (var + eps).sqrt();
        for j in 0..last_dim {
            row_dst[j] = g[j] * (row_src[j] - mean) * inv_std + b[j];
        }
    }

    Ok(())
}

/// Computes per-row mean and variance over the last dimension.
///
/// For an input viewed as `[rows, H]`, `mean` and `var` are written to
/// pre-allocated `[rows, 1]` tensors.
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] if either output is not `[rows, 1]`.
pub fn moments(
    input: &TensorView<'_>,
    mean: &mut Tensor,
    var: &mut Tensor,
) -> Result<(), TensorError> {
    let rows = input.shape().num_rows();
    let expected = Shape::matrix(rows, 1);
    for out in [&*mean, &*var] {
        if out.shape() != &expected {
            return Err(TensorError::ShapeMismatch {
                op: "moments (output)",
                lhs: expected,
                rhs: out.shape().clone(),
            });
        }
    }

    let last_dim = input.shape().last_dim().unwrap_or(1).max(1);
    let src = input.as_f32_slice();
    let means = mean.as_f32_slice_mut();
    for (m, row) in means.iter_mut().zip(src.chunks(last_dim)) {
        *m = row_moments(row).0;
    }
    let vars = var.as_f32_slice_mut();
    for (v, row) in vars.iter_mut().zip(src.chunks(last_dim)) {
        *v = row_moments(row).1;
    }
    Ok(())
}

fn row_moments(row: &[f32]) -> (f32, f32) {
    let n = row.len() as f32;
    let mean = row.iter().sum::<f32>() / n;
    let var = row.iter().map(|&x| (x - mean) * (x - mean)).sum::<f32>() / n;
    (mean, var)
}

impl Tensor {
    /// Allocating form of [`layer_norm`].
    pub fn layer_norm(&self, gamma: &Tensor, beta: &Tensor, eps: f32) -> Result<Tensor, TensorError> {
        let mut out = Tensor::zeros(self.shape().clone());
        layer_norm(&self.view(), &gamma.view(), &beta.view(), eps, &mut out)?;
        Ok(out)
    }

    /// Allocating form of [`moments`]: returns `(mean, var)`, each `[rows, 1]`.
    pub fn moments(&self) -> Result<(Tensor, Tensor), TensorError> {
        let rows = self.shape().num_rows();
        let mut mean = Tensor::zeros(Shape::matrix(rows, 1));
        let mut var = Tensor::zeros(Shape::matrix(rows, 1));
        moments(&self.view(), &mut mean, &mut var)?;
        Ok((mean, var))
    }
}
