// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Inverted dropout.

use rand::Rng;

use crate::{Tensor, TensorError, TensorView};

/// Zeroes each element with probability `p` and scales survivors by
/// `1 / (1 - p)`, drawing from `rng`.
///
/// With `p == 0.0` the input is copied unchanged and `rng` is not touched.
///
/// # Errors
/// * [`TensorError::InvalidArgument`] if `p` is outside `[0, 1)`.
/// * [`TensorError::ShapeMismatch`] if input and output shapes differ.
pub fn dropout<R: Rng + ?Sized>(
    input: &TensorView<'_>,
    p: f32,
    rng: &mut R,
    output: &mut Tensor,
) -> Result<(), TensorError> {
    if !(0.0..1.0).contains(&p) {
        return Err(TensorError::InvalidArgument {
            op: "dropout",
            detail: format!("rate must be in [0, 1), got {p}"),
        });
    }
    if input.shape() != output.shape() {
        return Err(TensorError::ShapeMismatch {
            op: "dropout",
            lhs: input.shape().clone(),
            rhs: output.shape().clone(),
        });
    }

    let src = input.as_f32_slice();
    let dst = output.as_f32_slice_mut();
    if p == 0.0 {
        dst.copy_from_slice(src);
        return Ok(());
    }

    let keep_scale = 1.0 / (1.0 - p);
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = if rng.gen::<f32>() < p { 0.0 } else { s * keep_scale };
    }
    Ok(())
}

impl Tensor {
    /// Allocating form of [`dropout`].
    pub fn dropout<R: Rng + ?Sized>(&self, p: f32, rng: &mut R) -> Result<Tensor, TensorError> {
        let mut out = Tensor::zeros(self.shape().clone());
        dropout(&self.view(), p, rng, &mut out)?;
        Ok(out)
    }
}
