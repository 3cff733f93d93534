// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Pointwise activation functions.

use crate::{Tensor, TensorError, TensorView};

/// Pointwise activations used by the recurrent cells and feed-forward blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// `1 / (1 + exp(-x))`
    Sigmoid,
    /// Hyperbolic tangent.
    Tanh,
    /// `max(0, x)`
    Relu,
}

impl Activation {
    /// Applies the activation to a single value.
    #[inline]
    pub fn apply_scalar(self, x: f32) -> f32 {
        match self {
            Activation::Sigmoid => sigmoid_f32(x),
            Activation::Tanh => x.tanh(),
            Activation::Relu => x.max(0.0),
        }
    }
}

/// Applies `activation` elementwise, writing into `output`.
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] if input and output shapes differ.
pub fn activate(
    input: &TensorView<'_>,
    activation: Activation,
    output: &mut Tensor,
) -> Result<(), TensorError> {
    if input.shape() != output.shape() {
        return Err(TensorError::ShapeMismatch {
            op: "activate",
            lhs: input.shape().clone(),
            rhs: output.shape().clone(),
        });
    }
    for (d, &s) in output.as_f32_slice_mut().iter_mut().zip(input.as_f32_slice()) {
        *d = activation.apply_scalar(s);
    }
    Ok(())
}

// Split on sign so exp never overflows.
#[inline]
fn sigmoid_f32(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

impl Tensor {
    /// Returns a new tensor with `activation` applied elementwise.
    pub fn activate(&self, activation: Activation) -> Tensor {
        let mut out = self.clone();
        out.as_f32_slice_mut()
            .iter_mut()
            .for_each(|v| *v = activation.apply_scalar(*v));
        out
    }

    pub fn sigmoid(&self) -> Tensor {
        self.activate(Activation::Sigmoid)
    }

    pub fn tanh(&self) -> Tensor {
        self.activate(Activation::Tanh)
    }

    pub fn relu(&self) -> Tensor {
        self.activate(Activation::Relu)
    }
}
