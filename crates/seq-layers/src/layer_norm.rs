// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Layer normalization with learned scale and shift.

use tensor_core::{Shape, Tensor};

use crate::params::{Param, Parameterized};
use crate::LayerError;

/// Per-row normalization over the last axis:
/// `scale ⊙ (x − mean) / sqrt(var + eps) + shift`.
///
/// `scale` and `shift` are 1-D parameters sized to the normalized dimension,
/// which must be greater than 1.
#[derive(Debug, Clone)]
pub struct LayerNorm {
    num_hidden: usize,
    scale: Param,
    shift: Param,
}

impl LayerNorm {
    /// Variance epsilon used by [`LayerNorm::normalize`].
    pub const DEFAULT_EPS: f32 = 1e-5;

    /// Creates a standalone unit with parameters `{prefix}_gamma` and
    /// `{prefix}_beta`.
    ///
    /// # Errors
    /// Returns [`LayerError::Config`] if `num_hidden <= 1`.
    pub fn new(
        prefix: &str,
        num_hidden: usize,
        scale_init: f32,
        shift_init: f32,
    ) -> Result<Self, LayerError> {
        Self::with_names(
            format!("{prefix}_gamma"),
            format!("{prefix}_beta"),
            num_hidden,
            scale_init,
            shift_init,
        )
    }

    /// Creates a unit with explicit parameter names, as used inside the
    /// recurrent cells (`{cell}i2h_scale`, `{cell}f_shift`, ...).
    ///
    /// # Errors
    /// Returns [`LayerError::Config`] if `num_hidden <= 1`.
    pub fn with_names(
        scale_name: String,
        shift_name: String,
        num_hidden: usize,
        scale_init: f32,
        shift_init: f32,
    ) -> Result<Self, LayerError> {
        if num_hidden <= 1 {
            return Err(LayerError::config(format!(
                "layer normalization needs more than 1 hidden unit, got {num_hidden}"
            )));
        }
        tracing::debug!(scale = %scale_name, num_hidden, "layer norm created");
        Ok(Self {
            num_hidden,
            scale: Param::new(scale_name, Tensor::full(Shape::vector(num_hidden), scale_init)),
            shift: Param::new(shift_name, Tensor::full(Shape::vector(num_hidden), shift_init)),
        })
    }

    pub fn num_hidden(&self) -> usize {
        self.num_hidden
    }

    pub fn scale(&self) -> &Param {
        &self.scale
    }

    pub fn shift(&self) -> &Param {
        &self.shift
    }

    /// Normalizes `x: [batch, H]` with eps `1e-5`.
    pub fn normalize(&self, x: &Tensor) -> Result<Tensor, LayerError> {
        self.normalize_with_eps(x, Self::DEFAULT_EPS)
    }

    pub fn normalize_with_eps(&self, x: &Tensor, eps: f32) -> Result<Tensor, LayerError> {
        Ok(x.layer_norm(self.scale.value(), self.shift.value(), eps)?)
    }

    /// Per-row mean and variance of `x`, each `[rows, 1]`.
    pub fn moments(x: &Tensor) -> Result<(Tensor, Tensor), LayerError> {
        Ok(x.moments()?)
    }
}

impl Parameterized for LayerNorm {
    fn named_parameters(&self) -> Vec<(&str, &Tensor)> {
        vec![self.scale.entry(), self.shift.entry()]
    }

    fn named_parameters_mut(&mut self) -> Vec<(&str, &mut Tensor)> {
        vec![self.scale.entry_mut(), self.shift.entry_mut()]
    }
}
