// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Fully-connected projection: `y = x · Wᵀ + b`.

use tensor_core::{Shape, Tensor};

use crate::params::{Initializer, Param, Parameterized};
use crate::LayerError;

/// An affine projection with weight `[out, in]` and bias `[out]`, named
/// `{name}_weight` and `{name}_bias`.
#[derive(Debug, Clone)]
pub struct Linear {
    in_features: usize,
    out_features: usize,
    weight: Param,
    bias: Param,
}

impl Linear {
    /// Creates a projection with a Xavier-uniform weight and zero bias.
    pub fn new(name: &str, in_features: usize, out_features: usize, init: &mut Initializer) -> Self {
        Self {
            in_features,
            out_features,
            weight: Param::new(
                format!("{name}_weight"),
                init.xavier_uniform(out_features, in_features),
            ),
            bias: Param::new(
                format!("{name}_bias"),
                init.constant(Shape::vector(out_features), 0.0),
            ),
        }
    }

    pub fn in_features(&self) -> usize {
        self.in_features
    }

    pub fn out_features(&self) -> usize {
        self.out_features
    }

    pub fn weight(&self) -> &Param {
        &self.weight
    }

    pub fn bias(&self) -> &Param {
        &self.bias
    }

    /// Writes `value` into bias entries `range` (used for gate-bias
    /// initialization).
    pub(crate) fn fill_bias(&mut self, range: std::ops::Range<usize>, value: f32) {
        if let Some(slice) = self.bias.value_mut().as_f32_slice_mut().get_mut(range) {
            slice.iter_mut().for_each(|b| *b = value);
        }
    }

    /// Applies the projection to `x: [N, in]`, returning `[N, out]`.
    pub fn forward(&self, x: &Tensor) -> Result<Tensor, LayerError> {
        Ok(x.fully_connected(self.weight.value(), self.bias.value())?)
    }
}

impl Parameterized for Linear {
    fn named_parameters(&self) -> Vec<(&str, &Tensor)> {
        vec![self.weight.entry(), self.bias.entry()]
    }

    fn named_parameters_mut(&mut self) -> Vec<(&str, &mut Tensor)> {
        vec![self.weight.entry_mut(), self.bias.entry_mut()]
    }
}
