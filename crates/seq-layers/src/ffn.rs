// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Position-wise feed-forward sublayer.

use rand::rngs::StdRng;
use tensor_core::{Shape, Tensor, TensorError};

use crate::config::FeedForwardConfig;
use crate::dropout::Dropout;
use crate::linear::Linear;
use crate::params::{Initializer, Parameterized};
use crate::LayerError;

/// `x → h2o(dropout(relu(i2h(x))))`, applied independently at every position.
///
/// No normalization or residual is applied here; callers wrap the sublayer.
#[derive(Debug, Clone)]
pub struct FeedForward {
    num_hidden: usize,
    num_model: usize,
    dropout: Dropout,
    i2h: Linear,
    h2o: Linear,
}

impl FeedForward {
    /// Creates the sublayer with parameters `{prefix}i2h_*` (model → hidden)
    /// and `{prefix}h2o_*` (hidden → model).
    pub fn new(
        prefix: &str,
        num_hidden: usize,
        num_model: usize,
        dropout: f32,
        init: &mut Initializer,
    ) -> Result<Self, LayerError> {
        let dropout = Dropout::new(dropout)?;
        let i2h = Linear::new(&format!("{prefix}i2h"), num_model, num_hidden, init);
        let h2o = Linear::new(&format!("{prefix}h2o"), num_hidden, num_model, init);
        tracing::debug!(prefix, num_hidden, num_model, "feed-forward created");
        Ok(Self {
            num_hidden,
            num_model,
            dropout,
            i2h,
            h2o,
        })
    }

    pub fn from_config(
        prefix: &str,
        config: &FeedForwardConfig,
        init: &mut Initializer,
    ) -> Result<Self, LayerError> {
        Self::new(prefix, config.num_hidden, config.num_model, config.dropout, init)
    }

    pub fn num_hidden(&self) -> usize {
        self.num_hidden
    }

    pub fn num_model(&self) -> usize {
        self.num_model
    }

    /// Inference-mode forward pass: `x: [batch, length, model]` → same shape.
    pub fn apply(&self, x: &Tensor, length: usize) -> Result<Tensor, LayerError> {
        self.forward(x, length, None)
    }

    /// Training-mode forward pass with dropout drawn from `rng`.
    pub fn apply_train(
        &self,
        x: &Tensor,
        length: usize,
        rng: &mut StdRng,
    ) -> Result<Tensor, LayerError> {
        self.forward(x, length, Some(rng))
    }

    fn forward(
        &self,
        x: &Tensor,
        length: usize,
        rng: Option<&mut StdRng>,
    ) -> Result<Tensor, LayerError> {
        let dims = x.dims();
        if dims.len() != 3 || dims[1] != length || dims[2] != self.num_model {
            return Err(TensorError::ShapeMismatch {
                op: "feed_forward (inputs)",
                lhs: Shape::rank3(dims.first().copied().unwrap_or(0), length, self.num_model),
                rhs: x.shape().clone(),
            }
            .into());
        }
        let batch = dims[0];

        let flat = x.reshape(Shape::matrix(batch * length, self.num_model))?;
        let hidden = self.i2h.forward(&flat)?.relu();
        let hidden = self.dropout.apply(&hidden, rng)?;
        let out = self.h2o.forward(&hidden)?;
        Ok(out.into_shape(Shape::rank3(batch, length, self.num_model))?)
    }
}

impl Parameterized for FeedForward {
    fn named_parameters(&self) -> Vec<(&str, &Tensor)> {
        let mut params = self.i2h.named_parameters();
        params.extend(self.h2o.named_parameters());
        params
    }

    fn named_parameters_mut(&mut self) -> Vec<(&str, &mut Tensor)> {
        let mut params = self.i2h.named_parameters_mut();
        params.extend(self.h2o.named_parameters_mut());
        params
    }
}
