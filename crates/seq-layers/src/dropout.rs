// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Inverted dropout wrapper.

use rand::rngs::StdRng;
use tensor_core::Tensor;

use crate::LayerError;

/// Dropout with a fixed rate in `[0, 1)`.
///
/// Dropout is only active when the caller supplies an RNG (training); with
/// `None` or a zero rate the input is returned unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dropout {
    rate: f32,
}

impl Dropout {
    /// # Errors
    /// Returns [`LayerError::Config`] if `rate` is outside `[0, 1)`.
    pub fn new(rate: f32) -> Result<Self, LayerError> {
        if !(0.0..1.0).contains(&rate) {
            return Err(LayerError::config(format!(
                "dropout rate must be in [0, 1), got {rate}"
            )));
        }
        Ok(Self { rate })
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn is_active(&self) -> bool {
        self.rate > 0.0
    }

    pub fn apply(&self, x: &Tensor, rng: Option<&mut StdRng>) -> Result<Tensor, LayerError> {
        match rng {
            Some(rng) if self.is_active() => Ok(x.dropout(self.rate, rng)?),
            _ => Ok(x.clone()),
        }
    }
}
