// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Named parameters, the parameter-update surface and initialization.
//!
//! Every block owns its parameters as [`Param`]s whose names are the stable
//! checkpoint keys an external parameter store uses. Forward passes only
//! read them; an external update step writes them between passes through
//! [`Parameterized::named_parameters_mut`] or
//! [`Parameterized::load_parameters`].

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tensor_core::{Shape, Tensor};

use crate::LayerError;

/// A tensor with a stable, fully-qualified name.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    name: String,
    value: Tensor,
}

impl Param {
    pub fn new(name: impl Into<String>, value: Tensor) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Tensor {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut Tensor {
        &mut self.value
    }

    /// `(name, value)` pair for [`Parameterized::named_parameters`].
    pub fn entry(&self) -> (&str, &Tensor) {
        (&self.name, &self.value)
    }

    /// `(name, value)` pair for [`Parameterized::named_parameters_mut`].
    pub fn entry_mut(&mut self) -> (&str, &mut Tensor) {
        (&self.name, &mut self.value)
    }
}

/// Outcome of [`Parameterized::load_parameters`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Number of parameters whose values were replaced.
    pub loaded: usize,
    /// Names present on the block but absent from the supplied map.
    pub missing: Vec<String>,
}

/// Access to a block's named parameters.
pub trait Parameterized {
    /// All parameters with their checkpoint keys, in a stable order.
    fn named_parameters(&self) -> Vec<(&str, &Tensor)>;

    /// Mutable access for an external update step.
    fn named_parameters_mut(&mut self) -> Vec<(&str, &mut Tensor)>;

    /// Total number of scalar parameters.
    fn num_parameters(&self) -> usize {
        self.named_parameters()
            .iter()
            .map(|(_, t)| t.num_elements())
            .sum()
    }

    /// Copies all parameters into an owned map keyed by name.
    fn state_dict(&self) -> HashMap<String, Tensor> {
        self.named_parameters()
            .into_iter()
            .map(|(name, t)| (name.to_string(), t.clone()))
            .collect()
    }

    /// Replaces parameter values by name.
    ///
    /// Names the block does not have are ignored; names the block has but
    /// the map lacks are left untouched and reported in
    /// [`LoadReport::missing`]. Every supplied value is shape-checked before
    /// anything is written, so a failed load leaves the block unchanged.
    ///
    /// # Errors
    /// Returns [`LayerError::Parameter`] on the first shape mismatch.
    fn load_parameters(
        &mut self,
        params: &HashMap<String, Tensor>,
    ) -> Result<LoadReport, LayerError> {
        for (name, current) in self.named_parameters() {
            if let Some(new) = params.get(name) {
                if new.shape() != current.shape() {
                    return Err(LayerError::Parameter {
                        name: name.to_string(),
                        detail: format!("expected shape {}, got {}", current.shape(), new.shape()),
                    });
                }
            }
        }

        let mut report = LoadReport::default();
        for (name, slot) in self.named_parameters_mut() {
            match params.get(name) {
                Some(new) => {
                    slot.as_f32_slice_mut().copy_from_slice(new.as_f32_slice());
                    report.loaded += 1;
                }
                None => report.missing.push(name.to_string()),
            }
        }
        if !report.missing.is_empty() {
            tracing::debug!(
                loaded = report.loaded,
                missing = report.missing.len(),
                "partial parameter load"
            );
        }
        Ok(report)
    }
}

/// Seeded parameter initializer.
///
/// Projection weights are drawn Xavier-uniform,
/// `U(-sqrt(6 / (in + out)), sqrt(6 / (in + out)))`; biases and
/// normalization scale/shift are constants. Two initializers created with
/// the same seed produce identical parameters for the same construction
/// sequence.
#[derive(Debug, Clone)]
pub struct Initializer {
    rng: StdRng,
}

impl Initializer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Xavier-uniform weight of shape `[out_features, in_features]`.
    pub fn xavier_uniform(&mut self, out_features: usize, in_features: usize) -> Tensor {
        let fan = (in_features + out_features).max(1) as f32;
        let limit = (6.0 / fan).sqrt();
        let mut weight = Tensor::zeros(Shape::matrix(out_features, in_features));
        for v in weight.as_f32_slice_mut() {
            *v = self.rng.gen_range(-limit..=limit);
        }
        weight
    }

    /// Tensor of the given shape filled with `value`.
    pub fn constant(&self, shape: impl Into<Shape>, value: f32) -> Tensor {
        Tensor::full(shape.into(), value)
    }
}

impl Default for Initializer {
    fn default() -> Self {
        Self::new(0)
    }
}
