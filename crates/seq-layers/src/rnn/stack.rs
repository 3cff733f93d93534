// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Multi-layer recurrent stacks.
//!
//! ```text
//! input ─▶ [l0 cell] ─▶ (dropout) ─▶ [l1 cell (+ input)] ─▶ (dropout) ─▶ ... ─▶ output
//! ```

use rand::rngs::StdRng;
use tensor_core::{Tensor, TensorError};

use super::{CellInit, CellState, RecurrentCell, TrainRng};
use crate::config::RnnConfig;
use crate::dropout::Dropout;
use crate::params::{Initializer, Parameterized};
use crate::LayerError;

/// Wraps a cell so that its output becomes `cell output + input`.
///
/// State passes through untouched.
#[derive(Debug, Clone)]
pub struct ResidualCell {
    base: RecurrentCell,
}

impl ResidualCell {
    /// # Errors
    /// Returns [`LayerError::Config`] if the cell's input size differs from
    /// its hidden size.
    pub fn new(base: RecurrentCell) -> Result<Self, LayerError> {
        if base.input_size() != base.num_hidden() {
            return Err(LayerError::config(format!(
                "residual connection on '{}' needs input size ({}) equal to hidden size ({})",
                base.prefix(),
                base.input_size(),
                base.num_hidden()
            )));
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &RecurrentCell {
        &self.base
    }

    pub fn step(
        &self,
        input: &Tensor,
        state: &CellState,
        step: usize,
    ) -> Result<(Tensor, CellState), LayerError> {
        let (output, next) = self.base.step(input, state, step)?;
        Ok((output.add(input)?, next))
    }
}

/// A stack layer's cell, plain or residual.
#[derive(Debug, Clone)]
pub enum LayerCell {
    Base(RecurrentCell),
    Residual(ResidualCell),
}

impl LayerCell {
    pub fn cell(&self) -> &RecurrentCell {
        match self {
            LayerCell::Base(c) => c,
            LayerCell::Residual(r) => &r.base,
        }
    }

    fn cell_mut(&mut self) -> &mut RecurrentCell {
        match self {
            LayerCell::Base(c) => c,
            LayerCell::Residual(r) => &mut r.base,
        }
    }

    pub fn is_residual(&self) -> bool {
        matches!(self, LayerCell::Residual(_))
    }

    pub fn step(
        &self,
        input: &Tensor,
        state: &CellState,
        step: usize,
    ) -> Result<(Tensor, CellState), LayerError> {
        match self {
            LayerCell::Base(c) => c.step(input, state, step),
            LayerCell::Residual(r) => r.step(input, state, step),
        }
    }
}

/// One layer: a cell and an optional dropout on its output.
#[derive(Debug, Clone)]
pub struct StackLayer {
    pub cell: LayerCell,
    pub dropout: Option<Dropout>,
}

/// An ordered stack of recurrent layers.
#[derive(Debug, Clone)]
pub struct RnnStack {
    prefix: String,
    input_size: usize,
    num_hidden: usize,
    layers: Vec<StackLayer>,
}

impl RnnStack {
    /// Assembles a stack from pre-built layers.
    ///
    /// # Errors
    /// Returns [`LayerError::Config`] if `layers` is empty or adjacent layers
    /// disagree on width.
    pub fn from_layers(prefix: &str, layers: Vec<StackLayer>) -> Result<Self, LayerError> {
        let (Some(first), Some(last)) = (layers.first(), layers.last()) else {
            return Err(LayerError::config("a cell stack needs at least one layer"));
        };
        let input_size = first.cell.cell().input_size();
        let num_hidden = last.cell.cell().num_hidden();
        for pair in layers.windows(2) {
            let (prev, next) = (pair[0].cell.cell(), pair[1].cell.cell());
            if prev.num_hidden() != next.input_size() {
                return Err(LayerError::config(format!(
                    "layer '{}' outputs {} units but '{}' expects {}",
                    prev.prefix(),
                    prev.num_hidden(),
                    next.prefix(),
                    next.input_size()
                )));
            }
        }
        Ok(Self {
            prefix: prefix.to_string(),
            input_size,
            num_hidden,
            layers,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Width of the stack output (last layer's hidden size).
    pub fn num_hidden(&self) -> usize {
        self.num_hidden
    }

    pub fn layers(&self) -> &[StackLayer] {
        &self.layers
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Zeroed per-layer states for `batch` sequences.
    pub fn begin_state(&self, batch: usize) -> Vec<CellState> {
        self.layers
            .iter()
            .map(|l| l.cell.cell().begin_state(batch))
            .collect()
    }

    /// Inference step through every layer; dropout is inactive.
    pub fn step(
        &self,
        input: &Tensor,
        states: &[CellState],
        step: usize,
    ) -> Result<(Tensor, Vec<CellState>), LayerError> {
        self.forward_step(input, states, step, None)
    }

    /// Training step; layer dropout draws from `rng`.
    pub fn step_train(
        &self,
        input: &Tensor,
        states: &[CellState],
        step: usize,
        rng: &mut StdRng,
    ) -> Result<(Tensor, Vec<CellState>), LayerError> {
        self.forward_step(input, states, step, Some(rng))
    }

    /// Runs the stack over a sequence of `[batch, input_size]` step inputs,
    /// starting from `states` (or zeros when `None`).
    ///
    /// Returns the per-step outputs and the final states. Equivalent to
    /// calling [`RnnStack::step`] once per element, threading states.
    pub fn unroll(
        &self,
        inputs: &[Tensor],
        states: Option<Vec<CellState>>,
    ) -> Result<(Vec<Tensor>, Vec<CellState>), LayerError> {
        self.forward_unroll(inputs, states, None)
    }

    /// Training-mode [`RnnStack::unroll`].
    pub fn unroll_train(
        &self,
        inputs: &[Tensor],
        states: Option<Vec<CellState>>,
        rng: &mut StdRng,
    ) -> Result<(Vec<Tensor>, Vec<CellState>), LayerError> {
        self.forward_unroll(inputs, states, Some(rng))
    }

    fn forward_unroll(
        &self,
        inputs: &[Tensor],
        states: Option<Vec<CellState>>,
        mut rng: TrainRng<'_>,
    ) -> Result<(Vec<Tensor>, Vec<CellState>), LayerError> {
        let batch = inputs.first().and_then(|x| x.shape().dim(0)).unwrap_or(0);
        let mut states = states.unwrap_or_else(|| self.begin_state(batch));
        let mut outputs = Vec::with_capacity(inputs.len());
        for (t, input) in inputs.iter().enumerate() {
            let (out, next) = self.forward_step(input, &states, t, rng.as_deref_mut())?;
            outputs.push(out);
            states = next;
        }
        tracing::debug!(stack = %self.prefix, steps = inputs.len(), batch, "unrolled");
        Ok((outputs, states))
    }

    fn forward_step(
        &self,
        input: &Tensor,
        states: &[CellState],
        step: usize,
        mut rng: TrainRng<'_>,
    ) -> Result<(Tensor, Vec<CellState>), LayerError> {
        if states.len() != self.layers.len() {
            return Err(TensorError::InvalidArgument {
                op: "stack step",
                detail: format!(
                    "expected {} layer states, got {}",
                    self.layers.len(),
                    states.len()
                ),
            }
            .into());
        }

        let mut x = input.clone();
        let mut next_states = Vec::with_capacity(states.len());
        for (layer, state) in self.layers.iter().zip(states) {
            let (out, next) = layer.cell.step(&x, state, step)?;
            x = match &layer.dropout {
                Some(d) => d.apply(&out, rng.as_deref_mut())?,
                None => out,
            };
            next_states.push(next);
        }
        Ok((x, next_states))
    }
}

impl Parameterized for RnnStack {
    fn named_parameters(&self) -> Vec<(&str, &Tensor)> {
        self.layers
            .iter()
            .flat_map(|l| l.cell.cell().named_parameters())
            .collect()
    }

    fn named_parameters_mut(&mut self) -> Vec<(&str, &mut Tensor)> {
        self.layers
            .iter_mut()
            .flat_map(|l| l.cell.cell_mut().named_parameters_mut())
            .collect()
    }
}

/// Builds a stack from `config`.
///
/// Layer `i` gets prefix `"{prefix}l{i}_"` and input size `input_size` for
/// the first layer, `num_hidden` afterwards. With `residual`, layers after
/// the first are wrapped in a [`ResidualCell`]. With `dropout > 0`, each
/// layer's output passes through dropout.
///
/// # Errors
/// Returns [`LayerError::Config`] for an unknown cell type, zero layers or
/// hidden units, a dropout outside `[0, 1)`, or a normalized cell with a
/// single hidden unit.
pub fn build(
    config: &RnnConfig,
    input_size: usize,
    prefix: &str,
    init: &mut Initializer,
) -> Result<RnnStack, LayerError> {
    config.validate()?;
    let kind = config.cell_kind()?;
    let cell_init = CellInit {
        forget_bias: config.forget_bias,
        norm_scale: config.norm_scale_init,
        norm_shift: config.norm_shift_init,
    };

    let mut layers = Vec::with_capacity(config.num_layers);
    for i in 0..config.num_layers {
        let cell_prefix = format!("{prefix}l{i}_");
        let layer_input = if i == 0 { input_size } else { config.num_hidden };
        let cell = RecurrentCell::new(
            kind,
            &cell_prefix,
            layer_input,
            config.num_hidden,
            &cell_init,
            init,
        )?;
        let cell = if config.residual && i > 0 {
            LayerCell::Residual(ResidualCell::new(cell)?)
        } else {
            LayerCell::Base(cell)
        };
        let dropout = if config.dropout > 0.0 {
            Some(Dropout::new(config.dropout)?)
        } else {
            None
        };
        layers.push(StackLayer { cell, dropout });
    }

    let stack = RnnStack::from_layers(prefix, layers)?;
    tracing::info!(
        prefix,
        cell_type = %kind,
        layers = config.num_layers,
        num_hidden = config.num_hidden,
        residual = config.residual,
        dropout = config.dropout,
        params = stack.num_parameters(),
        "rnn stack built"
    );
    Ok(stack)
}
