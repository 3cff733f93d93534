// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Recurrent cells and the cell-stack builder.
//!
//! Two cell families are provided, each with three normalization
//! placements:
//!
//! | identifier | family | normalization        |
//! |------------|--------|----------------------|
//! | `lstm`     | LSTM   | none                 |
//! | `lnlstm`   | LSTM   | across gates         |
//! | `lnglstm`  | LSTM   | per gate             |
//! | `gru`      | GRU    | none                 |
//! | `lngru`    | GRU    | across gates         |
//! | `lnggru`   | GRU    | per gate             |
//!
//! Cells are step-level: `step(input [batch, in], state) -> (output
//! [batch, H], new state)`. The caller threads state from one step into the
//! next; [`RnnStack::unroll`] does this for a whole sequence.

mod gru;
mod lstm;
mod stack;

pub use gru::{GruCell, GruNorm};
pub use lstm::{LstmCell, LstmNorm};
pub use stack::{build, LayerCell, ResidualCell, RnnStack, StackLayer};

use std::fmt;

use rand::rngs::StdRng;
use tensor_core::{Shape, Tensor};

use crate::params::{Initializer, Parameterized};
use crate::LayerError;

/// Where layer normalization is injected into a cell's recurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormPlacement {
    None,
    /// One unit over the whole `i2h` output and one over the whole `h2h`
    /// output, plus one on the cell memory (LSTM).
    AcrossGates,
    /// One unit per gate pre-activation, plus one on the cell memory (LSTM).
    PerGate,
}

/// Recurrent cell kind, parsed from the configuration string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellType {
    Lstm,
    LnLstm,
    LngLstm,
    Gru,
    LnGru,
    LngGru,
}

impl CellType {
    /// Parses an identifier case-insensitively.
    ///
    /// # Errors
    /// Returns [`LayerError::Config`] for an unknown identifier.
    pub fn from_str_loose(s: &str) -> Result<Self, LayerError> {
        match s.trim().to_lowercase().as_str() {
            "lstm" => Ok(CellType::Lstm),
            "lnlstm" => Ok(CellType::LnLstm),
            "lnglstm" => Ok(CellType::LngLstm),
            "gru" => Ok(CellType::Gru),
            "lngru" => Ok(CellType::LnGru),
            "lnggru" => Ok(CellType::LngGru),
            other => Err(LayerError::config(format!(
                "unknown cell type '{other}'; expected one of lstm, lnlstm, lnglstm, gru, lngru, lnggru"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CellType::Lstm => "lstm",
            CellType::LnLstm => "lnlstm",
            CellType::LngLstm => "lnglstm",
            CellType::Gru => "gru",
            CellType::LnGru => "lngru",
            CellType::LngGru => "lnggru",
        }
    }

    pub fn is_lstm(&self) -> bool {
        matches!(self, CellType::Lstm | CellType::LnLstm | CellType::LngLstm)
    }

    pub fn norm_placement(&self) -> NormPlacement {
        match self {
            CellType::Lstm | CellType::Gru => NormPlacement::None,
            CellType::LnLstm | CellType::LnGru => NormPlacement::AcrossGates,
            CellType::LngLstm | CellType::LngGru => NormPlacement::PerGate,
        }
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Initial values for gate biases and normalization parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellInit {
    /// Forget-gate bias (LSTM). Per-gate normalization also uses it as the
    /// forget unit's shift.
    pub forget_bias: f32,
    pub norm_scale: f32,
    pub norm_shift: f32,
}

impl Default for CellInit {
    fn default() -> Self {
        Self {
            forget_bias: 1.0,
            norm_scale: 1.0,
            norm_shift: 0.0,
        }
    }
}

/// Recurrent state carried between steps.
///
/// `hidden` is `[batch, H]`; `memory` is the LSTM cell memory `[batch, H]`
/// and is `None` for GRU cells.
#[derive(Debug, Clone, PartialEq)]
pub struct CellState {
    pub hidden: Tensor,
    pub memory: Option<Tensor>,
}

impl CellState {
    /// Zeroed state for a cell of `num_hidden` units.
    pub fn zeros(batch: usize, num_hidden: usize, with_memory: bool) -> Self {
        Self {
            hidden: Tensor::zeros(Shape::matrix(batch, num_hidden)),
            memory: with_memory.then(|| Tensor::zeros(Shape::matrix(batch, num_hidden))),
        }
    }
}

/// A single recurrent cell of either family.
#[derive(Debug, Clone)]
pub enum RecurrentCell {
    Lstm(LstmCell),
    Gru(GruCell),
}

impl RecurrentCell {
    /// Creates a cell of `kind` with parameters prefixed by `prefix`.
    ///
    /// # Errors
    /// Returns [`LayerError::Config`] if a normalized variant is requested
    /// with `num_hidden <= 1`.
    pub fn new(
        kind: CellType,
        prefix: &str,
        input_size: usize,
        num_hidden: usize,
        cell_init: &CellInit,
        init: &mut Initializer,
    ) -> Result<Self, LayerError> {
        let placement = kind.norm_placement();
        let cell = if kind.is_lstm() {
            RecurrentCell::Lstm(LstmCell::new(
                prefix, input_size, num_hidden, placement, cell_init, init,
            )?)
        } else {
            RecurrentCell::Gru(GruCell::new(
                prefix, input_size, num_hidden, placement, cell_init, init,
            )?)
        };
        tracing::debug!(prefix, kind = %kind, input_size, num_hidden, "recurrent cell created");
        Ok(cell)
    }

    pub fn kind(&self) -> CellType {
        match self {
            RecurrentCell::Lstm(c) => c.kind(),
            RecurrentCell::Gru(c) => c.kind(),
        }
    }

    pub fn prefix(&self) -> &str {
        match self {
            RecurrentCell::Lstm(c) => c.prefix(),
            RecurrentCell::Gru(c) => c.prefix(),
        }
    }

    pub fn input_size(&self) -> usize {
        match self {
            RecurrentCell::Lstm(c) => c.input_size(),
            RecurrentCell::Gru(c) => c.input_size(),
        }
    }

    pub fn num_hidden(&self) -> usize {
        match self {
            RecurrentCell::Lstm(c) => c.num_hidden(),
            RecurrentCell::Gru(c) => c.num_hidden(),
        }
    }

    /// Zeroed state for `batch` sequences.
    pub fn begin_state(&self, batch: usize) -> CellState {
        CellState::zeros(
            batch,
            self.num_hidden(),
            matches!(self, RecurrentCell::Lstm(_)),
        )
    }

    /// Advances one time step. `step` is the time index, used for tracing.
    pub fn step(
        &self,
        input: &Tensor,
        state: &CellState,
        step: usize,
    ) -> Result<(Tensor, CellState), LayerError> {
        tracing::trace!(cell = %self.prefix(), step, "cell step");
        match self {
            RecurrentCell::Lstm(c) => c.step(input, state),
            RecurrentCell::Gru(c) => c.step(input, state),
        }
    }
}

impl Parameterized for RecurrentCell {
    fn named_parameters(&self) -> Vec<(&str, &Tensor)> {
        match self {
            RecurrentCell::Lstm(c) => c.named_parameters(),
            RecurrentCell::Gru(c) => c.named_parameters(),
        }
    }

    fn named_parameters_mut(&mut self) -> Vec<(&str, &mut Tensor)> {
        match self {
            RecurrentCell::Lstm(c) => c.named_parameters_mut(),
            RecurrentCell::Gru(c) => c.named_parameters_mut(),
        }
    }
}

/// Optional training RNG threaded through a stack step.
pub(crate) type TrainRng<'a> = Option<&'a mut StdRng>;
