// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! GRU cell with optional layer normalization.
//!
//! Projections are `3H` wide, laid out `[reset, update, candidate]`.

use tensor_core::{Tensor, TensorError};

use super::{CellInit, CellState, CellType, NormPlacement};
use crate::layer_norm::LayerNorm;
use crate::linear::Linear;
use crate::params::{Initializer, Parameterized};
use crate::LayerError;

const GATES: usize = 3;

/// Normalization units held by a [`GruCell`].
#[derive(Debug, Clone)]
pub enum GruNorm {
    Plain,
    /// Whole `i2h` and `h2h` outputs normalized before the gate split.
    AcrossGates { i2h: LayerNorm, h2h: LayerNorm },
    /// `r = σ(reset(i_r + h_r))`, `z = σ(update(i_z + h_z))`,
    /// `n = tanh(candidate(i_c + r ⊙ h_c))`.
    PerGate {
        reset: LayerNorm,
        update: LayerNorm,
        candidate: LayerNorm,
    },
}

/// Gated recurrent unit.
#[derive(Debug, Clone)]
pub struct GruCell {
    prefix: String,
    input_size: usize,
    num_hidden: usize,
    i2h: Linear,
    h2h: Linear,
    norm: GruNorm,
}

impl GruCell {
    pub fn new(
        prefix: &str,
        input_size: usize,
        num_hidden: usize,
        placement: NormPlacement,
        cell_init: &CellInit,
        init: &mut Initializer,
    ) -> Result<Self, LayerError> {
        let h = num_hidden;
        let i2h = Linear::new(&format!("{prefix}i2h"), input_size, GATES * h, init);
        let h2h = Linear::new(&format!("{prefix}h2h"), h, GATES * h, init);

        let unit = |tag: &str, width: usize| {
            LayerNorm::with_names(
                format!("{prefix}{tag}_scale"),
                format!("{prefix}{tag}_shift"),
                width,
                cell_init.norm_scale,
                cell_init.norm_shift,
            )
        };

        let norm = match placement {
            NormPlacement::None => GruNorm::Plain,
            NormPlacement::AcrossGates => GruNorm::AcrossGates {
                i2h: unit("i2h", GATES * h)?,
                h2h: unit("h2h", GATES * h)?,
            },
            NormPlacement::PerGate => GruNorm::PerGate {
                reset: unit("r", h)?,
                update: unit("z", h)?,
                candidate: unit("o", h)?,
            },
        };

        Ok(Self {
            prefix: prefix.to_string(),
            input_size,
            num_hidden,
            i2h,
            h2h,
            norm,
        })
    }

    pub fn kind(&self) -> CellType {
        match self.norm {
            GruNorm::Plain => CellType::Gru,
            GruNorm::AcrossGates { .. } => CellType::LnGru,
            GruNorm::PerGate { .. } => CellType::LngGru,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn num_hidden(&self) -> usize {
        self.num_hidden
    }

    pub fn norm(&self) -> &GruNorm {
        &self.norm
    }

    /// One step: `h' = (1 − z) ⊙ n + z ⊙ h`.
    pub(crate) fn step(
        &self,
        input: &Tensor,
        state: &CellState,
    ) -> Result<(Tensor, CellState), LayerError> {
        let prev_h = &state.hidden;
        let mut i2h = self.i2h.forward(input)?;
        let mut h2h = self.h2h.forward(prev_h)?;
        if let GruNorm::AcrossGates { i2h: ni, h2h: nh } = &self.norm {
            i2h = ni.normalize(&i2h)?;
            h2h = nh.normalize(&h2h)?;
        }

        let (Ok([i_r, i_z, i_c]), Ok([h_r, h_z, h_c])) = (
            <[Tensor; GATES]>::try_from(i2h.split_last(GATES)?),
            <[Tensor; GATES]>::try_from(h2h.split_last(GATES)?),
        ) else {
            return Err(TensorError::InvalidArgument {
                op: "gru step",
                detail: "gate projection did not split into three gates".into(),
            }
            .into());
        };

        let reset_pre = i_r.add(&h_r)?;
        let update_pre = i_z.add(&h_z)?;
        let (reset_gate, update_gate) = match &self.norm {
            GruNorm::PerGate { reset, update, .. } => (
                reset.normalize(&reset_pre)?.sigmoid(),
                update.normalize(&update_pre)?.sigmoid(),
            ),
            _ => (reset_pre.sigmoid(), update_pre.sigmoid()),
        };

        let candidate_pre = i_c.add(&reset_gate.mul(&h_c)?)?;
        let next_h_tmp = match &self.norm {
            GruNorm::PerGate { candidate, .. } => candidate.normalize(&candidate_pre)?.tanh(),
            _ => candidate_pre.tanh(),
        };

        let kept = update_gate.mul(prev_h)?;
        let next_h = update_gate
            .zip_map(&next_h_tmp, "gru blend", |z, n| (1.0 - z) * n)?
            .add(&kept)?;

        Ok((
            next_h.clone(),
            CellState {
                hidden: next_h,
                memory: None,
            },
        ))
    }
}

impl Parameterized for GruCell {
    fn named_parameters(&self) -> Vec<(&str, &Tensor)> {
        let mut params = self.i2h.named_parameters();
        params.extend(self.h2h.named_parameters());
        match &self.norm {
            GruNorm::Plain => {}
            GruNorm::AcrossGates { i2h, h2h } => {
                params.extend(i2h.named_parameters());
                params.extend(h2h.named_parameters());
            }
            GruNorm::PerGate {
                reset,
                update,
                candidate,
            } => {
                for unit in [reset, update, candidate] {
                    params.extend(unit.named_parameters());
                }
            }
        }
        params
    }

    fn named_parameters_mut(&mut self) -> Vec<(&str, &mut Tensor)> {
        let mut params = self.i2h.named_parameters_mut();
        params.extend(self.h2h.named_parameters_mut());
        match &mut self.norm {
            GruNorm::Plain => {}
            GruNorm::AcrossGates { i2h, h2h } => {
                params.extend(i2h.named_parameters_mut());
                params.extend(h2h.named_parameters_mut());
            }
            GruNorm::PerGate {
                reset,
                update,
                candidate,
            } => {
                for unit in [reset, update, candidate] {
                    params.extend(unit.named_parameters_mut());
                }
            }
        }
        params
    }
}
