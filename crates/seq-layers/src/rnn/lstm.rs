// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! LSTM cell with optional layer normalization.
//!
//! Gate pre-activations are laid out `[in, forget, candidate, out]` along the
//! last axis of the `4H`-wide projections.

use tensor_core::{Tensor, TensorError};

use super::{CellInit, CellState, CellType, NormPlacement};
use crate::layer_norm::LayerNorm;
use crate::linear::Linear;
use crate::params::{Initializer, Parameterized};
use crate::LayerError;

const GATES: usize = 4;
const FORGET_GATE: usize = 1;

/// Normalization units held by an [`LstmCell`].
#[derive(Debug, Clone)]
pub enum LstmNorm {
    Plain,
    /// `gates = i2h(i2h(x)) + h2h(h2h(h))`, `h = o ⊙ tanh(cell(c))`.
    AcrossGates {
        i2h: LayerNorm,
        h2h: LayerNorm,
        cell: LayerNorm,
    },
    /// Each gate pre-activation normalized by its own unit, in gate order,
    /// then `h = o ⊙ tanh(cell(c))`.
    PerGate {
        gates: [LayerNorm; GATES],
        cell: LayerNorm,
    },
}

/// Long short-term memory cell.
#[derive(Debug, Clone)]
pub struct LstmCell {
    prefix: String,
    input_size: usize,
    num_hidden: usize,
    i2h: Linear,
    h2h: Linear,
    norm: LstmNorm,
}

impl LstmCell {
    /// Creates a cell whose parameters are named `{prefix}i2h_weight`,
    /// `{prefix}h2h_bias`, `{prefix}c_scale`, `{prefix}f_shift`, ...
    ///
    /// The forget slice of the `i2h` bias starts at `cell_init.forget_bias`.
    /// With per-gate normalization the forget unit's shift also starts there.
    pub fn new(
        prefix: &str,
        input_size: usize,
        num_hidden: usize,
        placement: NormPlacement,
        cell_init: &CellInit,
        init: &mut Initializer,
    ) -> Result<Self, LayerError> {
        let h = num_hidden;
        let mut i2h = Linear::new(&format!("{prefix}i2h"), input_size, GATES * h, init);
        let h2h = Linear::new(&format!("{prefix}h2h"), h, GATES * h, init);
        i2h.fill_bias(FORGET_GATE * h..(FORGET_GATE + 1) * h, cell_init.forget_bias);

        let unit = |tag: &str, width: usize, shift: f32| {
            LayerNorm::with_names(
                format!("{prefix}{tag}_scale"),
                format!("{prefix}{tag}_shift"),
                width,
                cell_init.norm_scale,
                shift,
            )
        };

        let norm = match placement {
            NormPlacement::None => LstmNorm::Plain,
            NormPlacement::AcrossGates => LstmNorm::AcrossGates {
                i2h: unit("i2h", GATES * h, cell_init.norm_shift)?,
                h2h: unit("h2h", GATES * h, cell_init.norm_shift)?,
                cell: unit("c", h, cell_init.norm_shift)?,
            },
            NormPlacement::PerGate => LstmNorm::PerGate {
                gates: [
                    unit("i", h, cell_init.norm_shift)?,
                    unit("f", h, cell_init.forget_bias)?,
                    unit("c", h, cell_init.norm_shift)?,
                    unit("o", h, cell_init.norm_shift)?,
                ],
                cell: unit("s", h, cell_init.norm_shift)?,
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
            LstmNorm::Plain => CellType::Lstm,
            LstmNorm::AcrossGates { .. } => CellType::LnLstm,
            LstmNorm::PerGate { .. } => CellType::LngLstm,
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

    pub fn norm(&self) -> &LstmNorm {
        &self.norm
    }

    /// One step: `input [batch, in]`, state `(h, c)` → `(h', (h', c'))`.
    pub(crate) fn step(
        &self,
        input: &Tensor,
        state: &CellState,
    ) -> Result<(Tensor, CellState), LayerError> {
        let memory = state.memory.as_ref().ok_or_else(|| TensorError::InvalidArgument {
            op: "lstm step",
            detail: format!("cell '{}' was given a state without memory", self.prefix),
        })?;

        let i2h = self.i2h.forward(input)?;
        let h2h = self.h2h.forward(&state.hidden)?;
        let gates = match &self.norm {
            LstmNorm::AcrossGates { i2h: ni, h2h: nh, .. } => {
                ni.normalize(&i2h)?.add(&nh.normalize(&h2h)?)?
            }
            LstmNorm::Plain | LstmNorm::PerGate { .. } => i2h.add(&h2h)?,
        };

        let mut parts = gates.split_last(GATES)?;
        if let LstmNorm::PerGate { gates: units, .. } = &self.norm {
            for (part, unit) in parts.iter_mut().zip(units) {
                *part = unit.normalize(part)?;
            }
        }
        let Ok([in_gate, forget_gate, in_transform, out_gate]) = <[Tensor; GATES]>::try_from(parts)
        else {
            return Err(TensorError::InvalidArgument {
                op: "lstm step",
                detail: "gate projection did not split into four gates".into(),
            }
            .into());
        };

        let in_gate = in_gate.sigmoid();
        let forget_gate = forget_gate.sigmoid();
        let in_transform = in_transform.tanh();
        let out_gate = out_gate.sigmoid();

        let next_c = forget_gate.mul(memory)?.add(&in_gate.mul(&in_transform)?)?;
        let squashed = match &self.norm {
            LstmNorm::Plain => next_c.tanh(),
            LstmNorm::AcrossGates { cell, .. } | LstmNorm::PerGate { cell, .. } => {
                cell.normalize(&next_c)?.tanh()
            }
        };
        let next_h = out_gate.mul(&squashed)?;

        Ok((
            next_h.clone(),
            CellState {
                hidden: next_h,
                memory: Some(next_c),
            },
        ))
    }
}

impl Parameterized for LstmCell {
    fn named_parameters(&self) -> Vec<(&str, &Tensor)> {
        let mut params = self.i2h.named_parameters();
        params.extend(self.h2h.named_parameters());
        match &self.norm {
            LstmNorm::Plain => {}
            LstmNorm::AcrossGates { i2h, h2h, cell } => {
                for unit in [i2h, h2h, cell] {
                    params.extend(unit.named_parameters());
                }
            }
            LstmNorm::PerGate { gates, cell } => {
                for unit in gates.iter().chain(std::iter::once(cell)) {
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
            LstmNorm::Plain => {}
            LstmNorm::AcrossGates { i2h, h2h, cell } => {
                for unit in [i2h, h2h, cell] {
                    params.extend(unit.named_parameters_mut());
                }
            }
            LstmNorm::PerGate { gates, cell } => {
                for unit in gates.iter_mut().chain(std::iter::once(cell)) {
                    params.extend(unit.named_parameters_mut());
                }
            }
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::Shape;

    fn cell(placement: NormPlacement, forget_bias: f32) -> LstmCell {
        let mut init = Initializer::new(17);
        let cell_init = CellInit {
            forget_bias,
            ..CellInit::default()
        };
        LstmCell::new("l0_", 3, 4, placement, &cell_init, &mut init).unwrap()
    }

    fn zero_state(batch: usize) -> CellState {
        CellState::zeros(batch, 4, true)
    }

    #[test]
    fn test_forget_bias_on_i2h_bias() {
        let c = cell(NormPlacement::None, 1.0);
        let (_, bias) = c.named_parameters()[1];
        let b = bias.as_f32_slice();
        assert!(b[0..4].iter().all(|&v| v == 0.0));
        assert!(b[4..8].iter().all(|&v| v == 1.0));
        assert!(b[8..16].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_across_gates_parameter_names() {
        let c = cell(NormPlacement::AcrossGates, 0.0);
        let names: Vec<&str> = c.named_parameters().iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            vec![
                "l0_i2h_weight",
                "l0_i2h_bias",
                "l0_h2h_weight",
                "l0_h2h_bias",
                "l0_i2h_scale",
                "l0_i2h_shift",
                "l0_h2h_scale",
                "l0_h2h_shift",
                "l0_c_scale",
                "l0_c_shift",
            ]
        );
        let sd = c.state_dict();
        assert_eq!(sd["l0_i2h_scale"].dims(), &[16]);
        assert_eq!(sd["l0_c_shift"].dims(), &[4]);
    }

    #[test]
    fn test_per_gate_forget_shift() {
        let c = cell(NormPlacement::PerGate, 1.0);
        let sd = c.state_dict();
        assert!(sd["l0_f_shift"].as_f32_slice().iter().all(|&v| v == 1.0));
        for gate in ["i", "c", "o", "s"] {
            let shift = &sd[&format!("l0_{gate}_shift")];
            assert!(shift.as_f32_slice().iter().all(|&v| v == 0.0), "{gate}");
            let scale = &sd[&format!("l0_{gate}_scale")];
            assert!(scale.as_f32_slice().iter().all(|&v| v == 1.0), "{gate}");
        }
    }

    #[test]
    fn test_step_shapes_and_state() {
        for placement in [
            NormPlacement::None,
            NormPlacement::AcrossGates,
            NormPlacement::PerGate,
        ] {
            let c = cell(placement, 1.0);
            let x = Tensor::from_f32(Shape::matrix(2, 3), &[0.5, -1.0, 2.0, 0.0, 0.3, -0.7]).unwrap();
            let (out, state) = c.step(&x, &zero_state(2)).unwrap();
            assert_eq!(out.dims(), &[2, 4]);
            assert_eq!(state.hidden, out);
            assert_eq!(state.memory.as_ref().map(|m| m.dims().to_vec()), Some(vec![2, 4]));
            // |h| = |o ⊙ tanh(.)| < 1
            assert!(out.as_f32_slice().iter().all(|v| v.abs() < 1.0));
        }
    }

    #[test]
    fn test_plain_zero_input_keeps_zero_state() {
        // Every pre-activation reduces to its bias; the candidate bias is 0.
        let c = cell(NormPlacement::None, 1.0);
        let x = Tensor::zeros(Shape::matrix(1, 3));
        let (out, state) = c.step(&x, &zero_state(1)).unwrap();
        assert!(out.as_f32_slice().iter().all(|&v| v == 0.0));
        assert!(state.memory.unwrap().as_f32_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_missing_memory_is_error() {
        let c = cell(NormPlacement::None, 0.0);
        let state = CellState::zeros(1, 4, false);
        let x = Tensor::zeros(Shape::matrix(1, 3));
        assert!(matches!(
            c.step(&x, &state),
            Err(LayerError::Tensor(TensorError::InvalidArgument { .. }))
        ));
    }

    #[test]
    fn test_wrong_input_width_is_tensor_error() {
        let c = cell(NormPlacement::AcrossGates, 0.0);
        let x = Tensor::zeros(Shape::matrix(1, 5));
        assert!(matches!(c.step(&x, &zero_state(1)), Err(LayerError::Tensor(_))));
    }
}
