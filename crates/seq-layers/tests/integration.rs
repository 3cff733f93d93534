// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: blocks composed through the public API only.
//!
//! These exercise the numerical contracts of normalization, attention
//! masking, head reshapes, dropout and the recurrent stacks end-to-end.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use seq_layers::attention::{combine_heads, split_heads};
use seq_layers::rnn::{self, CellInit, LstmCell, NormPlacement, ResidualCell};
use seq_layers::{
    AttentionConfig, CellState, CellType, FeedForward, Initializer, LayerError, LayerNorm,
    MultiHeadAttention, Parameterized, RecurrentCell, RnnConfig,
};
use tensor_core::{Shape, Tensor};

// ── Helpers ────────────────────────────────────────────────────

fn random(shape: Shape, seed: u64, spread: f32) -> Tensor {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = shape.num_elements();
    let data = (0..n).map(|_| rng.gen_range(-spread..spread)).collect();
    Tensor::from_vec(shape, data).unwrap()
}

fn lengths(values: &[f32]) -> Tensor {
    Tensor::from_f32(Shape::matrix(values.len(), 1), values).unwrap()
}

fn rnn_config(cell_type: &str, num_hidden: usize, layers: usize) -> RnnConfig {
    RnnConfig {
        cell_type: cell_type.into(),
        num_hidden,
        num_layers: layers,
        ..Default::default()
    }
}

const ALL_CELLS: [&str; 6] = ["lstm", "lnlstm", "lnglstm", "gru", "lngru", "lnggru"];

/// Random replacement values for every parameter of `block`; scales are
/// centred on 1.
fn perturbed(block: &impl Parameterized, seed: u64) -> HashMap<String, Tensor> {
    block
        .named_parameters()
        .into_iter()
        .enumerate()
        .map(|(i, (name, current))| {
            let value = random(current.shape().clone(), seed + i as u64, 0.5);
            let value = if name.ends_with("_scale") {
                value.map(|v| v + 1.0)
            } else {
                value
            };
            (name.to_string(), value)
        })
        .collect()
}

fn assert_close(actual: &[f32], expected: &[f32], what: &str) {
    assert_eq!(actual.len(), expected.len(), "{what}: length");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!((a - e).abs() < 1e-5, "{what}[{i}]: {a} vs {e}");
    }
}

// ── Reference math on plain slices ─────────────────────────────

/// `x [rows, in] · wᵀ + b` with `w` stored `[out, in]`.
fn affine(x: &[f32], rows: usize, w: &Tensor, b: &Tensor) -> Vec<f32> {
    let (out, inp) = (w.dims()[0], w.dims()[1]);
    let (w, b) = (w.as_f32_slice(), b.as_f32_slice());
    let mut y = vec![0.0; rows * out];
    for r in 0..rows {
        for o in 0..out {
            y[r * out + o] = b[o] + (0..inp).map(|i| w[o * inp + i] * x[r * inp + i]).sum::<f32>();
        }
    }
    y
}

fn norm_rows(x: &[f32], width: usize, scale: &Tensor, shift: &Tensor) -> Vec<f32> {
    let (g, b) = (scale.as_f32_slice(), shift.as_f32_slice());
    let mut y = Vec::with_capacity(x.len());
    for row in x.chunks(width) {
        let mean = row.iter().sum::<f32>() / width as f32;
        let var = row.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / width as f32;
        let inv_std = 1.0 / (var + 1e-5).sqrt();
        y.extend((0..width).map(|j| g[j] * (row[j] - mean) * inv_std + b[j]));
    }
    y
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Row `r` of a row-major buffer `width` wide.
fn row_of(data: &[f32], width: usize, r: usize) -> &[f32] {
    &data[r * width..(r + 1) * width]
}

/// LSTM step for a cell prefixed `cell_`; returns `(h', c')`.
fn lstm_reference(
    kind: CellType,
    p: &HashMap<String, Tensor>,
    x: &Tensor,
    h: &Tensor,
    c: &Tensor,
) -> (Vec<f32>, Vec<f32>) {
    let t = |name: &str| &p[&format!("cell_{name}")];
    let (batch, hidden) = (h.dims()[0], h.dims()[1]);
    let width = 4 * hidden;

    let mut gi = affine(x.as_f32_slice(), batch, t("i2h_weight"), t("i2h_bias"));
    let mut gh = affine(h.as_f32_slice(), batch, t("h2h_weight"), t("h2h_bias"));
    if kind == CellType::LnLstm {
        gi = norm_rows(&gi, width, t("i2h_scale"), t("i2h_shift"));
        gh = norm_rows(&gh, width, t("h2h_scale"), t("h2h_shift"));
    }
    let gates: Vec<f32> = gi.iter().zip(&gh).map(|(a, b)| a + b).collect();

    let (mut next_h, mut next_c) = (Vec::new(), Vec::new());
    for b in 0..batch {
        let row = row_of(&gates, width, b);
        let gate = |k: usize, tag: &str| {
            let pre = row_of(row, hidden, k);
            if kind == CellType::LngLstm {
                norm_rows(pre, hidden, t(&format!("{tag}_scale")), t(&format!("{tag}_shift")))
            } else {
                pre.to_vec()
            }
        };
        let (i, f, g, o) = (gate(0, "i"), gate(1, "f"), gate(2, "c"), gate(3, "o"));
        let prev_c = row_of(c.as_f32_slice(), hidden, b);
        let cell: Vec<f32> = (0..hidden)
            .map(|j| sigmoid(f[j]) * prev_c[j] + sigmoid(i[j]) * g[j].tanh())
            .collect();
        let squashed = match kind {
            CellType::LnLstm => norm_rows(&cell, hidden, t("c_scale"), t("c_shift")),
            CellType::LngLstm => norm_rows(&cell, hidden, t("s_scale"), t("s_shift")),
            _ => cell.clone(),
        };
        next_h.extend((0..hidden).map(|j| sigmoid(o[j]) * squashed[j].tanh()));
        next_c.extend(cell);
    }
    (next_h, next_c)
}

/// GRU step for a cell prefixed `cell_`; returns `h'`.
fn gru_reference(kind: CellType, p: &HashMap<String, Tensor>, x: &Tensor, h: &Tensor) -> Vec<f32> {
    let t = |name: &str| &p[&format!("cell_{name}")];
    let (batch, hidden) = (h.dims()[0], h.dims()[1]);
    let width = 3 * hidden;

    let mut gi = affine(x.as_f32_slice(), batch, t("i2h_weight"), t("i2h_bias"));
    let mut gh = affine(h.as_f32_slice(), batch, t("h2h_weight"), t("h2h_bias"));
    if kind == CellType::LnGru {
        gi = norm_rows(&gi, width, t("i2h_scale"), t("i2h_shift"));
        gh = norm_rows(&gh, width, t("h2h_scale"), t("h2h_shift"));
    }
    let per_gate = |pre: Vec<f32>, tag: &str| {
        if kind == CellType::LngGru {
            norm_rows(&pre, hidden, t(&format!("{tag}_scale")), t(&format!("{tag}_shift")))
        } else {
            pre
        }
    };

    let mut next_h = Vec::new();
    for b in 0..batch {
        let (ri, rh) = (row_of(&gi, width, b), row_of(&gh, width, b));
        let gate_i = |k: usize| row_of(ri, hidden, k);
        let gate_h = |k: usize| row_of(rh, hidden, k);
        let reset_pre: Vec<f32> = (0..hidden).map(|j| gate_i(0)[j] + gate_h(0)[j]).collect();
        let update_pre: Vec<f32> = (0..hidden).map(|j| gate_i(1)[j] + gate_h(1)[j]).collect();
        let r: Vec<f32> = per_gate(reset_pre, "r").into_iter().map(sigmoid).collect();
        let z: Vec<f32> = per_gate(update_pre, "z").into_iter().map(sigmoid).collect();
        let cand_pre: Vec<f32> = (0..hidden).map(|j| gate_i(2)[j] + r[j] * gate_h(2)[j]).collect();
        let n: Vec<f32> = per_gate(cand_pre, "o").into_iter().map(f32::tanh).collect();
        let prev = row_of(h.as_f32_slice(), hidden, b);
        next_h.extend((0..hidden).map(|j| (1.0 - z[j]) * n[j] + z[j] * prev[j]));
    }
    next_h
}

/// Self-attention over `x [batch, length, in]` computed one head and one
/// query at a time, using only keys below each sequence's valid length.
fn attend_reference(
    p: &HashMap<String, Tensor>,
    x: &Tensor,
    valid: &[usize],
    heads: usize,
) -> Vec<f32> {
    let (batch, length) = (x.dims()[0], x.dims()[1]);
    let proj = affine(x.as_f32_slice(), batch * length, &p["att_i2h_weight"], &p["att_i2h_bias"]);
    let depth_att = proj.len() / (batch * length * 3);
    let dh = depth_att / heads;
    let scale = (dh as f32).powf(-0.5);

    let mut context = vec![0.0; batch * length * depth_att];
    for b in 0..batch {
        for j in 0..heads {
            let head = |s: usize, part: usize| {
                let row = row_of(&proj, 3 * depth_att, b * length + s);
                &row[part * depth_att + j * dh..part * depth_att + (j + 1) * dh]
            };
            for t in 0..length {
                let q = head(t, 0);
                let scores: Vec<f32> = (0..valid[b])
                    .map(|s| q.iter().zip(head(s, 1)).map(|(a, k)| a * scale * k).sum())
                    .collect();
                let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
                let total: f32 = exps.iter().sum();
                for (s, e) in exps.iter().enumerate() {
                    let v = head(s, 2);
                    for d in 0..dh {
                        context[(b * length + t) * depth_att + j * dh + d] += e / total * v[d];
                    }
                }
            }
        }
    }

    match p.get("att_h2o_weight") {
        Some(w) => affine(&context, batch * length, w, &p["att_h2o_bias"]),
        None => context,
    }
}

// ── Normalization ──────────────────────────────────────────────

#[test]
fn normalization_dimension_boundary() {
    assert!(matches!(
        LayerNorm::new("n", 1, 1.0, 0.0),
        Err(LayerError::Config(_))
    ));
    assert!(LayerNorm::new("n", 2, 1.0, 0.0).is_ok());
}

#[test]
fn normalization_rows_have_zero_mean_unit_variance() {
    let ln = LayerNorm::new("n", 64, 1.0, 0.0).unwrap();
    let x = random(Shape::matrix(8, 64), 1, 50.0);
    let y = ln.normalize(&x).unwrap();
    let (mean, var) = LayerNorm::moments(&y).unwrap();
    for (&m, &v) in mean.as_f32_slice().iter().zip(var.as_f32_slice()) {
        assert!(m.abs() < 1e-4, "mean {m}");
        assert!((v - 1.0).abs() < 1e-4, "var {v}");
    }
}

// ── Attention ──────────────────────────────────────────────────

#[test]
fn head_split_then_combine_is_identity() {
    let x = random(Shape::rank3(3, 7, 24), 2, 1.0);
    for heads in [1, 2, 3, 4, 6, 8, 12, 24] {
        let round = combine_heads(&split_heads(&x, heads).unwrap(), heads).unwrap();
        assert_eq!(round, x, "heads = {heads}");
    }
}

#[test]
fn attention_512_by_8_builds_and_7_fails() {
    let mut init = Initializer::new(0);
    let ok = MultiHeadAttention::from_config("att_", 512, &AttentionConfig::default(), &mut init)
        .unwrap();
    assert_eq!(ok.depth_per_head(), 64);

    let bad = AttentionConfig {
        heads: 7,
        ..Default::default()
    };
    let err = MultiHeadAttention::from_config("att_", 512, &bad, &mut init).unwrap_err();
    assert!(matches!(err, LayerError::Config(_)));
}

#[test]
fn attend_output_shape_for_every_head_count() {
    for heads in [1, 2, 4, 8] {
        let mut init = Initializer::new(heads as u64);
        let att = MultiHeadAttention::new("att_", 12, 16, heads, 10, 0.0, &mut init).unwrap();
        let x = random(Shape::rank3(2, 5, 12), 3, 1.0);
        let y = att.attend(&x, &lengths(&[5.0, 3.0]), 5).unwrap();
        assert_eq!(y.dims(), &[2, 5, 10]);
    }
}

#[test]
fn attend_matches_per_head_reference() {
    let (depth_in, depth_att, heads, depth_out, length) = (6, 8, 2, 5, 4);
    let mut init = Initializer::new(20);
    let mut att =
        MultiHeadAttention::new("att_", depth_in, depth_att, heads, depth_out, 0.0, &mut init)
            .unwrap();
    assert!(att.has_output_projection());
    let params = perturbed(&att, 21);
    assert!(att.load_parameters(&params).unwrap().missing.is_empty());

    let x = random(Shape::rank3(2, length, depth_in), 22, 1.0);
    let y = att.attend(&x, &lengths(&[3.0, 1.0]), length).unwrap();
    assert_eq!(y.dims(), &[2, length, depth_out]);
    assert_close(y.as_f32_slice(), &attend_reference(&params, &x, &[3, 1], heads), "attend");
}

#[test]
fn attend_puts_no_probability_mass_on_padded_keys() {
    // One-hot inputs and an identity value projection make each output row
    // the attention distribution of its query.
    let length = 4;
    let mut init = Initializer::new(4);
    let mut att = MultiHeadAttention::new("att_", length, length, 1, length, 0.0, &mut init)
        .unwrap();
    let mut weight = random(Shape::matrix(3 * length, length), 5, 3.0);
    let w = weight.as_f32_slice_mut();
    for r in 0..length {
        for c in 0..length {
            w[(2 * length + r) * length + c] = if r == c { 1.0 } else { 0.0 };
        }
    }
    let params = HashMap::from([
        ("att_i2h_weight".to_string(), weight),
        ("att_i2h_bias".to_string(), Tensor::zeros(Shape::vector(3 * length))),
    ]);
    att.load_parameters(&params).unwrap();

    let mut x = Tensor::zeros(Shape::rank3(1, length, length));
    for t in 0..length {
        x.as_f32_slice_mut()[t * length + t] = 1.0;
    }

    let probs = att.attend(&x, &lengths(&[2.0]), length).unwrap();
    for row in probs.as_f32_slice().chunks(length) {
        assert!(row.iter().all(|v| v.is_finite()));
        assert!(row[2..].iter().all(|&v| v <= 1e-6), "row {row:?}");
        assert!(row[..2].iter().all(|&v| v > 0.0), "row {row:?}");
        assert!((row.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }
}

#[test]
fn attend_ignores_padded_positions() {
    let mut init = Initializer::new(6);
    let att = MultiHeadAttention::new("att_", 8, 8, 2, 8, 0.0, &mut init).unwrap();
    let x = random(Shape::rank3(1, 4, 8), 7, 1.0);

    // Same valid prefix, different padding.
    let mut padded = x.clone();
    for v in &mut padded.as_f32_slice_mut()[2 * 8..] {
        *v += 5.0;
    }

    let a = att.attend(&x, &lengths(&[2.0]), 4).unwrap();
    let b = att.attend(&padded, &lengths(&[2.0]), 4).unwrap();
    let valid = 2 * 8;
    for (u, v) in a.as_f32_slice()[..valid].iter().zip(&b.as_f32_slice()[..valid]) {
        assert!((u - v).abs() < 1e-5);
    }
}

#[test]
fn zero_dropout_is_bit_identical() {
    let mut init = Initializer::new(8);
    let cfg = AttentionConfig {
        depth_att: 8,
        heads: 2,
        depth_out: 8,
        dropout: 0.0,
    };
    let att = MultiHeadAttention::from_config("att_", 8, &cfg, &mut init).unwrap();
    let ffn = FeedForward::new("ff_", 16, 8, 0.0, &mut init).unwrap();
    let x = random(Shape::rank3(2, 3, 8), 9, 1.0);
    let lens = lengths(&[3.0, 1.0]);

    let mut rng = StdRng::seed_from_u64(1);
    let first = att.attend(&x, &lens, 3).unwrap();
    assert_eq!(first, att.attend(&x, &lens, 3).unwrap());
    assert_eq!(first, att.attend_train(&x, &lens, 3, &mut rng).unwrap());

    let y = ffn.apply(&first, 3).unwrap();
    assert_eq!(y, ffn.apply_train(&first, 3, &mut rng).unwrap());
}

// ── Recurrent cells ────────────────────────────────────────────

#[test]
fn every_cell_step_is_deterministic() {
    for kind in ALL_CELLS {
        let mut init = Initializer::new(10);
        let stack = rnn::build(&rnn_config(kind, 6, 2), 5, "s_", &mut init).unwrap();
        let x = random(Shape::matrix(3, 5), 11, 1.0);
        let states = stack.begin_state(3);
        let (a, sa) = stack.step(&x, &states, 0).unwrap();
        let (b, sb) = stack.step(&x, &states, 0).unwrap();
        assert_eq!(a, b, "{kind}");
        assert_eq!(sa, sb, "{kind}");
        assert_eq!(a.dims(), &[3, 6]);
    }
}

#[test]
fn same_seed_builds_identical_stacks() {
    let cfg = rnn_config("lnglstm", 4, 2);
    let a = rnn::build(&cfg, 3, "", &mut Initializer::new(5)).unwrap();
    let b = rnn::build(&cfg, 3, "", &mut Initializer::new(5)).unwrap();
    assert_eq!(a.state_dict(), b.state_dict());
}

#[test]
fn residual_output_is_base_output_plus_input() {
    let mut init = Initializer::new(12);
    let base = RecurrentCell::new(CellType::LnLstm, "l1_", 6, 6, &CellInit::default(), &mut init)
        .unwrap();
    let residual = ResidualCell::new(base.clone()).unwrap();
    let x = random(Shape::matrix(2, 6), 13, 1.0);
    let state = base.begin_state(2);

    let (plain, plain_state) = base.step(&x, &state, 0).unwrap();
    let (wrapped, wrapped_state) = residual.step(&x, &state, 0).unwrap();
    assert_eq!(wrapped, plain.add(&x).unwrap());
    assert_eq!(wrapped_state, plain_state);

    let mismatched =
        RecurrentCell::new(CellType::Gru, "l1_", 5, 6, &CellInit::default(), &mut init).unwrap();
    assert!(matches!(
        ResidualCell::new(mismatched),
        Err(LayerError::Config(_))
    ));
}

#[test]
fn every_cell_step_matches_reference_equations() {
    let (batch, input, hidden) = (3, 5, 4);
    for (i, name) in ALL_CELLS.iter().enumerate() {
        let seed = 30 + 10 * i as u64;
        let kind = CellType::from_str_loose(name).unwrap();
        let mut init = Initializer::new(seed);
        let mut cell =
            RecurrentCell::new(kind, "cell_", input, hidden, &CellInit::default(), &mut init)
                .unwrap();
        let params = perturbed(&cell, seed + 1);
        assert!(cell.load_parameters(&params).unwrap().missing.is_empty());

        let x = random(Shape::matrix(batch, input), seed + 2, 1.0);
        let h = random(Shape::matrix(batch, hidden), seed + 3, 1.0);
        let c = random(Shape::matrix(batch, hidden), seed + 4, 1.0);
        let state = CellState {
            hidden: h.clone(),
            memory: kind.is_lstm().then(|| c.clone()),
        };

        let (out, next) = cell.step(&x, &state, 0).unwrap();
        assert_eq!(next.hidden, out, "{name}");
        if kind.is_lstm() {
            let (want_h, want_c) = lstm_reference(kind, &params, &x, &h, &c);
            assert_close(out.as_f32_slice(), &want_h, name);
            let memory = next.memory.as_ref().unwrap();
            assert_close(memory.as_f32_slice(), &want_c, name);
        } else {
            assert_close(out.as_f32_slice(), &gru_reference(kind, &params, &x, &h), name);
            assert!(next.memory.is_none());
        }
    }
}

#[test]
fn per_gate_lstm_forget_shift_starts_at_forget_bias() {
    let mut init = Initializer::new(14);
    let cell = LstmCell::new(
        "l0_",
        4,
        8,
        NormPlacement::PerGate,
        &CellInit {
            forget_bias: 1.0,
            norm_scale: 1.0,
            norm_shift: 0.0,
        },
        &mut init,
    )
    .unwrap();
    let sd = cell.state_dict();
    assert!(sd["l0_f_shift"].as_f32_slice().iter().all(|&v| v == 1.0));
    for gate in ["i", "c", "o"] {
        let shift = &sd[&format!("l0_{gate}_shift")];
        assert!(shift.as_f32_slice().iter().all(|&v| v == 0.0), "gate {gate}");
    }
}

#[test]
fn unknown_cell_type_fails_at_build() {
    let mut init = Initializer::new(0);
    let err = rnn::build(&rnn_config("qrnn", 4, 1), 4, "", &mut init).unwrap_err();
    assert!(matches!(err, LayerError::Config(ref m) if m.contains("qrnn")));
}

#[test]
fn unroll_equals_manual_stepping() {
    for kind in ALL_CELLS {
        let mut init = Initializer::new(15);
        let cfg = RnnConfig {
            residual: true,
            ..rnn_config(kind, 5, 3)
        };
        let stack = rnn::build(&cfg, 5, "u_", &mut init).unwrap();
        let inputs: Vec<Tensor> = (0..6)
            .map(|t| random(Shape::matrix(2, 5), 100 + t, 1.0))
            .collect();

        let (outputs, final_states) = stack.unroll(&inputs, None).unwrap();
        assert_eq!(outputs.len(), 6);

        let mut states: Vec<CellState> = stack.begin_state(2);
        for (t, x) in inputs.iter().enumerate() {
            let (out, next) = stack.step(x, &states, t).unwrap();
            assert_eq!(out, outputs[t], "{kind} step {t}");
            states = next;
        }
        assert_eq!(states, final_states, "{kind}");
    }
}

#[test]
fn unroll_continues_from_given_state() {
    let mut init = Initializer::new(16);
    let stack = rnn::build(&rnn_config("lngru", 4, 2), 3, "", &mut init).unwrap();
    let inputs: Vec<Tensor> = (0..4)
        .map(|t| random(Shape::matrix(1, 3), 200 + t, 1.0))
        .collect();

    let (all, end) = stack.unroll(&inputs, None).unwrap();
    let (_, mid) = stack.unroll(&inputs[..2], None).unwrap();
    let (rest, end_split) = stack.unroll(&inputs[2..], Some(mid)).unwrap();
    assert_eq!(&all[2..], &rest[..]);
    assert_eq!(end, end_split);
}

// ── Configuration and parameters ───────────────────────────────

#[test]
fn rnn_config_toml_roundtrip_builds_same_stack() {
    let cfg = RnnConfig {
        cell_type: "lnlstm".into(),
        num_hidden: 6,
        num_layers: 2,
        dropout: 0.1,
        residual: true,
        forget_bias: 1.0,
        ..Default::default()
    };
    let parsed = RnnConfig::from_toml(&cfg.to_toml().unwrap()).unwrap();
    assert_eq!(parsed, cfg);

    let a = rnn::build(&cfg, 6, "", &mut Initializer::new(1)).unwrap();
    let b = rnn::build(&parsed, 6, "", &mut Initializer::new(1)).unwrap();
    assert_eq!(a.state_dict(), b.state_dict());
}

#[test]
fn stack_parameter_names_follow_layer_prefixes() {
    let mut init = Initializer::new(17);
    let stack = rnn::build(&rnn_config("lnlstm", 4, 2), 3, "encoder_rnn_", &mut init).unwrap();
    let names: Vec<&str> = stack.named_parameters().iter().map(|(n, _)| *n).collect();
    assert_eq!(names.len(), 2 * 10);
    assert_eq!(names[0], "encoder_rnn_l0_i2h_weight");
    assert!(names.contains(&"encoder_rnn_l1_c_scale"));
    assert!(names.contains(&"encoder_rnn_l1_h2h_shift"));
}

#[test]
fn load_parameters_copies_by_name_and_checks_shapes() {
    let cfg = rnn_config("gru", 4, 1);
    let source = rnn::build(&cfg, 3, "", &mut Initializer::new(1)).unwrap();
    let mut target = rnn::build(&cfg, 3, "", &mut Initializer::new(2)).unwrap();
    assert_ne!(source.state_dict(), target.state_dict());

    let mut partial: HashMap<String, Tensor> = source.state_dict();
    partial.remove("l0_h2h_bias");
    let report = target.load_parameters(&partial).unwrap();
    assert_eq!(report.loaded, 3);
    assert_eq!(report.missing, vec!["l0_h2h_bias".to_string()]);
    assert_eq!(
        target.state_dict()["l0_i2h_weight"],
        source.state_dict()["l0_i2h_weight"]
    );

    let mut wrong = HashMap::new();
    wrong.insert("l0_i2h_bias".to_string(), Tensor::zeros(Shape::vector(5)));
    assert!(matches!(
        target.load_parameters(&wrong),
        Err(LayerError::Parameter { .. })
    ));
}
