// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared helpers.

pub mod attend;
pub mod inspect;
pub mod unroll;

use rand::rngs::StdRng;
use rand::Rng;
use tensor_core::{Shape, Tensor};
use tracing_subscriber::EnvFilter;

/// Installs the global `fmt` subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the level follows the `-v` count:
/// none is `warn`, then `info`, `debug` and `trace`.
pub fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity_level(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn verbosity_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Uniform `[-1, 1)` tensor of the given shape.
pub(crate) fn random_tensor(shape: Shape, rng: &mut StdRng) -> anyhow::Result<Tensor> {
    let n = shape.num_elements();
    let data = (0..n).map(|_| rng.gen_range(-1.0f32..1.0)).collect();
    Ok(Tensor::from_vec(shape, data)?)
}

/// Root-mean-square of a tensor's elements.
pub(crate) fn rms(t: &Tensor) -> f32 {
    slice_rms(t.as_f32_slice())
}

pub(crate) fn slice_rms(data: &[f32]) -> f32 {
    if data.is_empty() {
        return 0.0;
    }
    (data.iter().map(|v| v * v).sum::<f32>() / data.len() as f32).sqrt()
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}
