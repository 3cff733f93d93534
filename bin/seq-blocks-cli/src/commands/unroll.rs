// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `seqblk unroll` command: run a cell stack over random inputs.

use std::path::PathBuf;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use seq_layers::{rnn, Initializer, RnnConfig};
use tensor_core::Shape;

use super::{random_tensor, rms};

pub fn execute(
    config: PathBuf,
    input_size: usize,
    batch: usize,
    steps: usize,
    seed: u64,
    train: bool,
) -> anyhow::Result<()> {
    if batch == 0 || steps == 0 {
        anyhow::bail!("batch and steps must both be at least 1");
    }

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║               seqblk · Stack Unroll                 ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let cfg = RnnConfig::from_file(&config).map_err(|e| {
        anyhow::anyhow!("failed to load config from '{}': {e}", config.display())
    })?;
    let mut init = Initializer::new(seed);
    let stack = rnn::build(&cfg, input_size, "", &mut init)?;

    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
    let inputs = (0..steps)
        .map(|_| random_tensor(Shape::matrix(batch, input_size), &mut rng))
        .collect::<anyhow::Result<Vec<_>>>()?;

    tracing::info!(cell = %cfg.cell_type, batch, steps, train, "unrolling stack");
    let start = Instant::now();
    let (outputs, states) = if train {
        stack.unroll_train(&inputs, None, &mut rng)?
    } else {
        stack.unroll(&inputs, None)?
    };
    let elapsed = start.elapsed();

    println!(
        "  {} × {} layer(s), H = {}, batch = {}, steps = {}, mode = {}",
        cfg.cell_type,
        stack.num_layers(),
        stack.num_hidden(),
        batch,
        steps,
        if train { "train" } else { "inference" },
    );
    println!();

    // ── Per-Step Outputs ───────────────────────────────────────
    println!("  {:<6} {:<14} {:>10} {:>10}", "Step", "Shape", "RMS", "Row0[0]");
    println!("  {}", "-".repeat(44));
    for (t, out) in outputs.iter().enumerate() {
        println!(
            "  {:<6} {:<14} {:>10.5} {:>10.5}",
            t,
            out.shape().to_string(),
            rms(out),
            out.as_f32_slice().first().copied().unwrap_or(0.0),
        );
    }
    println!();

    // ── Final States ───────────────────────────────────────────
    println!("  {:<6} {:>12} {:>12}", "Layer", "Hidden RMS", "Memory RMS");
    println!("  {}", "-".repeat(32));
    for (i, state) in states.iter().enumerate() {
        let memory = state
            .memory
            .as_ref()
            .map(|m| format!("{:.5}", rms(m)))
            .unwrap_or_else(|| "-".to_string());
        println!("  {:<6} {:>12.5} {:>12}", i, rms(&state.hidden), memory);
    }
    println!();
    println!("  Elapsed: {:.3} ms", elapsed.as_secs_f64() * 1000.0);

    Ok(())
}
