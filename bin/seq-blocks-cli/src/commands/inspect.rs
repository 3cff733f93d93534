// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `seqblk inspect` command: build a cell stack and print its layout.
//!
//! Lists every layer with its cell kind, widths and dropout, followed by
//! the full parameter table in checkpoint-name order.

use std::path::PathBuf;

use seq_layers::{rnn, Initializer, Parameterized, RnnConfig};

use super::truncate;

pub fn execute(config: PathBuf, input_size: usize, prefix: String) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              seqblk · Stack Inspector               ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let cfg = RnnConfig::from_file(&config).map_err(|e| {
        anyhow::anyhow!("failed to load config from '{}': {e}", config.display())
    })?;
    let mut init = Initializer::new(0);
    let stack = rnn::build(&cfg, input_size, &prefix, &mut init)?;

    // ── Summary ────────────────────────────────────────────────
    println!("  Cell type:   {}", cfg.cell_type);
    println!("  Layers:      {}", stack.num_layers());
    println!("  Input size:  {}", stack.input_size());
    println!("  Hidden:      {}", stack.num_hidden());
    println!("  Residual:    {}", cfg.residual);
    println!("  Dropout:     {}", cfg.dropout);
    println!("  Parameters:  {}", stack.num_parameters());
    println!();

    // ── Per-Layer Detail ───────────────────────────────────────
    println!(
        "  {:<4} {:<16} {:<9} {:>6} {:>6} {:>9} {:>10}",
        "Idx", "Prefix", "Kind", "In", "Hidden", "Residual", "#Params",
    );
    println!("  {}", "-".repeat(66));
    for (i, layer) in stack.layers().iter().enumerate() {
        let cell = layer.cell.cell();
        println!(
            "  {:<4} {:<16} {:<9} {:>6} {:>6} {:>9} {:>10}",
            i,
            truncate(cell.prefix(), 16),
            cell.kind().as_str(),
            cell.input_size(),
            cell.num_hidden(),
            if layer.cell.is_residual() { "yes" } else { "no" },
            cell.num_parameters(),
        );
    }
    println!();

    // ── Parameters ─────────────────────────────────────────────
    println!("  {:<36} {:<16} {:>10}", "Name", "Shape", "Elements");
    println!("  {}", "-".repeat(64));
    for (name, tensor) in stack.named_parameters() {
        println!(
            "  {:<36} {:<16} {:>10}",
            truncate(name, 36),
            tensor.shape().to_string(),
            tensor.num_elements(),
        );
    }
    println!();

    Ok(())
}
