// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `seqblk attend` command: self-attention over a random padded batch.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use seq_layers::{Initializer, MultiHeadAttention};
use tensor_core::{Shape, Tensor};

use super::{random_tensor, rms, slice_rms};

pub fn execute(
    depth: usize,
    heads: usize,
    out_depth: usize,
    in_depth: Option<usize>,
    length: usize,
    valid: String,
    seed: u64,
) -> anyhow::Result<()> {
    let valid = parse_lengths(&valid, length)?;
    let batch = valid.len();
    let in_depth = in_depth.unwrap_or(depth);

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║             seqblk · Multi-Head Attention           ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let mut init = Initializer::new(seed);
    let att = MultiHeadAttention::new("att_", in_depth, depth, heads, out_depth, 0.0, &mut init)?;

    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
    let inputs = random_tensor(Shape::rank3(batch, length, in_depth), &mut rng)?;
    let lengths = Tensor::from_vec(
        Shape::matrix(batch, 1),
        valid.iter().map(|&v| v as f32).collect(),
    )?;

    let start = Instant::now();
    let output = att.attend(&inputs, &lengths, length)?;
    let elapsed = start.elapsed();

    println!(
        "  depth = {}, heads = {} ({} per head), out = {}, projection = {}",
        depth,
        att.heads(),
        att.depth_per_head(),
        att.depth_out(),
        if att.has_output_projection() { "yes" } else { "no" },
    );
    println!("  Input:  {}", inputs.shape());
    println!("  Output: {}", output.shape());
    println!();

    // ── Per-Sequence Output ────────────────────────────────────
    println!("  {:<6} {:>6} {:>12} {:>12}", "Seq", "Valid", "RMS (valid)", "RMS (pad)");
    println!("  {}", "-".repeat(40));
    let row = length * out_depth;
    for (b, chunk) in output.as_f32_slice().chunks(row.max(1)).enumerate() {
        let split = valid[b] * out_depth;
        println!(
            "  {:<6} {:>6} {:>12.5} {:>12}",
            b,
            valid[b],
            slice_rms(&chunk[..split]),
            if split < chunk.len() {
                format!("{:.5}", slice_rms(&chunk[split..]))
            } else {
                "-".to_string()
            },
        );
    }
    println!();
    println!("  Overall RMS: {:.5}", rms(&output));
    println!("  Elapsed: {:.3} ms", elapsed.as_secs_f64() * 1000.0);

    Ok(())
}

/// Parses `"2,3"` into per-sequence valid lengths, each at most `length`.
fn parse_lengths(valid: &str, length: usize) -> anyhow::Result<Vec<usize>> {
    let lengths = valid
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map_err(|e| anyhow::anyhow!("invalid valid length '{s}': {e}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    if lengths.is_empty() {
        anyhow::bail!("at least one valid length is required");
    }
    if let Some(&bad) = lengths.iter().find(|&&v| v > length) {
        anyhow::bail!("valid length {bad} exceeds sequence length {length}");
    }
    Ok(lengths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lengths() {
        assert_eq!(parse_lengths("2,3", 4).unwrap(), vec![2, 3]);
        assert_eq!(parse_lengths(" 1 , 4 ", 4).unwrap(), vec![1, 4]);
        assert!(parse_lengths("", 4).is_err());
        assert!(parse_lengths("2,x", 4).is_err());
        assert!(parse_lengths("5", 4).is_err());
    }
}
