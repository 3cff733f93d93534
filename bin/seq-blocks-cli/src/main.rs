// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # seqblk
//!
//! Command-line driver for the seq-layers building blocks.
//!
//! ## Usage
//! ```bash
//! # Print the parameter layout of a cell stack
//! seqblk inspect --config stack.toml --input-size 64
//!
//! # Unroll a randomly initialised stack over random inputs
//! seqblk unroll --config stack.toml --input-size 64 --batch 4 --steps 10 --seed 7
//!
//! # Self-attention over a padded batch with valid lengths 2 and 3
//! seqblk attend --depth 16 --heads 4 --out-depth 16 --length 4 --valid 2,3
//! ```

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "seqblk",
    about = "Inspect and exercise attention, feed-forward and recurrent blocks",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a cell stack from a TOML config and print its parameters.
    Inspect {
        /// Path to the RNN stack TOML configuration.
        #[arg(short, long)]
        config: PathBuf,

        /// Width of the per-step input fed to the first layer.
        #[arg(short, long)]
        input_size: usize,

        /// Parameter-name prefix for the stack.
        #[arg(long, default_value = "")]
        prefix: String,
    },

    /// Unroll a cell stack over random inputs and report per-step outputs.
    Unroll {
        /// Path to the RNN stack TOML configuration.
        #[arg(short, long)]
        config: PathBuf,

        /// Width of the per-step input fed to the first layer.
        #[arg(short, long)]
        input_size: usize,

        /// Number of sequences in the batch.
        #[arg(short, long, default_value_t = 1)]
        batch: usize,

        /// Number of time steps to unroll.
        #[arg(short = 't', long, default_value_t = 8)]
        steps: usize,

        /// Seed for parameter initialisation and inputs.
        #[arg(short, long, default_value_t = 0)]
        seed: u64,

        /// Apply inter-layer dropout as in training.
        #[arg(long)]
        train: bool,
    },

    /// Run multi-head self-attention over a random padded batch.
    Attend {
        /// Attention depth (split across heads).
        #[arg(short, long, default_value_t = 512)]
        depth: usize,

        /// Number of attention heads.
        #[arg(long, default_value_t = 8)]
        heads: usize,

        /// Output depth; an output projection is added when it differs from `depth`.
        #[arg(short, long, default_value_t = 512)]
        out_depth: usize,

        /// Input feature width (defaults to `depth`).
        #[arg(long)]
        in_depth: Option<usize>,

        /// Padded sequence length.
        #[arg(short, long)]
        length: usize,

        /// Comma-separated valid lengths, one per sequence (e.g., "2,3").
        #[arg(long)]
        valid: String,

        /// Seed for parameter initialisation and inputs.
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Inspect {
            config,
            input_size,
            prefix,
        } => commands::inspect::execute(config, input_size, prefix),
        Commands::Unroll {
            config,
            input_size,
            batch,
            steps,
            seed,
            train,
        } => commands::unroll::execute(config, input_size, batch, steps, seed, train),
        Commands::Attend {
            depth,
            heads,
            out_depth,
            in_depth,
            length,
            valid,
            seed,
        } => commands::attend::execute(depth, heads, out_depth, in_depth, length, valid, seed),
    }
}
