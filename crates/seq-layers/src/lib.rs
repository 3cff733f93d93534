// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # seq-layers
//!
//! Building blocks for sequence models on top of [`tensor_core`]:
//!
//! - [`LayerNorm`] — per-row normalization with learned scale and shift.
//! - [`MultiHeadAttention`] — scaled dot-product self-attention with
//!   length masking.
//! - [`FeedForward`] — position-wise two-layer ReLU transform.
//! - [`rnn`] — LSTM and GRU cells, each plain or layer-normalized across
//!   gates or per gate, and the [`rnn::build`] cell-stack builder.
//!
//! Every block is constructed up front from explicit hyperparameters
//! (configuration errors surface there) and then runs pure forward passes
//! over `&self`. Parameters carry stable checkpoint names and are reachable
//! through the [`Parameterized`] trait.
//!
//! # Example
//! ```
//! use seq_layers::{rnn, Initializer, RnnConfig};
//!
//! let config = RnnConfig {
//!     cell_type: "lnlstm".into(),
//!     num_hidden: 8,
//!     num_layers: 2,
//!     ..Default::default()
//! };
//! let mut init = Initializer::new(42);
//! let stack = rnn::build(&config, 4, "encoder_", &mut init).unwrap();
//! let states = stack.begin_state(3);
//! assert_eq!(states.len(), 2);
//! ```

pub mod attention;
pub mod config;
pub mod dropout;
mod error;
pub mod ffn;
pub mod layer_norm;
pub mod linear;
pub mod params;
pub mod rnn;

pub use attention::{MultiHeadAttention, MASK_VALUE};
pub use config::{AttentionConfig, FeedForwardConfig, RnnConfig};
pub use dropout::Dropout;
pub use error::LayerError;
pub use ffn::FeedForward;
pub use layer_norm::LayerNorm;
pub use linear::Linear;
pub use params::{Initializer, LoadReport, Param, Parameterized};
pub use rnn::{CellState, CellType, RecurrentCell, RnnStack};
