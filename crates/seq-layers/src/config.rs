// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Block configurations loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! cell_type = "lnglstm"
//! num_hidden = 256
//! num_layers = 2
//! dropout = 0.1
//! residual = true
//! forget_bias = 1.0
//! ```

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::rnn::CellType;
use crate::LayerError;

/// Configuration of a recurrent cell stack.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RnnConfig {
    /// Cell kind: `"lstm"`, `"lnlstm"`, `"lnglstm"`, `"gru"`, `"lngru"`, `"lnggru"`.
    pub cell_type: String,
    /// Hidden units per layer.
    pub num_hidden: usize,
    /// Number of stacked layers.
    pub num_layers: usize,
    /// Dropout applied after every layer's output (0 disables).
    #[serde(default)]
    pub dropout: f32,
    /// Add each layer's input to its output for layers after the first.
    #[serde(default)]
    pub residual: bool,
    /// Initial value of the forget-gate bias (LSTM family only).
    #[serde(default)]
    pub forget_bias: f32,
    /// Initial value of every normalization scale.
    #[serde(default = "default_norm_scale")]
    pub norm_scale_init: f32,
    /// Initial value of every normalization shift (except per-gate forget).
    #[serde(default)]
    pub norm_shift_init: f32,
}

fn default_norm_scale() -> f32 {
    1.0
}

impl RnnConfig {
    pub fn from_file(path: &Path) -> Result<Self, LayerError> {
        read_toml_file(path)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self, LayerError> {
        parse_toml(toml_str)
    }

    pub fn to_toml(&self) -> Result<String, LayerError> {
        write_toml(self)
    }

    /// Parses [`RnnConfig::cell_type`].
    pub fn cell_kind(&self) -> Result<CellType, LayerError> {
        CellType::from_str_loose(&self.cell_type)
    }

    /// Checks every field without building anything.
    pub fn validate(&self) -> Result<(), LayerError> {
        self.cell_kind()?;
        if self.num_layers == 0 {
            return Err(LayerError::config("num_layers must be at least 1"));
        }
        if self.num_hidden == 0 {
            return Err(LayerError::config("num_hidden must be at least 1"));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(LayerError::config(format!(
                "dropout must be in [0, 1), got {}",
                self.dropout
            )));
        }
        Ok(())
    }
}

impl Default for RnnConfig {
    fn default() -> Self {
        Self {
            cell_type: "lstm".to_string(),
            num_hidden: 512,
            num_layers: 1,
            dropout: 0.0,
            residual: false,
            forget_bias: 0.0,
            norm_scale_init: 1.0,
            norm_shift_init: 0.0,
        }
    }
}

/// Configuration of a multi-head self-attention sublayer.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AttentionConfig {
    /// Total query/key/value depth before head splitting.
    pub depth_att: usize,
    /// Number of heads; must divide `depth_att`.
    pub heads: usize,
    /// Output depth; a projection is added only when it differs from `depth_att`.
    pub depth_out: usize,
    /// Dropout on attention probabilities.
    pub dropout: f32,
}

impl AttentionConfig {
    pub fn from_file(path: &Path) -> Result<Self, LayerError> {
        read_toml_file(path)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self, LayerError> {
        parse_toml(toml_str)
    }

    pub fn to_toml(&self) -> Result<String, LayerError> {
        write_toml(self)
    }
}

impl Default for AttentionConfig {
    fn default() -> Self {
        Self {
            depth_att: 512,
            heads: 8,
            depth_out: 512,
            dropout: 0.0,
        }
    }
}

/// Configuration of a position-wise feed-forward sublayer.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FeedForwardConfig {
    /// Inner (hidden) depth.
    pub num_hidden: usize,
    /// Model depth of input and output.
    pub num_model: usize,
    pub dropout: f32,
}

impl FeedForwardConfig {
    pub fn from_file(path: &Path) -> Result<Self, LayerError> {
        read_toml_file(path)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self, LayerError> {
        parse_toml(toml_str)
    }

    pub fn to_toml(&self) -> Result<String, LayerError> {
        write_toml(self)
    }
}

impl Default for FeedForwardConfig {
    fn default() -> Self {
        Self {
            num_hidden: 2048,
            num_model: 512,
            dropout: 0.0,
        }
    }
}

fn read_toml_file<T: DeserializeOwned>(path: &Path) -> Result<T, LayerError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        LayerError::config(format!("cannot read config '{}': {e}", path.display()))
    })?;
    parse_toml(&content)
}

fn parse_toml<T: DeserializeOwned>(toml_str: &str) -> Result<T, LayerError> {
    toml::from_str(toml_str).map_err(|e| LayerError::config(format!("TOML parse error: {e}")))
}

fn write_toml<T: Serialize>(value: &T) -> Result<String, LayerError> {
    toml::to_string_pretty(value)
        .map_err(|e| LayerError::config(format!("TOML serialise error: {e}")))
}
