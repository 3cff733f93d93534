// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the sequence building blocks.

use tensor_core::TensorError;

/// Errors raised while constructing or running a building block.
#[derive(Debug, thiserror::Error)]
pub enum LayerError {
    /// Static misconfiguration, detected at construction time.
    #[error("configuration error: {0}")]
    Config(String),

    /// A tensor kernel rejected its operands during a forward pass.
    #[error(transparent)]
    Tensor(#[from] TensorError),

    /// A parameter supplied to `load_parameters` does not fit its slot.
    #[error("parameter '{name}': {detail}")]
    Parameter { name: String, detail: String },
}

impl LayerError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        LayerError::Config(msg.into())
    }
}
