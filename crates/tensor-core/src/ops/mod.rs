// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor kernels.
//!
//! Each kernel validates its operands and writes into a pre-allocated output
//! buffer. Every kernel also has an allocating method on [`crate::Tensor`]
//! for callers that do not manage buffers themselves.

mod activation_op;
mod dropout_op;
mod elementwise_op;
mod layer_norm_op;
mod layout_op;
mod linear_op;
mod mask_op;
mod matmul_op;
mod softmax_op;

pub use activation_op::{activate, Activation};
pub use dropout_op::dropout;
pub use elementwise_op::{binary, BinaryOp};
pub use layer_norm_op::{layer_norm, moments};
pub use layout_op::{permute, split_last};
pub use linear_op::fully_connected;
pub use mask_op::sequence_mask;
pub use matmul_op::batch_matmul;
pub use softmax_op::softmax;
