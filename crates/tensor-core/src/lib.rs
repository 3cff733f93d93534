// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Owned `f32` tensors and the kernels that sequence-model building blocks
//! are composed from.
//!
//! This crate provides:
//! - [`Tensor`] — an n-dimensional, row-major `f32` tensor.
//! - [`Shape`] — runtime shape descriptors.
//! - Kernels: matrix and batched matrix multiplication, fully-connected,
//!   permute and last-axis split, softmax, sequence masking, layer
//!   normalization and moments, activations, elementwise arithmetic and
//!   inverted dropout.
//!
//! # Design Goals
//! - Kernels write into pre-allocated buffers; allocating wrappers exist on
//!   [`Tensor`] for convenience.
//! - Shape errors are values ([`TensorError`]), never panics.

mod error;
pub mod ops;
mod shape;
mod tensor;

pub use error::TensorError;
pub use ops::{
    activate, batch_matmul, binary, dropout, fully_connected, layer_norm, moments,
    permute, sequence_mask, softmax, split_last, Activation, BinaryOp,
};
pub use shape::Shape;
pub use tensor::{Tensor, TensorView};
