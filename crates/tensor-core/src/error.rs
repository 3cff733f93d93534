// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for tensor operations.

use crate::Shape;

/// Errors that can occur during tensor operations.
///
/// These are runtime shape errors: they are raised while a forward pass is
/// being computed and are passed through unchanged by the layers built on
/// top of this crate.
#[derive(Debug, thiserror::Error)]
pub enum TensorError {
    /// The provided buffer length does not match the element count of the shape.
    #[error("buffer size mismatch for shape {shape}: expected {expected} elements, got {actual}")]
    BufferSizeMismatch {
        shape: Shape,
        expected: usize,
        actual: usize,
    },

    /// Two tensors have incompatible shapes for the requested operation.
    #[error("incompatible shapes for {op}: {lhs} vs {rhs}")]
    ShapeMismatch {
        op: &'static str,
        lhs: Shape,
        rhs: Shape,
    },

    /// An axis argument is outside the tensor's rank, or repeats.
    #[error("invalid axis {axis} for {op} on a rank-{rank} tensor")]
    InvalidAxis {
        op: &'static str,
        axis: usize,
        rank: usize,
    },

    /// A scalar argument is outside its valid range.
    #[error("invalid argument for {op}: {detail}")]
    InvalidArgument { op: &'static str, detail: String },
}
