// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor shape descriptors and dimension utilities.

use std::fmt;

/// Describes the dimensionality of a [`crate::Tensor`].
///
/// Shapes are immutable once created. Most kernels in this crate treat a
/// shape as `[rows..., last]` and operate row by row over the last axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Creates a new shape from the given dimensions.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::Shape;
    /// let s = Shape::new(vec![2, 3, 4]);
    /// assert_eq!(s.rank(), 3);
    /// assert_eq!(s.num_elements(), 24);
    /// ```
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    /// Creates a scalar shape (rank 0).
    pub fn scalar() -> Self {
        Self { dims: vec![] }
    }

    /// Creates a 1-D shape.
    pub fn vector(len: usize) -> Self {
        Self { dims: vec![len] }
    }

    /// Creates a 2-D shape (matrix).
    pub fn matrix(rows: usize, cols: usize) -> Self {
        Self {
            dims: vec![rows, cols],
        }
    }

    /// Creates a 3-D shape, typically `[batch, length, depth]`.
    pub fn rank3(d0: usize, d1: usize, d2: usize) -> Self {
        Self {
            dims: vec![d0, d1, d2],
        }
    }

    /// Returns the number of dimensions (rank).
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Returns the total number of elements.
    ///
    /// For a scalar shape (rank 0), returns 1.
    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    /// Returns the dimensions as a slice.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Returns the size of a specific dimension, or `None` if out of bounds.
    pub fn dim(&self, index: usize) -> Option<usize> {
        self.dims.get(index).copied()
    }

    /// Returns the size of the last dimension, or `None` for a scalar.
    pub fn last_dim(&self) -> Option<usize> {
        self.dims.last().copied()
    }

    /// Number of rows when the tensor is viewed as `[rows, last_dim]`.
    pub fn num_rows(&self) -> usize {
        match self.dims.split_last() {
            Some((_, leading)) => leading.iter().product(),
            None => 1,
        }
    }

    /// Returns a copy of this shape with the last dimension replaced.
    ///
    /// A scalar shape becomes a 1-D shape of length `last`.
    pub fn with_last_dim(&self, last: usize) -> Shape {
        let mut dims = self.dims.clone();
        match dims.last_mut() {
            Some(d) => *d = last,
            None => dims.push(last),
        }
        Shape { dims }
    }

    /// Computes row-major (C-order) strides for this shape.
    ///
    /// The stride for dimension `i` is the number of elements to skip
    /// in the flat buffer to advance one step along that dimension.
    pub fn strides(&self) -> Vec<usize> {
        let rank = self.dims.len();
        let mut strides = vec![1usize; rank];
        for i in (0..rank.saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * self.dims[i + 1];
        }
        strides
    }

    /// Returns `true` if the shapes are compatible for a batched matrix
    /// multiply: `self` is `[B, M, K]` and `other` is `[B, K, N]`
    /// (or `[B, N, K]` when `transpose_rhs` is set).
    pub fn is_batch_matmul_compatible(&self, other: &Shape, transpose_rhs: bool) -> bool {
        if self.rank() != 3 || other.rank() != 3 || self.dims[0] != other.dims[0] {
            return false;
        }
        let k_rhs = if transpose_rhs {
            other.dims[2]
        } else {
            other.dims[1]
        };
        self.dims[2] == k_rhs
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self::new(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self::new(dims.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self::new(dims.to_vec())
    }
}
