// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Same-shape elementwise arithmetic.

use crate::{Tensor, TensorError, TensorView};

/// Binary elementwise operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
}

impl BinaryOp {
    fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
        }
    }

    #[inline]
    fn apply(self, a: f32, b: f32) -> f32 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
        }
    }
}

/// Computes `output = lhs <op> rhs` for tensors of identical shape.
///
/// No broadcasting is performed.
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] if any of the three shapes differ.
pub fn binary(
    lhs: &TensorView<'_>,
    rhs: &TensorView<'_>,
    op: BinaryOp,
    output: &mut Tensor,
) -> Result<(), TensorError> {
    if lhs.shape() != rhs.shape() {
        return Err(TensorError::ShapeMismatch {
            op: op.name(),
            lhs: lhs.shape().clone(),
            rhs: rhs.shape().clone(),
        });
    }
    if lhs.shape() != output.shape() {
        return Err(TensorError::ShapeMismatch {
            op: op.name(),
            lhs: lhs.shape().clone(),
            rhs: output.shape().clone(),
        });
    }

    let dst = output.as_f32_slice_mut();
    for ((d, &a), &b) in dst.iter_mut().zip(lhs.as_f32_slice()).zip(rhs.as_f32_slice()) {
        *d = op.apply(a, b);
    }
    Ok(())
}

impl Tensor {
    fn binary_op(&self, rhs: &Tensor, op: BinaryOp) -> Result<Tensor, TensorError> {
        let mut out = Tensor::zeros(self.shape().clone());
        binary(&self.view(), &rhs.view(), op, &mut out)?;
        Ok(out)
    }

    /// Elementwise sum of two tensors of identical shape.
    pub fn add(&self, rhs: &Tensor) -> Result<Tensor, TensorError> {
        self.binary_op(rhs, BinaryOp::Add)
    }

    /// Elementwise difference of two tensors of identical shape.
    pub fn sub(&self, rhs: &Tensor) -> Result<Tensor, TensorError> {
        self.binary_op(rhs, BinaryOp::Sub)
    }

    /// Elementwise (Hadamard) product of two tensors of identical shape.
    pub fn mul(&self, rhs: &Tensor) -> Result<Tensor, TensorError> {
        self.binary_op(rhs, BinaryOp::Mul)
    }

    /// Multiplies every element by `factor`.
    pub fn scale(&self, factor: f32) -> Tensor {
        self.map(|v| v * factor)
    }

    /// Applies `f` to every element.
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Tensor {
        let mut out = self.clone();
        out.as_f32_slice_mut().iter_mut().for_each(|v| *v = f(*v));
        out
    }

    /// Combines two same-shape tensors elementwise with `f`.
    ///
    /// # Errors
    /// Returns [`TensorError::ShapeMismatch`] if the shapes differ.
    pub fn zip_map(
        &self,
        rhs: &Tensor,
        op: &'static str,
        f: impl Fn(f32, f32) -> f32,
    ) -> Result<Tensor, TensorError> {
        if self.shape() != rhs.shape() {
            return Err(TensorError::ShapeMismatch {
                op,
                lhs: self.shape().clone(),
                rhs: rhs.shape().clone(),
            });
        }
        let mut out = self.clone();
        for (d, &b) in out.as_f32_slice_mut().iter_mut().zip(rhs.as_f32_slice()) {
            *d = f(*d, b);
        }
        Ok(out)
    }
}
