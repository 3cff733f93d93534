// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Core tensor type and view abstractions.

use crate::{Shape, TensorError};

/// An owned, n-dimensional `f32` tensor stored in contiguous memory.
///
/// `Tensor` is the data carrier for every block in the workspace: inputs,
/// parameters, recurrent state and outputs. It owns its buffer and exposes
/// immutable views via [`TensorView`], which is what the kernels in
/// [`crate::ops`] consume.
///
/// # Memory Layout
/// Data is stored in row-major (C) order.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Shape,
    data: Vec<f32>,
}

impl Tensor {
    /// Creates a new tensor filled with zeros.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{Shape, Tensor};
    /// let t = Tensor::zeros(Shape::matrix(2, 3));
    /// assert_eq!(t.num_elements(), 6);
    /// ```
    pub fn zeros(shape: Shape) -> Self {
        Self::full(shape, 0.0)
    }

    /// Creates a new tensor with every element set to `value`.
    pub fn full(shape: Shape, value: f32) -> Self {
        let n = shape.num_elements();
        Self {
            shape,
            data: vec![value; n],
        }
    }

    /// Creates a tensor taking ownership of `data`.
    ///
    /// Returns an error if `data.len()` does not match the element count.
    pub fn from_vec(shape: Shape, data: Vec<f32>) -> Result<Self, TensorError> {
        let expected = shape.num_elements();
        if data.len() != expected {
            return Err(TensorError::BufferSizeMismatch {
                shape,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Creates a tensor from a slice of `f32` values.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{Shape, Tensor};
    /// let t = Tensor::from_f32(Shape::vector(3), &[1.0, 2.0, 3.0]).unwrap();
    /// assert_eq!(t.as_f32_slice(), &[1.0, 2.0, 3.0]);
    /// ```
    pub fn from_f32(shape: Shape, values: &[f32]) -> Result<Self, TensorError> {
        Self::from_vec(shape, values.to_vec())
    }

    /// Returns the tensor's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Shorthand for `self.shape().dims()`.
    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    /// Returns the number of elements.
    pub fn num_elements(&self) -> usize {
        self.data.len()
    }

    /// Returns an immutable view over this tensor's data.
    pub fn view(&self) -> TensorView<'_> {
        TensorView {
            shape: &self.shape,
            data: &self.data,
        }
    }

    /// Returns the backing buffer.
    pub fn as_f32_slice(&self) -> &[f32] {
        &self.data
    }

    /// Returns the backing buffer mutably.
    pub fn as_f32_slice_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consumes the tensor and returns its buffer.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Fills the tensor with a constant value.
    pub fn fill_f32(&mut self, value: f32) {
        self.data.iter_mut().for_each(|x| *x = value);
    }

    /// Returns a copy of this tensor with a new shape of equal element count.
    pub fn reshape(&self, shape: impl Into<Shape>) -> Result<Tensor, TensorError> {
        self.clone().into_shape(shape)
    }

    /// Reinterprets the buffer under a new shape without copying.
    ///
    /// # Errors
    /// Returns [`TensorError::ShapeMismatch`] if the element counts differ.
    pub fn into_shape(self, shape: impl Into<Shape>) -> Result<Tensor, TensorError> {
        let shape = shape.into();
        if shape.num_elements() != self.data.len() {
            return Err(TensorError::ShapeMismatch {
                op: "reshape",
                lhs: self.shape,
                rhs: shape,
            });
        }
        Ok(Tensor {
            shape,
            data: self.data,
        })
    }
}

/// A borrowed, read-only view over a [`Tensor`]'s data.
///
/// Views are zero-copy and tied to the lifetime of the source buffer.
#[derive(Debug, Clone, Copy)]
pub struct TensorView<'a> {
    shape: &'a Shape,
    data: &'a [f32],
}

impl<'a> TensorView<'a> {
    /// Creates a view from raw parts.
    ///
    /// # Errors
    /// Returns [`TensorError::BufferSizeMismatch`] if `data` does not hold
    /// exactly `shape.num_elements()` values.
    pub fn from_parts(shape: &'a Shape, data: &'a [f32]) -> Result<Self, TensorError> {
        if shape.num_elements() != data.len() {
            return Err(TensorError::BufferSizeMismatch {
                shape: shape.clone(),
                expected: shape.num_elements(),
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Returns the shape of the viewed tensor.
    pub fn shape(&self) -> &'a Shape {
        self.shape
    }

    /// Returns the viewed buffer.
    pub fn as_f32_slice(&self) -> &'a [f32] {
        self.data
    }

    /// Copies the viewed data into an owned tensor.
    pub fn to_tensor(&self) -> Tensor {
        Tensor {
            shape: self.shape.clone(),
            data: self.data.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros() {
        let t = Tensor::zeros(Shape::matrix(2, 3));
        assert_eq!(t.num_elements(), 6);
        assert_eq!(t.shape(), &Shape::matrix(2, 3));
        assert!(t.as_f32_slice().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_from_f32() {
        let data = vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let t = Tensor::from_f32(Shape::matrix(2, 3), &data).unwrap();
        assert_eq!(t.as_f32_slice(), &data[..]);
    }

    #[test]
    fn test_from_vec_size_mismatch() {
        let result = Tensor::from_vec(Shape::matrix(2, 3), vec![0.0; 5]);
        assert!(matches!(
            result,
            Err(TensorError::BufferSizeMismatch {
                expected: 6,
                actual: 5,
                ..
            })
        ));
    }

    #[test]
    fn test_reshape_keeps_data() {
        let t = Tensor::from_f32(Shape::rank3(2, 2, 3), &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0])
            .unwrap();
        let flat = t.reshape(Shape::matrix(4, 3)).unwrap();
        assert_eq!(flat.dims(), &[4, 3]);
        assert_eq!(flat.as_f32_slice(), t.as_f32_slice());
    }

    #[test]
    fn test_reshape_element_count_mismatch() {
        let t = Tensor::zeros(Shape::matrix(2, 3));
        assert!(t.reshape(Shape::matrix(4, 2)).is_err());
    }

    #[test]
    fn test_view_from_parts() {
        let shape = Shape::vector(4);
        let data = [1.0, 2.0, 3.0, 4.0];
        let v = TensorView::from_parts(&shape, &data).unwrap();
        assert_eq!(v.to_tensor().as_f32_slice(), &data);
        assert!(TensorView::from_parts(&shape, &data[..3]).is_err());
    }

    #[test]
    fn test_fill_f32() {
        let mut t = Tensor::zeros(Shape::vector(5));
        t.fill_f32(3.5);
        assert!(t.as_f32_slice().iter().all(|&x| x == 3.5));
    }
}
