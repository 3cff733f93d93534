// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Batched matrix multiplication.

use crate::{Shape, Tensor, TensorError, TensorView};

/// Batched matrix multiplication over a leading batch axis.
///
/// `lhs` is `[B, M, K]`. With `transpose_rhs == false`, `rhs` is `[B, K, N]`;
/// with `transpose_rhs == true`, `rhs` is `[B, N, K]` and each slice is used
/// transposed. `output` must be `[B, M, N]`.
///
/// This is the kernel behind attention scores (`q · kᵀ`) and context
/// (`probs · v`).
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] if dimensions are incompatible.
pub fn batch_matmul(
    lhs: &TensorView<'_>,
    rhs: &TensorView<'_>,
    transpose_rhs: bool,
    output: &mut Tensor,
) -> Result<(), TensorError> {
    if !lhs.shape().is_batch_matmul_compatible(rhs.shape(), transpose_rhs) {
        return Err(TensorError::ShapeMismatch {
            op: "batch_matmul",
            lhs: lhs.shape().clone(),
            rhs: rhs.shape().clone(),
        });
    }

    let l = lhs.shape().dims();
    let r = rhs.shape().dims();
    let (batch, m, k) = (l[0], l[1], l[2]);
    let n = if transpose_rhs { r[1] } else { r[2] };

    let expected_shape = Shape::rank3(batch, m, n);
    if output.shape() != &expected_shape {
        return Err(TensorError::ShapeMismatch {
            op: "batch_matmul (output)",
            lhs: expected_shape,
            rhs: output.shape().clone(),
        });
    }

    let a = lhs.as_f32_slice();
    let b = rhs.as_f32_slice();
    let c = output.as_f32_slice_mut();

    for bi in 0..batch {
        let a_slice = &a[bi * m * k..(bi + 1) * m * k];
        let b_slice = &b[bi * k * n..(bi + 1) * k * n];
        let c_slice = &mut c[bi * m * n..(bi + 1) * m * n];
        if transpose_rhs {
            matmul_f32_transposed(a_slice, b_slice, c_slice, m, k, n);
        } else {
            matmul_f32_generic(a_slice, b_slice, c_slice, m, k, n);
        }
    }
    Ok(())
}

impl Tensor {
    /// Allocating form of [`batch_matmul`].
    pub fn batch_matmul(&self, rhs: &Tensor, transpose_rhs: bool) -> Result<Tensor, TensorError> {
        let d = self.dims();
        let r = rhs.dims();
        let (batch, m) = (d.first().copied().unwrap_or(0), d.get(1).copied().unwrap_or(0));
        let n = if transpose_rhs { r.get(1) } else { r.get(2) }
            .copied()
            .unwrap_or(0);
        let mut out = Tensor::zeros(Shape::rank3(batch, m, n));
        batch_matmul(&self.view(), &rhs.view(), transpose_rhs, &mut out)?;
        Ok(out)
    }
}

/// Generic (portable) f32 matrix multiplication.
///
/// Uses an ikj loop order so the inner loop is a saxpy on a row of C.
fn matmul_f32_generic(a: &[f32], b: &[f32], c: &mut [f32], m: usize, k: usize, n: usize) {
    c.iter_mut().for_each(|x| *x = 0.0);

    for i in 0..m {
        let c_row = &mut c[i * n..(i + 1) * n];
        for p in 0..k {
            let a_ip = a[i * k + p];
            let b_row = &b[p * n..(p + 1) * n];
            for (cj, bj) in c_row.iter_mut().zip(b_row) {
                *cj += a_ip * bj;
            }
        }
    }
}

/// `c = a @ bᵀ` where `b` is stored `[N, K]`: each output element is a dot
/// product of two contiguous rows.
pub(crate) fn matmul_f32_transposed(
    a: &[f32],
    b: &[f32],
    c: &mut [f32],
    m: usize,
    k: usize,
    n: usize,
) {
    for i in 0..m {
        let a_row = &a[i * k..(i + 1) * k];
        for j in 0..n {
            let b_row = &b[j * k..(j + 1) * k];
            c[i * n + j] = a_row.iter().zip(b_row).map(|(x, y)| x * y).sum();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_matmul_2x3_times_3x2() {
        // A = [[1, 2, 3], [4, 5, 6]]
        // B = [[7, 8], [9, 10], [11, 12]]
        // C = [[58, 64], [139, 154]]
        let a = Tensor::from_f32(Shape::rank3(1, 2, 3), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let b = Tensor::from_f32(Shape::rank3(1, 3, 2), &[7.0, 8.0, 9.0, 10.0, 11.0, 12.0])
            .unwrap();
        let mut c = Tensor::zeros(Shape::rank3(1, 2, 2));

        batch_matmul(&a.view(), &b.view(), false, &mut c).unwrap();

        let result = c.as_f32_slice();
        assert!((result[0] - 58.0).abs() < 1e-5);
        assert!((result[1] - 64.0).abs() < 1e-5);
        assert!((result[2] - 139.0).abs() < 1e-5);
        assert!((result[3] - 154.0).abs() < 1e-5);
    }

    #[test]
    fn test_batch_matmul_wrong_output() {
        let a = Tensor::zeros(Shape::rank3(1, 2, 3));
        let b = Tensor::zeros(Shape::rank3(1, 3, 2));
        let mut c = Tensor::zeros(Shape::rank3(1, 3, 3));
        assert!(matches!(
            batch_matmul(&a.view(), &b.view(), false, &mut c),
            Err(TensorError::ShapeMismatch {
                op: "batch_matmul (output)",
                ..
            })
        ));
    }

    #[test]
    fn test_batch_matmul_matches_per_slice() {
        // Two independent 2x2 products.
        let a = Tensor::from_f32(Shape::rank3(2, 2, 2), &[1.0, 2.0, 3.0, 4.0, 1.0, 0.0, 0.0, 1.0])
            .unwrap();
        let b = Tensor::from_f32(Shape::rank3(2, 2, 2), &[5.0, 6.0, 7.0, 8.0, 9.0, 8.0, 7.0, 6.0])
            .unwrap();
        let c = a.batch_matmul(&b, false).unwrap();
        assert_eq!(c.dims(), &[2, 2, 2]);
        assert_eq!(
            c.as_f32_slice(),
            &[19.0, 22.0, 43.0, 50.0, 9.0, 8.0, 7.0, 6.0]
        );
    }

    #[test]
    fn test_batch_matmul_transposed_rhs() {
        // q = [[1, 2]], k = [[3, 4], [5, 6]] → q·kᵀ = [[11, 17]]
        let q = Tensor::from_f32(Shape::rank3(1, 1, 2), &[1.0, 2.0]).unwrap();
        let k = Tensor::from_f32(Shape::rank3(1, 2, 2), &[3.0, 4.0, 5.0, 6.0]).unwrap();
        let s = q.batch_matmul(&k, true).unwrap();
        assert_eq!(s.dims(), &[1, 1, 2]);
        assert_eq!(s.as_f32_slice(), &[11.0, 17.0]);
    }

    #[test]
    fn test_batch_matmul_batch_mismatch() {
        let a = Tensor::zeros(Shape::rank3(2, 3, 4));
        let b = Tensor::zeros(Shape::rank3(3, 4, 5));
        assert!(a.batch_matmul(&b, false).is_err());
    }
}
