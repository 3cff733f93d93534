// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Multi-head scaled dot-product self-attention.
//!
//! ```text
//! inputs [b, l, in]
//!   │  i2h projection, split last axis
//!   ▼
//! q, k, v [b, l, a]        q *= (a / h)^-0.5
//!   │  split_heads
//!   ▼
//! [b·h, l, a/h]
//!   │  q · kᵀ, key-axis length mask, softmax, (dropout), · v
//!   ▼
//! [b·h, l, a/h]
//!   │  combine_heads, h2o projection if out != a
//!   ▼
//! [b, l, out]
//! ```

use rand::rngs::StdRng;
use tensor_core::{Shape, Tensor, TensorError};

use crate::config::AttentionConfig;
use crate::dropout::Dropout;
use crate::linear::Linear;
use crate::params::{Initializer, Parameterized};
use crate::LayerError;

/// Score written to masked key positions before the softmax.
///
/// Finite, so masked rows never produce NaN.
pub const MASK_VALUE: f32 = -99999999.0;

/// Self-attention sublayer with a combined query/key/value projection.
#[derive(Debug, Clone)]
pub struct MultiHeadAttention {
    prefix: String,
    depth_in: usize,
    depth_att: usize,
    heads: usize,
    depth_out: usize,
    dropout: Dropout,
    i2h: Linear,
    h2o: Option<Linear>,
}

impl MultiHeadAttention {
    /// Creates the sublayer.
    ///
    /// Parameters are `{prefix}i2h_weight` `[3·depth_att, depth_in]`,
    /// `{prefix}i2h_bias`, and when `depth_out != depth_att` also
    /// `{prefix}h2o_weight` `[depth_out, depth_att]` and `{prefix}h2o_bias`.
    ///
    /// # Errors
    /// Returns [`LayerError::Config`] if `heads` does not divide `depth_att`
    /// or the dropout rate is invalid.
    pub fn new(
        prefix: &str,
        depth_in: usize,
        depth_att: usize,
        heads: usize,
        depth_out: usize,
        dropout: f32,
        init: &mut Initializer,
    ) -> Result<Self, LayerError> {
        if heads == 0 || depth_att % heads != 0 {
            return Err(LayerError::config(format!(
                "Number of heads ({heads}) must divide attention depth ({depth_att})"
            )));
        }
        let dropout = Dropout::new(dropout)?;

        let i2h = Linear::new(&format!("{prefix}i2h"), depth_in, depth_att * 3, init);
        let h2o = (depth_out != depth_att)
            .then(|| Linear::new(&format!("{prefix}h2o"), depth_att, depth_out, init));

        tracing::debug!(
            prefix,
            depth_in,
            depth_att,
            heads,
            depth_out,
            "multi-head attention created"
        );

        Ok(Self {
            prefix: prefix.to_string(),
            depth_in,
            depth_att,
            heads,
            depth_out,
            dropout,
            i2h,
            h2o,
        })
    }

    pub fn from_config(
        prefix: &str,
        depth_in: usize,
        config: &AttentionConfig,
        init: &mut Initializer,
    ) -> Result<Self, LayerError> {
        Self::new(
            prefix,
            depth_in,
            config.depth_att,
            config.heads,
            config.depth_out,
            config.dropout,
            init,
        )
    }

    pub fn heads(&self) -> usize {
        self.heads
    }

    pub fn depth_per_head(&self) -> usize {
        self.depth_att / self.heads
    }

    pub fn depth_out(&self) -> usize {
        self.depth_out
    }

    pub fn has_output_projection(&self) -> bool {
        self.h2o.is_some()
    }

    /// Inference-mode self-attention.
    ///
    /// * `inputs` — `[batch, length, depth_in]`.
    /// * `valid_lengths` — `[batch, 1]` (or `[batch]`), as `f32`.
    /// * `length` — the padded sequence length, equal to `inputs.dims()[1]`.
    ///
    /// Returns `[batch, length, depth_out]`. Key positions at or beyond a
    /// sequence's valid length receive no attention mass; query rows past it
    /// are still computed.
    pub fn attend(
        &self,
        inputs: &Tensor,
        valid_lengths: &Tensor,
        length: usize,
    ) -> Result<Tensor, LayerError> {
        self.forward(inputs, valid_lengths, length, None)
    }

    /// Training-mode self-attention: dropout on the attention probabilities
    /// draws from `rng`.
    pub fn attend_train(
        &self,
        inputs: &Tensor,
        valid_lengths: &Tensor,
        length: usize,
        rng: &mut StdRng,
    ) -> Result<Tensor, LayerError> {
        self.forward(inputs, valid_lengths, length, Some(rng))
    }

    fn forward(
        &self,
        inputs: &Tensor,
        valid_lengths: &Tensor,
        length: usize,
        rng: Option<&mut StdRng>,
    ) -> Result<Tensor, LayerError> {
        let dims = inputs.dims();
        if dims.len() != 3 || dims[1] != length || dims[2] != self.depth_in {
            return Err(TensorError::ShapeMismatch {
                op: "attend (inputs)",
                lhs: Shape::rank3(dims.first().copied().unwrap_or(0), length, self.depth_in),
                rhs: inputs.shape().clone(),
            }
            .into());
        }
        let batch = dims[0];
        tracing::trace!(prefix = %self.prefix, batch, length, "attend");

        // [b·l, in] → [b·l, 3a] → [b, l, 3a] → q, k, v
        let flat = inputs.reshape(Shape::matrix(batch * length, self.depth_in))?;
        let combined = self
            .i2h
            .forward(&flat)?
            .into_shape(Shape::rank3(batch, length, 3 * self.depth_att))?;
        let mut qkv = combined.split_last(3)?.into_iter();
        let (Some(q), Some(k), Some(v)) = (qkv.next(), qkv.next(), qkv.next()) else {
            return Err(TensorError::InvalidArgument {
                op: "attend",
                detail: "projection did not split into query, key and value".into(),
            }
            .into());
        };

        let q = q.scale((self.depth_per_head() as f32).powf(-0.5));

        let q = split_heads(&q, self.heads)?;
        let k = split_heads(&k, self.heads)?;
        let v = split_heads(&v, self.heads)?;

        // [b·h, l, l]
        let scores = q.batch_matmul(&k, true)?;
        let lengths = broadcast_lengths(valid_lengths, self.heads)?;
        let scores = scores.sequence_mask(&lengths, MASK_VALUE)?;
        let probs = scores.softmax()?;
        let probs = self.dropout.apply(&probs, rng)?;

        // [b·h, l, a/h] → [b, l, a]
        let context = combine_heads(&probs.batch_matmul(&v, false)?, self.heads)?;

        match &self.h2o {
            Some(h2o) => {
                let flat = context.into_shape(Shape::matrix(batch * length, self.depth_att))?;
                Ok(h2o
                    .forward(&flat)?
                    .into_shape(Shape::rank3(batch, length, self.depth_out))?)
            }
            None => Ok(context),
        }
    }
}

impl Parameterized for MultiHeadAttention {
    fn named_parameters(&self) -> Vec<(&str, &Tensor)> {
        let mut params = self.i2h.named_parameters();
        if let Some(h2o) = &self.h2o {
            params.extend(h2o.named_parameters());
        }
        params
    }

    fn named_parameters_mut(&mut self) -> Vec<(&str, &mut Tensor)> {
        let mut params = self.i2h.named_parameters_mut();
        if let Some(h2o) = &mut self.h2o {
            params.extend(h2o.named_parameters_mut());
        }
        params
    }
}

/// Splits the depth axis into heads and folds them into the batch axis:
/// `[b, l, d] → [b, l, h, d/h] → [b, h, l, d/h] → [b·h, l, d/h]`.
///
/// Row `i·h + j` of the result belongs to batch entry `i`, head `j`.
pub fn split_heads(x: &Tensor, heads: usize) -> Result<Tensor, TensorError> {
    let dims = x.dims();
    if dims.len() != 3 || heads == 0 || dims[2] % heads != 0 {
        return Err(TensorError::InvalidArgument {
            op: "split_heads",
            detail: format!("cannot split {} into {heads} heads", x.shape()),
        });
    }
    let (b, l, d) = (dims[0], dims[1], dims[2]);
    let dh = d / heads;
    x.reshape(vec![b, l, heads, dh])?
        .permute(&[0, 2, 1, 3])?
        .into_shape(Shape::rank3(b * heads, l, dh))
}

/// Inverse of [`split_heads`]:
/// `[b·h, l, d/h] → [b, h, l, d/h] → [b, l, h, d/h] → [b, l, d]`.
pub fn combine_heads(x: &Tensor, heads: usize) -> Result<Tensor, TensorError> {
    let dims = x.dims();
    if dims.len() != 3 || heads == 0 || dims[0] % heads != 0 {
        return Err(TensorError::InvalidArgument {
            op: "combine_heads",
            detail: format!("cannot combine {} from {heads} heads", x.shape()),
        });
    }
    let (bh, l, dh) = (dims[0], dims[1], dims[2]);
    let b = bh / heads;
    x.reshape(vec![b, heads, l, dh])?
        .permute(&[0, 2, 1, 3])?
        .into_shape(Shape::rank3(b, l, heads * dh))
}

/// Replicates each sequence's valid length once per head, matching the
/// `[b·h, ...]` layout of [`split_heads`]: entry `i·h + j` is `lengths[i]`.
///
/// `lengths` is `[b, 1]` or `[b]`; the result is `[b·h]`.
pub fn broadcast_lengths(lengths: &Tensor, heads: usize) -> Result<Tensor, TensorError> {
    if !matches!(lengths.dims(), [_] | [_, 1]) {
        return Err(TensorError::InvalidArgument {
            op: "broadcast_lengths",
            detail: format!("expected lengths of shape [batch, 1], got {}", lengths.shape()),
        });
    }
    let data: Vec<f32> = lengths
        .as_f32_slice()
        .iter()
        .flat_map(|&len| std::iter::repeat(len).take(heads))
        .collect();
    Tensor::from_vec(Shape::vector(data.len()), data)
}
