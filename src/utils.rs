use burn::tensor::{backend::Backend, ElementConversion, Tensor};

use crate::error::{LossError, Result};

/// Numerically stable `log(sum(exp(x)))` along `dim`, keeping `dim` with size 1.
///
/// Entries equal to `-inf` (modes with zero mixture weight) are expected here
/// and contribute nothing. A slice that is entirely `-inf` reduces to `-inf`
/// instead of NaN.
pub fn log_sum_exp<B: Backend, const D: usize>(x: Tensor<B, D>, dim: usize) -> Tensor<B, D> {
    let max = x.clone().max_dim(dim).detach();
    let all_excluded = max.clone().equal_elem(f32::NEG_INFINITY);
    let max = max.mask_fill(all_excluded, 0.0);

    (x - max.clone()).exp().sum_dim(dim).log() + max
}

/// Log-softmax along `dim`, shifted through [`log_sum_exp`] so large logits
/// do not overflow.
pub fn log_softmax<B: Backend, const D: usize>(x: Tensor<B, D>, dim: usize) -> Tensor<B, D> {
    x.clone() - log_sum_exp(x, dim)
}

/// Fails with [`LossError::NonFinite`] if any element of `tensor` is NaN or infinite.
pub fn ensure_finite<B: Backend, const D: usize>(
    tensor: &Tensor<B, D>,
    loss: &'static str,
    stage: &'static str,
) -> Result<()> {
    let data = tensor.to_data();
    if data.value.iter().all(|&v| v.elem::<f64>().is_finite()) {
        return Ok(());
    }

    tracing::warn!(loss, stage, "non-finite values in loss computation");
    Err(LossError::NonFinite { loss, stage })
}

pub fn check_dims(tensor: &'static str, got: &[usize], expected: &[usize]) -> Result<()> {
    if got == expected {
        return Ok(());
    }

    Err(LossError::ShapeMismatch {
        tensor,
        expected: expected.to_vec(),
        got: got.to_vec(),
    })
}

pub fn check_non_empty(tensor: &'static str, dims: &[usize], axes: &[&'static str]) -> Result<()> {
    match dims.iter().zip(axes).find(|(size, _)| **size == 0) {
        Some((_, axis)) => Err(LossError::EmptyAxis { tensor, axis: *axis }),
        None => Ok(()),
    }
}
