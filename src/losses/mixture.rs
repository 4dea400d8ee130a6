use burn::tensor::{backend::Backend, Tensor};

use crate::data::batch::check_multi_agent;
use crate::error::Result;
use crate::modules::covariance::{inverse, log_determinant, quadratic_form};
use crate::utils::{check_dims, ensure_finite, log_softmax, log_sum_exp};

const NAME: &str = "nll_with_covariances";

/// Negative log-likelihood of the ground truth under a Gaussian mixture over
/// modes, with a full 2×2 covariance per mode and timestep.
///
/// Each available step contributes `-0.5 * (rᵀ Σ⁻¹ r + log|Σ|)` where `r` is
/// the residual to the mode. The per-mode sum over time is weighted by the
/// log-softmax of the confidences and the modes are combined with
/// log-sum-exp. The `log 2π` constant is left out.
///
/// Covariances must be positive-definite in every slot, masked steps
/// included. A violation surfaces as [`crate::LossError::NonFinite`] from
/// the quadratic form or masked log density checkpoint.
///
/// Shapes: gt `[B, N, T, 2]`, predictions `[B, N, M, T, 2]`,
/// confidences `[B, N, M]`, avails `[B, N, T, 1]`,
/// covariance_matrices `[B, N, M, T, 2, 2]`.
pub fn nll_with_covariances<B: Backend>(
    gt: Tensor<B, 4>,
    predictions: Tensor<B, 5>,
    confidences: Tensor<B, 3>,
    avails: Tensor<B, 4>,
    covariance_matrices: Tensor<B, 6>,
) -> Result<Tensor<B, 1>> {
    check_multi_agent(&gt, &predictions, Some(&confidences), &avails)?;
    let [batch, agents, modes, steps, coords] = predictions.dims();
    check_dims(
        "covariance_matrices",
        &covariance_matrices.dims(),
        &[batch, agents, modes, steps, 2, 2],
    )?;
    let slots = batch * agents * modes * steps;

    let covariances: Tensor<B, 3> = covariance_matrices.reshape([slots, 2, 2]);
    let precisions = inverse(covariances.clone());

    let gt: Tensor<B, 5> = gt.unsqueeze_dim(2);
    let avails: Tensor<B, 5> = avails.unsqueeze_dim(2);
    let residuals: Tensor<B, 2> = (gt - predictions).reshape([slots, coords]);

    let mahalanobis = quadratic_form(residuals, precisions);
    ensure_finite(&mahalanobis, NAME, "quadratic form")?;

    let log_density = (mahalanobis + log_determinant(covariances)) * -0.5;
    let log_density: Tensor<B, 5> = log_density.reshape([batch, agents, modes, steps, 1]);
    let log_density = log_density * avails;
    ensure_finite(&log_density, NAME, "masked log density")?;

    let log_likelihood: Tensor<B, 3> = log_density
        .sum_dim(4)
        .sum_dim(3)
        .reshape([batch, agents, modes]);
    let log_likelihood = log_softmax(confidences, 2) + log_likelihood;

    let nll = log_sum_exp(log_likelihood, 2).neg();
    let loss = nll.mean();
    tracing::trace!(loss = ?loss.to_data().value, "mixture nll with covariances");
    Ok(loss)
}
