use burn::tensor::{backend::Backend, Tensor};

use crate::data::batch::check_single_agent;
use crate::error::Result;
use crate::utils::{log_softmax, log_sum_exp};

/// Multi-modal negative log-likelihood for a single agent per sample, with
/// a fixed unit isotropic variance for every mode.
///
/// This is the single-agent baseline that PyTorch training code usually calls
/// `pytorch_neg_multi_log_likelihood_batch`; only the framework prefix is dropped.
///
/// Shapes: gt `[B, T, 2]`, predictions `[B, M, T, 2]`, confidences `[B, M]`,
/// avails `[B, T]`.
pub fn neg_multi_log_likelihood_batch<B: Backend>(
    gt: Tensor<B, 3>,
    predictions: Tensor<B, 4>,
    confidences: Tensor<B, 2>,
    avails: Tensor<B, 2>,
) -> Result<Tensor<B, 1>> {
    check_single_agent(&gt, &predictions, &confidences, &avails)?;
    let [batch, modes, steps, _] = predictions.dims();

    let gt: Tensor<B, 4> = gt.unsqueeze_dim(1);
    let avails: Tensor<B, 4> = avails.reshape([batch, 1, steps, 1]);

    let residual = (gt - predictions) * avails;
    let error: Tensor<B, 2> = (residual.clone() * residual)
        .sum_dim(3)
        .sum_dim(2)
        .reshape([batch, modes]);

    // a zero-weight mode gives -inf here, which log_sum_exp absorbs
    let log_likelihood = log_softmax(confidences, 1) - error * 0.5;

    let nll = log_sum_exp(log_likelihood, 1).neg();
    let loss = nll.mean();
    tracing::trace!(loss = ?loss.to_data().value, "isotropic mixture nll");
    Ok(loss)
}
