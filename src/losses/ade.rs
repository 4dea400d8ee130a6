use burn::tensor::{backend::Backend, Tensor};

use crate::data::batch::check_multi_agent;
use crate::error::Result;
use crate::utils::ensure_finite;

const NAME: &str = "ade_loss";

/// Best-of-modes average displacement error.
///
/// Squared error between the ground truth and every mode, masked by
/// availability and averaged over time and coordinates, is reduced to the
/// closest mode per agent and then averaged over batch and agent. The mean
/// over time divides by the full horizon, masked steps included.
///
/// `confidences` and `covariance_matrices` do not take part in the score.
/// They are accepted so every loss shares the same call shape.
///
/// Shapes: gt `[B, N, T, 2]`, predictions `[B, N, M, T, 2]`,
/// confidences `[B, N, M]`, avails `[B, N, T, 1]`,
/// covariance_matrices `[B, N, M, T, 2, 2]`.
pub fn ade_loss<B: Backend>(
    gt: Tensor<B, 4>,
    predictions: Tensor<B, 5>,
    _confidences: Tensor<B, 3>,
    avails: Tensor<B, 4>,
    _covariance_matrices: Option<Tensor<B, 6>>,
) -> Result<Tensor<B, 1>> {
    check_multi_agent(&gt, &predictions, None, &avails)?;
    let [batch, agents, modes, _, _] = predictions.dims();

    let gt: Tensor<B, 5> = gt.unsqueeze_dim(2);
    let avails: Tensor<B, 5> = avails.unsqueeze_dim(2);

    let delta = gt - predictions;
    let error = delta.clone() * delta * avails;
    let error: Tensor<B, 3> = error.mean_dim(4).mean_dim(3).reshape([batch, agents, modes]);

    let best = error.min_dim(2);
    ensure_finite(&best, NAME, "best mode error")?;

    let loss = best.mean();
    tracing::trace!(loss = ?loss.to_data().value, "ade loss");
    Ok(loss)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LossError;
    use crate::fixtures::{scalar, tensor, two_mode_batch};

    #[test]
    fn best_mode_wins() {
        let batch = two_mode_batch();

        let loss = ade_loss(
            batch.ground_truth,
            batch.predictions,
            batch.confidences,
            batch.availabilities,
            batch.covariance_matrices,
        )
        .unwrap();

        assert!(scalar(loss).abs() < 1e-6);
    }

    #[test]
    fn loss_is_error_of_closest_mode_only() {
        // mode 0 is off by 1 on x at both steps, mode 1 by 3
        let gt = tensor(vec![0.0, 0.0, 1.0, 1.0], [1, 1, 2, 2]);
        let predictions = tensor(
            vec![1.0, 0.0, 2.0, 1.0, 3.0, 0.0, 4.0, 1.0],
            [1, 1, 2, 2, 2],
        );
        let confidences = tensor(vec![-5.0, 5.0], [1, 1, 2]);
        let avails = tensor(vec![1.0, 1.0], [1, 1, 2, 1]);

        let loss = ade_loss(gt, predictions, confidences, avails, None).unwrap();

        // (1 + 0 + 1 + 0) / 4
        assert!((scalar(loss) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn confidences_and_covariances_are_ignored() {
        let batch = two_mode_batch();
        let reference = scalar(
            ade_loss(
                batch.ground_truth.clone(),
                batch.predictions.clone(),
                batch.confidences.clone(),
                batch.availabilities.clone(),
                None,
            )
            .unwrap(),
        );

        let other = scalar(
            ade_loss(
                batch.ground_truth,
                batch.predictions,
                tensor(vec![-9.0, 9.0], [1, 1, 2]),
                batch.availabilities,
                batch.covariance_matrices,
            )
            .unwrap(),
        );

        assert_eq!(reference, other);
    }

    #[test]
    fn masked_steps_do_not_contribute() {
        let run = |masked_value: f32| {
            let gt = tensor(vec![0.0, 0.0, masked_value, -masked_value], [1, 1, 2, 2]);
            let predictions = tensor(vec![1.0, 1.0, 2.0, 2.0], [1, 1, 1, 2, 2]);
            let confidences = tensor(vec![0.0], [1, 1, 1]);
            let avails = tensor(vec![1.0, 0.0], [1, 1, 2, 1]);
            scalar(ade_loss(gt, predictions, confidences, avails, None).unwrap())
        };

        assert_eq!(run(0.0), run(123.0));
        assert!((run(0.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn averages_over_batch_and_agents() {
        // two agents, one mode, one step: errors 2 and 0 per coordinate-mean
        let gt = tensor(vec![0.0, 0.0, 0.0, 0.0], [1, 2, 1, 2]);
        let predictions = tensor(vec![1.0, 1.732_050_8, 0.0, 0.0], [1, 2, 1, 1, 2]);
        let confidences = tensor(vec![0.0, 0.0], [1, 2, 1]);
        let avails = tensor(vec![1.0, 1.0], [1, 2, 1, 1]);

        let loss = scalar(ade_loss(gt, predictions, confidences, avails, None).unwrap());

        assert!((loss - 1.0).abs() < 1e-5, "got {loss}");
    }

    #[test]
    fn fully_masked_agent_scores_zero() {
        // the horizon mean divides by T * 2 even when every step is masked
        let gt = tensor(vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0], [1, 2, 2, 2]);
        let predictions = tensor(
            vec![3.0, 3.0, 3.0, 3.0, 1.0, 1.0, 1.0, 1.0],
            [1, 2, 1, 2, 2],
        );
        let confidences = tensor(vec![0.0, 0.0], [1, 2, 1]);
        let avails = tensor(vec![0.0, 0.0, 1.0, 1.0], [1, 2, 2, 1]);

        let loss = scalar(ade_loss(gt, predictions, confidences, avails, None).unwrap());

        // agent 0 contributes 0, agent 1 contributes 1
        assert!((loss - 0.5).abs() < 1e-6, "got {loss}");
    }

    #[test]
    fn non_finite_predictions_fail_loudly() {
        let gt = tensor(vec![0.0, 0.0], [1, 1, 1, 2]);
        let predictions = tensor(vec![f32::NAN, 0.0], [1, 1, 1, 1, 2]);
        let confidences = tensor(vec![0.0], [1, 1, 1]);
        let avails = tensor(vec![1.0], [1, 1, 1, 1]);

        let err = ade_loss(gt, predictions, confidences, avails, None).unwrap_err();

        assert!(matches!(err, LossError::NonFinite { loss: NAME, .. }));
    }

    #[test]
    fn repeated_calls_are_identical() {
        let batch = two_mode_batch();
        let run = || {
            let batch = batch.clone();
            scalar(
                ade_loss(
                    batch.ground_truth,
                    batch.predictions,
                    batch.confidences,
                    batch.availabilities,
                    batch.covariance_matrices,
                )
                .unwrap(),
            )
        };

        assert_eq!(run().to_bits(), run().to_bits());
    }
}
