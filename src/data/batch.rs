use burn::tensor::{backend::Backend, Tensor};

use crate::error::Result;
use crate::utils::{check_dims, check_non_empty};

/// Sizes of the axes shared by every tensor of a [`TrajectoryBatch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchDims {
    pub batch: usize,
    pub agents: usize,
    pub modes: usize,
    pub steps: usize,
}

/// Inputs of one multi-agent scoring call.
#[derive(Clone, Debug)]
pub struct TrajectoryBatch<B: Backend> {
    pub ground_truth: Tensor<B, 4>,                // [B, N, T, 2]
    pub predictions: Tensor<B, 5>,                 // [B, N, M, T, 2]
    pub confidences: Tensor<B, 3>,                 // [B, N, M]
    pub availabilities: Tensor<B, 4>,              // [B, N, T, 1]
    pub covariance_matrices: Option<Tensor<B, 6>>, // [B, N, M, T, 2, 2]
}

/// The same trajectories with the agent axis folded into the batch axis.
#[derive(Clone, Debug)]
pub struct SingleAgentBatch<B: Backend> {
    pub ground_truth: Tensor<B, 3>,   // [B * N, T, 2]
    pub predictions: Tensor<B, 4>,    // [B * N, M, T, 2]
    pub confidences: Tensor<B, 2>,    // [B * N, M]
    pub availabilities: Tensor<B, 2>, // [B * N, T]
}

impl<B: Backend> TrajectoryBatch<B> {
    pub fn new(
        ground_truth: Tensor<B, 4>,
        predictions: Tensor<B, 5>,
        confidences: Tensor<B, 3>,
        availabilities: Tensor<B, 4>,
    ) -> Self {
        Self {
            ground_truth,
            predictions,
            confidences,
            availabilities,
            covariance_matrices: None,
        }
    }

    pub fn with_covariances(mut self, covariance_matrices: Tensor<B, 6>) -> Self {
        self.covariance_matrices = Some(covariance_matrices);
        self
    }

    /// Axis sizes as declared by the predictions tensor.
    pub fn dims(&self) -> BatchDims {
        let [batch, agents, modes, steps, _] = self.predictions.dims();
        BatchDims {
            batch,
            agents,
            modes,
            steps,
        }
    }

    /// Checks that every tensor agrees with the predictions on the shared axes.
    pub fn validate(&self) -> Result<()> {
        check_multi_agent(
            &self.ground_truth,
            &self.predictions,
            Some(&self.confidences),
            &self.availabilities,
        )?;

        if let Some(covariances) = &self.covariance_matrices {
            let BatchDims {
                batch,
                agents,
                modes,
                steps,
            } = self.dims();
            check_dims(
                "covariance_matrices",
                &covariances.dims(),
                &[batch, agents, modes, steps, 2, 2],
            )?;
        }

        Ok(())
    }

    pub fn into_single_agent(self) -> SingleAgentBatch<B> {
        let BatchDims {
            batch,
            agents,
            modes,
            steps,
        } = self.dims();
        let rows = batch * agents;

        SingleAgentBatch {
            ground_truth: self.ground_truth.reshape([rows, steps, 2]),
            predictions: self.predictions.reshape([rows, modes, steps, 2]),
            confidences: self.confidences.reshape([rows, modes]),
            availabilities: self.availabilities.reshape([rows, steps]),
        }
    }
}

pub(crate) fn check_multi_agent<B: Backend>(
    ground_truth: &Tensor<B, 4>,
    predictions: &Tensor<B, 5>,
    confidences: Option<&Tensor<B, 3>>,
    availabilities: &Tensor<B, 4>,
) -> Result<()> {
    let dims = predictions.dims();
    check_non_empty("predictions", &dims, &["batch", "agent", "mode", "time"])?;

    let [batch, agents, modes, steps, _] = dims;
    check_dims("predictions", &dims, &[batch, agents, modes, steps, 2])?;
    check_dims("ground_truth", &ground_truth.dims(), &[batch, agents, steps, 2])?;
    check_dims(
        "availabilities",
        &availabilities.dims(),
        &[batch, agents, steps, 1],
    )?;
    if let Some(confidences) = confidences {
        check_dims("confidences", &confidences.dims(), &[batch, agents, modes])?;
    }

    Ok(())
}

pub(crate) fn check_single_agent<B: Backend>(
    ground_truth: &Tensor<B, 3>,
    predictions: &Tensor<B, 4>,
    confidences: &Tensor<B, 2>,
    availabilities: &Tensor<B, 2>,
) -> Result<()> {
    let dims = predictions.dims();
    check_non_empty("predictions", &dims, &["batch", "mode", "time"])?;

    let [batch, modes, steps, _] = dims;
    check_dims("predictions", &dims, &[batch, modes, steps, 2])?;
    check_dims("ground_truth", &ground_truth.dims(), &[batch, steps, 2])?;
    check_dims("confidences", &confidences.dims(), &[batch, modes])?;
    check_dims("availabilities", &availabilities.dims(), &[batch, steps])?;

    Ok(())
}
