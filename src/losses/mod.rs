pub mod ade;
pub mod isotropic;
pub mod mixture;

pub use ade::ade_loss;
pub use isotropic::neg_multi_log_likelihood_batch;
pub use mixture::nll_with_covariances;

use burn::config::Config;
use burn::tensor::{backend::Backend, Tensor};
use serde::{Deserialize, Serialize};

use crate::data::batch::TrajectoryBatch;
use crate::error::{self, LossError};

/// Which score a [`TrajectoryLoss`] computes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossKind {
    /// Best-of-modes average displacement error.
    Ade,
    /// Mixture NLL with the batch's per-step covariance matrices.
    NllWithCovariances,
    /// Mixture NLL with unit isotropic variance, agents folded into the batch.
    NllIsotropic,
}

#[derive(Debug, Clone)]
pub struct TrajectoryLoss {
    kind: LossKind,
}

impl TrajectoryLoss {
    pub fn kind(&self) -> LossKind {
        self.kind
    }

    /// Scores a whole batch, returning a single-element tensor.
    pub fn forward<B: Backend>(&self, batch: &TrajectoryBatch<B>) -> error::Result<Tensor<B, 1>> {
        batch.validate()?;
        let dims = batch.dims();
        tracing::debug!(
            kind = ?self.kind,
            batch = dims.batch,
            agents = dims.agents,
            modes = dims.modes,
            steps = dims.steps,
            "scoring trajectory batch"
        );

        let batch = batch.clone();
        match self.kind {
            LossKind::Ade => ade_loss(
                batch.ground_truth,
                batch.predictions,
                batch.confidences,
                batch.availabilities,
                batch.covariance_matrices,
            ),
            LossKind::NllWithCovariances => {
                let covariance_matrices = batch
                    .covariance_matrices
                    .ok_or(LossError::MissingCovariance("nll_with_covariances"))?;
                nll_with_covariances(
                    batch.ground_truth,
                    batch.predictions,
                    batch.confidences,
                    batch.availabilities,
                    covariance_matrices,
                )
            }
            LossKind::NllIsotropic => {
                let single = batch.into_single_agent();
                neg_multi_log_likelihood_batch(
                    single.ground_truth,
                    single.predictions,
                    single.confidences,
                    single.availabilities,
                )
            }
        }
    }
}

#[derive(Config, Debug)]
pub struct TrajectoryLossConfig {
    #[config(default = "LossKind::NllWithCovariances")]
    kind: LossKind,
}

impl TrajectoryLossConfig {
    pub fn init(&self) -> TrajectoryLoss {
        TrajectoryLoss { kind: self.kind }
    }
}
