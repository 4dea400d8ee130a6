//! Losses for multi-modal trajectory prediction.
//!
//! Given ground-truth future positions, a set of predicted trajectories
//! ("modes") with confidence logits, an availability mask and optionally a
//! 2×2 covariance per mode and step, these functions score how well the
//! predicted distribution explains the observed trajectory:
//!
//! - [`ade_loss`]: best-of-modes masked mean squared displacement.
//! - [`nll_with_covariances`]: Gaussian mixture negative log-likelihood with
//!   full per-step covariance.
//! - [`neg_multi_log_likelihood_batch`]: the same mixture NLL with a fixed
//!   unit isotropic variance, one agent per sample. PyTorch trajectory code
//!   usually calls it `pytorch_neg_multi_log_likelihood_batch`.
//!
//! [`TrajectoryLossConfig`] picks one of them and applies it to a
//! [`TrajectoryBatch`].

pub mod data;
pub mod error;
pub mod losses;
pub mod modules;
pub mod utils;

#[cfg(test)]
pub(crate) mod fixtures;

pub use data::batch::{BatchDims, SingleAgentBatch, TrajectoryBatch};
pub use error::{LossError, Result};
pub use losses::{
    ade_loss, neg_multi_log_likelihood_batch, nll_with_covariances, LossKind, TrajectoryLoss,
    TrajectoryLossConfig,
};
