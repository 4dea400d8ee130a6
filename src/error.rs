//! Error types for trajectory losses.

use thiserror::Error;

/// Result type alias using [`LossError`].
pub type Result<T> = std::result::Result<T, LossError>;

/// Errors a loss computation can report to its caller.
///
/// None of these are recovered internally. A training loop decides whether
/// to abort or skip the offending batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LossError {
    /// A finiteness checkpoint found NaN or infinite values.
    ///
    /// Usually a covariance that is not positive-definite, or NaN/inf
    /// already present in the inputs.
    #[error("{loss}: non-finite values after {stage}")]
    NonFinite {
        /// Loss that was being computed.
        loss: &'static str,
        /// Checkpoint that failed.
        stage: &'static str,
    },

    /// Input tensors disagree on their shared axes.
    #[error("Shape mismatch for {tensor}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Name of the offending tensor.
        tensor: &'static str,
        /// Expected dims.
        expected: Vec<usize>,
        /// Actual dims.
        got: Vec<usize>,
    },

    /// An axis the losses reduce over has size zero.
    #[error("Empty {axis} axis in {tensor}")]
    EmptyAxis {
        /// Name of the offending tensor.
        tensor: &'static str,
        /// Name of the empty axis.
        axis: &'static str,
    },

    /// The requested loss needs covariance matrices the batch does not carry.
    #[error("{0} requires covariance matrices but the batch has none")]
    MissingCovariance(&'static str),
}
