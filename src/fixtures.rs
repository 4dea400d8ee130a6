use burn::backend::NdArray;
use burn::tensor::{Data, Shape, Tensor};

use crate::data::batch::TrajectoryBatch;

pub type TestBackend = NdArray;

pub fn tensor<const D: usize>(values: Vec<f32>, dims: [usize; D]) -> Tensor<TestBackend, D> {
    Tensor::from_data(Data::new(values, Shape::new(dims)))
}

pub fn values<const D: usize>(tensor: Tensor<TestBackend, D>) -> Vec<f32> {
    tensor.into_data().value
}

pub fn scalar(tensor: Tensor<TestBackend, 1>) -> f32 {
    let values = values(tensor);
    assert_eq!(values.len(), 1, "expected a single loss value");
    values[0]
}

/// `scale * I` covariance for every (batch, agent, mode, step) slot.
pub fn identity_covariances(dims: [usize; 4], scale: f32) -> Tensor<TestBackend, 6> {
    let [batch, agents, modes, steps] = dims;
    let slots = batch * agents * modes * steps;
    let values = (0..slots)
        .flat_map(|_| [scale, 0.0, 0.0, scale])
        .collect();
    tensor(values, [batch, agents, modes, steps, 2, 2])
}

/// One agent, two steps, two modes: mode 0 follows the ground truth exactly,
/// mode 1 sits far away, and the confidences favour mode 0.
pub fn two_mode_batch() -> TrajectoryBatch<TestBackend> {
    let ground_truth = tensor(vec![0.0, 0.0, 1.0, 1.0], [1, 1, 2, 2]);
    let predictions = tensor(
        vec![0.0, 0.0, 1.0, 1.0, 5.0, 5.0, 5.0, 5.0],
        [1, 1, 2, 2, 2],
    );
    let confidences = tensor(vec![2.0, -2.0], [1, 1, 2]);
    let availabilities = tensor(vec![1.0, 1.0], [1, 1, 2, 1]);

    TrajectoryBatch::new(ground_truth, predictions, confidences, availabilities)
        .with_covariances(identity_covariances([1, 1, 2, 2], 1.0))
}
