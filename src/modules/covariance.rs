//! Closed-form operations on batches of 2×2 covariance matrices.
//!
//! Matrices are laid out as `[S, 2, 2]` where `S` is the number of
//! (batch, agent, mode, step) slots flattened together.

use burn::tensor::{backend::Backend, Tensor};

fn entries<B: Backend>(
    matrices: Tensor<B, 3>,
) -> (Tensor<B, 2>, Tensor<B, 2>, Tensor<B, 2>, Tensor<B, 2>) {
    let [slots, _, _] = matrices.dims();
    let mut chunks = matrices.reshape([slots, 4]).chunk(4, 1);
    let d = chunks.remove(3);
    let c = chunks.remove(2);
    let b = chunks.remove(1);
    let a = chunks.remove(0);
    (a, b, c, d)
}

/// Determinant of each matrix, shape `[S]`.
pub fn determinant<B: Backend>(matrices: Tensor<B, 3>) -> Tensor<B, 1> {
    let [slots, _, _] = matrices.dims();
    let (a, b, c, d) = entries(matrices);
    (a * d - b * c).reshape([slots])
}

/// Log-determinant of each matrix, shape `[S]`.
///
/// NaN for a negative determinant and `-inf` for a singular matrix; callers
/// are expected to catch both with a finiteness check.
pub fn log_determinant<B: Backend>(matrices: Tensor<B, 3>) -> Tensor<B, 1> {
    determinant(matrices).log()
}

/// Inverse of each matrix (the precision matrix for a covariance), shape `[S, 2, 2]`.
pub fn inverse<B: Backend>(matrices: Tensor<B, 3>) -> Tensor<B, 3> {
    let [slots, _, _] = matrices.dims();
    let (a, b, c, d) = entries(matrices);
    let det = a.clone() * d.clone() - b.clone() * c.clone();
    let adjugate = Tensor::cat(vec![d, b.neg(), c.neg(), a], 1);

    (adjugate / det).reshape([slots, 2, 2])
}

/// `vᵀ · M · v` for each slot: vectors `[S, 2]`, matrices `[S, 2, 2]`, output `[S]`.
pub fn quadratic_form<B: Backend>(vectors: Tensor<B, 2>, matrices: Tensor<B, 3>) -> Tensor<B, 1> {
    let [slots, size] = vectors.dims();
    let row: Tensor<B, 3> = vectors.clone().reshape([slots, 1, size]);
    let column: Tensor<B, 3> = vectors.reshape([slots, size, 1]);

    row.matmul(matrices).matmul(column).reshape([slots])
}
