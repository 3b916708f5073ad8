//! Dice similarity coefficient between predicted and ground-truth masks.
//!
//! `dice = 2 * |P ∩ T| / (|P| + |T|)`, where the intersection is the sum of the
//! elementwise product and `|.|` is the sum of a mask.

use burn::tensor::{backend::Backend, Tensor};

use crate::error::{MetricError, MetricResult};

/// Smoothing constant used by the training-time metric.
pub const DEFAULT_SMOOTH: f64 = 1e-5;

/// Dice coefficient of two flattened masks.
///
/// Predicted values are rounded to the nearest integer (ties to even) before the
/// comparison; ground-truth values are used as they are. When both masks are
/// empty the ratio is 0/0, which is reported as a perfect score of `1.0`.
///
/// # Errors
///
/// Returns [`MetricError::ShapeMismatch`] when the masks differ in length.
pub fn dice_coefficient(predicted: &[f32], truth: &[f32]) -> MetricResult<f64> {
    if predicted.len() != truth.len() {
        return Err(MetricError::ShapeMismatch {
            predicted: predicted.len(),
            truth: truth.len(),
        });
    }

    let mut intersection = 0.0_f64;
    let mut predicted_sum = 0.0_f64;
    let mut truth_sum = 0.0_f64;
    for (&p, &t) in predicted.iter().zip(truth) {
        let p = f64::from(p.round_ties_even());
        let t = f64::from(t);
        intersection += p * t;
        predicted_sum += p;
        truth_sum += t;
    }

    let denominator = predicted_sum + truth_sum;
    if denominator == 0.0 {
        return Ok(1.0);
    }

    Ok(2.0 * intersection / denominator)
}

/// Smoothed Dice coefficient over a whole batch, as monitored during training.
///
/// Both tensors are rounded, flattened and compared as one mask:
/// `(2 * |P ∩ T| + smooth) / (|P| + |T| + smooth)`.
///
/// # Shapes
///   - predicted: `[batch_size, 1, height, width]`
///   - truth: `[batch_size, 1, height, width]`
///   - output: `[1]`
pub fn smoothed_dice<B: Backend>(
    predicted: Tensor<B, 4>,
    truth: Tensor<B, 4>,
    smooth: f64,
) -> Tensor<B, 1> {
    let predicted = predicted.round().flatten::<1>(0, 3);
    let truth = truth.round().flatten::<1>(0, 3);

    let intersection = (predicted.clone() * truth.clone()).sum();
    let total = predicted.sum() + truth.sum();

    intersection.mul_scalar(2.0).add_scalar(smooth) / total.add_scalar(smooth)
}
