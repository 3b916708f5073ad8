//! # Carvana Metrics
//!
//! Scoring of binary segmentation masks.
//!
//! - [`dice_coefficient`]: Dice coefficient of two flattened masks, used by the
//!   evaluation drivers. The prediction is rounded; two empty masks score `1.0`.
//! - [`smoothed_dice`]: batch-level Dice on tensors with a smoothing constant,
//!   monitored during training.
//! - [`MetricsAggregator`]: batch-averaged loss and Dice over an epoch.
//! - [`ScoreSummary`]: mean and standard deviation of per-example scores.

pub mod aggregator;
pub mod dice;
pub mod error;
pub mod summary;

pub use aggregator::{EpochMetrics, MetricsAggregator};
pub use dice::{dice_coefficient, smoothed_dice, DEFAULT_SMOOTH};
pub use error::{MetricError, MetricResult};
pub use summary::ScoreSummary;

#[cfg(test)]
mod tests {
    pub type TestBackend = burn::backend::NdArray<f32>;
}
