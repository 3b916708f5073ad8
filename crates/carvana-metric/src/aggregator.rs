//! Metrics aggregator for batch processing.
//!
//! Accumulates the loss and the smoothed Dice coefficient of each batch and reports
//! their batch-averaged values, the way an epoch summary is computed.

use std::marker::PhantomData;

use burn::tensor::{backend::Backend, ElementConversion, Tensor};

use crate::dice::smoothed_dice;

/// Batch-averaged metrics of one pass over a split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochMetrics {
    pub loss: f64,
    pub dice: f64,
    pub batches: usize,
}

/// Metrics aggregator for batch processing.
#[derive(Debug, Clone)]
pub struct MetricsAggregator<B: Backend> {
    loss_sum: f64,
    dice_sum: f64,
    count: usize,
    smooth: f64,
    _phantom: PhantomData<B>,
}

impl<B: Backend> MetricsAggregator<B> {
    /// Create a new metrics aggregator using the given Dice smoothing constant.
    pub const fn new(smooth: f64) -> Self {
        Self {
            loss_sum: 0.0,
            dice_sum: 0.0,
            count: 0,
            smooth,
            _phantom: PhantomData,
        }
    }

    /// Add a batch: its scalar loss plus the predictions and targets it was computed from.
    pub fn update(&mut self, loss: f64, predictions: Tensor<B, 4>, targets: Tensor<B, 4>) {
        let dice = smoothed_dice(predictions, targets, self.smooth)
            .into_scalar()
            .elem::<f64>();

        self.loss_sum += loss;
        self.dice_sum += dice;
        self.count += 1;

        tracing::trace!(loss, dice, batch = self.count, "Accumulated batch metrics");
    }

    /// Get the average metrics, or `None` before the first batch.
    pub fn averages(&self) -> Option<EpochMetrics> {
        if self.count == 0 {
            return None;
        }

        let count = self.count as f64;
        Some(EpochMetrics {
            loss: self.loss_sum / count,
            dice: self.dice_sum / count,
            batches: self.count,
        })
    }

    /// Reset the aggregator.
    pub fn reset(&mut self) {
        self.loss_sum = 0.0;
        self.dice_sum = 0.0;
        self.count = 0;
    }
}

impl<B: Backend> Default for MetricsAggregator<B> {
    fn default() -> Self {
        Self::new(crate::dice::DEFAULT_SMOOTH)
    }
}
