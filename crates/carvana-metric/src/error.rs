use thiserror::Error;

/// Errors raised while scoring masks.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MetricError {
    /// Predicted and ground-truth masks hold a different number of pixels.
    #[error("mask shape mismatch: predicted has {predicted} pixels, truth has {truth}")]
    ShapeMismatch { predicted: usize, truth: usize },

    /// A summary was requested over zero examples.
    #[error("no scores to summarize: the evaluated set was empty")]
    EmptyScores,
}

pub type MetricResult<T> = Result<T, MetricError>;
