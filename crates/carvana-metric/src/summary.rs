use std::fmt;

use derive_new::new;

use crate::error::{MetricError, MetricResult};

/// Mean and population standard deviation of per-example scores.
#[derive(new, Debug, Clone, Copy, PartialEq)]
pub struct ScoreSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
}

impl ScoreSummary {
    /// Summarize a set of scores.
    ///
    /// The standard deviation divides by `n`, not `n - 1`.
    ///
    /// # Errors
    ///
    /// Returns [`MetricError::EmptyScores`] for an empty slice instead of reporting NaN.
    pub fn from_scores(scores: &[f64]) -> MetricResult<Self> {
        if scores.is_empty() {
            return Err(MetricError::EmptyScores);
        }

        let count = scores.len();
        let mean = scores.iter().sum::<f64>() / count as f64;
        let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / count as f64;

        Ok(Self::new(count, mean, variance.sqrt()))
    }
}

impl fmt::Display for ScoreSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mean {:.5}, sd {:.5} over {} examples",
            self.mean, self.std, self.count
        )
    }
}
