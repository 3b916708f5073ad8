use std::path::PathBuf;

use thiserror::Error;

/// The error type for network operations.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The input tensor cannot be processed by the network.
    #[error("Invalid input tensor shape: expected {expected}, got {actual:?}")]
    InvalidInputShape {
        /// Description of the accepted shapes.
        expected: String,
        /// The actual tensor shape.
        actual: [usize; 4],
    },

    /// Loading a saved network record failed.
    #[error("Failed to load weights from {}: {reason}", path.display())]
    WeightLoadingFailed { path: PathBuf, reason: String },

    /// Saving the network record failed.
    #[error("Failed to save weights to {}: {reason}", path.display())]
    WeightSavingFailed { path: PathBuf, reason: String },
}

/// A specialized `Result` type for network operations.
pub type ModelResult<T> = Result<T, ModelError>;
