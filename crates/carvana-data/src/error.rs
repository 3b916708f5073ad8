//! Error types for dataset construction and minibatch sampling.

use std::path::PathBuf;

use carvana_util::ImageError;
use thiserror::Error;

/// Error type for dataset operations.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// The image directory does not exist.
    #[error("Image directory not found: {}", path.display())]
    ImageDirectoryNotFound { path: PathBuf },

    /// The mask directory does not exist.
    #[error("Mask directory not found: {}", path.display())]
    MaskDirectoryNotFound { path: PathBuf },

    /// No image in the directory has a matching mask.
    #[error("No valid image/mask pairs found in: {}", path.display())]
    NoValidPairs { path: PathBuf },

    #[error("Cannot sample from an empty dataset")]
    EmptyDataset,

    /// The mask derived from an image's name does not exist.
    #[error("Mask {} for image {} not found", mask.display(), image.display())]
    MaskNotFound { image: PathBuf, mask: PathBuf },

    /// A file name without a usable UTF-8 base name.
    #[error("Invalid file name: {}", path.display())]
    InvalidFileName { path: PathBuf },

    /// An image and its mask differ in size.
    #[error(
        "Image {} is {image_dims:?} but its mask is {mask_dims:?}",
        image.display()
    )]
    DimensionMismatch {
        image: PathBuf,
        image_dims: (usize, usize),
        mask_dims: (usize, usize),
    },

    /// Items of one minibatch differ in size.
    #[error(
        "Image {} is {actual:?}, other images in the batch are {expected:?}",
        image.display()
    )]
    BatchDimensionMismatch {
        image: PathBuf,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Batch size must be positive, got {batch_size}")]
    InvalidBatchSize { batch_size: usize },

    #[error("Train fraction must lie strictly between 0 and 1, got {fraction}")]
    InvalidTrainFraction { fraction: f64 },

    #[error("Index {index} out of range for dataset of {len} items")]
    IndexOutOfRange { index: usize, len: usize },

    /// Decoding or listing image files failed.
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// A specialized `Result` type for dataset operations.
pub type DatasetResult<T> = Result<T, DatasetError>;
