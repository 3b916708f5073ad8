//! Average-mask baseline.
//!
//! The baseline predicts the same mask for every car: the pixel-wise mean of all
//! training masks, rounded to {0, 1}. Rounding is half-to-even, so a pixel that
//! is foreground in exactly half of the masks becomes background.

use std::path::{Path, PathBuf};

use ndarray::Array2;
use ndarray_npy::{read_npy, write_npy, ReadNpyError, WriteNpyError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BaselineError {
    #[error("No masks were accumulated")]
    Empty,

    #[error("Mask of {actual:?} does not match the first mask of {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Mask data has {actual} values, expected {expected}")]
    DataLengthMismatch { expected: usize, actual: usize },

    #[error("Average mask contains non-binary value {value}")]
    NonBinary { value: f64 },

    #[error("Failed to write average mask to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: WriteNpyError,
    },

    #[error("Failed to read average mask from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: ReadNpyError,
    },
}

pub type BaselineResult<T> = Result<T, BaselineError>;

/// Running pixel-wise sum of masks sharing one shape.
#[derive(Debug, Clone, Default)]
pub struct AverageMaskBuilder {
    sum: Vec<f64>,
    dims: Option<(usize, usize)>,
    count: usize,
}

impl AverageMaskBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a row-major `height x width` mask with values in `[0, 1]`.
    ///
    /// The first mask fixes the shape of the average.
    pub fn add(&mut self, mask: &[f32], height: usize, width: usize) -> BaselineResult<()> {
        if mask.len() != height * width {
            return Err(BaselineError::DataLengthMismatch {
                expected: height * width,
                actual: mask.len(),
            });
        }

        match self.dims {
            Some(expected) if expected != (height, width) => {
                return Err(BaselineError::ShapeMismatch {
                    expected,
                    actual: (height, width),
                });
            }
            Some(_) => {}
            None => {
                self.dims = Some((height, width));
                self.sum = vec![0.0; height * width];
            }
        }

        for (acc, &value) in self.sum.iter_mut().zip(mask) {
            *acc += f64::from(value);
        }
        self.count += 1;

        Ok(())
    }

    /// Number of masks added so far.
    pub const fn count(&self) -> usize {
        self.count
    }

    /// The unrounded pixel-wise mean.
    pub fn mean(&self) -> BaselineResult<Array2<f64>> {
        let (height, width) = self.dims.ok_or(BaselineError::Empty)?;
        let count = self.count as f64;

        Ok(Array2::from_shape_fn((height, width), |(row, col)| {
            self.sum[row * width + col] / count
        }))
    }

    /// The mean rounded to {0, 1}.
    pub fn finish(&self) -> BaselineResult<AverageMask> {
        let rounded = self.mean()?.mapv(f64::round_ties_even);
        AverageMask::from_array(rounded)
    }
}

/// A binary mask used as the prediction for every example.
#[derive(Debug, Clone, PartialEq)]
pub struct AverageMask {
    data: Array2<f64>,
}

impl AverageMask {
    /// Wraps an array after checking that every value is 0 or 1.
    pub fn from_array(data: Array2<f64>) -> BaselineResult<Self> {
        if let Some(&value) = data.iter().find(|&&v| v != 0.0 && v != 1.0) {
            return Err(BaselineError::NonBinary { value });
        }
        Ok(Self { data })
    }

    /// `(height, width)` of the mask.
    pub fn dims(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub const fn as_array(&self) -> &Array2<f64> {
        &self.data
    }

    /// Row-major pixel values, ready for scoring against a loaded mask.
    pub fn to_f32_vec(&self) -> Vec<f32> {
        self.data.iter().map(|&v| v as f32).collect()
    }

    /// Number of foreground pixels.
    pub fn foreground_pixels(&self) -> usize {
        self.data.iter().filter(|&&v| v == 1.0).count()
    }

    pub fn save(&self, path: &Path) -> BaselineResult<()> {
        write_npy(path, &self.data).map_err(|source| BaselineError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), dims = ?self.dims(), "Saved average mask");
        Ok(())
    }

    pub fn load(path: &Path) -> BaselineResult<Self> {
        let data: Array2<f64> = read_npy(path).map_err(|source| BaselineError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_array(data)
    }
}
