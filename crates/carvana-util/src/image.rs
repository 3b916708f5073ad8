//! Image loading utilities shared by the dataset, baseline and evaluation code.
//!
//! Every loader returns pixels normalized to `[0, 1]` (the 8-bit value divided by 255)
//! in row-major `HWC` order.

use std::path::{Path, PathBuf};

use burn::tensor::{backend::Backend, DType, Tensor, TensorData};
use image::{DynamicImage, ImageFormat};
use thiserror::Error;
use walkdir::WalkDir;

/// ImageError covers all possible errors in image processing operations
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to open image at '{}': {source}", path.display())]
    ImageLoadError {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to save image to '{}': {source}", path.display())]
    ImageSaveError {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("no decoder available for '{}'", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("failed to read directory '{}': {source}", path.display())]
    DirectoryReadFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to create directory '{}': {source}", path.display())]
    DirectoryCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to convert tensor to data: {reason}")]
    TensorConversionError { reason: String },

    #[error("batch size mismatch: expected 1, got {actual}")]
    InvalidBatchSize { actual: usize },

    #[error("data length mismatch: expected {expected}, got {actual}")]
    DataLengthMismatch { expected: usize, actual: usize },
}

/// Result type alias for ImageError
pub type ImageResult<T> = Result<T, ImageError>;

/// A decoded image as normalized floats in row-major `HWC` order.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelArray {
    pub data: Vec<f32>,
    pub height: usize,
    pub width: usize,
    pub channels: usize,
}

impl PixelArray {
    /// Wraps raw pixel data, checking that its length matches the shape.
    pub fn new(data: Vec<f32>, height: usize, width: usize, channels: usize) -> ImageResult<Self> {
        let expected = height * width * channels;
        if data.len() != expected {
            return Err(ImageError::DataLengthMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            data,
            height,
            width,
            channels,
        })
    }

    /// Spatial size as `(height, width)`.
    pub const fn spatial_dims(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}

/// Image processing utilities
pub struct ImageUtils;

impl ImageUtils {
    /// Decode an image file.
    pub fn open<P: AsRef<Path>>(path: P) -> ImageResult<DynamicImage> {
        image::open(&path).map_err(|source| ImageError::ImageLoadError {
            path: path.as_ref().to_path_buf(),
            source,
        })
    }

    /// Load an image as three normalized channels.
    pub fn load_rgb<P: AsRef<Path>>(path: P) -> ImageResult<PixelArray> {
        let img = Self::open(path)?;
        Ok(Self::rgb_pixels(img))
    }

    /// Load a mask file, keeping only its first channel.
    ///
    /// Masks are stored as regular (often paletted GIF) images; the first colour
    /// channel carries the foreground indicator.
    pub fn load_mask<P: AsRef<Path>>(path: P) -> ImageResult<PixelArray> {
        let img = Self::open(path)?;
        Ok(Self::first_channel(img))
    }

    /// Convert a decoded image into normalized RGB pixels.
    pub fn rgb_pixels(img: DynamicImage) -> PixelArray {
        let rgb = img.into_rgb32f();
        let (width, height) = rgb.dimensions();

        PixelArray {
            data: rgb.into_raw(),
            height: height as usize,
            width: width as usize,
            channels: 3,
        }
    }

    /// Extract the first channel of a decoded image, normalized to `[0, 1]`.
    pub fn first_channel(img: DynamicImage) -> PixelArray {
        let PixelArray {
            data,
            height,
            width,
            ..
        } = Self::rgb_pixels(img);

        PixelArray {
            data: data.into_iter().step_by(3).collect(),
            height,
            width,
            channels: 1,
        }
    }

    /// Whether the file extension belongs to a format the `image` crate can decode.
    pub fn is_supported_image_format<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .and_then(ImageFormat::from_extension)
            .is_some_and(|format| format.reading_enabled())
    }

    /// List every regular file directly inside `dir`, sorted by file name.
    pub fn list_files<P: AsRef<Path>>(dir: P) -> ImageResult<Vec<PathBuf>> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(ImageError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|source| ImageError::DirectoryReadFailed {
                path: dir.to_path_buf(),
                source,
            })?;

            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// List the decodable image files directly inside `dir`, sorted by file name.
    pub fn list_image_files<P: AsRef<Path>>(dir: P) -> ImageResult<Vec<PathBuf>> {
        let files = Self::list_files(dir)?
            .into_iter()
            .filter(|path| {
                let supported = Self::is_supported_image_format(path);
                if !supported {
                    tracing::debug!(path = %path.display(), "skipping non-image file");
                }
                supported
            })
            .collect();

        Ok(files)
    }

    /// Convert pixels into a tensor of shape `[1, channels, height, width]`.
    pub fn pixels_to_tensor<B: Backend>(pixels: &PixelArray, device: &B::Device) -> Tensor<B, 4> {
        let data = TensorData::new(
            pixels.data.clone(),
            [pixels.height, pixels.width, pixels.channels],
        );

        Tensor::<B, 3>::from_data(data, device)
            .permute([2, 0, 1])
            .unsqueeze::<4>()
    }

    /// Convert a tensor of shape `[1, channels, height, width]` back into pixels.
    pub fn tensor_to_pixels<B: Backend>(tensor: Tensor<B, 4>) -> ImageResult<PixelArray> {
        let [batch, channels, height, width] = tensor.dims();
        if batch != 1 {
            return Err(ImageError::InvalidBatchSize { actual: batch });
        }

        let data = tensor
            .squeeze::<3>(0)
            .permute([1, 2, 0])
            .into_data()
            .convert_dtype(DType::F32)
            .to_vec::<f32>()
            .map_err(|e| ImageError::TensorConversionError {
                reason: format!("{e:?}"),
            })?;

        PixelArray::new(data, height, width, channels)
    }
}
