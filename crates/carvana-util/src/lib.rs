//! Image and file utilities for the Carvana segmentation pipeline.

pub mod image;
pub mod resize;
pub mod rle;

pub use self::image::{ImageError, ImageResult, ImageUtils, PixelArray};
pub use resize::{resize_directory, resize_file, resize_image, ResizeFailure, ResizeReport};
pub use rle::{rle_decode, rle_encode, RleError, RleResult};
