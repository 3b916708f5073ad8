//! Image/mask pairs of a Carvana training directory.
//!
//! The dataset holds paths only; pixels are decoded when an item is loaded, so
//! one dataset can feed any number of samplers.

use std::path::{Path, PathBuf};

use carvana_util::ImageUtils;

use crate::{
    error::{DatasetError, DatasetResult},
    naming::MaskNaming,
};

/// Paths of an image and its mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMaskPair {
    pub image: PathBuf,
    pub mask: PathBuf,
}

/// A decoded image/mask pair.
#[derive(Debug, Clone)]
pub struct SegmentationItem {
    /// RGB pixels in `[0, 1]`, row-major `[height, width, 3]`
    pub image: Vec<f32>,
    /// First mask channel in `[0, 1]`, row-major `[height, width]`
    pub mask: Vec<f32>,
    pub height: usize,
    pub width: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SegmentationDataset {
    pairs: Vec<ImageMaskPair>,
}

impl SegmentationDataset {
    /// Pair every image in `image_dir` with its mask in `mask_dir`.
    ///
    /// Images without a mask are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Fails when either directory is missing or when no image has a mask.
    pub fn new(image_dir: &Path, mask_dir: &Path, naming: &MaskNaming) -> DatasetResult<Self> {
        if !image_dir.is_dir() {
            return Err(DatasetError::ImageDirectoryNotFound {
                path: image_dir.to_path_buf(),
            });
        }
        if !mask_dir.is_dir() {
            return Err(DatasetError::MaskDirectoryNotFound {
                path: mask_dir.to_path_buf(),
            });
        }

        let mut pairs = Vec::new();
        for image in ImageUtils::list_image_files(image_dir)? {
            let mask = mask_dir.join(naming.mask_file_name(&image)?);
            if mask.is_file() {
                pairs.push(ImageMaskPair { image, mask });
            } else {
                tracing::warn!(image = %image.display(), mask = %mask.display(), "No mask found for image");
            }
        }

        if pairs.is_empty() {
            return Err(DatasetError::NoValidPairs {
                path: image_dir.to_path_buf(),
            });
        }

        tracing::info!(
            pairs = pairs.len(),
            dir = %image_dir.display(),
            "Found image/mask pairs"
        );
        Ok(Self { pairs })
    }

    /// Build a dataset from already paired paths.
    pub const fn from_pairs(pairs: Vec<ImageMaskPair>) -> Self {
        Self { pairs }
    }

    pub fn pairs(&self) -> &[ImageMaskPair] {
        &self.pairs
    }

    pub fn into_pairs(self) -> Vec<ImageMaskPair> {
        self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Decode the pair at `index`.
    pub fn load(&self, index: usize) -> DatasetResult<SegmentationItem> {
        let pair = self
            .pairs
            .get(index)
            .ok_or(DatasetError::IndexOutOfRange {
                index,
                len: self.pairs.len(),
            })?;
        Self::load_pair(pair)
    }

    /// Decode an image and its mask, checking that both have the same size.
    pub fn load_pair(pair: &ImageMaskPair) -> DatasetResult<SegmentationItem> {
        if !pair.mask.is_file() {
            return Err(DatasetError::MaskNotFound {
                image: pair.image.clone(),
                mask: pair.mask.clone(),
            });
        }

        let image = ImageUtils::load_rgb(&pair.image)?;
        let mask = ImageUtils::load_mask(&pair.mask)?;

        if image.spatial_dims() != mask.spatial_dims() {
            return Err(DatasetError::DimensionMismatch {
                image: pair.image.clone(),
                image_dims: image.spatial_dims(),
                mask_dims: mask.spatial_dims(),
            });
        }

        Ok(SegmentationItem {
            height: image.height,
            width: image.width,
            image: image.data,
            mask: mask.data,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use image::{Rgb, RgbImage};

    use super::*;

    /// Writes `count` images `car_<i>.jpg` of `size x size` with matching GIF masks.
    pub(crate) fn write_synthetic_pairs(
        image_dir: &Path,
        mask_dir: &Path,
        count: usize,
        size: u32,
    ) {
        std::fs::create_dir_all(image_dir).unwrap();
        std::fs::create_dir_all(mask_dir).unwrap();

        for i in 0..count {
            let image = RgbImage::from_fn(size, size, |x, _| Rgb([(x * 8) as u8, 100, 200]));
            image.save(image_dir.join(format!("car_{i}.jpg"))).unwrap();

            let mask = RgbImage::from_fn(size, size, |x, y| {
                if x < size / 2 && y < size / 2 {
                    Rgb([255, 255, 255])
                } else {
                    Rgb([0, 0, 0])
                }
            });
            mask.save(mask_dir.join(format!("car_{i}_mask.gif"))).unwrap();
        }
    }

    #[test]
    fn pairs_images_with_derived_masks() {
        let dir = tempfile::tempdir().unwrap();
        let (images, masks) = (dir.path().join("train"), dir.path().join("train_masks"));
        write_synthetic_pairs(&images, &masks, 3, 8);

        let dataset = SegmentationDataset::new(&images, &masks, &MaskNaming::default()).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.pairs()[0].mask, masks.join("car_0_mask.gif"));
    }

    #[test]
    fn images_without_masks_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let (images, masks) = (dir.path().join("train"), dir.path().join("train_masks"));
        write_synthetic_pairs(&images, &masks, 3, 8);
        std::fs::remove_file(masks.join("car_1_mask.gif")).unwrap();

        let dataset = SegmentationDataset::new(&images, &masks, &MaskNaming::default()).unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn missing_directories_and_empty_datasets_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let naming = MaskNaming::default();
        let (images, masks) = (dir.path().join("train"), dir.path().join("train_masks"));

        assert!(matches!(
            SegmentationDataset::new(&images, &masks, &naming),
            Err(DatasetError::ImageDirectoryNotFound { .. })
        ));

        std::fs::create_dir_all(&images).unwrap();
        assert!(matches!(
            SegmentationDataset::new(&images, &masks, &naming),
            Err(DatasetError::MaskDirectoryNotFound { .. })
        ));

        std::fs::create_dir_all(&masks).unwrap();
        assert!(matches!(
            SegmentationDataset::new(&images, &masks, &naming),
            Err(DatasetError::NoValidPairs { .. })
        ));
    }

    #[test]
    fn loaded_item_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let (images, masks) = (dir.path().join("train"), dir.path().join("train_masks"));
        write_synthetic_pairs(&images, &masks, 1, 8);

        let dataset = SegmentationDataset::new(&images, &masks, &MaskNaming::default()).unwrap();
        let item = dataset.load(0).unwrap();

        assert_eq!((item.height, item.width), (8, 8));
        assert_eq!(item.image.len(), 8 * 8 * 3);
        assert_eq!(item.mask.len(), 8 * 8);
        assert!(item.image.iter().all(|v| (0.0..=1.0).contains(v)));
        assert_eq!(item.mask[0], 1.0);
        assert_eq!(item.mask[63], 0.0);

        assert!(matches!(
            dataset.load(1),
            Err(DatasetError::IndexOutOfRange { index: 1, len: 1 })
        ));
    }

    #[test]
    fn size_mismatch_between_image_and_mask_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let (images, masks) = (dir.path().join("train"), dir.path().join("train_masks"));
        write_synthetic_pairs(&images, &masks, 1, 8);
        RgbImage::new(4, 4).save(masks.join("car_0_mask.gif")).unwrap();

        let dataset = SegmentationDataset::new(&images, &masks, &MaskNaming::default()).unwrap();
        assert!(matches!(
            dataset.load(0),
            Err(DatasetError::DimensionMismatch { .. })
        ));
    }
}
