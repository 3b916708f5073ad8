//! Unbounded random minibatch sampling.
//!
//! Every batch draws `batch_size` indices uniformly with replacement, so one item
//! can appear more than once in a batch and some items may never be drawn in an
//! epoch. Consumers bound the iterator with `take(steps)`.

use burn::tensor::{backend::Backend, Tensor, TensorData};
use carvana_model::SegmentationBatch;
use rand::Rng;

use crate::{
    dataset::SegmentationDataset,
    error::{DatasetError, DatasetResult},
};

/// A sampled minibatch in channel-last layout.
#[derive(Debug, Clone)]
pub struct SampledBatch {
    /// `[batch_size, height, width, 3]`, row-major
    pub images: Vec<f32>,
    /// `[batch_size, height, width, 1]`, row-major
    pub masks: Vec<f32>,
    /// Dataset indices the batch was drawn from.
    pub indices: Vec<usize>,
    pub height: usize,
    pub width: usize,
}

impl SampledBatch {
    pub fn batch_size(&self) -> usize {
        self.indices.len()
    }

    pub fn image_shape(&self) -> [usize; 4] {
        [self.batch_size(), self.height, self.width, 3]
    }

    pub fn mask_shape(&self) -> [usize; 4] {
        [self.batch_size(), self.height, self.width, 1]
    }

    /// Move the batch to `device` as channel-first tensors.
    pub fn into_batch<B: Backend>(self, device: &B::Device) -> SegmentationBatch<B> {
        let image_shape = self.image_shape();
        let mask_shape = self.mask_shape();

        let images = Tensor::<B, 4>::from_data(TensorData::new(self.images, image_shape), device)
            .permute([0, 3, 1, 2]);
        let masks = Tensor::<B, 4>::from_data(TensorData::new(self.masks, mask_shape), device)
            .permute([0, 3, 1, 2]);

        SegmentationBatch::new(images, masks)
    }
}

/// An infinite iterator of random minibatches over a dataset.
#[derive(Debug, Clone)]
pub struct MinibatchSampler<R> {
    dataset: SegmentationDataset,
    batch_size: usize,
    rng: R,
}

impl<R: Rng> MinibatchSampler<R> {
    /// # Errors
    ///
    /// Fails for an empty dataset or a zero batch size.
    pub fn new(dataset: SegmentationDataset, batch_size: usize, rng: R) -> DatasetResult<Self> {
        if batch_size == 0 {
            return Err(DatasetError::InvalidBatchSize { batch_size });
        }
        if dataset.is_empty() {
            return Err(DatasetError::EmptyDataset);
        }

        Ok(Self {
            dataset,
            batch_size,
            rng,
        })
    }

    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub const fn dataset(&self) -> &SegmentationDataset {
        &self.dataset
    }

    /// Full batches that fit in the dataset, the step budget of one epoch.
    pub fn steps_per_epoch(&self) -> usize {
        self.dataset.len() / self.batch_size
    }

    /// Draw and decode the next batch.
    pub fn sample(&mut self) -> DatasetResult<SampledBatch> {
        let indices: Vec<usize> = (0..self.batch_size)
            .map(|_| self.rng.random_range(0..self.dataset.len()))
            .collect();

        let mut images = Vec::new();
        let mut masks = Vec::new();
        let mut dims = None;

        for &index in &indices {
            let item = self.dataset.load(index)?;
            let item_dims = (item.height, item.width);

            match dims {
                None => {
                    dims = Some(item_dims);
                    images.reserve(item.image.len() * self.batch_size);
                    masks.reserve(item.mask.len() * self.batch_size);
                }
                Some(expected) if expected != item_dims => {
                    return Err(DatasetError::BatchDimensionMismatch {
                        image: self.dataset.pairs()[index].image.clone(),
                        expected,
                        actual: item_dims,
                    });
                }
                Some(_) => {}
            }

            images.extend(item.image);
            masks.extend(item.mask);
        }

        let (height, width) = dims.unwrap_or_default();
        tracing::trace!(?indices, height, width, "Sampled minibatch");

        Ok(SampledBatch {
            images,
            masks,
            indices,
            height,
            width,
        })
    }
}

impl<R: Rng> Iterator for MinibatchSampler<R> {
    type Item = DatasetResult<SampledBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.sample())
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{
        dataset::{tests::write_synthetic_pairs, ImageMaskPair},
        naming::MaskNaming,
    };

    type TestBackend = burn::backend::NdArray<f32>;

    fn synthetic_dataset(dir: &std::path::Path, count: usize, size: u32) -> SegmentationDataset {
        let (images, masks) = (dir.join("train"), dir.join("train_masks"));
        write_synthetic_pairs(&images, &masks, count, size);
        SegmentationDataset::new(&images, &masks, &MaskNaming::default()).unwrap()
    }

    #[test]
    fn batches_have_channel_last_shapes_forever() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = synthetic_dataset(dir.path(), 10, 8);
        let sampler = MinibatchSampler::new(dataset, 4, StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(sampler.steps_per_epoch(), 2);

        for batch in sampler.take(5) {
            let batch = batch.unwrap();
            assert_eq!(batch.image_shape(), [4, 8, 8, 3]);
            assert_eq!(batch.mask_shape(), [4, 8, 8, 1]);
            assert_eq!(batch.images.len(), 4 * 8 * 8 * 3);
            assert_eq!(batch.masks.len(), 4 * 8 * 8);
            assert!(batch.indices.iter().all(|&i| i < 10));
        }
    }

    #[test]
    fn sampling_is_reproducible_for_a_seed() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = synthetic_dataset(dir.path(), 6, 4);

        let draw = |seed| {
            MinibatchSampler::new(dataset.clone(), 3, StdRng::seed_from_u64(seed))
                .unwrap()
                .take(4)
                .map(|batch| batch.unwrap().indices)
                .collect::<Vec<_>>()
        };

        assert_eq!(draw(11), draw(11));
    }

    #[test]
    fn batch_may_exceed_dataset_size() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = synthetic_dataset(dir.path(), 2, 4);
        let mut sampler = MinibatchSampler::new(dataset, 5, StdRng::seed_from_u64(0)).unwrap();

        assert_eq!(sampler.steps_per_epoch(), 0);
        assert_eq!(sampler.sample().unwrap().batch_size(), 5);
    }

    #[test]
    fn invalid_construction_is_rejected() {
        let dataset = SegmentationDataset::default();
        assert!(matches!(
            MinibatchSampler::new(dataset.clone(), 0, StdRng::seed_from_u64(0)),
            Err(DatasetError::InvalidBatchSize { batch_size: 0 })
        ));
        assert!(matches!(
            MinibatchSampler::new(dataset, 4, StdRng::seed_from_u64(0)),
            Err(DatasetError::EmptyDataset)
        ));
    }

    #[test]
    fn missing_files_surface_as_errors() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = SegmentationDataset::from_pairs(vec![ImageMaskPair {
            image: dir.path().join("car.jpg"),
            mask: dir.path().join("car_mask.gif"),
        }]);
        let mut sampler = MinibatchSampler::new(dataset, 2, StdRng::seed_from_u64(0)).unwrap();

        assert!(matches!(
            sampler.next(),
            Some(Err(DatasetError::MaskNotFound { .. }))
        ));
    }

    #[test]
    fn batch_converts_to_channel_first_tensors() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = synthetic_dataset(dir.path(), 3, 8);
        let mut sampler = MinibatchSampler::new(dataset, 2, StdRng::seed_from_u64(5)).unwrap();

        let batch = sampler.sample().unwrap().into_batch::<TestBackend>(&Default::default());
        assert_eq!(batch.images.dims(), [2, 3, 8, 8]);
        assert_eq!(batch.masks.dims(), [2, 1, 8, 8]);

        // top-left quadrant of every synthetic mask is foreground
        let corner = batch.masks.slice([0..2, 0..1, 0..1, 0..1]).sum().into_scalar();
        assert_eq!(corner, 2.0);
    }
}
