use std::marker::PhantomData;

use burn::{
    data::dataloader::batcher::Batcher,
    tensor::{backend::Backend, Tensor, TensorData},
};
use carvana_model::SegmentationBatch;

use crate::dataset::SegmentationItem;

/// Stacks decoded items into channel-first tensors on a device.
#[derive(Clone, Default)]
pub struct SegmentationBatcher<B: Backend> {
    _phantom: PhantomData<B>,
}

impl<B: Backend> SegmentationBatcher<B> {
    pub const fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<B: Backend> Batcher<B, SegmentationItem, SegmentationBatch<B>> for SegmentationBatcher<B> {
    fn batch(&self, items: Vec<SegmentationItem>, device: &B::Device) -> SegmentationBatch<B> {
        let mut images = Vec::with_capacity(items.len());
        let mut masks = Vec::with_capacity(items.len());

        for item in items {
            let image = Tensor::<B, 3>::from_data(
                TensorData::new(item.image, [item.height, item.width, 3]),
                device,
            )
            .permute([2, 0, 1]);

            let mask = Tensor::<B, 2>::from_data(
                TensorData::new(item.mask, [item.height, item.width]),
                device,
            )
            .unsqueeze::<3>();

            images.push(image);
            masks.push(mask);
        }

        SegmentationBatch::new(Tensor::stack(images, 0), Tensor::stack(masks, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray<f32>;

    #[test]
    fn batcher_creates_channel_first_batch() {
        let device = Default::default();
        let batcher = SegmentationBatcher::<TestBackend>::new();
        let (height, width) = (4, 6);

        let items = vec![
            SegmentationItem {
                image: vec![0.5; height * width * 3],
                mask: vec![1.0; height * width],
                height,
                width,
            },
            SegmentationItem {
                image: vec![0.25; height * width * 3],
                mask: vec![0.0; height * width],
                height,
                width,
            },
        ];

        let batch = batcher.batch(items, &device);
        assert_eq!(batch.images.dims(), [2, 3, 4, 6]);
        assert_eq!(batch.masks.dims(), [2, 1, 4, 6]);
        assert_eq!(batch.masks.sum().into_scalar(), 24.0);
    }
}
