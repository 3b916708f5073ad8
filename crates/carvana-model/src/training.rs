//! Batch and step output types shared by the data loader and the training driver.

use burn::{prelude::*, tensor::backend::Backend};

use crate::{losses::BceLoss, models::UNet};

/// A batch of channel-first images and masks.
#[derive(Debug, Clone)]
pub struct SegmentationBatch<B: Backend> {
    /// `[batch_size, 3, height, width]`, values in `[0, 1]`
    pub images: Tensor<B, 4>,
    /// `[batch_size, 1, height, width]`, values in `[0, 1]`
    pub masks: Tensor<B, 4>,
}

impl<B: Backend> SegmentationBatch<B> {
    pub const fn new(images: Tensor<B, 4>, masks: Tensor<B, 4>) -> Self {
        Self { images, masks }
    }

    pub fn batch_size(&self) -> usize {
        self.images.dims()[0]
    }
}

/// Loss, predictions and targets of one training or validation step.
#[derive(Debug, Clone)]
pub struct SegmentationOutput<B: Backend> {
    pub loss: Tensor<B, 1>,
    pub output: Tensor<B, 4>,
    pub targets: Tensor<B, 4>,
}

impl<B: Backend> SegmentationOutput<B> {
    pub const fn new(loss: Tensor<B, 1>, output: Tensor<B, 4>, targets: Tensor<B, 4>) -> Self {
        Self {
            loss,
            output,
            targets,
        }
    }
}

impl<B: Backend> UNet<B> {
    /// Predicts the batch and scores it with binary cross-entropy.
    pub fn forward_segmentation(
        &self,
        batch: SegmentationBatch<B>,
        loss: &BceLoss<B>,
    ) -> SegmentationOutput<B> {
        let output = self.forward(batch.images);
        let loss = loss.forward(output.clone(), batch.masks.clone());

        SegmentationOutput::new(loss, output, batch.masks)
    }
}

#[cfg(test)]
mod tests {
    use burn::{
        optim::{AdamConfig, GradientsParams, Optimizer},
        tensor::Distribution,
    };

    use super::*;
    use crate::{
        losses::BceLossConfig,
        models::UNetConfig,
        tests::{TestAutodiffBackend, TestBackend},
    };

    #[test]
    fn segmentation_step_keeps_targets_and_shapes() {
        let device = Default::default();
        let model = UNetConfig::new().init::<TestBackend>(&device);
        let loss = BceLossConfig::new().init();

        let images = Tensor::<TestBackend, 4>::random([2, 3, 16, 16], Distribution::Default, &device);
        let masks = Tensor::<TestBackend, 4>::ones([2, 1, 16, 16], &device);
        let batch = SegmentationBatch::new(images, masks);
        assert_eq!(batch.batch_size(), 2);

        let step = model.forward_segmentation(batch, &loss);
        assert_eq!(step.output.dims(), [2, 1, 16, 16]);
        assert_eq!(step.targets.dims(), [2, 1, 16, 16]);
        assert_eq!(step.loss.dims(), [1]);
        assert!(step.loss.into_scalar() > 0.0);
    }

    #[test]
    fn optimizer_step_updates_predictions() {
        let device = Default::default();
        let model = UNetConfig::new().init::<TestAutodiffBackend>(&device);
        let loss = BceLossConfig::new().init();
        let mut optim = AdamConfig::new().init();

        let images =
            Tensor::<TestAutodiffBackend, 4>::random([1, 3, 16, 16], Distribution::Default, &device);
        let masks = Tensor::<TestAutodiffBackend, 4>::ones([1, 1, 16, 16], &device);
        let batch = SegmentationBatch::new(images.clone(), masks);

        let before = model.forward(images.clone()).into_data();
        let step = model.forward_segmentation(batch, &loss);
        let grads = GradientsParams::from_grads(step.loss.backward(), &model);
        let model = optim.step(1e-3, model, grads);
        let after = model.forward(images).into_data();

        assert_ne!(before, after);
    }
}
