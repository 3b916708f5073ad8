//! U-Net for binary car segmentation.
//!
//! Four encoder stages halve the resolution, a bottleneck convolution works at
//! 1/16 of the input size and four up-sampling stages restore it, each merging
//! the matching encoder features. A 1x1 convolution with a sigmoid produces the
//! per-pixel foreground probability.

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::sigmoid,
};

use super::blocks::{ConvRelu, ConvReluConfig, EncoderBlock, EncoderBlockConfig, UpBlock, UpBlockConfig};
use crate::error::{ModelError, ModelResult};

/// Total down-sampling factor of the encoder.
pub const DOWNSAMPLE_FACTOR: usize = 16;

/// Configuration for the [`UNet`] module.
#[derive(Config, Debug)]
pub struct UNetConfig {
    /// Channels of the input images.
    #[config(default = "3")]
    pub in_channels: usize,
    /// Side length of the square images the network is trained on.
    #[config(default = "128")]
    pub input_size: usize,
}

impl UNetConfig {
    /// Initializes a `UNet` module with default weight initializers.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> UNet<B> {
        UNet {
            enc1: EncoderBlockConfig::new(self.in_channels, 16, 32).init(device),
            enc2: EncoderBlockConfig::new(32, 64, 128).init(device),
            enc3: EncoderBlockConfig::new(128, 256, 512).init(device),
            enc4: EncoderBlockConfig::new(512, 512, 512).init(device),
            bottleneck: ConvReluConfig::new(512, 512).init(device),
            up1: UpBlockConfig::new(512, 512, 512, 512).init(device),
            up2: UpBlockConfig::new(512, 512, 512, 128).init(device),
            up3: UpBlockConfig::new(128, 128, 128, 32).init(device),
            up4: UpBlockConfig::new(32, 32, 128, 32).init(device),
            classifier: Conv2dConfig::new([32, 1], [1, 1])
                .with_padding(PaddingConfig2d::Same)
                .init(device),
            in_channels: self.in_channels,
        }
    }
}

#[derive(Module, Debug)]
pub struct UNet<B: Backend> {
    enc1: EncoderBlock<B>,
    enc2: EncoderBlock<B>,
    enc3: EncoderBlock<B>,
    enc4: EncoderBlock<B>,
    bottleneck: ConvRelu<B>,
    up1: UpBlock<B>,
    up2: UpBlock<B>,
    up3: UpBlock<B>,
    up4: UpBlock<B>,
    classifier: Conv2d<B>,
    in_channels: usize,
}

impl<B: Backend> UNet<B> {
    /// # Shapes
    ///   - input: `[batch_size, in_channels, height, width]`
    ///   - output: `[batch_size, 1, height, width]`, values in `[0, 1]`
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let (skip1, x) = self.enc1.forward(x);
        let (skip2, x) = self.enc2.forward(x);
        let (skip3, x) = self.enc3.forward(x);
        let (skip4, x) = self.enc4.forward(x);

        let x = self.bottleneck.forward(x);

        let x = self.up1.forward(x, skip4);
        let x = self.up2.forward(x, skip3);
        let x = self.up3.forward(x, skip2);
        let x = self.up4.forward(x, skip1);

        sigmoid(self.classifier.forward(x))
    }

    /// Checks that a batch of the given shape can pass through the network.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidInputShape`] when the channel count differs
    /// from the configured one or a spatial side is not a positive multiple of 16.
    pub fn check_input(&self, dims: [usize; 4]) -> ModelResult<()> {
        let [_, channels, height, width] = dims;
        let spatial_ok = |side: usize| side > 0 && side % DOWNSAMPLE_FACTOR == 0;

        if channels != self.in_channels || !spatial_ok(height) || !spatial_ok(width) {
            return Err(ModelError::InvalidInputShape {
                expected: format!(
                    "[n, {}, h, w] with h and w positive multiples of {DOWNSAMPLE_FACTOR}",
                    self.in_channels
                ),
                actual: dims,
            });
        }

        Ok(())
    }

    /// Runs [`Self::check_input`] before [`Self::forward`].
    pub fn try_forward(&self, x: Tensor<B, 4>) -> ModelResult<Tensor<B, 4>> {
        self.check_input(x.dims())?;
        Ok(self.forward(x))
    }
}
