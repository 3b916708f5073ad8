//! Convolutional building blocks of the U-Net.

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        PaddingConfig2d, Relu,
    },
    prelude::*,
    tensor::{
        module::interpolate,
        ops::{InterpolateMode, InterpolateOptions},
    },
};

/// A same-padded convolution followed by a ReLU.
#[derive(Config, Debug)]
pub struct ConvReluConfig {
    in_channels: usize,
    out_channels: usize,
    #[config(default = "3")]
    kernel_size: usize,
}

impl ConvReluConfig {
    /// Initializes a `ConvRelu` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> ConvRelu<B> {
        let conv = Conv2dConfig::new(
            [self.in_channels, self.out_channels],
            [self.kernel_size, self.kernel_size],
        )
        .with_padding(PaddingConfig2d::Same)
        .init(device);

        ConvRelu {
            conv,
            activation: Relu::new(),
        }
    }
}

#[derive(Module, Debug)]
pub struct ConvRelu<B: Backend> {
    conv: Conv2d<B>,
    activation: Relu,
}

impl<B: Backend> ConvRelu<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.activation.forward(self.conv.forward(x))
    }
}

/// Encoder stage: a 3x3 and a 1x1 convolution, then 2x2 max pooling.
#[derive(Config, Debug)]
pub struct EncoderBlockConfig {
    in_channels: usize,
    mid_channels: usize,
    out_channels: usize,
}

impl EncoderBlockConfig {
    /// Initializes an `EncoderBlock` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> EncoderBlock<B> {
        EncoderBlock {
            conv1: ConvReluConfig::new(self.in_channels, self.mid_channels).init(device),
            conv2: ConvReluConfig::new(self.mid_channels, self.out_channels)
                .with_kernel_size(1)
                .init(device),
            pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
        }
    }
}

#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    conv1: ConvRelu<B>,
    conv2: ConvRelu<B>,
    pool: MaxPool2d,
}

impl<B: Backend> EncoderBlock<B> {
    /// Returns the pre-pooling features, kept for the skip connection, and the
    /// pooled features passed to the next stage.
    ///
    /// # Shapes
    ///   - input: `[batch_size, in_channels, height, width]`
    ///   - skip: `[batch_size, out_channels, height, width]`
    ///   - pooled: `[batch_size, out_channels, height / 2, width / 2]`
    pub fn forward(&self, x: Tensor<B, 4>) -> (Tensor<B, 4>, Tensor<B, 4>) {
        let skip = self.conv2.forward(self.conv1.forward(x));
        let pooled = self.pool.forward(skip.clone());
        (skip, pooled)
    }
}

/// Decoder stage: 2x nearest-neighbour upsampling, concatenation with the skip
/// features, then a 1x1 and a 3x3 convolution.
#[derive(Config, Debug)]
pub struct UpBlockConfig {
    in_channels: usize,
    skip_channels: usize,
    mid_channels: usize,
    out_channels: usize,
}

impl UpBlockConfig {
    /// Initializes an `UpBlock` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> UpBlock<B> {
        UpBlock {
            conv1: ConvReluConfig::new(self.in_channels + self.skip_channels, self.mid_channels)
                .with_kernel_size(1)
                .init(device),
            conv2: ConvReluConfig::new(self.mid_channels, self.out_channels).init(device),
        }
    }
}

#[derive(Module, Debug)]
pub struct UpBlock<B: Backend> {
    conv1: ConvRelu<B>,
    conv2: ConvRelu<B>,
}

impl<B: Backend> UpBlock<B> {
    /// # Shapes
    ///   - x: `[batch_size, in_channels, height, width]`
    ///   - skip: `[batch_size, skip_channels, 2 * height, 2 * width]`
    ///   - output: `[batch_size, out_channels, 2 * height, 2 * width]`
    pub fn forward(&self, x: Tensor<B, 4>, skip: Tensor<B, 4>) -> Tensor<B, 4> {
        let [_, _, height, width] = x.dims();
        let up = interpolate(
            x,
            [height * 2, width * 2],
            InterpolateOptions::new(InterpolateMode::Nearest),
        );
        let x = Tensor::cat(vec![up, skip], 1);
        self.conv2.forward(self.conv1.forward(x))
    }
}
