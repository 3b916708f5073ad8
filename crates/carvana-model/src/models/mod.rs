pub mod blocks;
pub mod unet;

pub use blocks::{
    ConvRelu, ConvReluConfig, EncoderBlock, EncoderBlockConfig, UpBlock, UpBlockConfig,
};
pub use unet::{UNet, UNetConfig, UNetRecord, DOWNSAMPLE_FACTOR};
