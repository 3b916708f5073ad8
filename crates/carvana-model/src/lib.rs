//! U-Net segmentation network and average-mask baseline for the Carvana masking challenge.
//!
//! ## Modules
//!
//! - `models`: convolutional blocks and the [`UNet`] built from them.
//! - `checkpoint`: saving and loading network weights.
//! - `losses`: binary cross-entropy on probabilities.
//! - `baseline`: the pixel-wise average of the training masks, stored as `.npy`.
//! - `training`: batch and step output types consumed by the training driver.

pub mod baseline;
pub mod checkpoint;
mod error;
pub mod losses;
pub mod models;
pub mod training;

#[doc(inline)]
pub use baseline::{AverageMask, AverageMaskBuilder, BaselineError, BaselineResult};
#[doc(inline)]
pub use checkpoint::CheckpointRecorder;
#[doc(inline)]
pub use error::{ModelError, ModelResult};
#[doc(inline)]
pub use losses::{BceLoss, BceLossConfig};
#[doc(inline)]
pub use models::{UNet, UNetConfig, UNetRecord};
#[doc(inline)]
pub use training::{SegmentationBatch, SegmentationOutput};

#[cfg(test)]
mod tests {
    use burn::backend::{Autodiff, NdArray};

    pub type TestBackend = NdArray<f32>;

    pub type TestAutodiffBackend = Autodiff<TestBackend>;
}
