//! Data loading for Carvana segmentation training.
//!
//! Images are paired with masks by name, split into training and validation
//! subsets, and fed to the network through an unbounded random sampler.

pub mod batcher;
pub mod dataset;
mod error;
pub mod naming;
pub mod sampler;
pub mod split;

pub use batcher::SegmentationBatcher;
pub use dataset::{ImageMaskPair, SegmentationDataset, SegmentationItem};
pub use error::{DatasetError, DatasetResult};
pub use naming::MaskNaming;
pub use sampler::{MinibatchSampler, SampledBatch};
pub use split::split_train_validation;
