//! Carvana image masking pipeline.
//!
//! This crate ties the workspace together: it selects the tensor backend,
//! holds the pipeline configuration and provides one driver per step
//! (resizing, average-mask baseline, U-Net training, evaluation and submission).

pub mod backend;
pub mod baseline;
pub mod config;
pub mod evaluation;
mod progress;
pub mod resize;
pub mod submission;
pub mod training;

#[doc(inline)]
pub use carvana_data as data;
#[doc(inline)]
pub use carvana_metric as metric;
#[doc(inline)]
pub use carvana_model as model;
#[doc(inline)]
pub use carvana_util as util;
#[doc(inline)]
pub use config::PipelineConfig;
