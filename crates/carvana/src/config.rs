//! Pipeline configuration.
//!
//! Every path and constant of the pipeline lives here. The defaults reproduce
//! the standard Carvana layout; a JSON file may override any subset of fields.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use carvana_data::MaskNaming;
use carvana_metric::DEFAULT_SMOOTH;
use serde::{Deserialize, Serialize};

/// An image directory and its mask directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetPaths {
    pub images: PathBuf,
    pub masks: PathBuf,
}

impl DatasetPaths {
    pub fn new(images: impl Into<PathBuf>, masks: impl Into<PathBuf>) -> Self {
        Self {
            images: images.into(),
            masks: masks.into(),
        }
    }

    /// Full-resolution Kaggle training data.
    pub fn full_resolution() -> Self {
        Self::new("data/train", "data/train_masks")
    }

    /// The downsampled copy written by the resize step.
    pub fn small() -> Self {
        Self::new("small_dataset/train", "small_dataset/train_masks")
    }
}

/// Configuration for downsampling the training data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeConfig {
    pub source: DatasetPaths,
    pub target: DatasetPaths,
    pub width: u32,
    pub height: u32,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            source: DatasetPaths::full_resolution(),
            target: DatasetPaths::small(),
            width: 128,
            height: 128,
        }
    }
}

/// One set of masks averaged into a baseline artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineSet {
    /// Label used in reports, e.g. "smaller".
    pub name: String,
    pub masks: PathBuf,
    /// `.npy` file holding the rounded average mask.
    pub artifact: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineConfig {
    pub sets: Vec<BaselineSet>,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            sets: vec![
                BaselineSet {
                    name: "smaller".to_string(),
                    masks: DatasetPaths::small().masks,
                    artifact: PathBuf::from("models/avg_mask.npy"),
                },
                BaselineSet {
                    name: "big".to_string(),
                    masks: DatasetPaths::full_resolution().masks,
                    artifact: PathBuf::from("models/avg_mask_big.npy"),
                },
            ],
        }
    }
}

/// Configuration for training the U-Net.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub data: DatasetPaths,
    pub num_epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    /// Share of the pairs used for training; the rest is validation.
    pub train_fraction: f64,
    /// Seeds the split, both samplers and weight initialization.
    pub seed: u64,
    /// Smoothing constant of the monitored Dice coefficient.
    pub smooth: f64,
    /// Best-so-far weights, overwritten whenever validation Dice improves.
    pub checkpoint: PathBuf,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            data: DatasetPaths::small(),
            num_epochs: 10,
            batch_size: 32,
            learning_rate: 1e-4,
            train_fraction: 0.8,
            seed: 42,
            smooth: DEFAULT_SMOOTH,
            checkpoint: PathBuf::from("models/unet_128_best.mpk"),
        }
    }
}

/// Configuration for scoring the trained network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub data: DatasetPaths,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            data: DatasetPaths::small(),
        }
    }
}

/// Configuration for the Kaggle submission file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Directory of full-resolution test images.
    pub images: PathBuf,
    pub output: PathBuf,
    /// Probability at or above which a pixel is foreground.
    pub threshold: f32,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            images: PathBuf::from("data/test"),
            output: PathBuf::from("submission.csv"),
            threshold: 0.5,
        }
    }
}

/// Configuration of the whole pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub mask_naming: MaskNaming,
    pub resize: ResizeConfig,
    pub baseline: BaselineConfig,
    pub training: TrainingConfig,
    pub evaluation: EvaluationConfig,
    pub submission: SubmissionConfig,
}

impl PipelineConfig {
    /// Load a JSON configuration; missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.input_size()?;
        Ok(config)
    }

    /// Load `path` when given, the defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Side length of the square network input, taken from the resize target.
    ///
    /// # Errors
    ///
    /// Fails when the resize target is not square, since the network is trained
    /// and applied at the same size.
    pub fn input_size(&self) -> Result<u32> {
        let (width, height) = (self.resize.width, self.resize.height);
        if width != height {
            bail!("Resize target must be square, got {width}x{height}");
        }
        Ok(width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_standard_layout() {
        let config = PipelineConfig::default();
        assert_eq!(config.resize.source.images, PathBuf::from("data/train"));
        assert_eq!(
            config.resize.target.masks,
            PathBuf::from("small_dataset/train_masks")
        );
        assert_eq!((config.resize.width, config.resize.height), (128, 128));
        assert_eq!(config.training.batch_size, 32);
        assert_eq!(config.training.num_epochs, 10);
        assert_eq!(config.training.learning_rate, 1e-4);
        assert_eq!(config.training.train_fraction, 0.8);
        assert_eq!(config.baseline.sets.len(), 2);
        assert_eq!(
            config.baseline.sets[0].artifact,
            PathBuf::from("models/avg_mask.npy")
        );
        assert_eq!(config.mask_naming, MaskNaming::default());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "training": { "batch_size": 4, "seed": 7 }, "submission": { "threshold": 0.6 } }"#,
        )
        .unwrap();

        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.training.batch_size, 4);
        assert_eq!(config.training.seed, 7);
        assert_eq!(config.training.num_epochs, 10);
        assert_eq!(config.submission.threshold, 0.6);
        assert_eq!(config.resize, ResizeConfig::default());
    }

    #[test]
    fn json_round_trip_preserves_config() {
        let config = PipelineConfig::default();
        let parsed: PipelineConfig = serde_json::from_str(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn unreadable_config_names_the_file() {
        let err = PipelineConfig::load(Path::new("does/not/exist.json")).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.json"));
    }

    #[test]
    fn non_square_resize_target_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "resize": { "width": 128, "height": 96 } }"#).unwrap();

        let err = PipelineConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("128x96"));
        assert_eq!(PipelineConfig::default().input_size().unwrap(), 128);
    }
}
