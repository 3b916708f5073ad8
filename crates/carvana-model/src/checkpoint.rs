//! Persistence of trained network weights.

use std::path::{Path, PathBuf};

use burn::{
    prelude::*,
    record::{FileRecorder, FullPrecisionSettings, NamedMpkFileRecorder},
};

use crate::{
    error::{ModelError, ModelResult},
    models::{UNet, UNetConfig},
};

/// Recorder used for every checkpoint file.
pub type CheckpointRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

impl<B: Backend> UNet<B> {
    /// The path a checkpoint is actually written to, with the recorder's extension.
    pub fn checkpoint_file(path: &Path) -> PathBuf {
        path.with_extension(<CheckpointRecorder as FileRecorder<B>>::file_extension())
    }

    /// Save the weights, overwriting any previous checkpoint at `path`.
    pub fn save_checkpoint(&self, path: &Path) -> ModelResult<PathBuf> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ModelError::WeightSavingFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        self.clone()
            .save_file(path, &CheckpointRecorder::new())
            .map_err(|e| ModelError::WeightSavingFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let file = Self::checkpoint_file(path);
        tracing::debug!(path = %file.display(), "Saved checkpoint");
        Ok(file)
    }

    /// Build a network from `config` and load weights saved by [`Self::save_checkpoint`].
    pub fn load_checkpoint(config: &UNetConfig, path: &Path, device: &B::Device) -> ModelResult<Self> {
        config
            .init::<B>(device)
            .load_file(path, &CheckpointRecorder::new(), device)
            .map_err(|e| ModelError::WeightLoadingFailed {
                path: Self::checkpoint_file(path),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use burn::tensor::Distribution;

    use super::*;
    use crate::tests::TestBackend;

    #[test]
    fn reloaded_network_predicts_the_same() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("unet_128_best.mpk");
        let device = Default::default();
        let config = UNetConfig::new();

        let model = config.init::<TestBackend>(&device);
        let written = model.save_checkpoint(&path).unwrap();
        assert_eq!(written, path);
        assert!(written.is_file());

        let reloaded = UNet::<TestBackend>::load_checkpoint(&config, &path, &device).unwrap();
        let x = Tensor::<TestBackend, 4>::random([1, 3, 16, 16], Distribution::Default, &device);
        let expected = model.forward(x.clone()).into_data().to_vec::<f32>().unwrap();
        let actual = reloaded.forward(x).into_data().to_vec::<f32>().unwrap();
        for (a, b) in expected.iter().zip(&actual) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn missing_checkpoint_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = UNet::<TestBackend>::load_checkpoint(
            &UNetConfig::new(),
            &dir.path().join("absent.mpk"),
            &Default::default(),
        );
        assert!(matches!(result, Err(ModelError::WeightLoadingFailed { .. })));
    }
}
