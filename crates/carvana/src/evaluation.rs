//! Dice evaluation of the average-mask baseline and of the trained network.

use std::path::Path;

use anyhow::{bail, Context, Result};
use burn::{data::dataloader::batcher::Batcher, tensor::backend::Backend};
use carvana_data::{MaskNaming, SegmentationBatcher, SegmentationDataset};
use carvana_metric::{dice_coefficient, ScoreSummary};
use carvana_model::{AverageMask, UNet, UNetConfig};
use carvana_util::ImageUtils;

use crate::{
    config::{BaselineSet, DatasetPaths},
    progress::file_progress,
};

/// Score the average mask against every mask file in `mask_dir`.
pub fn evaluate_average_mask(mask_dir: &Path, artifact: &Path) -> Result<ScoreSummary> {
    let average = AverageMask::load(artifact)?;
    let prediction = average.to_f32_vec();

    let files = ImageUtils::list_files(mask_dir)
        .with_context(|| format!("Failed to list masks in {}", mask_dir.display()))?;

    let pb = file_progress(files.len(), "scoring average mask");
    let mut scores = Vec::with_capacity(files.len());
    for path in &files {
        let mask = ImageUtils::load_mask(path)
            .with_context(|| format!("Failed to load mask {}", path.display()))?;
        if mask.spatial_dims() != average.dims() {
            bail!(
                "Mask {} is {:?} but the average mask is {:?}",
                path.display(),
                mask.spatial_dims(),
                average.dims()
            );
        }

        let score = dice_coefficient(&mask.data, &prediction)
            .with_context(|| format!("Failed to score {}", path.display()))?;
        scores.push(score);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let summary = ScoreSummary::from_scores(&scores)
        .with_context(|| format!("No masks to score in {}", mask_dir.display()))?;
    tracing::info!(dir = %mask_dir.display(), %summary, "Scored average mask");
    Ok(summary)
}

/// Score the average mask of every configured set, in order.
pub fn evaluate_baselines(sets: &[BaselineSet]) -> Result<Vec<(String, ScoreSummary)>> {
    sets.iter()
        .map(|set| {
            evaluate_average_mask(&set.masks, &set.artifact)
                .with_context(|| format!("Evaluation of baseline set '{}' failed", set.name))
                .map(|summary| (set.name.clone(), summary))
        })
        .collect()
}

/// Score the network stored at `checkpoint` on every image/mask pair.
pub fn evaluate_unet<B: Backend>(
    data: &DatasetPaths,
    naming: &MaskNaming,
    checkpoint: &Path,
    device: &B::Device,
) -> Result<ScoreSummary> {
    let model = UNet::<B>::load_checkpoint(&UNetConfig::new(), checkpoint, device)?;
    let dataset = SegmentationDataset::new(&data.images, &data.masks, naming)?;

    let batcher = SegmentationBatcher::<B>::new();
    let pb = file_progress(dataset.len(), "scoring network");
    let mut scores = Vec::with_capacity(dataset.len());
    for pair in dataset.pairs() {
        let item = SegmentationDataset::load_pair(pair)
            .with_context(|| format!("Failed to load {}", pair.image.display()))?;
        let batch = batcher.batch(vec![item], device);

        let output = model
            .try_forward(batch.images)
            .with_context(|| format!("Failed to predict {}", pair.image.display()))?;
        let prediction = ImageUtils::tensor_to_pixels(output)?;
        let truth = ImageUtils::tensor_to_pixels(batch.masks)?;

        let score = dice_coefficient(&prediction.data, &truth.data)
            .with_context(|| format!("Failed to score {}", pair.image.display()))?;
        scores.push(score);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let summary = ScoreSummary::from_scores(&scores)?;
    tracing::info!(checkpoint = %checkpoint.display(), %summary, "Scored network");
    Ok(summary)
}

/// The two report lines printed for a summary, e.g. with subject "in the smaller dataset".
pub fn report_lines(subject: &str, summary: &ScoreSummary) -> [String; 2] {
    [
        format!("Mean dice coefficient {subject} is: {}", summary.mean),
        format!("SD dice coefficient {subject} is: {}", summary.std),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_lines_name_the_dataset() {
        let [mean, sd] = report_lines("in the smaller dataset", &ScoreSummary::new(2, 0.75, 0.25));
        assert_eq!(mean, "Mean dice coefficient in the smaller dataset is: 0.75");
        assert_eq!(sd, "SD dice coefficient in the smaller dataset is: 0.25");
    }
}
