//! Kaggle submission: one run-length encoded mask per test image.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{bail, Context, Result};
use burn::tensor::{
    backend::Backend,
    module::interpolate,
    ops::{InterpolateMode, InterpolateOptions},
};
use carvana_model::{UNet, UNetConfig};
use carvana_util::{resize_image, rle_encode, ImageUtils};

use crate::progress::file_progress;

/// Header of the submission file.
pub const SUBMISSION_HEADER: &str = "img,rle_mask";

/// Predict the binary mask of one image at its original resolution.
///
/// The image is shrunk to the network input size, the probability map is
/// scaled back up bilinearly and thresholded.
pub fn predict_full_resolution_mask<B: Backend>(
    model: &UNet<B>,
    path: &Path,
    input_size: u32,
    threshold: f32,
    device: &B::Device,
) -> Result<Vec<f32>> {
    let img = ImageUtils::open(path)?;
    let (width, height) = (img.width() as usize, img.height() as usize);

    let small = ImageUtils::rgb_pixels(resize_image(&img, input_size, input_size));
    let probabilities = model.try_forward(ImageUtils::pixels_to_tensor::<B>(&small, device))?;
    let probabilities = interpolate(
        probabilities,
        [height, width],
        InterpolateOptions::new(InterpolateMode::Bilinear),
    );

    let pixels = ImageUtils::tensor_to_pixels(probabilities)?;
    Ok(pixels
        .data
        .into_iter()
        .map(|p| if p >= threshold { 1.0 } else { 0.0 })
        .collect())
}

/// Write `img,rle_mask` rows for every image in `image_dir`.
pub fn write_submission<B: Backend>(
    image_dir: &Path,
    checkpoint: &Path,
    output: &Path,
    input_size: u32,
    threshold: f32,
    device: &B::Device,
) -> Result<usize> {
    let model = UNet::<B>::load_checkpoint(&UNetConfig::new(), checkpoint, device)?;
    let files = ImageUtils::list_files(image_dir)
        .with_context(|| format!("Failed to list test images in {}", image_dir.display()))?;
    if files.is_empty() {
        bail!("No test images found in {}", image_dir.display());
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let mut writer = BufWriter::new(
        File::create(output).with_context(|| format!("Failed to create {}", output.display()))?,
    );
    writeln!(writer, "{SUBMISSION_HEADER}")?;

    let pb = file_progress(files.len(), "predicting");
    for path in &files {
        let mask = predict_full_resolution_mask(&model, path, input_size, threshold, device)
            .with_context(|| format!("Failed to predict {}", path.display()))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Invalid file name {}", path.display()))?;

        writeln!(writer, "{name},{}", rle_encode(&mask))?;
        pb.inc(1);
    }
    pb.finish_and_clear();
    writer.flush()?;

    tracing::info!(rows = files.len(), output = %output.display(), "Wrote submission");
    Ok(files.len())
}
