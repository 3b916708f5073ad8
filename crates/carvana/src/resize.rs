//! Downsampling of the training images and masks.

use std::path::Path;

use anyhow::{bail, Context, Result};
use carvana_util::{resize_directory, ImageUtils, ResizeReport};

use crate::{config::ResizeConfig, progress::file_progress};

/// Resize one directory, reporting progress per file.
pub fn resize_with_progress(source: &Path, target: &Path, size: (u32, u32)) -> Result<ResizeReport> {
    let total = ImageUtils::list_files(source)
        .with_context(|| format!("Failed to list {}", source.display()))?
        .len();
    let pb = file_progress(total, "resizing");

    let report = resize_directory(source, target, size, |_| pb.inc(1))
        .with_context(|| format!("Failed to resize {} into {}", source.display(), target.display()))?;
    pb.finish_and_clear();

    Ok(report)
}

/// Resize the image directory, then the mask directory.
///
/// Every file is attempted; the run fails afterwards if any file failed.
pub fn run_resize(config: &ResizeConfig) -> Result<Vec<ResizeReport>> {
    let size = (config.width, config.height);
    let jobs = [
        (&config.source.images, &config.target.images),
        (&config.source.masks, &config.target.masks),
    ];

    let mut reports = Vec::with_capacity(jobs.len());
    for (source, target) in jobs {
        tracing::info!(
            source = %source.display(),
            target = %target.display(),
            width = size.0,
            height = size.1,
            "Resizing directory"
        );
        reports.push(resize_with_progress(source, target, size)?);
    }

    let failed: usize = reports.iter().map(|r| r.failures.len()).sum();
    if failed > 0 {
        bail!("{failed} file(s) could not be resized");
    }

    Ok(reports)
}
