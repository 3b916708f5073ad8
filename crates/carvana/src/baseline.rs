//! Average-mask baseline construction.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use carvana_model::{AverageMask, AverageMaskBuilder};
use carvana_util::ImageUtils;

use crate::{
    config::{BaselineConfig, BaselineSet},
    progress::file_progress,
};

/// Average every mask file in `mask_dir` and round the result to {0, 1}.
pub fn build_average_mask(mask_dir: &Path) -> Result<AverageMask> {
    let files = ImageUtils::list_files(mask_dir)
        .with_context(|| format!("Failed to list masks in {}", mask_dir.display()))?;
    if files.is_empty() {
        bail!("No mask files found in {}", mask_dir.display());
    }

    let pb = file_progress(files.len(), "averaging masks");
    let mut builder = AverageMaskBuilder::new();
    for path in &files {
        let mask = ImageUtils::load_mask(path)
            .with_context(|| format!("Failed to load mask {}", path.display()))?;
        builder
            .add(&mask.data, mask.height, mask.width)
            .with_context(|| format!("Failed to accumulate mask {}", path.display()))?;
        pb.inc(1);
    }
    pb.finish_and_clear();

    let mask = builder.finish()?;
    tracing::info!(
        masks = builder.count(),
        dims = ?mask.dims(),
        foreground = mask.foreground_pixels(),
        "Built average mask"
    );
    Ok(mask)
}

/// Build and persist the average mask of one set.
pub fn build_baseline_set(set: &BaselineSet) -> Result<AverageMask> {
    let mask = build_average_mask(&set.masks)?;

    if let Some(parent) = set.artifact.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    mask.save(&set.artifact)?;

    tracing::info!(set = %set.name, artifact = %set.artifact.display(), "Saved average mask");
    Ok(mask)
}

/// Build every configured baseline set.
pub fn run_baseline(config: &BaselineConfig) -> Result<()> {
    for set in &config.sets {
        build_baseline_set(set).with_context(|| format!("Baseline set '{}' failed", set.name))?;
    }
    Ok(())
}
