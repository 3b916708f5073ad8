//! Directory-to-directory downsampling of images and masks.

use std::{
    fs,
    path::{Path, PathBuf},
};

use image::{imageops::FilterType, DynamicImage};

use crate::image::{ImageError, ImageResult, ImageUtils};

/// A file that could not be resized, with the reason.
#[derive(Debug)]
pub struct ResizeFailure {
    pub path: PathBuf,
    pub error: ImageError,
}

/// Outcome of [`resize_directory`].
#[derive(Debug, Default)]
pub struct ResizeReport {
    /// Files written to the target directory.
    pub written: Vec<PathBuf>,
    /// Source files that failed; other files are unaffected.
    pub failures: Vec<ResizeFailure>,
}

impl ResizeReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Resize to exactly `width x height` with bilinear interpolation, ignoring aspect ratio.
pub fn resize_image(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    img.resize_exact(width, height, FilterType::Triangle)
}

/// Resize a single file and write it to `target`.
pub fn resize_file(source: &Path, target: &Path, width: u32, height: u32) -> ImageResult<()> {
    let img = ImageUtils::open(source)?;
    let resized = resize_image(&img, width, height);

    resized
        .save(target)
        .map_err(|source| ImageError::ImageSaveError {
            path: target.to_path_buf(),
            source,
        })
}

/// Resize every file in `source_dir` into `target_dir`, keeping file names.
///
/// Failures are collected per file in the report, including files with no
/// available decoder. Only failures that prevent the
/// run as a whole (missing source directory, uncreatable target) are returned as errors.
/// `on_file` is called once per source file after it has been processed.
pub fn resize_directory<F>(
    source_dir: &Path,
    target_dir: &Path,
    (width, height): (u32, u32),
    mut on_file: F,
) -> ImageResult<ResizeReport>
where
    F: FnMut(&Path),
{
    let files = ImageUtils::list_files(source_dir)?;
    fs::create_dir_all(target_dir).map_err(|source| ImageError::DirectoryCreateFailed {
        path: target_dir.to_path_buf(),
        source,
    })?;

    let mut report = ResizeReport::default();
    for path in files {
        let Some(file_name) = path.file_name() else {
            continue;
        };
        let target = target_dir.join(file_name);

        let result = if ImageUtils::is_supported_image_format(&path) {
            resize_file(&path, &target, width, height)
        } else {
            Err(ImageError::UnsupportedFormat { path: path.clone() })
        };

        match result {
            Ok(()) => report.written.push(target),
            Err(error) => {
                tracing::error!(path = %path.display(), %error, "failed to resize file");
                report.failures.push(ResizeFailure { path: path.clone(), error });
            }
        }
        on_file(&path);
    }

    tracing::info!(
        source = %source_dir.display(),
        target = %target_dir.display(),
        written = report.written.len(),
        failed = report.failures.len(),
        "resized directory",
    );
    Ok(report)
}
