//! Derivation of a mask file name from its image file name.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, DatasetResult};

/// How mask files are named after their images.
///
/// The mask of `<base>.<anything>` is `<base><suffix>.<extension>`, where
/// `<base>` is the file name up to its first `.`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskNaming {
    pub suffix: String,
    pub extension: String,
}

impl Default for MaskNaming {
    fn default() -> Self {
        Self {
            suffix: "_mask".to_string(),
            extension: "gif".to_string(),
        }
    }
}

impl MaskNaming {
    /// The part of the file name before its first `.`.
    pub fn base_name(path: &Path) -> DatasetResult<&str> {
        let invalid = || DatasetError::InvalidFileName {
            path: path.to_path_buf(),
        };

        let name = path.file_name().and_then(|n| n.to_str()).ok_or_else(invalid)?;
        match name.split('.').next() {
            Some(base) if !base.is_empty() => Ok(base),
            _ => Err(invalid()),
        }
    }

    /// File name of the mask paired with `image_path`.
    pub fn mask_file_name(&self, image_path: &Path) -> DatasetResult<String> {
        let base = Self::base_name(image_path)?;
        Ok(format!("{base}{}.{}", self.suffix, self.extension))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn mask_name_follows_carvana_convention() {
        let naming = MaskNaming::default();
        assert_eq!(
            naming.mask_file_name(Path::new("train/abc_01.jpg")).unwrap(),
            "abc_01_mask.gif"
        );
    }

    #[test]
    fn base_name_stops_at_first_dot() {
        assert_eq!(
            MaskNaming::base_name(Path::new("car.v2.final.png")).unwrap(),
            "car"
        );
    }

    #[test]
    fn custom_suffix_and_extension() {
        let naming = MaskNaming {
            suffix: "-gt".to_string(),
            extension: "png".to_string(),
        };
        assert_eq!(naming.mask_file_name(Path::new("x.jpg")).unwrap(), "x-gt.png");
    }

    #[test]
    fn hidden_files_have_no_base_name() {
        assert!(matches!(
            MaskNaming::base_name(&PathBuf::from(".hidden")),
            Err(DatasetError::InvalidFileName { .. })
        ));
    }
}
