//! Marker template loading

use crate::error::{LocatorError, LocatorResult};
use image::DynamicImage;
use std::path::{Path, PathBuf};

/// A marker image, loaded fresh for each locate call
#[derive(Debug, Clone)]
pub struct Template {
    pub path: PathBuf,
    pub name: String,
    pub image: DynamicImage,
}

impl Template {
    pub fn load(path: &Path) -> LocatorResult<Self> {
        let image = image::open(path).map_err(|source| LocatorError::TemplateUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_image(path, image))
    }

    /// Wrap an already decoded image; `path` only supplies the name
    pub fn from_image(path: &Path, image: DynamicImage) -> Self {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();
        Self {
            path: path.to_path_buf(),
            name,
            image,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}
