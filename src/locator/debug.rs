//! Debug and audit images written during locate calls

use crate::template_matching::BoundingBox;
use image::DynamicImage;
use std::fs;
use std::path::PathBuf;

pub const CAPTURE_FILE: &str = "analyzed_region.png";
pub const NO_MATCH_FILE: &str = "analyzed_region_no_match.png";
pub const SINGLE_MATCH_FILE: &str = "single_image_match.png";
pub const ALL_MATCHES_FILE: &str = "all_image_matches.png";

/// Writes capture and match images into one directory.
///
/// Failures to write are logged and otherwise ignored.
#[derive(Debug, Clone)]
pub struct DebugArtifacts {
    dir: Option<PathBuf>,
    visual: bool,
}

impl DebugArtifacts {
    pub fn new(dir: Option<PathBuf>, visual: bool) -> Self {
        Self { dir, visual }
    }

    pub fn disabled() -> Self {
        Self::new(None, false)
    }

    /// The searched image, saved on every call
    pub fn save_capture(&self, image: &DynamicImage) -> Option<PathBuf> {
        self.save(CAPTURE_FILE, image)
    }

    /// The searched image when no match was found or the call failed
    pub fn save_no_match(&self, image: &DynamicImage) -> Option<PathBuf> {
        self.save(NO_MATCH_FILE, image)
    }

    /// Crop of the single best match; `bounds` are in `image` coordinates
    pub fn save_single_match(&self, image: &DynamicImage, bounds: &BoundingBox) -> Option<PathBuf> {
        self.save(SINGLE_MATCH_FILE, &crop(image, bounds))
    }

    /// Crop of the box covering all matches, only with visual debugging on
    pub fn save_all_matches(&self, image: &DynamicImage, bounds: &BoundingBox) -> Option<PathBuf> {
        if !self.visual {
            return None;
        }
        let path = self.save(ALL_MATCHES_FILE, &crop(image, bounds))?;
        log::info!("Visual debug: saved all matches as {}", path.display());
        Some(path)
    }

    fn save(&self, file_name: &str, image: &DynamicImage) -> Option<PathBuf> {
        let dir = self.dir.as_ref()?;
        if let Err(e) = fs::create_dir_all(dir) {
            log::warn!("⚠️ Cannot create debug directory {}: {e}", dir.display());
            return None;
        }

        let path = dir.join(file_name);
        match image.save(&path) {
            Ok(()) => Some(path),
            Err(e) => {
                log::warn!("⚠️ Failed to save {}: {e}", path.display());
                None
            }
        }
    }
}

fn crop(image: &DynamicImage, bounds: &BoundingBox) -> DynamicImage {
    let tl = bounds.top_left();
    image.crop_imm(
        tl.x.max(0) as u32,
        tl.y.max(0) as u32,
        bounds.width(),
        bounds.height(),
    )
}
