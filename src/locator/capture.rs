//! Screen capture boundary
//!
//! Acquiring pixels from a real display lives outside this crate; anything
//! that can produce an image implements [`ScreenCapture`].

use crate::error::{LocatorError, LocatorResult};
use crate::template_matching::{Point, Region};
use image::DynamicImage;
use std::path::PathBuf;

/// A captured image and where its top-left pixel sits on screen
#[derive(Debug, Clone)]
pub struct Capture {
    pub image: DynamicImage,
    pub origin: Point,
}

impl Capture {
    pub fn full_screen(image: DynamicImage) -> Self {
        Self {
            image,
            origin: Point::new(0, 0),
        }
    }

    pub fn at(image: DynamicImage, origin: Point) -> Self {
        Self { image, origin }
    }
}

pub trait ScreenCapture {
    /// Capture the whole screen, or only `region` when given
    fn capture(&mut self, region: Option<Region>) -> LocatorResult<Capture>;
}

/// Replays a saved screenshot as the screen
#[derive(Debug, Clone)]
pub struct ImageFileCapture {
    path: PathBuf,
}

impl ImageFileCapture {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ScreenCapture for ImageFileCapture {
    fn capture(&mut self, region: Option<Region>) -> LocatorResult<Capture> {
        let screen = image::open(&self.path).map_err(|e| {
            LocatorError::Capture(format!("Failed to load {}: {e}", self.path.display()))
        })?;

        match region {
            None => Ok(Capture::full_screen(screen)),
            Some(region) => {
                let (image, origin) = super::region::crop_to(&screen, region)?;
                Ok(Capture::at(image, origin))
            }
        }
    }
}
