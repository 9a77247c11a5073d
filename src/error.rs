use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for locator operations.
pub type LocatorResult<T> = Result<T, LocatorError>;

/// The error type for locating markers and maintaining the coordinate history.
///
/// "No match" is deliberately not represented here: a search that never clears
/// its threshold is an ordinary `Ok(None)` or an empty vector.
#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("Template image {path:?} could not be read: {source}")]
    TemplateUnreadable {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Cannot encapsulate an empty set of bounding boxes")]
    EmptyMatchSet,

    #[error("Invalid bounding box ({x1}, {y1}) - ({x2}, {y2}): bottom-right must lie below and right of top-left")]
    InvalidBox { x1: i32, y1: i32, x2: i32, y2: i32 },

    #[error("Region [{x},{y},{width},{height}] does not overlap the {image_width}x{image_height} image")]
    InvalidRegion {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to save image to {path:?}: {source}")]
    ImageSave {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Screen capture failed: {0}")]
    Capture(String),
}

impl LocatorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LocatorError::Io {
            path: path.into(),
            source,
        }
    }

    /// Resource errors abort one locate call; the outer polling loop keeps going.
    pub fn is_resource_error(&self) -> bool {
        matches!(
            self,
            LocatorError::TemplateUnreadable { .. } | LocatorError::Capture(_)
        )
    }
}
