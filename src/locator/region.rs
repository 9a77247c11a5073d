//! Region restriction helpers: named screen areas, parsing, cropping

use crate::error::{LocatorError, LocatorResult};
use crate::template_matching::{Point, Region};
use image::DynamicImage;

/// Named screen areas used to restrict a search
pub fn named_region(name: &str, screen_width: u32, screen_height: u32) -> Option<Region> {
    let (w, h) = (screen_width, screen_height);
    let (x, y, width, height) = match name {
        "full_screen" => (0, 0, w, h),
        "left_half" => (0, 0, w / 2, h),
        "right_half" => (w / 2, 0, w - w / 2, h),
        "top_half" => (0, 0, w, h / 2),
        "bottom_half" => (0, h / 2, w, h - h / 2),
        "center" => (w / 4, h / 4, w / 2, h / 2),
        _ => return None,
    };
    Region::new(x as i32, y as i32, width, height).ok()
}

/// Parse `x,y,width,height`, optionally wrapped in brackets: `[300,1682,50,50]`
pub fn parse_region(text: &str) -> Option<Region> {
    let inner = text
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(text.trim());

    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return None;
    }
    let (Ok(x), Ok(y), Ok(width), Ok(height)) = (
        parts[0].parse::<i32>(),
        parts[1].parse::<i32>(),
        parts[2].parse::<u32>(),
        parts[3].parse::<u32>(),
    ) else {
        return None;
    };
    Region::new(x, y, width, height).ok()
}

/// Named region first, then the numeric form
pub fn resolve_region(identifier: &str, screen_width: u32, screen_height: u32) -> Option<Region> {
    named_region(identifier, screen_width, screen_height).or_else(|| parse_region(identifier))
}

/// Crop `image` to `region` (in the image's own coordinates), clipped to its bounds.
///
/// Returns the crop and its top-left corner within `image`.
pub fn crop_to(image: &DynamicImage, region: Region) -> LocatorResult<(DynamicImage, Point)> {
    let clipped = region
        .clip_to(image.width(), image.height())
        .ok_or(LocatorError::InvalidRegion {
            x: region.x,
            y: region.y,
            width: region.width,
            height: region.height,
            image_width: image.width(),
            image_height: image.height(),
        })?;

    if clipped != region {
        log::debug!("✂️ Region {} clipped to {}", region, clipped);
    }

    let cropped = image.crop_imm(
        clipped.x as u32,
        clipped.y as u32,
        clipped.width,
        clipped.height,
    );
    Ok((cropped, clipped.origin()))
}
