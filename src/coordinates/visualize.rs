//! Overview image of logged hit areas and the optimized region

use super::coordinate_log::CoordinateLogEntry;
use super::optimizer::OptimizedRegion;
use crate::error::{LocatorError, LocatorResult};
use crate::template_matching::Region;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::path::Path;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const HIT_AREA: Rgb<u8> = Rgb([0, 0, 255]);
const AVERAGE_AREA: Rgb<u8> = Rgb([255, 0, 0]);

/// Draw every logged box whose center is on screen in blue, and the optimized region in red
pub fn render_overview(
    entries: &[CoordinateLogEntry],
    optimized: Option<&OptimizedRegion>,
    screen_width: u32,
    screen_height: u32,
) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(screen_width.max(1), screen_height.max(1), BACKGROUND);
    let screen = Region {
        x: 0,
        y: 0,
        width: canvas.width(),
        height: canvas.height(),
    };

    let mut drawn = 0;
    for bounds in entries.iter().filter_map(|e| e.bounds().ok()) {
        if screen.contains(bounds.center()) {
            draw_hollow_rect_mut(&mut canvas, to_rect(bounds.into()), HIT_AREA);
            drawn += 1;
        }
    }

    if let Some(optimized) = optimized {
        // Doubled outline so the average stands out from the hit areas
        let region = optimized.region;
        draw_hollow_rect_mut(&mut canvas, to_rect(region), AVERAGE_AREA);
        if region.width > 2 && region.height > 2 {
            let inner = Region {
                x: region.x + 1,
                y: region.y + 1,
                width: region.width - 2,
                height: region.height - 2,
            };
            draw_hollow_rect_mut(&mut canvas, to_rect(inner), AVERAGE_AREA);
        }
    }

    log::debug!("🖼️ Overview drew {} of {} hit areas", drawn, entries.len());
    canvas
}

/// Render the overview and write it as an image file
pub fn save_overview(
    path: &Path,
    entries: &[CoordinateLogEntry],
    optimized: Option<&OptimizedRegion>,
    screen_width: u32,
    screen_height: u32,
) -> LocatorResult<()> {
    render_overview(entries, optimized, screen_width, screen_height)
        .save(path)
        .map_err(|source| LocatorError::ImageSave {
            path: path.to_path_buf(),
            source,
        })
}

fn to_rect(region: Region) -> Rect {
    Rect::at(region.x, region.y).of_size(region.width, region.height)
}
