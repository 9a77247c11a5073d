//! Template matching data types

use crate::error::{LocatorError, LocatorResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in screen coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Shift by an offset, used to move region-relative points back to screen space
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned box with `bottom_right` strictly below and right of `top_left`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    top_left: Point,
    bottom_right: Point,
}

impl BoundingBox {
    /// Create a box, rejecting empty or inverted corners
    pub fn new(top_left: Point, bottom_right: Point) -> LocatorResult<Self> {
        if bottom_right.x <= top_left.x || bottom_right.y <= top_left.y {
            return Err(LocatorError::InvalidBox {
                x1: top_left.x,
                y1: top_left.y,
                x2: bottom_right.x,
                y2: bottom_right.y,
            });
        }
        Ok(Self {
            top_left,
            bottom_right,
        })
    }

    /// Box for a template placed at `(x, y)`; zero sizes are bumped to one pixel
    pub fn from_placement(x: u32, y: u32, width: u32, height: u32) -> Self {
        let top_left = Point::new(x as i32, y as i32);
        Self {
            top_left,
            bottom_right: top_left.offset(width.max(1) as i32, height.max(1) as i32),
        }
    }

    pub fn top_left(&self) -> Point {
        self.top_left
    }

    pub fn bottom_right(&self) -> Point {
        self.bottom_right
    }

    pub fn width(&self) -> u32 {
        (self.bottom_right.x - self.top_left.x) as u32
    }

    pub fn height(&self) -> u32 {
        (self.bottom_right.y - self.top_left.y) as u32
    }

    /// Center point, rounded down on both axes
    pub fn center(&self) -> Point {
        Point::new(
            (self.top_left.x + self.bottom_right.x).div_euclid(2),
            (self.top_left.y + self.bottom_right.y).div_euclid(2),
        )
    }

    /// Horizontal center on the bottom edge of the box
    pub fn bottom_center(&self) -> Point {
        Point::new(
            self.top_left.x + self.width() as i32 / 2,
            self.top_left.y + self.height() as i32,
        )
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            top_left: self.top_left.offset(dx, dy),
            bottom_right: self.bottom_right.offset(dx, dy),
        }
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.top_left, self.bottom_right)
    }
}

/// A single match result
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Match {
    /// Location of the matched template in the searched image
    pub bounds: BoundingBox,
    /// Correlation score, practically in 0.0-1.0
    pub confidence: f32,
    /// Template scale factor that produced the match (1.0 without scale search)
    pub scale: f32,
}

impl Match {
    pub fn new(bounds: BoundingBox, confidence: f32, scale: f32) -> Self {
        Self {
            bounds,
            confidence,
            scale,
        }
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            bounds: self.bounds.translate(dx, dy),
            ..*self
        }
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}% @ {:.2}x",
            self.bounds,
            (self.confidence * 100.0) as i32,
            self.scale
        )
    }
}

/// Rectangular screen area `{x, y, width, height}` with non-zero size
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> LocatorResult<Self> {
        if width == 0 || height == 0 {
            return Err(LocatorError::InvalidRegion {
                x,
                y,
                width,
                height,
                image_width: 0,
                image_height: 0,
            });
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Intersect with a `width`x`height` image anchored at the origin
    pub fn clip_to(&self, image_width: u32, image_height: u32) -> Option<Region> {
        let left = self.x.max(0) as i64;
        let top = self.y.max(0) as i64;
        let right = (self.x as i64 + self.width as i64).min(image_width as i64);
        let bottom = (self.y as i64 + self.height as i64).min(image_height as i64);
        if right <= left || bottom <= top {
            return None;
        }
        Some(Region {
            x: left as i32,
            y: top as i32,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        })
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && (point.x as i64) < self.x as i64 + self.width as i64
            && (point.y as i64) < self.y as i64 + self.height as i64
    }
}

impl From<BoundingBox> for Region {
    fn from(bounds: BoundingBox) -> Self {
        Region {
            x: bounds.top_left.x,
            y: bounds.top_left.y,
            width: bounds.width(),
            height: bounds.height(),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{},{},{}]", self.x, self.y, self.width, self.height)
    }
}
