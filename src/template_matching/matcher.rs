//! Template matching strategies built on score surfaces
//!
//! `MultiScaleMatcher` keeps the single best placement across a sweep of
//! template scales; `MultiMatchFinder` keeps every placement above a threshold
//! at the template's native scale.

use super::score::{ScoreField, best_cell};
use super::types::{BoundingBox, Match};
use image::DynamicImage;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// Resampling filter used when scaling templates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    #[default]
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Evenly spaced template scale factors from `min` to `max` inclusive
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScaleSweep {
    pub min: f32,
    pub max: f32,
    pub steps: usize,
}

impl Default for ScaleSweep {
    fn default() -> Self {
        Self {
            min: 0.5,
            max: 2.0,
            steps: 20,
        }
    }
}

impl ScaleSweep {
    /// Native scale only
    pub fn fixed() -> Self {
        Self {
            min: 1.0,
            max: 1.0,
            steps: 1,
        }
    }

    pub fn values(&self) -> Vec<f32> {
        match self.steps {
            0 => Vec::new(),
            1 => vec![self.min],
            steps => {
                let step = (self.max - self.min) / (steps - 1) as f32;
                (0..steps).map(|i| self.min + step * i as f32).collect()
            }
        }
    }
}

/// Finds the single best match across a range of template scales
#[derive(Clone, Copy, Debug)]
pub struct MultiScaleMatcher {
    field: ScoreField,
    filter: ResizeFilter,
}

impl MultiScaleMatcher {
    pub fn new(field: ScoreField, filter: ResizeFilter) -> Self {
        Self { field, filter }
    }

    /// Best placement over all `scales`.
    ///
    /// A scale's best cell replaces the running best only when it clears
    /// `threshold` and is strictly greater, so the first scale wins exact ties.
    /// Returns `None` when no scale clears `threshold`.
    pub fn find_best(
        &self,
        capture: &DynamicImage,
        template: &DynamicImage,
        scales: &[f32],
        threshold: f32,
    ) -> Option<Match> {
        let mut best: Option<Match> = None;

        for (i, &scale) in scales.iter().enumerate() {
            let Some(scaled) = self.scale_template(template, scale) else {
                log::debug!("  ⚠️ Scale {:.3} collapses the template, skipping", scale);
                continue;
            };
            let Some(surface) = self.field.score(capture, &scaled) else {
                continue;
            };

            let (x, y, confidence) = best_cell(&surface);
            log::debug!(
                "  ⏳ Scale {}/{} ({:.3}x): best {:.4} at ({},{})",
                i + 1,
                scales.len(),
                scale,
                confidence,
                x,
                y
            );

            let improves = best.is_none_or(|current| confidence > current.confidence);
            if confidence >= threshold && improves {
                let bounds = BoundingBox::from_placement(x, y, scaled.width(), scaled.height());
                best = Some(Match::new(bounds, confidence, scale));
            }
        }

        best
    }

    /// Best placement at the template's native scale
    pub fn find_fixed(
        &self,
        capture: &DynamicImage,
        template: &DynamicImage,
        threshold: f32,
    ) -> Option<Match> {
        self.find_best(capture, template, &[1.0], threshold)
    }

    fn scale_template(&self, template: &DynamicImage, scale: f32) -> Option<DynamicImage> {
        if scale.is_nan() || scale <= 0.0 {
            return None;
        }
        if (scale - 1.0).abs() < 1e-3 {
            return Some(template.clone());
        }

        let width = (template.width() as f32 * scale).round() as u32;
        let height = (template.height() as f32 * scale).round() as u32;
        if width == 0 || height == 0 {
            return None;
        }

        Some(template.resize_exact(width, height, self.filter.into()))
    }
}

/// Finds every placement of a template that clears a threshold
#[derive(Clone, Copy, Debug)]
pub struct MultiMatchFinder {
    field: ScoreField,
}

impl MultiMatchFinder {
    pub fn new(field: ScoreField) -> Self {
        Self { field }
    }

    /// Boxes for all cells `>= threshold`, in row-major scan order.
    ///
    /// Overlapping hits around one true match are not merged.
    pub fn find_all(
        &self,
        capture: &DynamicImage,
        template: &DynamicImage,
        threshold: f32,
    ) -> Vec<BoundingBox> {
        self.find_all_scored(capture, template, threshold)
            .into_iter()
            .map(|m| m.bounds)
            .collect()
    }

    /// Same as [`find_all`](Self::find_all) but keeps each cell's score
    pub fn find_all_scored(
        &self,
        capture: &DynamicImage,
        template: &DynamicImage,
        threshold: f32,
    ) -> Vec<Match> {
        let Some(surface) = self.field.score(capture, template) else {
            return Vec::new();
        };

        let (width, height) = (template.width(), template.height());
        let matches: Vec<Match> = surface
            .enumerate_pixels()
            .filter(|(_, _, score)| score[0] >= threshold)
            .map(|(x, y, score)| {
                Match::new(BoundingBox::from_placement(x, y, width, height), score[0], 1.0)
            })
            .collect();

        log::debug!(
            "✅ {} placements at or above {:.2} out of {}",
            matches.len(),
            threshold,
            surface.width() * surface.height()
        );
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template_matching::score::ChannelMode;
    use crate::template_matching::types::Point;
    use image::{GrayImage, Luma};

    fn white_block_scene() -> DynamicImage {
        let mut capture = GrayImage::new(100, 100);
        for y in 20..30 {
            for x in 20..30 {
                capture.put_pixel(x, y, Luma([255]));
            }
        }
        DynamicImage::ImageLuma8(capture)
    }

    fn white(size: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(size, size, Luma([255])))
    }

    fn grayscale_matcher() -> MultiScaleMatcher {
        MultiScaleMatcher::new(ScoreField::new(ChannelMode::Grayscale), ResizeFilter::Lanczos3)
    }

    #[test]
    fn test_default_sweep() {
        let values = ScaleSweep::default().values();
        assert_eq!(values.len(), 20);
        assert!((values[0] - 0.5).abs() < 1e-6);
        assert!((values[19] - 2.0).abs() < 1e-5);
        assert!(values.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_degenerate_sweeps() {
        assert!(ScaleSweep { min: 1.0, max: 2.0, steps: 0 }.values().is_empty());
        assert_eq!(ScaleSweep::fixed().values(), vec![1.0]);
    }

    #[test]
    fn test_fixed_scale_finds_white_block() {
        let found = grayscale_matcher()
            .find_fixed(&white_block_scene(), &white(10), 0.75)
            .expect("block should match");

        assert_eq!(found.bounds.top_left(), Point::new(20, 20));
        assert_eq!(found.bounds.bottom_right(), Point::new(30, 30));
        assert!((found.scale - 1.0).abs() < 1e-6);
        assert!((found.confidence - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_scaled_template_needs_scale_search() {
        let capture = white_block_scene();
        let template = white(15);
        let matcher = grayscale_matcher();

        assert!(matcher.find_fixed(&capture, &template, 0.99).is_none());

        let found = matcher
            .find_best(&capture, &template, &ScaleSweep::default().values(), 0.99)
            .expect("a smaller scale should fit the block");
        assert!(found.scale < 1.0);
        assert!(found.confidence >= 0.99);
        assert!(found.bounds.width() <= 10);
        assert!(found.bounds.top_left().x >= 20 && found.bounds.bottom_right().x <= 30);
        assert!(found.bounds.top_left().y >= 20 && found.bounds.bottom_right().y <= 30);
    }

    #[test]
    fn test_raising_threshold_never_creates_a_match() {
        let capture = white_block_scene();
        let template = white(15);
        let scales = ScaleSweep { min: 0.9, max: 1.5, steps: 4 }.values();
        let matcher = grayscale_matcher();

        let mut seen_none = false;
        for threshold in [0.1, 0.3, 0.5, 0.7, 0.9, 0.99, 1.0] {
            let result = matcher.find_best(&capture, &template, &scales, threshold);
            if seen_none {
                assert!(result.is_none(), "threshold {threshold} produced a match after a miss");
            }
            seen_none |= result.is_none();
        }
        assert!(seen_none);
    }

    #[test]
    fn test_first_scale_wins_ties() {
        // Both scales collapse to the same 10x10 template and score 1.0
        let found = grayscale_matcher()
            .find_best(&white_block_scene(), &white(10), &[1.0, 1.0004], 0.5)
            .unwrap();
        assert_eq!(found.scale, 1.0);
    }

    #[test]
    fn test_find_all_row_major_and_empty() {
        let mut capture = GrayImage::new(40, 20);
        for (ox, oy) in [(25u32, 2u32), (5, 10)] {
            for y in oy..oy + 4 {
                for x in ox..ox + 4 {
                    capture.put_pixel(x, y, Luma([255]));
                }
            }
        }
        let finder = MultiMatchFinder::new(ScoreField::new(ChannelMode::Grayscale));
        let boxes = finder.find_all(&DynamicImage::ImageLuma8(capture), &white(4), 0.999);
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].top_left(), Point::new(25, 2));
        assert_eq!(boxes[1].top_left(), Point::new(5, 10));

        let none = finder.find_all(&DynamicImage::ImageLuma8(GrayImage::new(40, 20)), &white(4), 0.5);
        assert!(none.is_empty());
    }
}
