//! Marker locator: one entry point over all matching strategies

use super::capture::{Capture, ScreenCapture};
use super::config::LocatorConfig;
use super::debug::DebugArtifacts;
use super::region::crop_to;
use super::template::Template;
use crate::coordinates::{CoordinateLog, CoordinateLogEntry};
use crate::error::LocatorResult;
use crate::template_matching::{
    BoundingBox, ChannelMode, Match, MultiMatchFinder, MultiScaleMatcher, Point, Region,
    ScoreField, encapsulate,
};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Matching strategy for one locate call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMode {
    /// Best grayscale placement at the template's native scale
    SingleGrayscale,
    /// Best grayscale placement over the configured scale sweep
    SingleGrayscaleMultiScale,
    /// Every color-fused placement above the threshold (marker repeated on screen)
    AllMatchesColor,
}

impl MatchMode {
    pub fn from_flags(all_matches: bool, multiscale: bool) -> Self {
        match (all_matches, multiscale) {
            (true, _) => MatchMode::AllMatchesColor,
            (false, true) => MatchMode::SingleGrayscaleMultiScale,
            (false, false) => MatchMode::SingleGrayscale,
        }
    }

    pub fn channels(&self) -> ChannelMode {
        match self {
            MatchMode::AllMatchesColor => ChannelMode::Color,
            _ => ChannelMode::Grayscale,
        }
    }

    pub fn is_all_matches(&self) -> bool {
        matches!(self, MatchMode::AllMatchesColor)
    }
}

/// What to look for and where
#[derive(Debug, Clone)]
pub struct LocateRequest {
    pub template_path: PathBuf,
    pub mode: MatchMode,
    /// Overrides the configured threshold
    pub threshold: Option<f32>,
    /// Screen-space area to search, cropped out of the capture before matching
    pub region_restriction: Option<Region>,
}

impl LocateRequest {
    pub fn new(template_path: impl Into<PathBuf>, mode: MatchMode) -> Self {
        Self {
            template_path: template_path.into(),
            mode,
            threshold: None,
            region_restriction: None,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn restricted_to(mut self, region: Option<Region>) -> Self {
        self.region_restriction = region;
        self
    }
}

/// Result of a successful locate call, in full-screen coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct LocateOutcome {
    /// One match in single mode, one per detected instance otherwise
    pub matches: Vec<Match>,
    /// The box appended to the coordinate log (covers all matches in all-matches mode)
    pub logged: BoundingBox,
    /// Click points: the bottom-center of the match in single mode, match centers otherwise
    pub targets: Vec<Point>,
}

impl LocateOutcome {
    pub fn target(&self) -> Option<Point> {
        self.targets.first().copied()
    }
}

/// Finds markers in captures and records where they were seen
pub struct Locator<'a> {
    history: &'a CoordinateLog,
    config: LocatorConfig,
    debug: DebugArtifacts,
}

impl<'a> Locator<'a> {
    pub fn new(history: &'a CoordinateLog, config: LocatorConfig) -> Self {
        let debug = DebugArtifacts::new(config.debug_dir.clone(), config.visual_debug);
        Self {
            history,
            config,
            debug,
        }
    }

    /// Capture through `source` (optionally only `capture_region`) and locate in it
    pub fn capture_and_locate<C: ScreenCapture>(
        &self,
        source: &mut C,
        capture_region: Option<Region>,
        request: &LocateRequest,
    ) -> Option<LocateOutcome> {
        match source.capture(capture_region) {
            Ok(capture) => self.locate(&capture, request),
            Err(e) => {
                log::warn!("⚠️ Capture failed: {e}");
                None
            }
        }
    }

    /// Locate the requested marker.
    ///
    /// Every failure, including an unreadable template, ends as `None` with
    /// the searched image saved for inspection.
    pub fn locate(&self, capture: &Capture, request: &LocateRequest) -> Option<LocateOutcome> {
        match self.try_locate(capture, request) {
            Ok(Some(outcome)) => Some(outcome),
            Ok(None) => {
                let saved = self.debug.save_no_match(&capture.image);
                log::info!(
                    "No match found for {}{}",
                    request.template_path.display(),
                    saved
                        .map(|p| format!(". Screenshot saved to {}", p.display()))
                        .unwrap_or_default()
                );
                None
            }
            Err(e) => {
                if e.is_resource_error() {
                    log::warn!("⚠️ Locate failed for {}: {e}", request.template_path.display());
                } else {
                    log::error!("❌ Locate failed for {}: {e}", request.template_path.display());
                }
                self.debug.save_no_match(&capture.image);
                None
            }
        }
    }

    /// Like [`locate`](Self::locate), but errors are returned and nothing is saved on a miss
    pub fn try_locate(
        &self,
        capture: &Capture,
        request: &LocateRequest,
    ) -> LocatorResult<Option<LocateOutcome>> {
        self.debug.save_capture(&capture.image);

        let template = Template::load(&request.template_path)?;
        let threshold = request.threshold.unwrap_or(self.config.match_threshold);

        let (search, offset) = match request.region_restriction {
            Some(region) => {
                // Restriction is screen space; the capture may itself be a region
                let local = Region {
                    x: region.x - capture.origin.x,
                    y: region.y - capture.origin.y,
                    ..region
                };
                let (cropped, crop_origin) = crop_to(&capture.image, local)?;
                (
                    cropped,
                    crop_origin.offset(capture.origin.x, capture.origin.y),
                )
            }
            None => (capture.image.clone(), capture.origin),
        };

        log::debug!(
            "🔍 Searching {}x{} at {} for '{}' ({}x{}, {:?}, threshold {:.2})",
            search.width(),
            search.height(),
            offset,
            template.name,
            template.width(),
            template.height(),
            request.mode,
            threshold
        );

        if request.mode.is_all_matches() {
            self.locate_all(&search, offset, &template, threshold)
        } else {
            self.locate_single(&search, offset, &template, request.mode, threshold)
        }
    }

    fn locate_single(
        &self,
        search: &DynamicImage,
        offset: Point,
        template: &Template,
        mode: MatchMode,
        threshold: f32,
    ) -> LocatorResult<Option<LocateOutcome>> {
        let matcher = MultiScaleMatcher::new(
            ScoreField::new(mode.channels()),
            self.config.resize_filter,
        );
        let scales = match mode {
            MatchMode::SingleGrayscaleMultiScale => self.config.scale_sweep.values(),
            _ => vec![1.0],
        };

        let Some(found) = matcher.find_best(search, &template.image, &scales, threshold) else {
            return Ok(None);
        };

        self.debug.save_single_match(search, &found.bounds);

        let found = found.translate(offset.x, offset.y);
        self.record(found.bounds)?;
        log::info!(
            "✅ '{}' found with confidence {:.4} at scale {:.2}. Coordinates logged to {}",
            template.name,
            found.confidence,
            found.scale,
            self.history.path().display()
        );

        Ok(Some(LocateOutcome {
            matches: vec![found],
            logged: found.bounds,
            targets: vec![found.bounds.bottom_center()],
        }))
    }

    fn locate_all(
        &self,
        search: &DynamicImage,
        offset: Point,
        template: &Template,
        threshold: f32,
    ) -> LocatorResult<Option<LocateOutcome>> {
        let finder = MultiMatchFinder::new(ScoreField::new(ChannelMode::Color));
        let found = finder.find_all_scored(search, &template.image, threshold);
        if found.is_empty() {
            return Ok(None);
        }

        let local_boxes: Vec<BoundingBox> = found.iter().map(|m| m.bounds).collect();
        let covering = encapsulate(&local_boxes)?;
        self.debug.save_all_matches(search, &covering);

        let matches: Vec<Match> = found
            .iter()
            .map(|m| m.translate(offset.x, offset.y))
            .collect();
        let logged = covering.translate(offset.x, offset.y);
        self.record(logged)?;
        log::info!(
            "✅ Box covering {} matches of '{}' logged to {}",
            matches.len(),
            template.name,
            self.history.path().display()
        );

        Ok(Some(LocateOutcome {
            targets: matches.iter().map(|m| m.bounds.center()).collect(),
            matches,
            logged,
        }))
    }

    /// Append `bounds` and trim the log.
    ///
    /// Only a failed append fails the call; once the row is written a failed
    /// trim is logged and the match still stands.
    fn record(&self, bounds: BoundingBox) -> LocatorResult<()> {
        self.history.append(&CoordinateLogEntry::from(bounds))?;
        if let Err(e) = self.history.limit(self.config.log_limit) {
            log::warn!("⚠️ Could not trim {}: {e}", self.history.path().display());
        }
        Ok(())
    }

    /// Path of the coordinate log this locator writes to
    pub fn history_path(&self) -> &Path {
        self.history.path()
    }
}
