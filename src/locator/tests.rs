//! Tests for the locator: strategies, coordinate translation and logging

use crate::coordinates::{CoordinateLog, CoordinateLogEntry};
use crate::locator::debug::{CAPTURE_FILE, NO_MATCH_FILE, SINGLE_MATCH_FILE};
use crate::locator::{
    Capture, ImageFileCapture, LocateRequest, Locator, LocatorConfig, MatchMode,
};
use crate::template_matching::{
    BoundingBox, ChannelMode, MultiMatchFinder, Point, Region, ScoreField, encapsulate,
};
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

/// Pseudo-random color marker, so shifted placements correlate poorly
fn marker(size: u32) -> RgbImage {
    let mut state = 0x2545_f491_u32;
    RgbImage::from_fn(size, size, |_, _| {
        let mut channel = || {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            (state >> 16) as u8
        };
        Rgb([channel(), channel(), channel()])
    })
}

fn listing_scene(positions: &[(i64, i64)]) -> RgbImage {
    let mut scene = RgbImage::new(160, 120);
    let mark = marker(12);
    for &(x, y) in positions {
        image::imageops::replace(&mut scene, &mark, x, y);
    }
    scene
}

fn white_block_scene() -> DynamicImage {
    let mut capture = GrayImage::new(100, 100);
    for y in 20..30 {
        for x in 20..30 {
            capture.put_pixel(x, y, Luma([255]));
        }
    }
    DynamicImage::ImageLuma8(capture)
}

struct Workspace {
    dir: TempDir,
    history: CoordinateLog,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let history = CoordinateLog::new(dir.path().join("config").join("coordinate_log.csv"));
        Self { dir, history }
    }

    fn config(&self) -> LocatorConfig {
        LocatorConfig {
            debug_dir: Some(self.debug_dir()),
            ..LocatorConfig::default()
        }
    }

    fn debug_dir(&self) -> PathBuf {
        self.dir.path().join("logs")
    }

    fn save_template(&self, name: &str, image: DynamicImage) -> PathBuf {
        let path = self.dir.path().join(name);
        image.save(&path).unwrap();
        path
    }

    fn white_template(&self, size: u32) -> PathBuf {
        self.save_template(
            &format!("white{size}.png"),
            DynamicImage::ImageLuma8(GrayImage::from_pixel(size, size, Luma([255]))),
        )
    }
}

fn exists(dir: &Path, file: &str) -> bool {
    dir.join(file).exists()
}

#[test]
fn test_find_all_three_markers_and_encapsulate() {
    let scene = DynamicImage::ImageRgb8(listing_scene(&[(10, 10), (70, 40), (120, 90)]));
    let template = DynamicImage::ImageRgb8(marker(12));

    let finder = MultiMatchFinder::new(ScoreField::new(ChannelMode::Color));
    let boxes = finder.find_all(&scene, &template, 0.8);

    let corners: Vec<Point> = boxes.iter().map(|b| b.top_left()).collect();
    assert_eq!(
        corners,
        vec![Point::new(10, 10), Point::new(70, 40), Point::new(120, 90)]
    );

    let covering = encapsulate(&boxes).unwrap();
    assert_eq!(
        covering,
        BoundingBox::new(Point::new(10, 10), Point::new(132, 102)).unwrap()
    );
}

#[test]
fn test_single_match_logs_box_and_targets_bottom_edge() {
    let ws = Workspace::new();
    let template = ws.white_template(10);
    let locator = Locator::new(&ws.history, ws.config());

    let outcome = locator
        .locate(
            &Capture::full_screen(white_block_scene()),
            &LocateRequest::new(&template, MatchMode::SingleGrayscale),
        )
        .expect("white block should be found");

    let expected = BoundingBox::new(Point::new(20, 20), Point::new(30, 30)).unwrap();
    assert_eq!(outcome.logged, expected);
    assert_eq!(outcome.matches.len(), 1);
    assert!((outcome.matches[0].confidence - 1.0).abs() < 1e-4);
    assert_eq!(outcome.target(), Some(Point::new(25, 30)));

    assert_eq!(
        ws.history.read_all().unwrap(),
        vec![CoordinateLogEntry::from(expected)]
    );
    assert!(exists(&ws.debug_dir(), CAPTURE_FILE));
    assert!(exists(&ws.debug_dir(), SINGLE_MATCH_FILE));
    assert!(!exists(&ws.debug_dir(), NO_MATCH_FILE));
}

#[test]
fn test_region_restriction_is_untranslated() {
    let ws = Workspace::new();
    let template = ws.white_template(10);
    let locator = Locator::new(&ws.history, ws.config());

    // The capture itself is a screen region starting at (500, 300)
    let capture = Capture::at(white_block_scene(), Point::new(500, 300));
    let request = LocateRequest::new(&template, MatchMode::SingleGrayscale)
        .restricted_to(Region::new(510, 305, 60, 60).ok());

    let outcome = locator.locate(&capture, &request).unwrap();
    assert_eq!(outcome.logged.top_left(), Point::new(520, 320));
    assert_eq!(outcome.logged.bottom_right(), Point::new(530, 330));
    assert_eq!(outcome.target(), Some(Point::new(525, 330)));
    assert_eq!(ws.history.read_all().unwrap()[0].top_left, Point::new(520, 320));
}

#[test]
fn test_restriction_outside_capture_fails_quietly() {
    let ws = Workspace::new();
    let template = ws.white_template(10);
    let locator = Locator::new(&ws.history, ws.config());

    let request = LocateRequest::new(&template, MatchMode::SingleGrayscale)
        .restricted_to(Region::new(1000, 1000, 50, 50).ok());
    assert!(
        locator
            .locate(&Capture::full_screen(white_block_scene()), &request)
            .is_none()
    );
    assert!(ws.history.read_all().unwrap().is_empty());
}

#[test]
fn test_multiscale_mode_finds_resized_marker() {
    let ws = Workspace::new();
    let template = ws.white_template(15);
    let locator = Locator::new(&ws.history, ws.config());
    let capture = Capture::full_screen(white_block_scene());

    let fixed = LocateRequest::new(&template, MatchMode::SingleGrayscale).with_threshold(0.99);
    assert!(locator.locate(&capture, &fixed).is_none());
    assert!(exists(&ws.debug_dir(), NO_MATCH_FILE));

    let scaled =
        LocateRequest::new(&template, MatchMode::SingleGrayscaleMultiScale).with_threshold(0.99);
    let outcome = locator.locate(&capture, &scaled).unwrap();
    assert!(outcome.matches[0].scale < 1.0);
    assert_eq!(ws.history.read_all().unwrap().len(), 1);
}

#[test]
fn test_all_matches_mode_logs_covering_box() {
    let ws = Workspace::new();
    let template = ws.save_template("EasyApplySmall.png", DynamicImage::ImageRgb8(marker(12)));
    let locator = Locator::new(&ws.history, ws.config());
    let capture = Capture::full_screen(DynamicImage::ImageRgb8(listing_scene(&[
        (10, 10),
        (70, 40),
        (120, 90),
    ])));
    let request = LocateRequest::new(&template, MatchMode::AllMatchesColor)
        .with_threshold(0.8)
        .restricted_to(Region::new(5, 5, 150, 110).ok());

    let outcome = locator.locate(&capture, &request).unwrap();
    assert_eq!(outcome.matches.len(), 3);
    assert_eq!(
        outcome.targets,
        vec![Point::new(16, 16), Point::new(76, 46), Point::new(126, 96)]
    );
    assert_eq!(
        outcome.logged,
        BoundingBox::new(Point::new(10, 10), Point::new(132, 102)).unwrap()
    );
    assert_eq!(
        ws.history.read_all().unwrap(),
        vec![CoordinateLogEntry::from(outcome.logged)]
    );
}

#[test]
fn test_no_match_leaves_log_untouched() {
    let ws = Workspace::new();
    let template = ws.save_template("marker.png", DynamicImage::ImageRgb8(marker(12)));
    let locator = Locator::new(&ws.history, ws.config());
    let capture = Capture::full_screen(DynamicImage::ImageRgb8(RgbImage::new(80, 80)));

    let request = LocateRequest::new(&template, MatchMode::AllMatchesColor);
    assert!(locator.locate(&capture, &request).is_none());
    assert!(!ws.history.path().exists());
    assert!(exists(&ws.debug_dir(), CAPTURE_FILE));
    assert!(exists(&ws.debug_dir(), NO_MATCH_FILE));
}

#[test]
fn test_unreadable_template_is_not_fatal() {
    let ws = Workspace::new();
    let locator = Locator::new(&ws.history, ws.config());
    let capture = Capture::full_screen(white_block_scene());
    let request = LocateRequest::new(ws.dir.path().join("Missing.png"), MatchMode::SingleGrayscale);

    assert!(locator.try_locate(&capture, &request).is_err());
    assert!(locator.locate(&capture, &request).is_none());
    assert!(exists(&ws.debug_dir(), NO_MATCH_FILE));
    assert!(ws.history.read_all().unwrap().is_empty());
}

#[test]
fn test_log_is_limited_after_each_append() {
    let ws = Workspace::new();
    let template = ws.white_template(10);
    let config = LocatorConfig {
        log_limit: 2,
        debug_dir: None,
        ..LocatorConfig::default()
    };
    let locator = Locator::new(&ws.history, config);
    let request = LocateRequest::new(&template, MatchMode::SingleGrayscale);

    for _ in 0..4 {
        assert!(
            locator
                .locate(&Capture::full_screen(white_block_scene()), &request)
                .is_some()
        );
    }
    assert_eq!(ws.history.read_all().unwrap().len(), 2);
    assert!(!ws.debug_dir().exists());
}

#[test]
fn test_failed_trim_keeps_logged_match() {
    let ws = Workspace::new();
    let template = ws.white_template(10);
    // Not UTF-8: appending works, reading the log back for trimming does not
    std::fs::create_dir_all(ws.history.path().parent().unwrap()).unwrap();
    std::fs::write(ws.history.path(), [0xff, 0xfe, b'\n']).unwrap();

    let locator = Locator::new(&ws.history, ws.config());
    let outcome = locator.locate(
        &Capture::full_screen(white_block_scene()),
        &LocateRequest::new(&template, MatchMode::SingleGrayscale),
    );

    assert!(outcome.is_some());
    let raw = std::fs::read(ws.history.path()).unwrap();
    assert!(raw.ends_with(b"\"(20, 20)\",\"(30, 30)\"\n"));
    assert!(!exists(&ws.debug_dir(), NO_MATCH_FILE));
}

#[test]
fn test_capture_and_locate_through_file_source() {
    let ws = Workspace::new();
    let template = ws.white_template(10);
    let screenshot = ws.dir.path().join("screen.png");
    white_block_scene().save(&screenshot).unwrap();

    let locator = Locator::new(&ws.history, ws.config());
    let mut source = ImageFileCapture::new(&screenshot);
    let outcome = locator
        .capture_and_locate(
            &mut source,
            Region::new(15, 15, 40, 40).ok(),
            &LocateRequest::new(&template, MatchMode::SingleGrayscale),
        )
        .unwrap();
    assert_eq!(outcome.logged.top_left(), Point::new(20, 20));
}

#[test]
fn test_mode_flags() {
    assert_eq!(MatchMode::from_flags(true, true), MatchMode::AllMatchesColor);
    assert_eq!(
        MatchMode::from_flags(false, true),
        MatchMode::SingleGrayscaleMultiScale
    );
    assert_eq!(MatchMode::from_flags(false, false), MatchMode::SingleGrayscale);
    assert_eq!(MatchMode::AllMatchesColor.channels(), ChannelMode::Color);
}
