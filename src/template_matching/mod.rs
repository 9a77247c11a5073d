//! Template matching module for marker detection in screen captures
//!
//! This module provides:
//! - Correlation score surfaces, grayscale or fused over color channels
//! - Best-match search across a sweep of template scales
//! - All-matches extraction above a threshold
//! - Encapsulation of many hits into one covering box

pub mod encapsulate;
pub mod matcher;
pub mod score;
pub mod types;

pub use encapsulate::encapsulate;
pub use matcher::{MultiMatchFinder, MultiScaleMatcher, ResizeFilter, ScaleSweep};
pub use score::{ChannelMode, ScoreField, ScoreSurface, best_cell};
pub use types::{BoundingBox, Match, Point, Region};
