//! Marker location for screen automation
//!
//! Ties capture, template loading, the matching strategies and the coordinate
//! log together behind [`Locator`], the one component callers use directly.

pub mod capture;
pub mod config;
pub mod debug;
pub mod locate;
pub mod region;
pub mod template;

#[cfg(test)]
mod tests;

// Re-export main types and functions
pub use capture::{Capture, ImageFileCapture, ScreenCapture};
pub use config::{LocatorConfig, create_button_config, create_listing_config};
pub use debug::DebugArtifacts;
pub use locate::{LocateOutcome, LocateRequest, Locator, MatchMode};
pub use region::{named_region, parse_region, resolve_region};
pub use template::Template;
