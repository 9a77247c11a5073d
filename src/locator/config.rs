//! Configuration for locate and optimize runs

use crate::coordinates::RegionOptimizer;
use crate::error::{LocatorError, LocatorResult};
use crate::template_matching::{ResizeFilter, ScaleSweep};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Confidence threshold used when a request does not set its own (0.0 to 1.0)
    pub match_threshold: f32,
    /// Template scales tried by the multi-scale mode
    pub scale_sweep: ScaleSweep,
    /// Resampling filter for scaled templates
    pub resize_filter: ResizeFilter,
    /// Coordinate log rows kept after each append
    pub log_limit: usize,
    pub coordinate_log_path: PathBuf,
    /// Where the optimized search region is persisted
    pub region_path: PathBuf,
    /// Directory for capture and match images; `None` disables them
    pub debug_dir: Option<PathBuf>,
    /// Also save the crop covering all matches in all-matches mode
    pub visual_debug: bool,
    /// IQR multiplier for outlier removal; `None` keeps every logged value
    pub iqr_multiplier: Option<f64>,
    /// Standard deviations added around the optimized region
    pub region_inflation: f64,
    pub screen_width: u32,
    pub screen_height: u32,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        let optimizer = RegionOptimizer::default();
        Self {
            match_threshold: 0.75,
            scale_sweep: ScaleSweep::default(),
            resize_filter: ResizeFilter::default(),
            log_limit: 20,
            coordinate_log_path: PathBuf::from("config/coordinate_log.csv"),
            region_path: PathBuf::from("config/automation_config.json"),
            debug_dir: Some(PathBuf::from("logs")),
            visual_debug: false,
            iqr_multiplier: optimizer.iqr_multiplier,
            region_inflation: optimizer.inflation,
            screen_width: 2560,
            screen_height: 1440,
        }
    }
}

impl LocatorConfig {
    /// Load a JSON config; a missing file yields the defaults
    pub fn load(path: &Path) -> LocatorResult<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(LocatorError::io(path, e)),
        };
        serde_json::from_str(&content).map_err(|source| LocatorError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn optimizer(&self) -> RegionOptimizer {
        RegionOptimizer {
            iqr_multiplier: self.iqr_multiplier,
            inflation: self.region_inflation,
        }
    }
}

/// Configuration preset for listing rows (many marker instances per screen)
pub fn create_listing_config() -> LocatorConfig {
    LocatorConfig {
        match_threshold: 0.75,
        visual_debug: true,
        ..LocatorConfig::default()
    }
}

/// Configuration preset for exact UI buttons
pub fn create_button_config() -> LocatorConfig {
    LocatorConfig {
        match_threshold: 0.99,
        scale_sweep: ScaleSweep::fixed(),
        ..LocatorConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_defaults() {
        let config = LocatorConfig::default();
        assert_eq!(config.match_threshold, 0.75);
        assert_eq!(config.log_limit, 20);
        assert_eq!(config.scale_sweep.steps, 20);
        assert_eq!(config.iqr_multiplier, Some(3.0));
        assert!(!config.visual_debug);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = LocatorConfig::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, LocatorConfig::default());
    }

    #[test]
    fn test_partial_file_overrides_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("locator.json");
        std::fs::write(
            &path,
            r#"{"match_threshold": 0.9, "log_limit": 5, "debug_dir": null, "scale_sweep": {"min": 0.8, "max": 1.2, "steps": 5}}"#,
        )
        .unwrap();

        let config = LocatorConfig::load(&path).unwrap();
        assert_eq!(config.match_threshold, 0.9);
        assert_eq!(config.log_limit, 5);
        assert!(config.debug_dir.is_none());
        assert_eq!(config.scale_sweep.values().len(), 5);
        assert_eq!(config.screen_width, 2560);
    }

    #[test]
    fn test_presets() {
        assert_eq!(create_button_config().match_threshold, 0.99);
        assert_eq!(create_button_config().scale_sweep.values(), vec![1.0]);
        assert!(create_listing_config().visual_debug);
    }
}
