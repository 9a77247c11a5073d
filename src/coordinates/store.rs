//! Persisted search region, consumed as the next run's region restriction
//!
//! File layout: `{"analyze": {"optimize_region": [x, y, width, height]}}`

use super::optimizer::{OptimizedRegion, covering_region};
use crate::error::{LocatorError, LocatorResult};
use crate::template_matching::Region;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct RegionRecord {
    analyze: AnalyzeSection,
}

#[derive(Debug, Serialize, Deserialize)]
struct AnalyzeSection {
    optimize_region: [f64; 4],
}

/// JSON file holding the latest optimized region
#[derive(Clone, Debug)]
pub struct RegionStore {
    path: PathBuf,
}

impl RegionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the store with the unrounded estimate
    pub fn save(&self, optimized: &OptimizedRegion) -> LocatorResult<()> {
        let record = RegionRecord {
            analyze: AnalyzeSection {
                optimize_region: optimized.estimate,
            },
        };
        let json = serde_json::to_string_pretty(&record).map_err(|source| LocatorError::Json {
            path: self.path.clone(),
            source,
        })?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| LocatorError::io(parent, e))?;
        }
        fs::write(&self.path, json).map_err(|e| LocatorError::io(&self.path, e))?;

        log::info!(
            "💾 Optimized region {:?} saved to {}",
            optimized.estimate,
            self.path.display()
        );
        Ok(())
    }

    /// Stored region rounded outward to whole pixels; `None` if nothing was saved yet
    pub fn load(&self) -> LocatorResult<Option<Region>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(LocatorError::io(&self.path, e)),
        };
        let record: RegionRecord =
            serde_json::from_str(&content).map_err(|source| LocatorError::Json {
                path: self.path.clone(),
                source,
            })?;

        let [x, y, width, height] = record.analyze.optimize_region;
        Ok(Some(covering_region(x, y, width, height)))
    }
}
