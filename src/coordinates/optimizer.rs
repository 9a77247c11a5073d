//! Outlier-robust search region estimation
//!
//! Each axis (x1, y1, x2, y2) of the logged boxes is filtered with the
//! interquartile-range rule independently, then averaged. The emitted region
//! is inflated by `inflation` standard deviations so that it still contains
//! the marker after ordinary drift.

use super::coordinate_log::{CoordinateLog, CoordinateLogEntry};
use crate::error::LocatorResult;
use crate::template_matching::Region;

/// Values of one quantity for each box axis
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PerAxis<T> {
    pub x1: T,
    pub y1: T,
    pub x2: T,
    pub y2: T,
}

impl<T> PerAxis<T> {
    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> PerAxis<U> {
        PerAxis {
            x1: f(&self.x1),
            y1: f(&self.y1),
            x2: f(&self.x2),
            y2: f(&self.y2),
        }
    }
}

/// Statistics of one axis after outlier removal
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AxisStats {
    pub mean: f64,
    /// Population variance of the retained values
    pub variance: f64,
    pub retained: usize,
    pub total: usize,
}

impl AxisStats {
    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }

    /// Values the outlier filter discarded
    pub fn discarded(&self) -> usize {
        self.total - self.retained
    }
}

/// Search region derived from the whole coordinate log
#[derive(Clone, Debug, PartialEq)]
pub struct OptimizedRegion {
    /// Integer region, covering `estimate` and at least one pixel in each dimension
    pub region: Region,
    /// Unrounded `[x, y, width, height]`
    pub estimate: [f64; 4],
    pub axes: PerAxis<AxisStats>,
}

impl OptimizedRegion {
    pub fn axis_variance(&self) -> PerAxis<f64> {
        self.axes.map(|a| a.variance)
    }
}

/// Smallest integer region covering `[x, y, width, height]`
pub fn covering_region(x: f64, y: f64, width: f64, height: f64) -> Region {
    let left = x.floor();
    let top = y.floor();
    let right = (x + width).ceil();
    let bottom = (y + height).ceil();
    Region {
        x: left as i32,
        y: top as i32,
        width: ((right - left) as i64).max(1) as u32,
        height: ((bottom - top) as i64).max(1) as u32,
    }
}

/// Percentile with linear interpolation between closest ranks; `sorted` must be ascending
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = (pct / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
        }
    }
}

/// Values within `[Q1 - k*IQR, Q3 + k*IQR]`, in input order
pub fn remove_outliers(values: &[f64], k: f64) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let q1 = percentile(&sorted, 25.0);
    let q3 = percentile(&sorted, 75.0);
    let iqr = q3 - q1;
    let (lower, upper) = (q1 - k * iqr, q3 + k * iqr);

    values
        .iter()
        .copied()
        .filter(|v| (lower..=upper).contains(v))
        .collect()
}

fn mean_and_variance(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, variance)
}

/// Turns the coordinate history into one inflated search region
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionOptimizer {
    /// IQR multiplier; `None` disables outlier removal
    pub iqr_multiplier: Option<f64>,
    /// Standard deviations added around the mean box
    pub inflation: f64,
}

impl Default for RegionOptimizer {
    fn default() -> Self {
        Self {
            iqr_multiplier: Some(3.0),
            inflation: 2.0,
        }
    }
}

impl RegionOptimizer {
    /// Plain mean/variance of every logged value
    pub fn without_outlier_removal() -> Self {
        Self {
            iqr_multiplier: None,
            ..Self::default()
        }
    }

    fn axis_stats(&self, values: &[f64]) -> AxisStats {
        let filtered = match self.iqr_multiplier {
            Some(k) => remove_outliers(values, k),
            None => values.to_vec(),
        };
        // Pathological filtering falls back to the unfiltered set
        let retained = if filtered.is_empty() { values } else { &filtered };

        let (mean, variance) = mean_and_variance(retained);
        AxisStats {
            mean,
            variance,
            retained: retained.len(),
            total: values.len(),
        }
    }

    /// Recompute the region from every entry; `None` for an empty log
    pub fn optimize(&self, entries: &[CoordinateLogEntry]) -> Option<OptimizedRegion> {
        if entries.is_empty() {
            return None;
        }

        let column = |f: fn(&CoordinateLogEntry) -> i32| -> Vec<f64> {
            entries.iter().map(|e| f(e) as f64).collect()
        };
        let axes = PerAxis {
            x1: self.axis_stats(&column(|e| e.top_left.x)),
            y1: self.axis_stats(&column(|e| e.top_left.y)),
            x2: self.axis_stats(&column(|e| e.bottom_right.x)),
            y2: self.axis_stats(&column(|e| e.bottom_right.y)),
        };

        let k = self.inflation;
        let width = (axes.x2.mean - axes.x1.mean) + k * axes.x2.std_dev();
        let height = (axes.y2.mean - axes.y1.mean) + k * axes.y2.std_dev();
        let x = axes.x1.mean - k * axes.x1.std_dev();
        let y = axes.y1.mean - k * axes.y1.std_dev();

        Some(OptimizedRegion {
            region: covering_region(x, y, width, height),
            estimate: [x, y, width, height],
            axes,
        })
    }

    /// Read the log and optimize, propagating read errors
    pub fn try_optimize_log(
        &self,
        history: &CoordinateLog,
    ) -> LocatorResult<Option<OptimizedRegion>> {
        let entries = history.read_all()?;
        Ok(self.optimize(&entries))
    }

    /// Read the log and optimize; read failures are logged and yield `None`
    pub fn optimize_log(&self, history: &CoordinateLog) -> Option<OptimizedRegion> {
        match self.try_optimize_log(history) {
            Ok(Some(optimized)) => {
                log::info!(
                    "📐 Optimized region {} from {} entries",
                    optimized.region,
                    optimized.axes.x1.total
                );
                Some(optimized)
            }
            Ok(None) => {
                log::info!(
                    "No entries in {}, nothing to optimize",
                    history.path().display()
                );
                None
            }
            Err(e) => {
                log::warn!("⚠️ Region optimization failed: {e}");
                None
            }
        }
    }
}
