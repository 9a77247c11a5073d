//! Coordinate history and search region estimation
//!
//! Every successful locate call appends its box to the [`CoordinateLog`].
//! [`RegionOptimizer`] periodically recomputes a trusted search region from
//! the whole log, which [`RegionStore`] persists for the next capture.

pub mod coordinate_log;
pub mod optimizer;
pub mod store;
pub mod visualize;

pub use coordinate_log::{CoordinateLog, CoordinateLogEntry};
pub use optimizer::{AxisStats, OptimizedRegion, PerAxis, RegionOptimizer, remove_outliers};
pub use store::RegionStore;
pub use visualize::{render_overview, save_overview};
