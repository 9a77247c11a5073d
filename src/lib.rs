pub mod coordinates;
pub mod error;
pub mod locator;
pub mod template_matching;

pub use coordinates::{CoordinateLog, RegionOptimizer, RegionStore};
pub use error::{LocatorError, LocatorResult};
pub use locator::{LocateRequest, Locator, LocatorConfig, MatchMode};
