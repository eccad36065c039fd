//! Walk tracking for PawWalk
//!
//! Accumulates walking distance from a live position stream, filters noisy
//! samples, derives pace and calorie statistics and announces goal milestones.

pub mod announce;
pub mod clock;
pub mod driver;
pub mod geo;
pub mod settings;
pub mod source;
pub mod stats;
pub mod tracker;
pub mod types;

pub use announce::{AnnouncementSink, LogSink};
pub use clock::{Clock, ManualClock, SystemClock};
pub use driver::{WalkDriver, WalkHandle};
pub use geo::{haversine_km, GeoPoint};
pub use settings::TrackerSettings;
pub use source::{AccuracyTier, PositionSource, SensorFeed, StepSource, WatchOptions};
pub use stats::WalkStats;
pub use tracker::WalkTracker;
pub use types::*;
