//! `wiggle_core`: Wiggle detection for dragged editor objects.
//!
//! # Module layout
//! - [`types`]     : Fundamental types (IDs, keys, samples)
//! - [`motion`]    : Rolling per-object history and derived movement signals
//! - [`classifier`]: Signals + thresholds → wiggle verdict
//! - [`config`]    : Thresholds, sensitivity presets, host settings
//! - [`driver`]    : Poll driver and host collaborator traits
//! - [`metrics`]   : Precision/recall over evaluated gestures

pub mod classifier;
pub mod config;
pub mod driver;
pub mod metrics;
pub mod motion;
pub mod types;

pub use classifier::{classify, evaluate, Verdict};
pub use config::{Sensitivity, WiggleConfig, WiggleSettings};
pub use driver::{Disconnection, LinkGraph, PollDriver, PositionSource, TickReport, POLL_INTERVAL};
pub use motion::{MotionTracker, Signals};
pub use types::{ObjectId, Sample, SurfaceId, TrackKey, Vec2};
