//! Motion tracker: rolling position history per object and the movement
//! signals derived from it.
//!
//! # Signals
//! - **direction_changes**: reversals between successive movement directions.
//!   Only deltas longer than `min_movement` produce a direction; shorter ones
//!   are treated as sensor noise.
//! - **total_distance**: path length over *all* raw deltas in the window,
//!   noise included.
//! - **displacement**: straight-line distance first → last retained sample.

use crate::types::{Sample, TrackKey, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Two successive directions with a dot product below this count as a
/// reversal (angle between them larger than ~107°).
pub const REVERSAL_DOT_THRESHOLD: f64 = -0.3;

/// Lower bound for the displacement used as the wiggle-ratio denominator.
pub const DISPLACEMENT_FLOOR: f64 = 0.1;

/// Fewest retained samples for which signals are produced.
pub const MIN_SAMPLES: usize = 3;

/// Fewest direction vectors for which signals are produced.
pub const MIN_DIRECTIONS: usize = 2;

/// Movement signals computed from one object's current window.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Signals {
    /// Number of direction reversals in the window
    pub direction_changes: u32,
    /// Sum of the lengths of all consecutive raw deltas
    pub total_distance: f64,
    /// Distance between first and last retained sample
    pub displacement: f64,
    /// Number of samples the signals were computed from
    pub sample_count: usize,
}

impl Signals {
    /// Path length over net displacement. High means lots of motion going
    /// nowhere. The denominator never drops below [`DISPLACEMENT_FLOOR`].
    pub fn wiggle_ratio(&self) -> f64 {
        self.total_distance / self.displacement.max(DISPLACEMENT_FLOOR)
    }
}

/// Chronological samples of one object, pruned to the time window.
#[derive(Clone, Debug, Default)]
pub struct TrackState {
    samples: VecDeque<Sample>,
}

impl TrackState {
    pub fn samples(&self) -> &VecDeque<Sample> {
        &self.samples
    }

    fn push(&mut self, sample: Sample) {
        self.samples.push_back(sample);
    }

    /// Drop every sample at least `window` seconds older than `now`.
    /// Filters the whole sequence instead of popping from the front only.
    fn prune(&mut self, now: f64, window: f64) {
        self.samples.retain(|s| s.age(now) < window);
    }

    fn signals(&self, min_movement: f64) -> Option<Signals> {
        if self.samples.len() < MIN_SAMPLES {
            return None;
        }

        let deltas: Vec<Vec2> = self
            .samples
            .iter()
            .zip(self.samples.iter().skip(1))
            .map(|(a, b)| b.position - a.position)
            .collect();

        // Zero-length deltas must never reach normalize(), even with a negative floor
        let floor = min_movement.max(0.0);
        let directions: Vec<Vec2> = deltas
            .iter()
            .filter(|d| d.norm() > floor)
            .map(|d| d.normalize())
            .collect();

        if directions.len() < MIN_DIRECTIONS {
            return None;
        }

        let direction_changes = directions
            .windows(2)
            .filter(|pair| pair[1].dot(&pair[0]) < REVERSAL_DOT_THRESHOLD)
            .count() as u32;

        let total_distance: f64 = deltas.iter().map(|d| d.norm()).sum();

        // Non-empty: len >= MIN_SAMPLES checked above
        let first = self.samples.front()?.position;
        let last = self.samples.back()?.position;

        Some(Signals {
            direction_changes,
            total_distance,
            displacement: (last - first).norm(),
            sample_count: self.samples.len(),
        })
    }
}

/// Owns the rolling history of every tracked object.
#[derive(Clone, Debug)]
pub struct MotionTracker {
    time_window: f64,
    tracks: HashMap<TrackKey, TrackState>,
}

impl MotionTracker {
    pub fn new(time_window: f64) -> Self {
        Self {
            time_window,
            tracks: HashMap::new(),
        }
    }

    pub fn time_window(&self) -> f64 {
        self.time_window
    }

    /// Change the eviction window. Takes effect on the next `record`.
    pub fn set_time_window(&mut self, time_window: f64) {
        self.time_window = time_window;
    }

    /// Append a sample for `key` and evict everything outside the window.
    pub fn record(&mut self, key: TrackKey, position: Vec2, now: f64) {
        let window = self.time_window;
        let track = self.tracks.entry(key).or_default();
        track.push(Sample::new(now, position));
        track.prune(now, window);
    }

    /// Derived movement signals for `key`, or `None` when there is not enough
    /// data in the window to say anything.
    pub fn signals(&self, key: &TrackKey, min_movement: f64) -> Option<Signals> {
        self.tracks.get(key)?.signals(min_movement)
    }

    /// Forget everything about `key`. No-op for unknown keys.
    pub fn clear(&mut self, key: &TrackKey) {
        self.tracks.remove(key);
    }

    /// Forget every tracked object.
    pub fn reset_all(&mut self) {
        self.tracks.clear();
    }

    /// Keep only the objects for which `keep` returns true.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&TrackKey) -> bool,
    {
        self.tracks.retain(|key, _| keep(key));
    }

    pub fn samples(&self, key: &TrackKey) -> Option<&VecDeque<Sample>> {
        self.tracks.get(key).map(TrackState::samples)
    }

    pub fn is_tracking(&self, key: &TrackKey) -> bool {
        self.tracks.contains_key(key)
    }

    /// Number of objects with tracking state.
    pub fn tracked_len(&self) -> usize {
        self.tracks.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
