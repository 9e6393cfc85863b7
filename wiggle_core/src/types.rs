//! Fundamental types used across the entire workspace.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Scalar type: f64 throughout, positions are editor-space pixels.
// ---------------------------------------------------------------------------

/// 2D position or displacement in editor space: [x, y]
pub type Vec2 = Vector2<f64>;

// ---------------------------------------------------------------------------
// Identifier types: newtype wrappers so IDs are never confused at compile time
// ---------------------------------------------------------------------------

/// One editable graph surface (e.g. a node tree open in an editor).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SurfaceId(pub u64);

/// One movable object (node) living on a surface.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ObjectId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G{}", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// Identity of a tracked object for the lifetime of a tracking session.
///
/// The same object id on two different surfaces is two distinct keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackKey {
    pub surface: SurfaceId,
    pub object: ObjectId,
}

impl TrackKey {
    pub fn new(surface: SurfaceId, object: ObjectId) -> Self {
        Self { surface, object }
    }
}

impl fmt::Display for TrackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.surface, self.object)
    }
}

// ---------------------------------------------------------------------------
// Sample
// ---------------------------------------------------------------------------

/// A single timestamped position observation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Monotonic time in seconds
    pub timestamp: f64,
    /// Object position at `timestamp`
    pub position: Vec2,
}

impl Sample {
    pub fn new(timestamp: f64, position: Vec2) -> Self {
        Self {
            timestamp,
            position,
        }
    }

    /// Age of this sample relative to `now` (seconds).
    pub fn age(&self, now: f64) -> f64 {
        now - self.timestamp
    }
}
