//! Wiggle classifier: turns movement signals and thresholds into a verdict.
//!
//! A wiggle needs all three at once:
//! 1. enough direction reversals,
//! 2. a high path-length to displacement ratio,
//! 3. enough total path length.

use crate::{config::WiggleConfig, motion::Signals};
use serde::{Deserialize, Serialize};

/// Per-condition breakdown of one classification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub enough_reversals: bool,
    pub ratio_exceeded: bool,
    pub distance_exceeded: bool,
    /// Wiggle ratio the decision was made on (0 when no signals)
    pub wiggle_ratio: f64,
}

impl Verdict {
    pub fn is_wiggle(&self) -> bool {
        self.enough_reversals && self.ratio_exceeded && self.distance_exceeded
    }
}

/// Evaluate every condition separately. Missing signals fail all of them.
pub fn evaluate(signals: Option<&Signals>, config: &WiggleConfig) -> Verdict {
    let Some(s) = signals else {
        return Verdict::default();
    };
    let wiggle_ratio = s.wiggle_ratio();
    Verdict {
        enough_reversals: s.direction_changes >= config.direction_changes_threshold,
        ratio_exceeded: wiggle_ratio > config.wiggle_ratio_threshold,
        distance_exceeded: s.total_distance > config.min_total_distance,
        wiggle_ratio,
    }
}

/// `true` when the signals describe a wiggle under `config`.
pub fn classify(signals: Option<&Signals>, config: &WiggleConfig) -> bool {
    evaluate(signals, config).is_wiggle()
}
