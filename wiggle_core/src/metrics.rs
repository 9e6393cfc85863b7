//! Detection metrics: confusion counts, precision/recall over evaluated gestures.

use serde::{Deserialize, Serialize};

/// Accumulated detection statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionMetrics {
    /// Number of gestures evaluated
    pub n_evaluated: u64,
    /// Wiggles that were detected
    pub true_positives: u64,
    /// Non-wiggles that were disconnected anyway
    pub false_positives: u64,
    /// Wiggles that went unnoticed
    pub false_negatives: u64,
    /// Non-wiggles correctly left alone
    pub true_negatives: u64,
}

impl DetectionMetrics {
    /// Precision = TP / (TP + FP)
    pub fn precision(&self) -> f64 {
        let denom = (self.true_positives + self.false_positives) as f64;
        if denom == 0.0 { 1.0 } else { self.true_positives as f64 / denom }
    }

    /// Recall = TP / (TP + FN)
    pub fn recall(&self) -> f64 {
        let denom = (self.true_positives + self.false_negatives) as f64;
        if denom == 0.0 { 1.0 } else { self.true_positives as f64 / denom }
    }

    /// Fraction of gestures classified correctly.
    pub fn accuracy(&self) -> f64 {
        if self.n_evaluated == 0 {
            return 1.0;
        }
        (self.true_positives + self.true_negatives) as f64 / self.n_evaluated as f64
    }

    /// Record one gesture outcome.
    pub fn accumulate(&mut self, expected_wiggle: bool, detected: bool) {
        self.n_evaluated += 1;
        match (expected_wiggle, detected) {
            (true, true) => self.true_positives += 1,
            (false, true) => self.false_positives += 1,
            (true, false) => self.false_negatives += 1,
            (false, false) => self.true_negatives += 1,
        }
    }

    /// Fold another set of counts into this one.
    pub fn merge(&mut self, other: &DetectionMetrics) {
        self.n_evaluated += other.n_evaluated;
        self.true_positives += other.true_positives;
        self.false_positives += other.false_positives;
        self.false_negatives += other.false_negatives;
        self.true_negatives += other.true_negatives;
    }
}
