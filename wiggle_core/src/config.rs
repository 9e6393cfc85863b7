//! Detector thresholds, sensitivity presets and host-facing settings.

use serde::{Deserialize, Serialize};

/// Thresholds used by the tracker and the classifier for one evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WiggleConfig {
    /// Rolling window analysed per object (seconds)
    pub time_window: f64,
    /// Deltas no longer than this are noise, not movement (pixels)
    pub min_movement: f64,
    /// Reversals required for a wiggle
    pub direction_changes_threshold: u32,
    /// Path length / displacement must exceed this
    pub wiggle_ratio_threshold: f64,
    /// Path length must exceed this (pixels)
    pub min_total_distance: f64,
}

impl Default for WiggleConfig {
    fn default() -> Self {
        let mut config = Self {
            time_window: 0.5,
            min_movement: 5.0,
            direction_changes_threshold: 0,
            wiggle_ratio_threshold: 0.0,
            min_total_distance: 0.0,
        };
        Sensitivity::default().apply(&mut config);
        config
    }
}

/// How much wiggling it takes to trigger a disconnect.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sensitivity {
    /// Requires very aggressive wiggling
    Low,
    /// Balanced
    #[default]
    Medium,
    /// Detects gentle wiggling
    High,
}

impl Sensitivity {
    pub const ALL: [Sensitivity; 3] = [Sensitivity::Low, Sensitivity::Medium, Sensitivity::High];

    /// (direction_changes_threshold, wiggle_ratio_threshold, min_total_distance)
    pub fn thresholds(self) -> (u32, f64, f64) {
        match self {
            Sensitivity::Low => (5, 4.0, 150.0),
            Sensitivity::Medium => (3, 3.0, 100.0),
            Sensitivity::High => (2, 2.0, 50.0),
        }
    }

    /// Overwrite the preset-controlled thresholds of `config` in one step.
    /// `time_window` and `min_movement` are left alone.
    pub fn apply(self, config: &mut WiggleConfig) {
        let (changes, ratio, distance) = self.thresholds();
        config.direction_changes_threshold = changes;
        config.wiggle_ratio_threshold = ratio;
        config.min_total_distance = distance;
    }

    pub fn label(self) -> &'static str {
        match self {
            Sensitivity::Low => "low",
            Sensitivity::Medium => "medium",
            Sensitivity::High => "high",
        }
    }
}

/// Everything the host exposes to the operator.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WiggleSettings {
    /// Master switch; a disabled driver stops and drops its state
    pub enabled: bool,
    /// Last preset chosen by the operator
    pub sensitivity: Sensitivity,
    /// Thresholds currently in effect
    pub config: WiggleConfig,
}

impl WiggleSettings {
    /// Enabled settings with the given preset applied.
    pub fn enabled_with(sensitivity: Sensitivity) -> Self {
        let mut settings = Self {
            enabled: true,
            ..Default::default()
        };
        settings.set_sensitivity(sensitivity);
        settings
    }

    /// Select a preset and overwrite the thresholds it controls.
    pub fn set_sensitivity(&mut self, sensitivity: Sensitivity) {
        self.sensitivity = sensitivity;
        sensitivity.apply(&mut self.config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_medium_preset() {
        let cfg = WiggleConfig::default();
        assert_eq!(cfg.time_window, 0.5);
        assert_eq!(cfg.min_movement, 5.0);
        assert_eq!(cfg.direction_changes_threshold, 3);
        assert_eq!(cfg.wiggle_ratio_threshold, 3.0);
        assert_eq!(cfg.min_total_distance, 100.0);
        assert!(!WiggleSettings::default().enabled);
    }

    #[test]
    fn preset_table() {
        let mut s = WiggleSettings::default();
        s.set_sensitivity(Sensitivity::Low);
        assert_eq!(s.config.direction_changes_threshold, 5);
        assert_eq!(s.config.wiggle_ratio_threshold, 4.0);
        assert_eq!(s.config.min_total_distance, 150.0);

        s.set_sensitivity(Sensitivity::High);
        assert_eq!(s.config.direction_changes_threshold, 2);
        assert_eq!(s.config.wiggle_ratio_threshold, 2.0);
        assert_eq!(s.config.min_total_distance, 50.0);
        assert_eq!(s.sensitivity, Sensitivity::High);
    }

    #[test]
    fn preset_leaves_window_and_noise_floor() {
        let mut s = WiggleSettings::default();
        s.config.time_window = 1.5;
        s.config.min_movement = 12.0;
        s.set_sensitivity(Sensitivity::Low);
        assert_eq!(s.config.time_window, 1.5);
        assert_eq!(s.config.min_movement, 12.0);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let s: WiggleSettings =
            serde_json::from_str(r#"{"enabled": true, "sensitivity": "HIGH", "config": {"time_window": 0.8}}"#)
                .expect("valid settings");
        assert!(s.enabled);
        assert_eq!(s.sensitivity, Sensitivity::High);
        assert_eq!(s.config.time_window, 0.8);
        assert_eq!(s.config.min_movement, 5.0);
    }
}
