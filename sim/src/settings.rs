//! Settings files: JSON `WiggleSettings`, checked against the ranges an
//! editor UI would let the operator pick from.

use anyhow::{ensure, Context};
use std::io::BufReader;
use std::path::Path;
use std::ops::RangeInclusive;
use wiggle_core::config::{WiggleConfig, WiggleSettings};

pub const TIME_WINDOW_RANGE: RangeInclusive<f64> = 0.1..=2.0;
pub const DIRECTION_CHANGES_RANGE: RangeInclusive<u32> = 1..=10;
pub const WIGGLE_RATIO_RANGE: RangeInclusive<f64> = 1.5..=10.0;
pub const MIN_MOVEMENT_RANGE: RangeInclusive<f64> = 1.0..=50.0;
pub const MIN_TOTAL_DISTANCE_RANGE: RangeInclusive<f64> = 20.0..=500.0;

/// Reject thresholds outside the operator-facing ranges.
pub fn validate_config(config: &WiggleConfig) -> anyhow::Result<()> {
    ensure!(
        TIME_WINDOW_RANGE.contains(&config.time_window),
        "time_window {} outside {:?}",
        config.time_window,
        TIME_WINDOW_RANGE
    );
    ensure!(
        DIRECTION_CHANGES_RANGE.contains(&config.direction_changes_threshold),
        "direction_changes_threshold {} outside {:?}",
        config.direction_changes_threshold,
        DIRECTION_CHANGES_RANGE
    );
    ensure!(
        WIGGLE_RATIO_RANGE.contains(&config.wiggle_ratio_threshold),
        "wiggle_ratio_threshold {} outside {:?}",
        config.wiggle_ratio_threshold,
        WIGGLE_RATIO_RANGE
    );
    ensure!(
        MIN_MOVEMENT_RANGE.contains(&config.min_movement),
        "min_movement {} outside {:?}",
        config.min_movement,
        MIN_MOVEMENT_RANGE
    );
    ensure!(
        MIN_TOTAL_DISTANCE_RANGE.contains(&config.min_total_distance),
        "min_total_distance {} outside {:?}",
        config.min_total_distance,
        MIN_TOTAL_DISTANCE_RANGE
    );
    Ok(())
}

/// Load and validate a settings file.
pub fn load_settings(path: &Path) -> anyhow::Result<WiggleSettings> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening settings file {}", path.display()))?;
    let settings: WiggleSettings = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing settings file {}", path.display()))?;
    validate_config(&settings.config)
        .with_context(|| format!("invalid settings in {}", path.display()))?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiggle_core::config::Sensitivity;

    #[test]
    fn presets_are_valid() {
        for s in Sensitivity::ALL {
            let settings = WiggleSettings::enabled_with(s);
            validate_config(&settings.config).unwrap();
        }
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let bad = WiggleConfig {
            time_window: 5.0,
            ..Default::default()
        };
        let err = validate_config(&bad).unwrap_err();
        assert!(err.to_string().contains("time_window"));

        let bad = WiggleConfig {
            min_movement: 0.0,
            ..Default::default()
        };
        assert!(validate_config(&bad).is_err());

        let bad = WiggleConfig {
            wiggle_ratio_threshold: f64::NAN,
            ..Default::default()
        };
        assert!(validate_config(&bad).is_err());
    }

    #[test]
    fn load_from_file() {
        let path = std::env::temp_dir().join(format!("wiggle_settings_{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"enabled": true, "config": {"time_window": 0.75, "min_movement": 3.0}}"#,
        )
        .unwrap();
        let settings = load_settings(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(settings.enabled);
        assert_eq!(settings.config.time_window, 0.75);
        assert_eq!(settings.config.direction_changes_threshold, 3);
    }
}
