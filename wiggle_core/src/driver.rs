//! Poll driver: one detection cycle per scheduler tick.
//!
//! # Processing steps per tick
//! 1. Bail out if detection is disabled (stop + reset) or not running
//! 2. Ask the host for the active surface; none → no-op tick
//! 3. Forget objects that left the selection, then read the position of
//!    every relevant (selected) object
//! 4. Skip objects that have not moved since the previous tick
//! 5. Record the sample, derive signals, classify
//! 6. On a wiggle: disconnect the object, then forget its history
//!
//! The driver is the only writer of the tracker. `tick` takes `&mut self`,
//! so it can never run concurrently with itself.

use crate::{
    classifier::evaluate,
    config::{Sensitivity, WiggleConfig, WiggleSettings},
    motion::{MotionTracker, Signals},
    types::{ObjectId, SurfaceId, TrackKey, Vec2},
};
use std::collections::HashMap;

/// Fixed polling cadence (seconds): 50 evaluations per second.
pub const POLL_INTERVAL: f64 = 0.02;

// ---------------------------------------------------------------------------
// Host collaborators
// ---------------------------------------------------------------------------

/// Read access to the host's editor.
pub trait PositionSource {
    /// Surface currently being edited, if any.
    fn active_surface(&self) -> Option<SurfaceId>;
    /// Objects to watch this tick (typically the selection).
    fn relevant_objects(&self, surface: SurfaceId) -> Vec<ObjectId>;
    /// Current position of `object`, `None` if it no longer exists.
    fn current_position(&self, surface: SurfaceId, object: ObjectId) -> Option<Vec2>;
}

/// Write access to the host's relationship graph.
pub trait LinkGraph {
    /// Remove every relationship touching `object`. Returns how many were
    /// removed (0 when there were none).
    fn disconnect(&mut self, surface: SurfaceId, object: ObjectId) -> usize;
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// One object that was disconnected because it was wiggled.
#[derive(Clone, Debug, PartialEq)]
pub struct Disconnection {
    pub key: TrackKey,
    pub links_removed: usize,
    /// Signals that triggered the disconnect
    pub signals: Signals,
}

/// What happened during one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Objects whose new position was recorded and classified
    pub evaluated: usize,
    /// Objects skipped because they had not moved
    pub unchanged: usize,
    /// The host had no active surface; nothing was evaluated
    pub surface_missing: bool,
    pub disconnections: Vec<Disconnection>,
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Owns a tracking session: tracker, settings and last-seen positions.
pub struct PollDriver {
    settings: WiggleSettings,
    tracker: MotionTracker,
    last_positions: HashMap<TrackKey, Vec2>,
    running: bool,
}

impl PollDriver {
    /// Create a driver. It does not poll until [`PollDriver::start`] is called
    /// (or [`PollDriver::set_enabled`] with `true`).
    pub fn new(settings: WiggleSettings) -> Self {
        let tracker = MotionTracker::new(settings.config.time_window);
        Self {
            settings,
            tracker,
            last_positions: HashMap::new(),
            running: false,
        }
    }

    pub fn settings(&self) -> &WiggleSettings {
        &self.settings
    }

    pub fn tracker(&self) -> &MotionTracker {
        &self.tracker
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Replace every threshold at once.
    pub fn replace_config(&mut self, config: WiggleConfig) {
        self.tracker.set_time_window(config.time_window);
        self.settings.config = config;
    }

    /// Apply a sensitivity preset.
    pub fn set_sensitivity(&mut self, sensitivity: Sensitivity) {
        self.settings.set_sensitivity(sensitivity);
        tracing::debug!(sensitivity = sensitivity.label(), "Sensitivity preset applied");
    }

    /// Begin a fresh session. Any previous state is discarded.
    pub fn start(&mut self) {
        self.reset_session();
        self.running = true;
        tracing::info!("Wiggle detection started");
    }

    /// End the session, synchronously discarding all tracking state.
    pub fn stop(&mut self) {
        self.reset_session();
        if self.running {
            tracing::info!("Wiggle detection stopped");
        }
        self.running = false;
    }

    /// Toggle detection; enabling starts a new session, disabling stops it.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.settings.enabled = enabled;
        if enabled {
            self.start();
        } else {
            self.stop();
        }
    }

    fn reset_session(&mut self) {
        self.tracker.reset_all();
        self.last_positions.clear();
    }

    /// Run one detection cycle at time `now` (seconds, monotonic).
    pub fn tick<H>(&mut self, host: &mut H, now: f64) -> TickReport
    where
        H: PositionSource + LinkGraph,
    {
        let mut report = TickReport::default();

        // ----------------------------------------------------------------
        // Step 1: enabled / running
        // ----------------------------------------------------------------
        if !self.settings.enabled {
            if self.running {
                self.stop();
            }
            return report;
        }
        if !self.running {
            return report;
        }

        // ----------------------------------------------------------------
        // Step 2: active surface
        // ----------------------------------------------------------------
        let Some(surface) = host.active_surface() else {
            report.surface_missing = true;
            return report;
        };

        // ----------------------------------------------------------------
        // Step 3-6: per-object evaluation
        // ----------------------------------------------------------------
        let relevant = host.relevant_objects(surface);
        self.evict_unselected(surface, &relevant);

        for object in relevant {
            let Some(position) = host.current_position(surface, object) else {
                continue;
            };
            let key = TrackKey::new(surface, object);

            if self.last_positions.get(&key) == Some(&position) {
                report.unchanged += 1;
                continue;
            }
            self.last_positions.insert(key, position);

            report.evaluated += 1;
            let config = &self.settings.config;
            self.tracker.record(key, position, now);
            let signals = self.tracker.signals(&key, config.min_movement);
            let verdict = evaluate(signals.as_ref(), config);

            if !verdict.is_wiggle() {
                continue;
            }
            let Some(signals) = signals else {
                continue;
            };

            let links_removed = host.disconnect(surface, object);
            if links_removed > 0 {
                tracing::info!(
                    %key,
                    links_removed,
                    direction_changes = signals.direction_changes,
                    wiggle_ratio = verdict.wiggle_ratio,
                    "Disconnected wiggled object"
                );
            } else {
                tracing::info!(%key, "Wiggle detected but object had no links");
            }
            self.tracker.clear(&key);
            report.disconnections.push(Disconnection {
                key,
                links_removed,
                signals,
            });
        }

        report
    }

    /// Drop history and last-seen positions of objects that are not relevant
    /// on `surface` this tick.
    fn evict_unselected(&mut self, surface: SurfaceId, relevant: &[ObjectId]) {
        let keep = |key: &TrackKey| key.surface == surface && relevant.contains(&key.object);
        let before = self.last_positions.len();
        self.last_positions.retain(|key, _| keep(key));
        self.tracker.retain(keep);
        let evicted = before - self.last_positions.len();
        if evicted > 0 {
            tracing::debug!(evicted, "Forgot objects no longer selected");
        }
    }

    /// Disconnect every relevant object on the active surface right away,
    /// without waiting for a wiggle. Returns the total number of links removed.
    pub fn disconnect_selected<H>(&mut self, host: &mut H) -> usize
    where
        H: PositionSource + LinkGraph,
    {
        let Some(surface) = host.active_surface() else {
            tracing::warn!("No active surface, nothing to disconnect");
            return 0;
        };

        let mut total = 0;
        for object in host.relevant_objects(surface) {
            total += host.disconnect(surface, object);
            self.tracker.clear(&TrackKey::new(surface, object));
        }

        if total > 0 {
            tracing::info!(links_removed = total, "Removed links from selected objects");
        } else {
            tracing::info!("No links to remove");
        }
        total
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    /// Minimal in-memory host: positions and link counts per object.
    #[derive(Default)]
    struct FakeHost {
        surface: Option<SurfaceId>,
        positions: BTreeMap<ObjectId, Vec2>,
        selected: Vec<ObjectId>,
        links: BTreeMap<ObjectId, usize>,
        disconnect_calls: usize,
    }

    impl FakeHost {
        fn with_node(links: usize) -> Self {
            let mut host = FakeHost {
                surface: Some(SurfaceId(1)),
                ..Default::default()
            };
            host.positions.insert(ObjectId(0), Vec2::zeros());
            host.selected.push(ObjectId(0));
            host.links.insert(ObjectId(0), links);
            host
        }

        fn move_to(&mut self, x: f64, y: f64) {
            self.positions.insert(ObjectId(0), Vec2::new(x, y));
        }
    }

    impl PositionSource for FakeHost {
        fn active_surface(&self) -> Option<SurfaceId> {
            self.surface
        }
        fn relevant_objects(&self, _surface: SurfaceId) -> Vec<ObjectId> {
            self.selected.clone()
        }
        fn current_position(&self, _surface: SurfaceId, object: ObjectId) -> Option<Vec2> {
            self.positions.get(&object).copied()
        }
    }

    impl LinkGraph for FakeHost {
        fn disconnect(&mut self, _surface: SurfaceId, object: ObjectId) -> usize {
            self.disconnect_calls += 1;
            self.links.insert(object, 0).unwrap_or(0)
        }
    }

    fn running_driver() -> PollDriver {
        let mut driver = PollDriver::new(WiggleSettings::enabled_with(Sensitivity::Medium));
        driver.start();
        driver
    }

    /// Shake ±30 px along x at the poll cadence; returns all disconnections.
    fn shake(driver: &mut PollDriver, host: &mut FakeHost, ticks: usize) -> Vec<Disconnection> {
        let mut out = Vec::new();
        for i in 0..ticks {
            let x = if i % 2 == 0 { 30.0 } else { -30.0 };
            host.move_to(x, 0.0);
            let report = driver.tick(host, i as f64 * POLL_INTERVAL);
            out.extend(report.disconnections);
        }
        out
    }

    #[test]
    fn shaking_disconnects_and_clears() {
        let mut driver = running_driver();
        let mut host = FakeHost::with_node(3);
        // Fifth sample gives four deltas and three reversals
        let hits = shake(&mut driver, &mut host, 5);
        assert_eq!(hits.len(), 1, "exactly one disconnect expected");
        assert_eq!(hits[0].links_removed, 3);
        assert!(hits[0].signals.direction_changes >= 3);
        let key = TrackKey::new(SurfaceId(1), ObjectId(0));
        // The disconnect happened on the last tick, state is gone
        assert!(!driver.tracker().is_tracking(&key));
    }

    #[test]
    fn clears_even_when_nothing_was_linked() {
        let mut driver = running_driver();
        let mut host = FakeHost::with_node(0);
        let hits = shake(&mut driver, &mut host, 5);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].links_removed, 0);
        assert_eq!(driver.tracker().tracked_len(), 0);
    }

    #[test]
    fn unchanged_position_is_skipped() {
        let mut driver = running_driver();
        let mut host = FakeHost::with_node(1);
        host.move_to(10.0, 10.0);
        let first = driver.tick(&mut host, 0.0);
        assert_eq!(first.evaluated, 1);
        for i in 1..20 {
            let report = driver.tick(&mut host, i as f64 * POLL_INTERVAL);
            assert_eq!(report.evaluated, 0);
            assert_eq!(report.unchanged, 1);
        }
        let key = TrackKey::new(SurfaceId(1), ObjectId(0));
        assert_eq!(driver.tracker().samples(&key).map(|s| s.len()), Some(1));
    }

    #[test]
    fn missing_surface_is_a_noop() {
        let mut driver = running_driver();
        let mut host = FakeHost::with_node(2);
        host.surface = None;
        host.move_to(50.0, 0.0);
        let report = driver.tick(&mut host, 0.0);
        assert!(report.surface_missing);
        assert_eq!(report.evaluated, 0);
        assert_eq!(driver.tracker().tracked_len(), 0);
    }

    #[test]
    fn smooth_drag_never_disconnects() {
        let mut driver = running_driver();
        let mut host = FakeHost::with_node(2);
        for i in 0..50 {
            host.move_to(i as f64 * 8.0, i as f64 * 2.0);
            let report = driver.tick(&mut host, i as f64 * POLL_INTERVAL);
            assert!(report.disconnections.is_empty());
        }
        assert_eq!(host.disconnect_calls, 0);
    }

    #[test]
    fn disabled_driver_stops_and_resets() {
        let mut driver = running_driver();
        let mut host = FakeHost::with_node(2);
        host.move_to(1.0, 0.0);
        driver.tick(&mut host, 0.0);
        assert_eq!(driver.tracker().tracked_len(), 1);

        driver.set_enabled(false);
        assert!(!driver.is_running());
        assert_eq!(driver.tracker().tracked_len(), 0);

        host.move_to(2.0, 0.0);
        let report = driver.tick(&mut host, POLL_INTERVAL);
        assert_eq!(report, TickReport::default());
    }

    #[test]
    fn settings_disabled_behind_drivers_back_stops_on_tick() {
        let mut settings = WiggleSettings::enabled_with(Sensitivity::Medium);
        settings.enabled = false;
        let mut driver = PollDriver::new(settings);
        driver.running = true;
        let mut host = FakeHost::with_node(2);
        driver.tick(&mut host, 0.0);
        assert!(!driver.is_running());
    }

    #[test]
    fn deselected_objects_are_forgotten() {
        let mut driver = running_driver();
        let mut host = FakeHost::with_node(2);
        host.positions.insert(ObjectId(1), Vec2::new(100.0, 0.0));
        host.selected.push(ObjectId(1));
        host.move_to(5.0, 0.0);
        driver.tick(&mut host, 0.0);
        assert_eq!(driver.tracker().tracked_len(), 2);

        host.selected = vec![ObjectId(1)];
        driver.tick(&mut host, POLL_INTERVAL);
        assert!(!driver.tracker().is_tracking(&TrackKey::new(SurfaceId(1), ObjectId(0))));
        assert!(driver.tracker().is_tracking(&TrackKey::new(SurfaceId(1), ObjectId(1))));
        assert_eq!(driver.last_positions.len(), 1);

        // Selecting it again starts from scratch, even at the old position
        host.selected.push(ObjectId(0));
        let report = driver.tick(&mut host, 2.0 * POLL_INTERVAL);
        assert_eq!(report.evaluated, 1);
        assert_eq!(report.unchanged, 1);
        let key = TrackKey::new(SurfaceId(1), ObjectId(0));
        assert_eq!(driver.tracker().samples(&key).map(|s| s.len()), Some(1));
    }

    #[test]
    fn not_started_driver_does_nothing() {
        let mut driver = PollDriver::new(WiggleSettings::enabled_with(Sensitivity::High));
        let mut host = FakeHost::with_node(2);
        let hits = shake(&mut driver, &mut host, 10);
        assert!(hits.is_empty());
    }

    #[test]
    fn restart_discards_previous_history() {
        let mut driver = running_driver();
        let mut host = FakeHost::with_node(2);
        shake(&mut driver, &mut host, 4);
        driver.stop();
        driver.start();
        assert_eq!(driver.tracker().tracked_len(), 0);
    }

    #[test]
    fn replace_config_updates_window() {
        let mut driver = running_driver();
        driver.replace_config(WiggleConfig {
            time_window: 1.25,
            ..Default::default()
        });
        assert_eq!(driver.tracker().time_window(), 1.25);
        assert_eq!(driver.settings().config.time_window, 1.25);
    }

    #[test]
    fn manual_disconnect_removes_links_of_selection() {
        let mut driver = running_driver();
        let mut host = FakeHost::with_node(4);
        host.move_to(3.0, 0.0);
        driver.tick(&mut host, 0.0);
        assert_eq!(driver.disconnect_selected(&mut host), 4);
        assert_eq!(driver.tracker().tracked_len(), 0);
        // Idempotent: nothing left the second time
        assert_eq!(driver.disconnect_selected(&mut host), 0);

        host.surface = None;
        assert_eq!(driver.disconnect_selected(&mut host), 0);
    }
}
