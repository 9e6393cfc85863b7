//! Replay: serialize/deserialize session logs and re-run them offline.

use crate::editor::SimEditor;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use wiggle_core::{
    config::WiggleSettings,
    driver::{Disconnection, PollDriver, POLL_INTERVAL},
    types::ObjectId,
};

/// A full recorded session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReplayLog {
    pub scenario_name: String,
    pub seed: u64,
    pub poll_interval: f64,
    /// Settings the session ran with
    pub settings: WiggleSettings,
    /// Editor state before the first tick
    pub initial: SimEditor,
    /// Node positions at every tick, in chronological order
    pub frames: Vec<PositionFrame>,
    /// Disconnects that happened during the session
    pub disconnects: Vec<DisconnectEvent>,
}

/// Positions of the moving nodes at one tick.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PositionFrame {
    pub time: f64,
    pub positions: Vec<NodePosition>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub id: ObjectId,
    pub position: [f64; 2],
}

/// One wiggle-triggered disconnect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisconnectEvent {
    pub time: f64,
    pub node: ObjectId,
    pub links_removed: usize,
    pub direction_changes: u32,
    pub wiggle_ratio: f64,
}

impl DisconnectEvent {
    pub fn new(time: f64, d: &Disconnection) -> Self {
        Self {
            time,
            node: d.key.object,
            links_removed: d.links_removed,
            direction_changes: d.signals.direction_changes,
            wiggle_ratio: d.signals.wiggle_ratio(),
        }
    }
}

/// Save a replay log to a JSON file.
pub fn save_replay(log: &ReplayLog, path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating replay file {}", path.display()))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, log)?;
    Ok(())
}

/// Load a replay log from a JSON file.
pub fn load_replay(path: &Path) -> anyhow::Result<ReplayLog> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening replay file {}", path.display()))?;
    let reader = BufReader::new(file);
    let log: ReplayLog = serde_json::from_reader(reader)
        .with_context(|| format!("parsing replay file {}", path.display()))?;
    Ok(log)
}

/// Feed the recorded frames through a fresh driver configured with
/// `settings`. Returns the disconnects it produced.
pub fn replay_log(log: &ReplayLog, settings: WiggleSettings) -> Vec<DisconnectEvent> {
    let mut editor = log.initial.clone();
    let enabled = settings.enabled;
    let mut driver = PollDriver::new(settings);
    // Same lifecycle as a live session: a disabled driver never polls
    if enabled {
        driver.start();
    }

    if log.poll_interval != POLL_INTERVAL {
        tracing::warn!(
            recorded = log.poll_interval,
            expected = POLL_INTERVAL,
            "Replay was recorded with a different poll interval"
        );
    }

    let mut events = Vec::new();
    for frame in &log.frames {
        for np in &frame.positions {
            editor.move_node(np.id, np.position);
        }
        let report = driver.tick(&mut editor, frame.time);
        events.extend(
            report
                .disconnections
                .iter()
                .map(|d| DisconnectEvent::new(frame.time, d)),
        );
    }
    events
}
