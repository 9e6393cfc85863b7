//! Session runner: moves nodes along their gestures and polls the driver at
//! the fixed cadence, like a host editor's timer would.

use crate::{
    editor::SimEditor,
    replay::{DisconnectEvent, NodePosition, PositionFrame, ReplayLog},
    scenarios::Scenario,
};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use wiggle_core::{
    config::WiggleSettings,
    driver::{PollDriver, POLL_INTERVAL},
    metrics::DetectionMetrics,
    types::ObjectId,
};

/// Summary of one finished session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub scenario_name: String,
    pub seed: u64,
    pub ticks: u64,
    pub disconnects: Vec<DisconnectEvent>,
    /// Nodes that were disconnected at least once
    pub disconnected_nodes: Vec<ObjectId>,
    pub metrics: DetectionMetrics,
    /// Links left in the graph at the end
    pub remaining_links: usize,
}

/// One scenario run from start to finish.
pub struct Session {
    scenario: Scenario,
    editor: SimEditor,
    driver: PollDriver,
    rng: ChaCha8Rng,
    frames: Vec<PositionFrame>,
    disconnects: Vec<DisconnectEvent>,
}

impl Session {
    pub fn new(scenario: Scenario, settings: WiggleSettings) -> Self {
        let editor = scenario.editor.clone();
        // Separate stream from the one used to build the scenario
        let rng = ChaCha8Rng::seed_from_u64(scenario.seed ^ 0x5EED_F00D);
        Self {
            scenario,
            editor,
            driver: PollDriver::new(settings),
            rng,
            frames: Vec::new(),
            disconnects: Vec::new(),
        }
    }

    /// Run to the end of the scenario. Returns the outcome and the replay log.
    pub fn run(mut self) -> (SessionOutcome, ReplayLog) {
        let initial = self.editor.clone();
        let ticks = (self.scenario.duration / POLL_INTERVAL).round() as u64;

        // The host toggles detection on before the operator starts moving things
        if self.driver.settings().enabled {
            self.driver.start();
        }

        for tick in 0..ticks {
            let now = tick as f64 * POLL_INTERVAL;
            self.step(now);
        }

        let disconnected: BTreeSet<ObjectId> = self.disconnects.iter().map(|e| e.node).collect();
        let mut metrics = DetectionMetrics::default();
        for g in &self.scenario.gestures {
            metrics.accumulate(g.expect_wiggle, disconnected.contains(&g.node));
        }

        tracing::debug!(
            scenario = %self.scenario.name,
            ticks,
            disconnects = self.disconnects.len(),
            "Session finished"
        );

        // Closing the editor ends the session
        self.driver.stop();

        let outcome = SessionOutcome {
            scenario_name: self.scenario.name.clone(),
            seed: self.scenario.seed,
            ticks,
            disconnects: self.disconnects.clone(),
            disconnected_nodes: disconnected.into_iter().collect(),
            metrics,
            remaining_links: self.editor.link_count(),
        };
        let log = ReplayLog {
            scenario_name: self.scenario.name,
            seed: self.scenario.seed,
            poll_interval: POLL_INTERVAL,
            settings: self.driver.settings().clone(),
            initial,
            frames: self.frames,
            disconnects: self.disconnects,
        };
        (outcome, log)
    }

    /// Move every gesture's node to where it is at `now`, then poll.
    fn step(&mut self, now: f64) {
        let mut positions = Vec::with_capacity(self.scenario.gestures.len());
        for g in &self.scenario.gestures {
            if now < g.start_at {
                continue;
            }
            let p = g.position_at(now, &mut self.rng);
            self.editor.move_node(g.node, p);
            if let Some(node) = self.editor.nodes.get(&g.node) {
                positions.push(NodePosition {
                    id: g.node,
                    position: node.position,
                });
            }
        }
        self.frames.push(PositionFrame {
            time: now,
            positions,
        });

        let report = self.driver.tick(&mut self.editor, now);
        for d in &report.disconnections {
            tracing::debug!(
                node = ?self.editor.node_name(d.key.object),
                time = now,
                "Wiggle disconnect"
            );
            self.disconnects.push(DisconnectEvent::new(now, d));
        }
    }
}

/// Build and run a scenario in one go.
pub fn run_scenario(scenario: Scenario, settings: WiggleSettings) -> (SessionOutcome, ReplayLog) {
    Session::new(scenario, settings).run()
}
