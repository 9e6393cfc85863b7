//! Scenario definitions.
//!
//! Each scenario is a small node graph plus the gestures applied to it.
//! Every gesture carries the verdict a correct detector should reach.
//! All scenarios are deterministic given the same seed.

use crate::{
    editor::SimEditor,
    gesture::{Gesture, GestureSpec},
};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use wiggle_core::types::{ObjectId, SurfaceId};

/// Which pre-defined scenario to load.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum ScenarioKind {
    /// One linked node shaken hard left and right
    Shake,
    /// One linked node dragged smoothly across the canvas
    SmoothDrag,
    /// Selected node held still
    Hold,
    /// Drag with hand tremor below the noise floor
    JitteryDrag,
    /// Node moved in circles: lots of travel but no reversals
    Orbit,
    /// Drag into place, pause, then shake loose
    DragThenShake,
    /// Several nodes at once, only one shaken while selected
    MultiNode,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 7] = [
        ScenarioKind::Shake,
        ScenarioKind::SmoothDrag,
        ScenarioKind::Hold,
        ScenarioKind::JitteryDrag,
        ScenarioKind::Orbit,
        ScenarioKind::DragThenShake,
        ScenarioKind::MultiNode,
    ];
}

/// A fully configured simulation scenario.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub seed: u64,
    pub duration: f64, // seconds
    pub editor: SimEditor,
    pub gestures: Vec<Gesture>,
}

impl Scenario {
    /// Build the named scenario. Uses `seed` for repeatability.
    pub fn build(kind: ScenarioKind, seed: u64) -> Self {
        match kind {
            ScenarioKind::Shake => Self::shake(seed),
            ScenarioKind::SmoothDrag => Self::smooth_drag(seed),
            ScenarioKind::Hold => Self::hold(seed),
            ScenarioKind::JitteryDrag => Self::jittery_drag(seed),
            ScenarioKind::Orbit => Self::orbit(seed),
            ScenarioKind::DragThenShake => Self::drag_then_shake(seed),
            ScenarioKind::MultiNode => Self::multi_node(seed),
        }
    }

    /// Gestures a correct detector disconnects.
    pub fn expected_wiggles(&self) -> Vec<ObjectId> {
        self.gestures
            .iter()
            .filter(|g| g.expect_wiggle)
            .map(|g| g.node)
            .collect()
    }

    // -----------------------------------------------------------------------
    // Scenario 1: Shake
    // -----------------------------------------------------------------------
    fn shake(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let (editor, node) = linked_trio();
        // Vary the shake a little per seed, always well inside "aggressive"
        let amplitude = 35.0 + rng.gen::<f64>() * 15.0;
        let frequency = 4.0 + rng.gen::<f64>() * 2.0;
        let angle = rng.gen::<f64>() * std::f64::consts::PI;
        let gestures = vec![gesture(
            node,
            &editor,
            GestureSpec::Shake {
                axis: [angle.cos(), angle.sin()],
                amplitude,
                frequency,
            },
            0.2,
            Some(1.5),
            1.0,
            true,
        )];
        Scenario {
            name: "shake".into(),
            seed,
            duration: 2.0,
            editor,
            gestures,
        }
    }

    // -----------------------------------------------------------------------
    // Scenario 2: Smooth drag
    // -----------------------------------------------------------------------
    fn smooth_drag(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let (editor, node) = linked_trio();
        let speed = 150.0 + rng.gen::<f64>() * 250.0;
        let heading = rng.gen::<f64>() * std::f64::consts::TAU;
        let gestures = vec![gesture(
            node,
            &editor,
            GestureSpec::Drag {
                velocity: [speed * heading.cos(), speed * heading.sin()],
            },
            0.1,
            Some(1.6),
            0.0,
            false,
        )];
        Scenario {
            name: "smooth_drag".into(),
            seed,
            duration: 2.0,
            editor,
            gestures,
        }
    }

    // -----------------------------------------------------------------------
    // Scenario 3: Hold
    // -----------------------------------------------------------------------
    fn hold(seed: u64) -> Self {
        let (editor, node) = linked_trio();
        let gestures = vec![gesture(
            node,
            &editor,
            GestureSpec::Hold,
            0.0,
            None,
            0.0,
            false,
        )];
        Scenario {
            name: "hold".into(),
            seed,
            duration: 1.0,
            editor,
            gestures,
        }
    }

    // -----------------------------------------------------------------------
    // Scenario 4: Jittery drag
    // -----------------------------------------------------------------------
    fn jittery_drag(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let (editor, node) = linked_trio();
        let speed = 250.0 + rng.gen::<f64>() * 100.0;
        let gestures = vec![gesture(
            node,
            &editor,
            GestureSpec::Drag {
                velocity: [speed, speed * 0.25],
            },
            0.1,
            Some(1.8),
            2.0,
            false,
        )];
        Scenario {
            name: "jittery_drag".into(),
            seed,
            duration: 2.0,
            editor,
            gestures,
        }
    }

    // -----------------------------------------------------------------------
    // Scenario 5: Orbit
    // -----------------------------------------------------------------------
    fn orbit(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let (editor, node) = linked_trio();
        let radius = 50.0 + rng.gen::<f64>() * 30.0;
        let gestures = vec![gesture(
            node,
            &editor,
            GestureSpec::Circle {
                radius,
                frequency: 1.0,
            },
            0.0,
            Some(2.5),
            0.0,
            false,
        )];
        Scenario {
            name: "orbit".into(),
            seed,
            duration: 3.0,
            editor,
            gestures,
        }
    }

    // -----------------------------------------------------------------------
    // Scenario 6: Drag, pause, shake
    // -----------------------------------------------------------------------
    fn drag_then_shake(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let (editor, node) = linked_trio();
        let amplitude = 40.0 + rng.gen::<f64>() * 10.0;
        let motion = GestureSpec::Segmented {
            segments: vec![
                (
                    0.0,
                    Box::new(GestureSpec::Drag {
                        velocity: [300.0, -80.0],
                    }),
                ),
                (1.0, Box::new(GestureSpec::Hold)),
                (
                    1.4,
                    Box::new(GestureSpec::Shake {
                        axis: [0.0, 1.0],
                        amplitude,
                        frequency: 5.0,
                    }),
                ),
            ],
        };
        let gestures = vec![gesture(node, &editor, motion, 0.1, Some(2.6), 0.5, true)];
        Scenario {
            name: "drag_then_shake".into(),
            seed,
            duration: 3.0,
            editor,
            gestures,
        }
    }

    // -----------------------------------------------------------------------
    // Scenario 7: Multiple nodes
    // -----------------------------------------------------------------------
    fn multi_node(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut editor = SimEditor::new(SurfaceId(1));
        let src = editor.add_node(0, "Image Texture", [0.0, 0.0], false);
        let shaken = editor.add_node(1, "Color Ramp", [250.0, 0.0], true);
        let dragged = editor.add_node(2, "Bump", [250.0, 200.0], true);
        let held = editor.add_node(3, "Mapping", [-250.0, 0.0], true);
        // Moved programmatically while unselected: never polled
        let unselected = editor.add_node(4, "Frame", [0.0, -300.0], false);
        let out = editor.add_node(5, "Material Output", [600.0, 0.0], false);
        editor.link(held, src);
        editor.link(src, shaken);
        editor.link(src, dragged);
        editor.link(shaken, out);
        editor.link(dragged, out);
        editor.link(unselected, out);

        let amplitude = 40.0 + rng.gen::<f64>() * 10.0;
        let shake = GestureSpec::Shake {
            axis: [1.0, 0.2],
            amplitude,
            frequency: 5.0,
        };
        let gestures = vec![
            gesture(shaken, &editor, shake.clone(), 0.3, Some(1.6), 1.0, true),
            gesture(
                dragged,
                &editor,
                GestureSpec::Drag {
                    velocity: [-200.0, 60.0],
                },
                0.0,
                Some(1.8),
                1.0,
                false,
            ),
            gesture(held, &editor, GestureSpec::Hold, 0.0, None, 0.0, false),
            gesture(unselected, &editor, shake, 0.3, Some(1.6), 0.0, false),
        ];
        Scenario {
            name: "multi_node".into(),
            seed,
            duration: 2.0,
            editor,
            gestures,
        }
    }
}

// ---------------------------------------------------------------------------
// Builder helpers
// ---------------------------------------------------------------------------

/// Source → selected node → output, two links on the selected node.
fn linked_trio() -> (SimEditor, ObjectId) {
    let mut editor = SimEditor::new(SurfaceId(1));
    let src = editor.add_node(0, "Noise Texture", [-300.0, 0.0], false);
    let node = editor.add_node(1, "Principled BSDF", [0.0, 0.0], true);
    let out = editor.add_node(2, "Material Output", [300.0, 0.0], false);
    editor.link(src, node);
    editor.link(node, out);
    editor.link(src, out);
    (editor, node)
}

fn gesture(
    node: ObjectId,
    editor: &SimEditor,
    motion: GestureSpec,
    start_at: f64,
    end_at: Option<f64>,
    jitter: f64,
    expect_wiggle: bool,
) -> Gesture {
    let origin = editor
        .nodes
        .get(&node)
        .map(|n| n.position)
        .unwrap_or([0.0, 0.0]);
    Gesture {
        node,
        origin,
        motion,
        start_at,
        end_at,
        jitter,
        expect_wiggle,
    }
}
