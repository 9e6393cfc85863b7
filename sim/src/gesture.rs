//! Pointer gesture models.
//!
//! Each gesture moves one node: a `GestureSpec` gives a closed-form offset
//! from the node's origin as a function of time since the gesture started,
//! and optional jitter adds hand tremor on top. The editor snaps the result
//! to whole pixels.

use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use wiggle_core::types::ObjectId;

/// Describes how a node moves while a gesture is active.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum GestureSpec {
    /// Node stays where it is.
    Hold,
    /// Straight drag at constant velocity (px/s).
    Drag { velocity: [f64; 2] },
    /// Back-and-forth along `axis` (normalised internally), sinusoidal.
    /// `amplitude` in px, `frequency` in Hz.
    Shake {
        axis: [f64; 2],
        amplitude: f64,
        frequency: f64,
    },
    /// Circle of `radius` px traced `frequency` times per second, starting
    /// at the origin.
    Circle { radius: f64, frequency: f64 },
    /// Switch gesture at given offsets (seconds since gesture start).
    /// Sorted ascending; each segment continues from where the previous one
    /// ended.
    Segmented {
        segments: Vec<(f64, Box<GestureSpec>)>,
    },
}

impl GestureSpec {
    /// Offset from the origin `dt` seconds into the gesture.
    pub fn offset(&self, dt: f64) -> [f64; 2] {
        match self {
            GestureSpec::Hold => [0.0, 0.0],
            GestureSpec::Drag { velocity } => [velocity[0] * dt, velocity[1] * dt],
            GestureSpec::Shake {
                axis,
                amplitude,
                frequency,
            } => {
                let norm = (axis[0] * axis[0] + axis[1] * axis[1]).sqrt();
                if norm == 0.0 {
                    return [0.0, 0.0];
                }
                let s = amplitude * (TAU * frequency * dt).sin() / norm;
                [axis[0] * s, axis[1] * s]
            }
            GestureSpec::Circle { radius, frequency } => {
                let phase = TAU * frequency * dt;
                [radius * (phase.cos() - 1.0), radius * phase.sin()]
            }
            GestureSpec::Segmented { segments } => {
                let mut base = [0.0, 0.0];
                for (i, (start, spec)) in segments.iter().enumerate() {
                    if dt < *start {
                        break;
                    }
                    let end = segments.get(i + 1).map_or(f64::INFINITY, |(t, _)| *t);
                    let local = spec.offset(dt.min(end) - start);
                    let here = [base[0] + local[0], base[1] + local[1]];
                    if dt < end {
                        return here;
                    }
                    base = here;
                }
                base
            }
        }
    }
}

/// One node driven by one gesture over a time span.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Gesture {
    /// Node being moved
    pub node: ObjectId,
    /// Node position when the gesture starts
    pub origin: [f64; 2],
    pub motion: GestureSpec,
    /// Session time the gesture starts
    pub start_at: f64,
    /// Optional: the node is released at this time and stops moving
    pub end_at: Option<f64>,
    /// Uniform hand-tremor amplitude (px) added per axis
    pub jitter: f64,
    /// Whether a correct detector should disconnect this node
    pub expect_wiggle: bool,
}

impl Gesture {
    /// True if the gesture moves its node at time `t`.
    pub fn is_active(&self, t: f64) -> bool {
        if t < self.start_at {
            return false;
        }
        if let Some(end) = self.end_at {
            if t >= end {
                return false;
            }
        }
        true
    }

    /// Noise-free position at time `t`. Before the start the node sits at its
    /// origin; after release it stays where it was let go.
    pub fn nominal_position(&self, t: f64) -> [f64; 2] {
        let t = match self.end_at {
            Some(end) => t.min(end),
            None => t,
        };
        let dt = (t - self.start_at).max(0.0);
        let off = self.motion.offset(dt);
        [self.origin[0] + off[0], self.origin[1] + off[1]]
    }

    /// Position at time `t` including jitter while active.
    pub fn position_at<R: Rng>(&self, t: f64, rng: &mut R) -> [f64; 2] {
        let [x, y] = self.nominal_position(t);
        if !self.is_active(t) || self.jitter <= 0.0 {
            return [x, y];
        }
        let jx = (rng.gen::<f64>() * 2.0 - 1.0) * self.jitter;
        let jy = (rng.gen::<f64>() * 2.0 - 1.0) * self.jitter;
        [x + jx, y + jy]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand_chacha::ChaCha8Rng;

    fn gesture(motion: GestureSpec) -> Gesture {
        Gesture {
            node: ObjectId(0),
            origin: [100.0, 50.0],
            motion,
            start_at: 1.0,
            end_at: Some(2.0),
            jitter: 0.0,
            expect_wiggle: false,
        }
    }

    #[test]
    fn drag_moves_linearly_and_stops_on_release() {
        let g = gesture(GestureSpec::Drag {
            velocity: [100.0, 0.0],
        });
        assert_eq!(g.nominal_position(0.5), [100.0, 50.0]);
        assert_abs_diff_eq!(g.nominal_position(1.5)[0], 150.0, epsilon = 1e-9);
        assert_abs_diff_eq!(g.nominal_position(5.0)[0], 200.0, epsilon = 1e-9);
    }

    #[test]
    fn shake_oscillates_around_origin() {
        let spec = GestureSpec::Shake {
            axis: [2.0, 0.0],
            amplitude: 30.0,
            frequency: 5.0,
        };
        // Quarter period: full amplitude along normalised axis
        assert_abs_diff_eq!(spec.offset(0.05)[0], 30.0, epsilon = 1e-9);
        assert_abs_diff_eq!(spec.offset(0.15)[0], -30.0, epsilon = 1e-9);
        assert_abs_diff_eq!(spec.offset(0.2)[0], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn circle_returns_to_origin() {
        let spec = GestureSpec::Circle {
            radius: 40.0,
            frequency: 1.0,
        };
        let end = spec.offset(1.0);
        assert_abs_diff_eq!(end[0], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(end[1], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(spec.offset(0.5)[0], -80.0, epsilon = 1e-9);
    }

    #[test]
    fn segmented_is_continuous() {
        let spec = GestureSpec::Segmented {
            segments: vec![
                (
                    0.0,
                    Box::new(GestureSpec::Drag {
                        velocity: [100.0, 0.0],
                    }),
                ),
                (1.0, Box::new(GestureSpec::Hold)),
                (
                    2.0,
                    Box::new(GestureSpec::Drag {
                        velocity: [0.0, 10.0],
                    }),
                ),
            ],
        };
        assert_abs_diff_eq!(spec.offset(0.999_999)[0], 100.0, epsilon = 1e-3);
        assert_eq!(spec.offset(1.5), [100.0, 0.0]);
        let late = spec.offset(3.0);
        assert_abs_diff_eq!(late[0], 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(late[1], 10.0, epsilon = 1e-9);
    }

    #[test]
    fn jitter_is_bounded_and_seeded() {
        let mut g = gesture(GestureSpec::Hold);
        g.jitter = 2.0;
        let mut a = ChaCha8Rng::seed_from_u64(7);
        let mut b = ChaCha8Rng::seed_from_u64(7);
        for i in 0..50 {
            let t = 1.0 + i as f64 * 0.02;
            let pa = g.position_at(t, &mut a);
            let pb = g.position_at(t, &mut b);
            assert_eq!(pa, pb);
            assert!((pa[0] - 100.0).abs() <= 2.0);
            assert!((pa[1] - 50.0).abs() <= 2.0);
        }
    }
}
