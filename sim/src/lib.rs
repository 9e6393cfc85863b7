//! `sim`: Gesture simulator: node editor stand-in, scenarios, sessions, replay.

pub mod editor;
pub mod gesture;
pub mod replay;
pub mod scenarios;
pub mod session;
pub mod settings;

pub use editor::{Link, SimEditor, SimNode};
pub use gesture::{Gesture, GestureSpec};
pub use replay::{load_replay, replay_log, save_replay, DisconnectEvent, ReplayLog};
pub use scenarios::{Scenario, ScenarioKind};
pub use session::{run_scenario, Session, SessionOutcome};
pub use settings::{load_settings, validate_config};
