//! The autopilot: decision engine plus orchestration loop.
//!
//! `DecisionEngine` turns (snapshot, goal, history) into exactly one next
//! action with a stated reason and confidence, and watches state digests
//! for no-progress loops. `Autopilot` drives the loop: decide → execute
//! (with adaptive waits and recovery) → record → re-evaluate termination.

mod autopilot;
mod config;
mod decision;

pub use autopilot::{Autopilot, EngineError};
pub use config::AutopilotConfig;
pub use decision::DecisionEngine;
