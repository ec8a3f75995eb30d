//! Shared primitives for the FormPilot crates.
//!
//! Everything the autopilot loop passes between components lives here:
//! immutable page snapshots, goal descriptions, decided actions, state
//! digests for stuck detection, and the execution records returned to the
//! caller.

mod action;
mod digest;
mod goal;
mod report;
mod snapshot;

pub use action::{Action, ActionKind};
pub use digest::{DigestHistory, StateDigest};
pub use goal::{
    FieldInstruction, FieldRef, Goal, GoalOptions, SuccessCondition, TargetSpec, ValueSpec,
};
pub use report::{ExecutionResult, ExecutionStep, InteractionResult, StepOutcome};
pub use snapshot::{
    AlertInfo, AlertKind, BoundingBox, ControlInfo, FieldInfo, ModalInfo, PageSnapshot,
};

/// Identifier for one autopilot run.
#[derive(Clone, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub struct RunId(pub String);

impl RunId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
