//! Actions decided by the engine, one per loop iteration.

use serde::{Deserialize, Serialize};

/// The mechanical part of a decided action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    /// Write a value into a field.
    Fill { selector: String, value: String },
    /// Activate a control.
    Click { selector: String },
    /// Choose an option in a dropdown-like field.
    Select { selector: String, value: String },
    /// Pause for a bounded interval.
    Wait { ms: u64 },
    /// Press Escape (dismiss overlays, close dropdowns).
    Escape,
    /// Press Tab (blur confirmation).
    TabKey,
    /// The goal's success condition is satisfied.
    Done,
    /// The goal cannot be reached; the run fails with this reason.
    Blocked { reason: String },
    /// The engine cannot tell what to do next; the caller should dump
    /// diagnostic state. Bounded, then escalates to failure.
    Explore { reason: String },
}

impl ActionKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fill { .. } => "fill",
            Self::Click { .. } => "click",
            Self::Select { .. } => "select",
            Self::Wait { .. } => "wait",
            Self::Escape => "escape",
            Self::TabKey => "tab",
            Self::Done => "done",
            Self::Blocked { .. } => "blocked",
            Self::Explore { .. } => "explore",
        }
    }

    /// Terminal actions end the loop.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Blocked { .. })
    }

    /// Whether executing this action can mutate the page.
    pub fn mutates_page(&self) -> bool {
        matches!(
            self,
            Self::Fill { .. } | Self::Click { .. } | Self::Select { .. } | Self::Escape | Self::TabKey
        )
    }
}

/// One decided action with its stated reason and confidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    /// Human-readable justification, suitable for operator display.
    pub reason: String,
    /// Engine confidence in this decision, in `[0, 1]`.
    pub confidence: f64,
}

impl Action {
    pub fn new(kind: ActionKind, reason: impl Into<String>, confidence: f64) -> Self {
        Self {
            kind,
            reason: reason.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn done(reason: impl Into<String>) -> Self {
        Self::new(ActionKind::Done, reason, 1.0)
    }

    pub fn blocked(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::new(
            ActionKind::Blocked {
                reason: reason.clone(),
            },
            reason,
            1.0,
        )
    }
}
