//! Execution records returned to the caller.

use serde::{Deserialize, Serialize};

use crate::{Action, PageSnapshot};

/// Outcome of executing one decided action.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepOutcome {
    pub success: bool,
    /// Interaction method that ultimately applied, e.g. `native-select`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether a recovery strategy ran for this step.
    pub recovered: bool,
}

impl StepOutcome {
    pub fn ok(method: impl Into<String>) -> Self {
        Self {
            success: true,
            method: Some(method.into()),
            error: None,
            recovered: false,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            method: None,
            error: Some(error.into()),
            recovered: false,
        }
    }
}

/// One executed loop iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionStep {
    /// 1-indexed step number.
    pub index: u32,
    pub action: Action,
    pub outcome: StepOutcome,
    pub duration_ms: u64,
}

/// Final report of one `execute()` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub steps: Vec<ExecutionStep>,
    /// Snapshot taken after the final step, when one could be captured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_state: Option<PageSnapshot>,
    /// Operator-readable failure reason. Never a raw stack trace.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub total_time_ms: u64,
}

impl ExecutionResult {
    pub fn succeeded(steps: Vec<ExecutionStep>, final_state: Option<PageSnapshot>, total_time_ms: u64) -> Self {
        Self {
            success: true,
            steps,
            final_state,
            error: None,
            total_time_ms,
        }
    }

    pub fn failed(
        reason: impl Into<String>,
        steps: Vec<ExecutionStep>,
        final_state: Option<PageSnapshot>,
        total_time_ms: u64,
    ) -> Self {
        Self {
            success: false,
            steps,
            final_state,
            error: Some(reason.into()),
            total_time_ms,
        }
    }

    pub fn steps_taken(&self) -> u32 {
        self.steps.len() as u32
    }
}

/// Result of applying one value to one field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionResult {
    pub success: bool,
    /// Name of the strategy tier that succeeded (or the last one tried).
    pub method: String,
    /// Number of strategy tiers attempted.
    pub attempts: u32,
    /// Value observed in the field after the interaction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_value: Option<String>,
}

impl InteractionResult {
    pub fn ok(method: impl Into<String>, attempts: u32, final_value: Option<String>) -> Self {
        Self {
            success: true,
            method: method.into(),
            attempts,
            final_value,
        }
    }

    pub fn failed(method: impl Into<String>, attempts: u32) -> Self {
        Self {
            success: false,
            method: method.into(),
            attempts,
            final_value: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ActionKind;

    #[test]
    fn result_counts_steps() {
        let steps = vec![ExecutionStep {
            index: 1,
            action: Action::new(ActionKind::Done, "success condition met", 1.0),
            outcome: StepOutcome::ok("none"),
            duration_ms: 3,
        }];
        let result = ExecutionResult::succeeded(steps, None, 10);
        assert!(result.success);
        assert_eq!(result.steps_taken(), 1);
    }

    #[test]
    fn failed_outcome_carries_reason() {
        let outcome = StepOutcome::failed("element not found: #missing");
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("element not found: #missing"));
    }
}
