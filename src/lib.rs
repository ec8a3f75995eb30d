//! FormPilot: autonomous completion of web forms and multi-step UI flows.
//!
//! The library facade re-exports the workspace surface. The core loop
//! lives in [`formpilot_engine::Autopilot`]: capture a normalized snapshot
//! of the page, decide the single best next action, execute it through
//! layered interaction strategies with verified persistence, recover from
//! classified failures, and stop on success, stuck state, or an exhausted
//! step budget.
//!
//! ```no_run
//! use std::sync::Arc;
//! use formpilot_cli::prelude::*;
//!
//! # async fn run(driver: Arc<dyn PageDriver>) -> anyhow::Result<()> {
//! let pilot = Autopilot::new(driver);
//! let goal = Goal::new("create campaign")
//!     .click_target(TargetSpec::Text("Create campaign".into()))
//!     .with_success(SuccessCondition::UrlContains("/campaigns/".into()));
//! let result = pilot.execute(&goal).await?;
//! println!("{}", if result.success { "done" } else { "failed" });
//! # Ok(())
//! # }
//! ```

pub mod demo;

pub use adaptive_wait::{AdaptiveWaiter, WaitConfig, WaitOutcome};
pub use driver_bridge::{DriverError, ElementNode, ElementState, Key, PageDriver};
pub use element_locator::{LocatorCandidate, LocatorTier, SelectorResolver};
pub use failure_recovery::{classify_failure, FailureKind, RecoveryOutcome, RecoveryStrategy};
pub use field_actions::{ActionError, ExecutorConfig, InteractionExecutor};
pub use field_classifier::{ClassifiedField, FieldClassifier, FieldPurpose, FieldType};
pub use formpilot_engine::{Autopilot, AutopilotConfig, DecisionEngine, EngineError};
pub use formpilot_types::{
    Action, ActionKind, ExecutionResult, ExecutionStep, FieldInstruction, FieldRef, Goal,
    GoalOptions, PageSnapshot, SuccessCondition, TargetSpec, ValueSpec,
};
pub use surface_perceiver::{describe, FormView, SurfacePerceiver};

/// The imports nearly every caller wants.
pub mod prelude {
    pub use driver_bridge::PageDriver;
    pub use formpilot_engine::{Autopilot, AutopilotConfig};
    pub use formpilot_types::{
        ExecutionResult, FieldInstruction, FieldRef, Goal, SuccessCondition, TargetSpec,
    };
}
