//! The orchestration loop.

use std::sync::Arc;
use std::time::Instant;

use adaptive_wait::AdaptiveWaiter;
use driver_bridge::{Key, PageDriver};
use failure_recovery::{classify_failure, RecoveryContext, RecoveryManager};
use field_actions::{ActionError, ExecutorConfig, InteractionExecutor};
use field_classifier::{ClassifyContext, FieldClassifier};
use formpilot_types::{
    Action, ActionKind, AlertKind, ExecutionResult, ExecutionStep, FieldInfo, Goal, PageSnapshot,
    RunId, StepOutcome,
};
use surface_perceiver::{describe, SurfacePerceiver};
use thiserror::Error;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, instrument, warn};

use crate::{AutopilotConfig, DecisionEngine};

/// Unrecoverable failures. Goal-level failures are reported inside
/// `ExecutionResult`; this is only for the driver connection itself dying.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("driver connection lost: {0}")]
    DriverLost(String),
}

/// Drives one goal at a time against an exclusively-owned page.
///
/// All run state (decision engine, histories) is created per `execute()`
/// call and discarded when it returns; running two goals concurrently
/// requires two `Autopilot` instances bound to separate browsing contexts.
pub struct Autopilot {
    driver: Arc<dyn PageDriver>,
    perceiver: SurfacePerceiver,
    executor: InteractionExecutor,
    recovery: RecoveryManager,
    waiter: AdaptiveWaiter,
    classifier: FieldClassifier,
    config: AutopilotConfig,
}

impl Autopilot {
    pub fn new(driver: Arc<dyn PageDriver>) -> Self {
        Self::with_config(driver, AutopilotConfig::default())
    }

    pub fn with_config(driver: Arc<dyn PageDriver>, config: AutopilotConfig) -> Self {
        let perceiver = SurfacePerceiver::new(driver.clone());
        let executor = InteractionExecutor::new(
            driver.clone(),
            ExecutorConfig {
                type_delay_ms: config.type_delay_ms,
                verify_timeout_ms: config.waits.value_timeout_ms,
            },
        );
        let waiter = AdaptiveWaiter::with_config(driver.clone(), config.waits.clone());
        let recovery = RecoveryManager::new(
            driver.clone(),
            AdaptiveWaiter::with_config(driver.clone(), config.waits.clone()),
        );
        Self {
            driver,
            perceiver,
            executor,
            recovery,
            waiter,
            classifier: FieldClassifier::new(),
            config,
        }
    }

    pub fn config(&self) -> &AutopilotConfig {
        &self.config
    }

    /// Run the loop until the goal is reached, blocked, or out of budget.
    #[instrument(skip_all, fields(goal = %goal.name))]
    pub async fn execute(&self, goal: &Goal) -> Result<ExecutionResult, EngineError> {
        let started = Instant::now();
        let max_steps = goal.options.max_steps.unwrap_or(self.config.max_steps);
        let step_delay = goal
            .options
            .step_delay_ms
            .unwrap_or(self.config.step_delay_ms);

        let run_id = RunId::new();
        info!(run = %run_id, max_steps, "starting autopilot run");
        let mut engine = DecisionEngine::new(&self.config);
        let mut steps: Vec<ExecutionStep> = Vec::new();
        let mut consecutive_failures: u32 = 0;
        let mut last_snapshot: Option<PageSnapshot> = None;

        for index in 1..=max_steps {
            let snapshot = self.capture().await?;
            if !steps.is_empty() {
                let target_enabled = target_enabled(&snapshot, goal);
                engine.note_digest(snapshot.digest(target_enabled));
            }

            let action = engine.decide(&snapshot, goal, &steps);
            debug!(
                step = index,
                kind = action.kind.label(),
                confidence = action.confidence,
                reason = %action.reason,
                "decided next action"
            );

            let step_started = Instant::now();
            match &action.kind {
                ActionKind::Done => {
                    steps.push(make_step(index, action, StepOutcome::ok("none"), step_started));
                    info!(steps = steps.len(), "goal reached");
                    return Ok(ExecutionResult::succeeded(
                        steps,
                        Some(snapshot),
                        elapsed_ms(started),
                    ));
                }
                ActionKind::Blocked { reason } => {
                    let reason = reason.clone();
                    steps.push(make_step(
                        index,
                        action,
                        StepOutcome::failed(reason.clone()),
                        step_started,
                    ));
                    warn!(%reason, "run blocked");
                    return Ok(ExecutionResult::failed(
                        reason,
                        steps,
                        Some(snapshot),
                        elapsed_ms(started),
                    ));
                }
                _ => {}
            }

            let outcome = if let ActionKind::Explore { reason } = &action.kind {
                // No mutation: dump diagnostics and let the next capture
                // re-evaluate.
                warn!(%reason, "explore cycle");
                debug!(state = %describe(&snapshot), "explore state dump");
                StepOutcome::ok("explore")
            } else {
                match self.perform(&action, &snapshot).await {
                    Ok(method) => {
                        consecutive_failures = 0;
                        StepOutcome::ok(method)
                    }
                    Err(err) if err.is_fatal() => {
                        return Err(EngineError::DriverLost(err.to_string()))
                    }
                    Err(err) => {
                        warn!(step = index, %err, "step execution failed");
                        let recovered = if self.config.retry_on_error {
                            self.recover_and_retry(&action, &snapshot, &err).await
                        } else {
                            None
                        };
                        match recovered {
                            Some(method) => {
                                consecutive_failures = 0;
                                StepOutcome {
                                    success: true,
                                    method: Some(method),
                                    error: None,
                                    recovered: true,
                                }
                            }
                            None => {
                                consecutive_failures += 1;
                                if consecutive_failures > self.config.max_retries {
                                    let reason = format!(
                                        "{consecutive_failures} consecutive step failures, last: {err}"
                                    );
                                    steps.push(make_step(
                                        index,
                                        action,
                                        StepOutcome::failed(err.to_string()),
                                        step_started,
                                    ));
                                    return Ok(ExecutionResult::failed(
                                        reason,
                                        steps,
                                        Some(snapshot),
                                        elapsed_ms(started),
                                    ));
                                }
                                StepOutcome::failed(err.to_string())
                            }
                        }
                    }
                }
            };

            let mutated = action.kind.mutates_page() && outcome.success;
            steps.push(make_step(index, action, outcome, step_started));
            last_snapshot = Some(snapshot);

            if mutated && self.config.use_adaptive_wait {
                let _ = self.waiter.wait_stable_state().await;
            }
            if step_delay > 0 {
                sleep(Duration::from_millis(step_delay)).await;
            }
        }

        Ok(ExecutionResult::failed(
            format!("maximum steps ({max_steps}) exhausted before reaching the goal"),
            steps,
            last_snapshot,
            elapsed_ms(started),
        ))
    }

    /// One decide-and-execute cycle with a fresh engine. For interactive
    /// debugging; no recovery, no digest history.
    pub async fn step_once(&self, goal: &Goal) -> Result<ExecutionStep, EngineError> {
        let snapshot = self.capture().await?;
        let mut engine = DecisionEngine::new(&self.config);
        let action = engine.decide(&snapshot, goal, &[]);
        let step_started = Instant::now();
        let outcome = match &action.kind {
            ActionKind::Done | ActionKind::Blocked { .. } | ActionKind::Explore { .. } => {
                StepOutcome::ok(action.kind.label())
            }
            _ => match self.perform(&action, &snapshot).await {
                Ok(method) => StepOutcome::ok(method),
                Err(err) if err.is_fatal() => {
                    return Err(EngineError::DriverLost(err.to_string()))
                }
                Err(err) => StepOutcome::failed(err.to_string()),
            },
        };
        Ok(make_step(1, action, outcome, step_started))
    }

    /// Snapshot of the current surface.
    pub async fn get_state(&self) -> Result<PageSnapshot, EngineError> {
        self.capture().await
    }

    /// Operator-readable dump of the current surface.
    pub async fn get_readable_state(&self) -> Result<String, EngineError> {
        Ok(describe(&self.capture().await?))
    }

    /// Why is this button (not) clickable right now?
    pub async fn analyze_button(&self, text: &str) -> Result<Vec<String>, EngineError> {
        let snapshot = self.capture().await?;
        let Some(control) = snapshot.find_control_by_text(text) else {
            return Ok(vec![format!("no visible button matching '{text}'")]);
        };
        if control.is_enabled() {
            return Ok(vec![format!("button '{}' is enabled and clickable", control.text)]);
        }

        let mut reasons = vec![format!("button '{}' is disabled", control.text)];
        for field in snapshot.empty_required_fields() {
            reasons.push(format!(
                "required field '{}' is empty",
                field.display_name()
            ));
        }
        for modal in &snapshot.modals {
            reasons.push(format!(
                "a dialog is open: {}",
                modal.title.as_deref().unwrap_or(&modal.selector)
            ));
        }
        for alert in &snapshot.alerts {
            if matches!(alert.kind, AlertKind::Error | AlertKind::Warning) {
                reasons.push(format!("page shows an alert: {}", alert.message));
            }
        }
        if reasons.len() == 1 {
            reasons.push(
                "no obvious blocker found; the form may have hidden validation".to_string(),
            );
        }
        Ok(reasons)
    }

    async fn capture(&self) -> Result<PageSnapshot, EngineError> {
        self.perceiver
            .capture()
            .await
            .map_err(|err| EngineError::DriverLost(err.to_string()))
    }

    /// Execute one mutating or waiting action. Returns the interaction
    /// method that applied.
    async fn perform(
        &self,
        action: &Action,
        snapshot: &PageSnapshot,
    ) -> Result<String, ActionError> {
        match &action.kind {
            ActionKind::Fill { selector, value } | ActionKind::Select { selector, value } => {
                let field = lookup_field(snapshot, selector).cloned().unwrap_or_else(|| {
                    // Replacement selectors from recovery are not in the
                    // snapshot; synthesize a descriptor of the right shape.
                    let select_like = matches!(action.kind, ActionKind::Select { .. });
                    FieldInfo {
                        selector: selector.clone(),
                        tag: if select_like { "select" } else { "input" }.into(),
                        input_type: (!select_like).then(|| "text".into()),
                        visible: true,
                        ..Default::default()
                    }
                });
                let classified = self.classifier.classify(
                    &field,
                    &ClassifyContext {
                        page_title: snapshot.title.clone(),
                        active_tab: snapshot.active_tab.clone(),
                    },
                );
                let result = self.executor.apply(&classified, value).await?;
                Ok(result.method)
            }
            ActionKind::Click { selector } => {
                self.executor.click(selector).await?;
                Ok("click".to_string())
            }
            ActionKind::Wait { ms } => {
                sleep(Duration::from_millis(*ms)).await;
                Ok("wait".to_string())
            }
            ActionKind::Escape => {
                self.driver.press_key(Key::Escape).await?;
                Ok("escape".to_string())
            }
            ActionKind::TabKey => {
                self.driver.press_key(Key::Tab).await?;
                Ok("tab".to_string())
            }
            ActionKind::Done | ActionKind::Blocked { .. } | ActionKind::Explore { .. } => Err(
                ActionError::Internal("terminal action reached perform()".into()),
            ),
        }
    }

    /// Classify the failure, run the recovery ladder, and if it helped,
    /// retry the same logical action once (against the replacement
    /// selector when one was derived).
    async fn recover_and_retry(
        &self,
        action: &Action,
        snapshot: &PageSnapshot,
        err: &ActionError,
    ) -> Option<String> {
        let kind = classify_failure(&err.to_string());
        let (selector, text_hint) = action_target(action, snapshot);
        let context = RecoveryContext {
            selector,
            text_hint,
            allow_refresh: self.config.allow_refresh,
        };
        let outcome = match self.recovery.recover(kind, &context).await {
            Ok(outcome) => outcome,
            Err(recovery_err) => {
                warn!(%recovery_err, "recovery machinery failed");
                return None;
            }
        };
        if !outcome.recovered {
            debug!(kind = kind.name(), "recovery exhausted");
            return None;
        }

        let retry_action = match &outcome.replacement_selector {
            Some(replacement) => substitute_selector(action, replacement),
            None => action.clone(),
        };
        match self.perform(&retry_action, snapshot).await {
            Ok(method) => {
                info!(
                    kind = kind.name(),
                    strategy = ?outcome.strategy,
                    "retry after recovery succeeded"
                );
                Some(method)
            }
            Err(retry_err) => {
                warn!(%retry_err, "retry after recovery failed");
                None
            }
        }
    }
}

fn make_step(index: u32, action: Action, outcome: StepOutcome, started: Instant) -> ExecutionStep {
    ExecutionStep {
        index,
        action,
        outcome,
        duration_ms: elapsed_ms(started),
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

fn target_enabled(snapshot: &PageSnapshot, goal: &Goal) -> bool {
    use formpilot_types::TargetSpec;
    match &goal.target {
        Some(TargetSpec::Text(text)) => snapshot
            .find_control_by_text(text)
            .map(|c| c.is_enabled())
            .unwrap_or(false),
        Some(TargetSpec::Selector(selector)) => snapshot
            .controls
            .iter()
            .find(|c| c.selector == *selector)
            .map(|c| c.is_enabled())
            .unwrap_or(false),
        Some(TargetSpec::Role { role, name }) => {
            let wanted = name.to_lowercase();
            snapshot
                .controls
                .iter()
                .find(|c| {
                    c.role.as_deref() == Some(role.as_str())
                        && c.text.to_lowercase().contains(&wanted)
                })
                .map(|c| c.is_enabled())
                .unwrap_or(false)
        }
        None => false,
    }
}

/// Fields live either on the page or inside an open dialog.
fn lookup_field<'a>(snapshot: &'a PageSnapshot, selector: &str) -> Option<&'a FieldInfo> {
    snapshot.field_by_selector(selector).or_else(|| {
        snapshot
            .modals
            .iter()
            .flat_map(|m| m.fields.iter())
            .find(|f| f.selector == selector)
    })
}

/// The selector and text hint recovery works with.
fn action_target(action: &Action, snapshot: &PageSnapshot) -> (Option<String>, Option<String>) {
    match &action.kind {
        ActionKind::Fill { selector, .. } | ActionKind::Select { selector, .. } => {
            let hint = lookup_field(snapshot, selector)
                .map(|f| f.display_name().to_string());
            (Some(selector.clone()), hint)
        }
        ActionKind::Click { selector } => {
            let hint = snapshot
                .controls
                .iter()
                .chain(snapshot.modals.iter().flat_map(|m| m.controls.iter()))
                .find(|c| c.selector == *selector)
                .map(|c| c.text.clone());
            (Some(selector.clone()), hint)
        }
        _ => (None, None),
    }
}

fn substitute_selector(action: &Action, replacement: &str) -> Action {
    let kind = match &action.kind {
        ActionKind::Fill { value, .. } => ActionKind::Fill {
            selector: replacement.to_string(),
            value: value.clone(),
        },
        ActionKind::Select { value, .. } => ActionKind::Select {
            selector: replacement.to_string(),
            value: value.clone(),
        },
        ActionKind::Click { .. } => ActionKind::Click {
            selector: replacement.to_string(),
        },
        other => other.clone(),
    };
    Action::new(
        kind,
        format!("{} (retried via {replacement})", action.reason),
        action.confidence,
    )
}
