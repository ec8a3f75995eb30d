//! The decision engine: one action per call, with reason and confidence.

use field_classifier::{ClassifyContext, FieldClassifier, FieldType};
use formpilot_types::{
    Action, ActionKind, ControlInfo, DigestHistory, ExecutionStep, FieldInfo, FieldInstruction,
    FieldRef, Goal, ModalInfo, PageSnapshot, StateDigest, TargetSpec, ValueSpec,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::AutopilotConfig;

/// "Type DELETE to confirm"-style prompts in confirmation dialogs.
static CONFIRMATION_PROMPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)type\s+["']?([^"']+?)["']?\s+to\s+confirm"#).unwrap());

/// Control texts that confirm a dialog.
static CONFIRM_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(confirm|yes|ok|okay|delete|save|create|submit|apply|continue|done|enable)\b")
        .unwrap()
});

/// State machine over the goal: emits exactly one next action per call and
/// tracks state digests to detect no-progress loops.
///
/// One engine instance serves one `execute()` call; its histories are
/// discarded with it.
pub struct DecisionEngine {
    classifier: FieldClassifier,
    digests: DigestHistory,
    stuck_window: usize,
    stuck_escapes: u32,
    explore_count: u32,
    max_explore_cycles: u32,
    strict: bool,
    smart: bool,
}

impl DecisionEngine {
    pub fn new(config: &AutopilotConfig) -> Self {
        Self {
            classifier: FieldClassifier::new(),
            digests: DigestHistory::new(config.stuck_window.max(3) * 4),
            stuck_window: config.stuck_window,
            stuck_escapes: 0,
            explore_count: 0,
            max_explore_cycles: config.max_explore_cycles,
            strict: config.strict_mode,
            smart: config.use_smart_analysis,
        }
    }

    /// Record the digest observed after an executed action.
    pub fn note_digest(&mut self, digest: StateDigest) {
        if self.digests.last() != Some(&digest) {
            // Any movement resets the escape ladder.
            self.stuck_escapes = 0;
        }
        self.digests.push(digest);
    }

    /// True when the most recent digests are all identical.
    pub fn is_stuck(&self) -> bool {
        self.digests.last_n_identical(self.stuck_window)
    }

    /// Decide the single best next action for this snapshot.
    pub fn decide(
        &mut self,
        snapshot: &PageSnapshot,
        goal: &Goal,
        history: &[ExecutionStep],
    ) -> Action {
        // An open dialog owns the surface until it is resolved.
        if let Some(modal) = snapshot.modals.last() {
            return self.resolve_modal(modal, goal);
        }

        if let Some(condition) = &goal.success {
            if condition.is_met(&snapshot.url, &snapshot.page_text, snapshot) {
                return Action::done(format!("success condition met for goal '{}'", goal.name));
            }
        }

        // A goal that is not done and a surface that stopped moving: run
        // the escape ladder instead of repeating the same decision.
        if self.is_stuck() {
            return self.escape_ladder();
        }

        match self.resolve_target(snapshot, goal) {
            Some(control) if control.is_enabled() => Action::new(
                ActionKind::Click {
                    selector: control.selector.clone(),
                },
                format!("target '{}' is enabled", control.text),
                0.9,
            ),
            Some(control) => {
                let control_text = control.text.clone();
                let control_selector = control.selector.clone();
                if let Some(action) = self.next_fill(snapshot, goal) {
                    return action;
                }
                if fill_since_blur(history) {
                    return Action::new(
                        ActionKind::TabKey,
                        "confirming pending input with a blur before re-checking the target",
                        0.6,
                    );
                }
                self.explore(format!(
                    "target '{control_text}' ({control_selector}) stays disabled with no pending fields"
                ))
            }
            None if goal.target.is_some() => {
                if let Some(action) = self.next_fill(snapshot, goal) {
                    return action;
                }
                self.explore(format!(
                    "target {:?} not present on this surface",
                    goal.target.as_ref().expect("checked above")
                ))
            }
            None => {
                // No target named at all: explicit instructions may still
                // make progress, otherwise there is nothing left to try.
                if let Some(action) = self.explicit_fill(snapshot, goal) {
                    return action;
                }
                Action::blocked(
                    "goal names no target control and its success condition is not met",
                )
            }
        }
    }

    /// Escape ladder once stuck: Escape → TabKey → one bounded wait →
    /// surface failure.
    fn escape_ladder(&mut self) -> Action {
        self.stuck_escapes += 1;
        match self.stuck_escapes {
            1 => Action::new(
                ActionKind::Escape,
                "state unchanged across recent actions, dismissing any overlay",
                0.4,
            ),
            2 => Action::new(
                ActionKind::TabKey,
                "still no progress, forcing a blur",
                0.4,
            ),
            3 => Action::new(
                ActionKind::Wait { ms: 1_000 },
                "still no progress, waiting once before the final retry",
                0.3,
            ),
            _ => Action::blocked(
                "stuck: repeated identical page states and escape attempts changed nothing",
            ),
        }
    }

    fn explore(&mut self, reason: String) -> Action {
        self.explore_count += 1;
        if self.explore_count > self.max_explore_cycles {
            return Action::blocked(format!(
                "could not determine why the goal is unreachable: {reason}"
            ));
        }
        debug!(%reason, cycle = self.explore_count, "entering explore");
        Action::new(ActionKind::Explore { reason: reason.clone() }, reason, 0.3)
    }

    /// Dialogs: fill the first empty field, else click the first enabled
    /// confirm-like control, else Escape.
    fn resolve_modal(&self, modal: &ModalInfo, goal: &Goal) -> Action {
        let dialog = modal.title.as_deref().unwrap_or(&modal.selector);
        for field in &modal.fields {
            if field.visible && !field.disabled && !field.readonly && field.is_empty() {
                let value = self.modal_fill_value(field, goal);
                return Action::new(
                    ActionKind::Fill {
                        selector: field.selector.clone(),
                        value,
                    },
                    format!("dialog '{dialog}' has empty field '{}'", field.display_name()),
                    0.8,
                );
            }
        }
        for control in &modal.controls {
            if control.is_enabled() && CONFIRM_LIKE.is_match(&control.text) {
                return Action::new(
                    ActionKind::Click {
                        selector: control.selector.clone(),
                    },
                    format!("confirming dialog '{dialog}' via '{}'", control.text),
                    0.8,
                );
            }
        }
        Action::new(
            ActionKind::Escape,
            format!("dialog '{dialog}' has nothing to fill or confirm"),
            0.5,
        )
    }

    fn modal_fill_value(&self, field: &FieldInfo, goal: &Goal) -> String {
        if let Some(instruction) = match_instruction(field, goal) {
            return self.instruction_value(field, instruction);
        }
        for text in [field.label.as_deref(), field.placeholder.as_deref()]
            .into_iter()
            .flatten()
        {
            if let Some(captures) = CONFIRMATION_PROMPT.captures(text) {
                return captures[1].to_string();
            }
        }
        self.classified_value(field)
            .unwrap_or_else(|| "confirm".to_string())
    }

    fn resolve_target<'a>(
        &self,
        snapshot: &'a PageSnapshot,
        goal: &Goal,
    ) -> Option<&'a ControlInfo> {
        match goal.target.as_ref()? {
            TargetSpec::Text(text) => snapshot.find_control_by_text(text),
            TargetSpec::Selector(selector) => snapshot
                .controls
                .iter()
                .find(|c| c.selector == *selector && c.visible),
            TargetSpec::Role { role, name } => {
                let wanted = name.to_lowercase();
                snapshot.controls.iter().find(|c| {
                    c.visible
                        && c.role.as_deref() == Some(role.as_str())
                        && c.text.to_lowercase().contains(&wanted)
                })
            }
        }
    }

    /// Next field to fill: explicit instructions take priority over the
    /// generic emptiness scan.
    fn next_fill(&self, snapshot: &PageSnapshot, goal: &Goal) -> Option<Action> {
        if let Some(action) = self.explicit_fill(snapshot, goal) {
            return Some(action);
        }
        if self.strict || goal.options.strict_mode || !self.smart {
            return None;
        }

        // Required fields first.
        for field in snapshot.empty_required_fields() {
            if field.readonly {
                continue;
            }
            if let Some(action) = self.generic_fill(field, 0.7, "required and empty") {
                return Some(action);
            }
        }
        // Then optional empties whose purpose we actually recognize.
        for field in &snapshot.fields {
            if !field.visible || field.disabled || field.readonly || field.required {
                continue;
            }
            if !field.is_empty() {
                continue;
            }
            let classified = self
                .classifier
                .classify(field, &ClassifyContext::default());
            if classified.purpose == field_classifier::FieldPurpose::Unknown {
                continue;
            }
            if let Some(action) = self.generic_fill(field, 0.55, "optional with known purpose") {
                return Some(action);
            }
        }
        None
    }

    fn explicit_fill(&self, snapshot: &PageSnapshot, goal: &Goal) -> Option<Action> {
        for instruction in &goal.fields {
            let Some(field) = find_field(snapshot, &instruction.field) else {
                continue;
            };
            if !field.visible || field.disabled {
                continue;
            }
            if !field.is_empty() && instruction.skip_if_filled {
                continue;
            }
            let value = self.instruction_value(field, instruction);
            let kind = self.fill_kind(field, value);
            return Some(Action::new(
                kind,
                format!("explicit instruction for field '{}'", field.display_name()),
                0.85,
            ));
        }
        None
    }

    fn generic_fill(&self, field: &FieldInfo, confidence: f64, why: &str) -> Option<Action> {
        let classified = self
            .classifier
            .classify(field, &ClassifyContext::default());
        let kind = match classified.field_type {
            // No sensible generic choice exists for these.
            FieldType::Radio | FieldType::File => return None,
            FieldType::Checkbox => ActionKind::Fill {
                selector: field.selector.clone(),
                value: "true".into(),
            },
            FieldType::Dropdown => {
                let option = field.options.first()?.clone();
                ActionKind::Select {
                    selector: field.selector.clone(),
                    value: option,
                }
            }
            _ => ActionKind::Fill {
                selector: field.selector.clone(),
                value: classified.suggested_value?,
            },
        };
        Some(Action::new(
            kind,
            format!("field '{}' is {why}", field.display_name()),
            confidence,
        ))
    }

    fn instruction_value(&self, field: &FieldInfo, instruction: &FieldInstruction) -> String {
        match &instruction.value {
            ValueSpec::Literal(value) => value.clone(),
            ValueSpec::Generated => self
                .classified_value(field)
                .unwrap_or_else(|| format!("test-{}", uuid_head())),
        }
    }

    fn classified_value(&self, field: &FieldInfo) -> Option<String> {
        self.classifier
            .classify(field, &ClassifyContext::default())
            .suggested_value
    }

    fn fill_kind(&self, field: &FieldInfo, value: String) -> ActionKind {
        let classified = self
            .classifier
            .classify(field, &ClassifyContext::default());
        if classified.field_type == FieldType::Dropdown {
            ActionKind::Select {
                selector: field.selector.clone(),
                value,
            }
        } else {
            ActionKind::Fill {
                selector: field.selector.clone(),
                value,
            }
        }
    }
}

fn uuid_head() -> String {
    uuid::Uuid::new_v4()
        .to_string()
        .split('-')
        .next()
        .unwrap_or("0")
        .to_string()
}

/// A successful fill since the last blur-ish action means a Tab press may
/// be all that stands between the form and an enabled target.
fn fill_since_blur(history: &[ExecutionStep]) -> bool {
    for step in history.iter().rev() {
        match &step.action.kind {
            ActionKind::TabKey | ActionKind::Escape | ActionKind::Click { .. } => return false,
            ActionKind::Fill { .. } | ActionKind::Select { .. } if step.outcome.success => {
                return true
            }
            _ => {}
        }
    }
    false
}

fn find_field<'a>(snapshot: &'a PageSnapshot, field_ref: &FieldRef) -> Option<&'a FieldInfo> {
    match field_ref {
        FieldRef::Selector(selector) => snapshot.field_by_selector(selector),
        FieldRef::Label(label) => {
            let wanted = label.to_lowercase();
            snapshot
                .fields
                .iter()
                .find(|f| f.descriptive_text().contains(&wanted))
        }
    }
}

fn match_instruction<'a>(field: &FieldInfo, goal: &'a Goal) -> Option<&'a FieldInstruction> {
    goal.fields.iter().find(|instruction| match &instruction.field {
        FieldRef::Selector(selector) => *selector == field.selector,
        FieldRef::Label(label) => field
            .descriptive_text()
            .contains(&label.to_lowercase()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use formpilot_types::BoundingBox;

    fn engine() -> DecisionEngine {
        DecisionEngine::new(&AutopilotConfig::minimal())
    }

    fn control(selector: &str, text: &str, disabled: bool) -> ControlInfo {
        ControlInfo {
            selector: selector.into(),
            text: text.into(),
            disabled,
            visible: true,
            role: None,
            bbox: BoundingBox::new(0.0, 0.0, 80.0, 24.0),
        }
    }

    fn field(selector: &str, label: &str, required: bool, value: &str) -> FieldInfo {
        FieldInfo {
            selector: selector.into(),
            tag: "input".into(),
            input_type: Some("text".into()),
            label: Some(label.into()),
            required,
            visible: true,
            value: value.into(),
            bbox: BoundingBox::new(0.0, 0.0, 120.0, 24.0),
            ..Default::default()
        }
    }

    fn snapshot(controls: Vec<ControlInfo>, fields: Vec<FieldInfo>) -> PageSnapshot {
        PageSnapshot {
            url: "https://app.test/new".into(),
            title: None,
            controls,
            fields,
            alerts: vec![],
            modals: vec![],
            active_tab: None,
            page_text: String::new(),
            captured_at: Utc::now(),
        }
    }

    fn goal_with_target() -> Goal {
        Goal::new("create").click_target(TargetSpec::Text("Create".into()))
    }

    #[test]
    fn enabled_target_clicks_immediately() {
        let snap = snapshot(
            vec![control("#create", "Create", false)],
            vec![field("#name", "Name", true, "")],
        );
        let action = engine().decide(&snap, &goal_with_target(), &[]);
        assert!(matches!(action.kind, ActionKind::Click { .. }));
    }

    #[test]
    fn disabled_target_fills_required_field_first() {
        let snap = snapshot(
            vec![control("#create", "Create", true)],
            vec![field("#name", "Campaign name", true, "")],
        );
        let action = engine().decide(&snap, &goal_with_target(), &[]);
        match action.kind {
            ActionKind::Fill { selector, value } => {
                assert_eq!(selector, "#name");
                assert!(!value.is_empty());
            }
            other => panic!("expected fill, got {other:?}"),
        }
    }

    #[test]
    fn filled_field_then_enabled_target_clicks() {
        let snap = snapshot(
            vec![control("#create", "Create", false)],
            vec![field("#name", "Campaign name", true, "QA Campaign 1")],
        );
        let action = engine().decide(&snap, &goal_with_target(), &[]);
        assert!(matches!(action.kind, ActionKind::Click { .. }));
    }

    #[test]
    fn pending_fill_gets_blur_confirmation_before_explore() {
        let snap = snapshot(
            vec![control("#create", "Create", true)],
            vec![field("#name", "Campaign name", true, "already filled")],
        );
        let history = vec![ExecutionStep {
            index: 1,
            action: Action::new(
                ActionKind::Fill {
                    selector: "#name".into(),
                    value: "already filled".into(),
                },
                "test",
                0.7,
            ),
            outcome: formpilot_types::StepOutcome::ok("type-with-delay"),
            duration_ms: 1,
        }];
        let action = engine().decide(&snap, &goal_with_target(), &history);
        assert!(matches!(action.kind, ActionKind::TabKey));
    }

    #[test]
    fn explore_is_bounded_then_blocks() {
        let snap = snapshot(
            vec![control("#create", "Create", true)],
            vec![field("#name", "Campaign name", true, "filled")],
        );
        let mut engine = engine();
        let mut kinds = Vec::new();
        for _ in 0..4 {
            kinds.push(engine.decide(&snap, &goal_with_target(), &[]).kind);
        }
        assert!(matches!(kinds[0], ActionKind::Explore { .. }));
        assert!(matches!(kinds[1], ActionKind::Explore { .. }));
        assert!(matches!(kinds[2], ActionKind::Blocked { .. }));
    }

    #[test]
    fn stuck_after_three_identical_digests() {
        let mut engine = engine();
        let digest = StateDigest {
            location: "https://app.test".into(),
            empty_required: 1,
            filled: 0,
            target_enabled: false,
        };
        engine.note_digest(digest.clone());
        engine.note_digest(digest.clone());
        assert!(!engine.is_stuck());
        engine.note_digest(digest);
        assert!(engine.is_stuck());
    }

    #[test]
    fn escape_ladder_escalates_to_blocked() {
        let mut engine = engine();
        let digest = StateDigest {
            location: "x".into(),
            empty_required: 0,
            filled: 0,
            target_enabled: false,
        };
        for _ in 0..3 {
            engine.note_digest(digest.clone());
        }
        let snap = snapshot(vec![], vec![]);
        let goal = goal_with_target();
        assert!(matches!(
            engine.decide(&snap, &goal, &[]).kind,
            ActionKind::Escape
        ));
        assert!(matches!(
            engine.decide(&snap, &goal, &[]).kind,
            ActionKind::TabKey
        ));
        assert!(matches!(
            engine.decide(&snap, &goal, &[]).kind,
            ActionKind::Wait { .. }
        ));
        assert!(matches!(
            engine.decide(&snap, &goal, &[]).kind,
            ActionKind::Blocked { .. }
        ));
    }

    #[test]
    fn success_condition_wins_even_when_stuck() {
        let mut engine = engine();
        let digest = StateDigest {
            location: "x".into(),
            empty_required: 0,
            filled: 0,
            target_enabled: false,
        };
        for _ in 0..3 {
            engine.note_digest(digest.clone());
        }
        let mut snap = snapshot(vec![], vec![]);
        snap.url = "https://app.test/campaigns/42".into();
        let goal = Goal::new("create")
            .with_success(formpilot_types::SuccessCondition::UrlContains("/campaigns/".into()));
        let action = engine.decide(&snap, &goal, &[]);
        assert!(matches!(action.kind, ActionKind::Done));
    }

    #[test]
    fn modal_fill_extracts_confirmation_text() {
        let mut modal_field = field("#confirm-input", "Type DELETE to confirm", true, "");
        modal_field.label = Some("Type DELETE to confirm".into());
        let modal = ModalInfo {
            selector: "[data-dialog='confirm']".into(),
            title: Some("Are you sure?".into()),
            fields: vec![modal_field],
            controls: vec![control("#confirm-btn", "Delete", true)],
        };
        let mut snap = snapshot(vec![], vec![]);
        snap.modals.push(modal);
        let action = engine().decide(&snap, &goal_with_target(), &[]);
        match action.kind {
            ActionKind::Fill { selector, value } => {
                assert_eq!(selector, "#confirm-input");
                assert_eq!(value, "DELETE");
            }
            other => panic!("expected modal fill, got {other:?}"),
        }
    }

    #[test]
    fn modal_without_fields_clicks_confirm_like_control() {
        let modal = ModalInfo {
            selector: "[data-dialog='confirm']".into(),
            title: Some("Are you sure?".into()),
            fields: vec![],
            controls: vec![
                control("#cancel", "Cancel", false),
                control("#yes", "Yes, delete it", false),
            ],
        };
        let mut snap = snapshot(vec![], vec![]);
        snap.modals.push(modal);
        let action = engine().decide(&snap, &goal_with_target(), &[]);
        match action.kind {
            ActionKind::Click { selector } => assert_eq!(selector, "#yes"),
            other => panic!("expected click, got {other:?}"),
        }
    }

    #[test]
    fn empty_modal_escapes() {
        let modal = ModalInfo {
            selector: "[data-dialog='hint']".into(),
            title: None,
            fields: vec![],
            controls: vec![],
        };
        let mut snap = snapshot(vec![], vec![]);
        snap.modals.push(modal);
        let action = engine().decide(&snap, &goal_with_target(), &[]);
        assert!(matches!(action.kind, ActionKind::Escape));
    }

    #[test]
    fn strict_mode_ignores_generic_fields() {
        let mut config = AutopilotConfig::minimal();
        config.strict_mode = true;
        let mut engine = DecisionEngine::new(&config);
        let snap = snapshot(
            vec![control("#create", "Create", true)],
            vec![field("#name", "Campaign name", true, "")],
        );
        let action = engine.decide(&snap, &goal_with_target(), &[]);
        assert!(matches!(action.kind, ActionKind::Explore { .. }));
    }

    #[test]
    fn instruction_skips_already_filled_field() {
        let goal = goal_with_target().with_field(FieldInstruction::literal(
            FieldRef::Selector("#name".into()),
            "value",
        ));
        let snap = snapshot(
            vec![control("#create", "Create", true)],
            vec![field("#name", "Name", false, "existing")],
        );
        let action = engine().decide(&snap, &goal, &[]);
        // Skipped: field holds a value and the instruction says leave it.
        assert!(!matches!(action.kind, ActionKind::Fill { .. }));
    }

    #[test]
    fn no_target_and_no_success_blocks() {
        let snap = snapshot(vec![], vec![]);
        let action = engine().decide(&snap, &Goal::new("aimless"), &[]);
        assert!(matches!(action.kind, ActionKind::Blocked { .. }));
    }

    #[test]
    fn disabled_field_is_never_selected() {
        let mut disabled = field("#locked", "Campaign name", true, "");
        disabled.disabled = true;
        let snap = snapshot(vec![control("#create", "Create", true)], vec![disabled]);
        let action = engine().decide(&snap, &goal_with_target(), &[]);
        assert!(!matches!(action.kind, ActionKind::Fill { .. }));
    }
}
