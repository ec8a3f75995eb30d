//! End-to-end scenarios against the in-memory driver.

use std::sync::Arc;

use driver_bridge::mock::{
    button, combobox, disabled_button, native_select, required_text_input, text_input, EnableRule,
    EnableTrigger, MockDriver, MockPage,
};
use driver_bridge::PageDriver;
use formpilot_engine::{Autopilot, AutopilotConfig};
use formpilot_types::{ActionKind, FieldInstruction, FieldRef, Goal, SuccessCondition, TargetSpec};

fn autopilot(driver: Arc<MockDriver>) -> Autopilot {
    Autopilot::with_config(driver, AutopilotConfig::minimal())
}

/// A campaign form: required name, required channel combobox, disabled
/// Create button that enables once both are filled.
fn campaign_form(allow_create: bool) -> Arc<MockDriver> {
    let page = MockPage::new("https://app.test/campaigns/new", "New campaign").with_elements(vec![
        required_text_input("#campaign-name", "Campaign name"),
        combobox("#channel", "Channel", &["Email", "SMS"], allow_create),
        disabled_button("#create", "Create campaign"),
        button("#cancel", "Cancel"),
    ]);
    let driver = Arc::new(MockDriver::new(page));
    driver.add_enable_rule(EnableRule {
        control: "#create".into(),
        requires_filled: vec!["#campaign-name".into(), "#channel".into()],
        on: EnableTrigger::Change,
    });
    driver.on_click("#create", |page| {
        page.navigate("https://app.test/campaigns/123");
    });
    driver
}

#[tokio::test]
async fn fills_form_and_clicks_create() {
    let driver = campaign_form(true);
    let pilot = autopilot(driver.clone());
    let goal = Goal::new("create campaign")
        .click_target(TargetSpec::Text("Create campaign".into()))
        .with_success(SuccessCondition::UrlContains("/campaigns/123".into()));

    let result = pilot.execute(&goal).await.unwrap();
    assert!(result.success, "run failed: {:?}", result.error);

    // Both fields were actually written.
    let name = driver.read_value("#campaign-name").await.unwrap().unwrap();
    assert!(!name.is_empty());
    let channel = driver.read_value("#channel").await.unwrap().unwrap();
    assert!(!channel.is_empty());

    // The decided sequence ends with a click on the now-enabled target.
    let kinds: Vec<&str> = result.steps.iter().map(|s| s.action.kind.label()).collect();
    assert!(kinds.contains(&"fill"));
    assert_eq!(*kinds.last().unwrap(), "done");
}

#[tokio::test]
async fn enabled_target_is_clicked_without_filling() {
    let page = MockPage::new("https://app.test/list", "Campaigns").with_elements(vec![
        required_text_input("#search", "Search"),
        button("#new", "New campaign"),
    ]);
    let driver = Arc::new(MockDriver::new(page));
    driver.on_click("#new", |page| page.navigate("https://app.test/campaigns/new"));
    let pilot = autopilot(driver);
    let goal = Goal::new("open editor")
        .click_target(TargetSpec::Text("New campaign".into()))
        .with_success(SuccessCondition::UrlContains("/campaigns/new".into()));

    let result = pilot.execute(&goal).await.unwrap();
    assert!(result.success);
    // First action must be the click, never a fill.
    assert!(matches!(
        result.steps[0].action.kind,
        ActionKind::Click { .. }
    ));
}

#[tokio::test]
async fn explicit_instructions_take_priority() {
    let driver = campaign_form(true);
    let pilot = autopilot(driver.clone());
    let goal = Goal::new("create named campaign")
        .click_target(TargetSpec::Text("Create campaign".into()))
        .with_field(FieldInstruction::literal(
            FieldRef::Label("campaign name".into()),
            "Spring launch",
        ))
        .with_success(SuccessCondition::UrlContains("/campaigns/123".into()));

    let result = pilot.execute(&goal).await.unwrap();
    assert!(result.success);
    assert_eq!(
        driver.read_value("#campaign-name").await.unwrap().unwrap(),
        "Spring launch"
    );
}

#[tokio::test]
async fn dropdown_without_matching_option_fails_honestly() {
    let page = MockPage::new("https://app.test/new", "New").with_elements(vec![
        native_select("#channel", "Channel", &["Email", "SMS"]),
        disabled_button("#save", "Save"),
    ]);
    let driver = Arc::new(MockDriver::new(page));
    let pilot = autopilot(driver.clone());
    let goal = Goal::new("pick unavailable channel")
        .click_target(TargetSpec::Text("Save".into()))
        .with_field(FieldInstruction::literal(
            FieldRef::Selector("#channel".into()),
            "Carrier pigeon",
        ));

    let result = pilot.execute(&goal).await.unwrap();
    assert!(!result.success);
    // The select was never silently reported as applied.
    assert_eq!(driver.read_value("#channel").await.unwrap().unwrap(), "");
    let failed_step = result.steps.iter().find(|s| !s.outcome.success).unwrap();
    assert!(failed_step.outcome.error.as_ref().unwrap().contains("not found"));
}

#[tokio::test]
async fn two_step_confirmation_modal_resolves_without_intervention() {
    // Page: a Delete button opening dialog 1 ("type DELETE to confirm",
    // Delete disabled until typed), whose Delete opens dialog 2 ("Are you
    // sure?"), whose Confirm deletes and navigates.
    let mut confirm_field = required_text_input("#confirm-text", "Type DELETE to confirm");
    confirm_field.dialog_id = Some("confirm-1".into());
    confirm_field.dialog_title = Some("Confirm deletion".into());
    confirm_field.visible = false;
    let mut confirm_delete = disabled_button("#confirm-delete", "Delete");
    confirm_delete.dialog_id = Some("confirm-1".into());
    confirm_delete.dialog_title = Some("Confirm deletion".into());
    confirm_delete.visible = false;
    let mut really_confirm = button("#really-confirm", "Yes, delete it");
    really_confirm.dialog_id = Some("confirm-2".into());
    really_confirm.dialog_title = Some("Are you sure?".into());
    really_confirm.visible = false;

    let page = MockPage::new("https://app.test/campaigns/7", "Campaign 7").with_elements(vec![
        button("#delete", "Delete campaign"),
        confirm_field,
        confirm_delete,
        really_confirm,
    ]);
    let driver = Arc::new(MockDriver::new(page));
    driver.add_enable_rule(EnableRule {
        control: "#confirm-delete".into(),
        requires_filled: vec!["#confirm-text".into()],
        on: EnableTrigger::Change,
    });
    driver.on_click("#delete", |page| page.show_dialog("confirm-1"));
    driver.on_click("#confirm-delete", |page| {
        page.close_top_dialog();
        page.show_dialog("confirm-2");
    });
    driver.on_click("#really-confirm", |page| {
        page.close_top_dialog();
        page.navigate("https://app.test/campaigns?deleted=7");
    });

    let pilot = autopilot(driver.clone());
    let goal = Goal::new("delete campaign")
        .click_target(TargetSpec::Text("Delete campaign".into()))
        .with_success(SuccessCondition::UrlContains("deleted=7".into()));

    let result = pilot.execute(&goal).await.unwrap();
    assert!(result.success, "run failed: {:?}", result.error);
    // The confirmation text was extracted from the prompt, not guessed.
    assert_eq!(
        driver.read_value("#confirm-text").await.unwrap().unwrap(),
        "DELETE"
    );
}

#[tokio::test]
async fn max_steps_exhaustion_reports_failure() {
    // A target that never enables and a field that never helps.
    let page = MockPage::new("https://app.test/stuck", "Stuck").with_elements(vec![
        text_input("#note", "Notes"),
        disabled_button("#save", "Save"),
    ]);
    let driver = Arc::new(MockDriver::new(page));
    let mut config = AutopilotConfig::minimal();
    config.max_steps = 4;
    config.max_explore_cycles = 100; // keep Explore from blocking first
    let pilot = Autopilot::with_config(driver, config);
    let goal = Goal::new("unreachable").click_target(TargetSpec::Text("Save".into()));

    let result = pilot.execute(&goal).await.unwrap();
    assert!(!result.success);
    let error = result.error.unwrap();
    assert!(
        error.contains("maximum steps") || error.contains("stuck"),
        "unexpected failure reason: {error}"
    );
    assert!(result.steps.len() <= 4);
}

#[tokio::test]
async fn explore_exhaustion_blocks_with_reason() {
    let page = MockPage::new("https://app.test/odd", "Odd").with_elements(vec![
        disabled_button("#save", "Save"),
    ]);
    let driver = Arc::new(MockDriver::new(page));
    let pilot = autopilot(driver);
    let goal = Goal::new("save").click_target(TargetSpec::Text("Save".into()));

    let result = pilot.execute(&goal).await.unwrap();
    assert!(!result.success);
    assert!(result
        .error
        .unwrap()
        .to_lowercase()
        .contains("could not determine"));
}

#[tokio::test]
async fn target_survives_rerender_between_runs() {
    // The button's descriptor changes between captures (framework
    // re-render). Text-based targeting keeps working because every
    // iteration resolves against a fresh snapshot.
    let page = MockPage::new("https://app.test/r", "R").with_elements(vec![
        text_input("#name", "Name"),
        button("#save-v1", "Save changes"),
    ]);
    let driver = Arc::new(MockDriver::new(page));
    driver.update(|p| {
        if let Some(el) = p.element_mut("#save-v1") {
            el.selector = "#save-v2".into();
        }
    });
    let pilot = autopilot(driver.clone());
    let reasons = pilot.analyze_button("Save changes").await.unwrap();
    assert!(reasons[0].contains("enabled"));

    let goal = Goal::new("save")
        .click_target(TargetSpec::Text("Save changes".into()))
        .with_success(SuccessCondition::predicate(|s| s.url.ends_with("saved")));
    driver.on_click("#save-v2", |page| page.navigate("https://app.test/saved"));
    let result = pilot.execute(&goal).await.unwrap();
    assert!(result.success);
}

#[tokio::test]
async fn get_state_twice_is_stable() {
    let driver = campaign_form(false);
    let pilot = autopilot(driver);
    let first = pilot.get_state().await.unwrap();
    let second = pilot.get_state().await.unwrap();
    assert_eq!(first.fields.len(), second.fields.len());
    assert_eq!(first.controls.len(), second.controls.len());
    for (a, b) in first.fields.iter().zip(second.fields.iter()) {
        assert_eq!(a.value, b.value);
    }
}

#[tokio::test]
async fn readable_state_names_the_blockers() {
    let driver = campaign_form(false);
    let pilot = autopilot(driver);
    let text = pilot.get_readable_state().await.unwrap();
    assert!(text.contains("Campaign name"));
    assert!(text.contains("Likely submit"));

    let reasons = pilot.analyze_button("Create campaign").await.unwrap();
    assert!(reasons[0].contains("disabled"));
    assert!(reasons.iter().any(|r| r.contains("required field")));
}

#[tokio::test]
async fn step_once_decides_a_single_action() {
    let driver = campaign_form(true);
    let pilot = autopilot(driver);
    let goal = Goal::new("create campaign")
        .click_target(TargetSpec::Text("Create campaign".into()));
    let step = pilot.step_once(&goal).await.unwrap();
    // Disabled target and an empty required field: the one action is a fill.
    assert!(matches!(step.action.kind, ActionKind::Fill { .. }));
    assert!(step.outcome.success);
}

#[tokio::test]
async fn strict_mode_only_touches_instructed_fields() {
    let driver = campaign_form(true);
    let mut config = AutopilotConfig::minimal();
    config.strict_mode = true;
    config.max_steps = 5;
    let pilot = Autopilot::with_config(driver.clone(), config);
    let goal = Goal::new("strict fill")
        .click_target(TargetSpec::Text("Create campaign".into()))
        .with_field(FieldInstruction::literal(
            FieldRef::Selector("#campaign-name".into()),
            "Strict only",
        ));

    let result = pilot.execute(&goal).await.unwrap();
    // The channel combobox was never touched, so the run cannot succeed.
    assert!(!result.success);
    assert_eq!(
        driver.read_value("#campaign-name").await.unwrap().unwrap(),
        "Strict only"
    );
    assert_eq!(driver.read_value("#channel").await.unwrap().unwrap(), "");
}
