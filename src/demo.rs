//! The demo surface the CLI drives: a scripted in-memory campaign form.

use std::sync::Arc;

use driver_bridge::mock::{
    button, combobox, disabled_button, native_select, required_text_input, text_input, EnableRule,
    EnableTrigger, MockDriver, MockPage,
};
use formpilot_types::{Goal, SuccessCondition, TargetSpec};

/// Build the demo page: a campaign editor whose Create button enables only
/// once the required name and channel are filled, with a confirmation
/// dialog before saving.
pub fn campaign_form() -> Arc<MockDriver> {
    let mut confirm = disabled_button("#confirm-create", "Create");
    confirm.dialog_id = Some("confirm".into());
    confirm.dialog_title = Some("Create this campaign?".into());
    confirm.visible = false;
    let mut confirm_field = required_text_input("#confirm-name", "Type CREATE to confirm");
    confirm_field.dialog_id = Some("confirm".into());
    confirm_field.dialog_title = Some("Create this campaign?".into());
    confirm_field.visible = false;

    let page = MockPage::new("https://demo.test/campaigns/new", "New campaign")
        .with_elements(vec![
            required_text_input("#campaign-name", "Campaign name"),
            combobox("#channel", "Channel", &["Email", "SMS"], true),
            native_select("#objective", "Objective", &["Awareness", "Conversions"]),
            text_input("#landing-url", "Landing page URL"),
            disabled_button("#create", "Create campaign"),
            button("#cancel", "Cancel"),
            confirm_field,
            confirm,
        ]);

    let driver = Arc::new(MockDriver::new(page));
    driver.add_enable_rule(EnableRule {
        control: "#create".into(),
        requires_filled: vec!["#campaign-name".into(), "#channel".into()],
        on: EnableTrigger::Change,
    });
    driver.add_enable_rule(EnableRule {
        control: "#confirm-create".into(),
        requires_filled: vec!["#confirm-name".into()],
        on: EnableTrigger::Change,
    });
    driver.on_click("#create", |page| page.show_dialog("confirm"));
    driver.on_click("#confirm-create", |page| {
        page.close_top_dialog();
        page.navigate("https://demo.test/campaigns/1042");
    });
    driver
}

/// The goal the demo runs against [`campaign_form`].
pub fn campaign_goal() -> Goal {
    Goal::new("create campaign")
        .click_target(TargetSpec::Text("Create campaign".into()))
        .with_success(SuccessCondition::UrlContains("/campaigns/1042".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use formpilot_engine::{Autopilot, AutopilotConfig};

    #[tokio::test]
    async fn demo_goal_completes() {
        let driver = campaign_form();
        let pilot = Autopilot::with_config(driver, AutopilotConfig::minimal());
        let result = pilot.execute(&campaign_goal()).await.unwrap();
        assert!(result.success, "demo run failed: {:?}", result.error);
    }
}
