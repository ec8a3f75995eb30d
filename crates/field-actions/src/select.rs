//! Dropdown and combobox strategy chains.

use driver_bridge::{Key, OptionEntry, OptionMatch};
use field_classifier::ClassifiedField;
use formpilot_types::InteractionResult;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::{ActionError, InteractionExecutor};

/// "Create new ..." affordances that comboboxes surface inside their
/// option lists.
static CREATE_AFFORDANCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(create|add|new)\b").unwrap());

/// Upper bound on keyboard arrow navigation steps.
const MAX_ARROW_STEPS: usize = 10;

impl InteractionExecutor {
    /// Dropdown chain: native select by label → native select by value →
    /// open and match option by role → match list item → Enter confirm.
    pub(crate) async fn apply_dropdown(
        &self,
        field: &ClassifiedField,
        value: &str,
    ) -> Result<InteractionResult, ActionError> {
        let selector = field.selector();
        let mut attempts = 0;

        if field.field.tag == "select" {
            for matcher in [OptionMatch::Label, OptionMatch::Value] {
                attempts += 1;
                if self
                    .driver
                    .select_option(selector, matcher, value)
                    .await
                    .is_ok()
                    && self.verify_value(selector, value).await.is_ok()
                {
                    let method = match matcher {
                        OptionMatch::Label => "native-select-label",
                        OptionMatch::Value => "native-select-value",
                    };
                    return Ok(InteractionResult::ok(
                        method,
                        attempts,
                        Some(value.to_string()),
                    ));
                }
            }
        }

        // Open the widget and work the option list.
        self.driver.click(selector).await?;
        let options = self.driver.list_options(selector).await?;

        attempts += 1;
        if let Some(option) = exact_option(&options, value) {
            let applied = option.label.clone();
            self.driver.click(&option.selector).await?;
            if self.verify_value(selector, &applied).await.is_ok() {
                return Ok(InteractionResult::ok("option-role-match", attempts, Some(applied)));
            }
        }

        attempts += 1;
        if let Some(option) = partial_option(&options, value) {
            let applied = option.label.clone();
            self.driver.click(&option.selector).await?;
            if self.verify_value(selector, &applied).await.is_ok() {
                return Ok(InteractionResult::ok("list-item-match", attempts, Some(applied)));
            }
        }

        attempts += 1;
        self.driver.press_key(Key::Enter).await?;
        if self.verify_value(selector, value).await.is_ok() {
            return Ok(InteractionResult::ok(
                "enter-confirm",
                attempts,
                Some(value.to_string()),
            ));
        }

        debug!(selector, value, "dropdown chain exhausted");
        Err(ActionError::OptionNotFound(value.to_string()))
    }

    /// Combobox chain: type value → exact option → create affordance →
    /// Enter → Tab blur → bounded keyboard arrow navigation.
    pub(crate) async fn apply_combobox(
        &self,
        field: &ClassifiedField,
        value: &str,
    ) -> Result<InteractionResult, ActionError> {
        let selector = field.selector();
        let mut attempts = 0;

        self.driver.click(selector).await?;
        let _ = self.driver.clear(selector).await;
        self.driver
            .type_text(selector, value, self.config.type_delay_ms)
            .await?;
        let options = self.driver.list_options(selector).await?;

        attempts += 1;
        if let Some(option) = exact_option(&options, value) {
            let applied = option.label.clone();
            self.driver.click(&option.selector).await?;
            if self.verify_value(selector, &applied).await.is_ok() {
                return Ok(InteractionResult::ok("combobox-option", attempts, Some(applied)));
            }
        }

        attempts += 1;
        if let Some(option) = create_affordance(&options) {
            self.driver.click(&option.selector).await?;
            if self.verify_value(selector, value).await.is_ok() {
                return Ok(InteractionResult::ok(
                    "combobox-create",
                    attempts,
                    Some(value.to_string()),
                ));
            }
        }

        attempts += 1;
        self.driver.press_key(Key::Enter).await?;
        self.blur_ladder(selector).await?;
        if self.verify_value(selector, value).await.is_ok() {
            return Ok(InteractionResult::ok(
                "combobox-enter",
                attempts,
                Some(value.to_string()),
            ));
        }

        // Keyboard arrow navigation, bounded. Re-type the value first so
        // the widget filters again after the dropped Enter attempt.
        for step in 0..MAX_ARROW_STEPS {
            attempts += 1;
            self.driver.focus(selector).await?;
            for _ in 0..=step {
                self.driver.press_key(Key::ArrowDown).await?;
            }
            self.driver.press_key(Key::Enter).await?;
            if self.verify_value(selector, value).await.is_ok() {
                return Ok(InteractionResult::ok(
                    "combobox-arrow",
                    attempts,
                    Some(value.to_string()),
                ));
            }
        }

        debug!(selector, value, "combobox chain exhausted");
        Err(ActionError::OptionNotFound(value.to_string()))
    }
}

fn exact_option<'a>(options: &'a [OptionEntry], value: &str) -> Option<&'a OptionEntry> {
    options
        .iter()
        .find(|o| !o.is_create_affordance && o.label.eq_ignore_ascii_case(value))
}

fn partial_option<'a>(options: &'a [OptionEntry], value: &str) -> Option<&'a OptionEntry> {
    let needle = value.to_lowercase();
    options
        .iter()
        .find(|o| !o.is_create_affordance && o.label.to_lowercase().contains(&needle))
}

fn create_affordance(options: &[OptionEntry]) -> Option<&OptionEntry> {
    options
        .iter()
        .find(|o| o.is_create_affordance || CREATE_AFFORDANCE.is_match(&o.label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExecutorConfig;
    use driver_bridge::mock::{combobox, native_select, MockDriver, MockPage};
    use driver_bridge::PageDriver;
    use field_classifier::{ClassifyContext, FieldClassifier};
    use formpilot_types::FieldInfo;
    use std::sync::Arc;

    fn executor(driver: Arc<MockDriver>) -> InteractionExecutor {
        InteractionExecutor::new(
            driver,
            ExecutorConfig {
                type_delay_ms: 0,
                verify_timeout_ms: 80,
            },
        )
    }

    fn classified(selector: &str, tag: &str, combobox_like: bool) -> ClassifiedField {
        let field = FieldInfo {
            selector: selector.into(),
            tag: tag.into(),
            input_type: (tag == "input").then(|| "text".into()),
            label: Some("Channel".into()),
            has_dropdown_indicator: combobox_like,
            has_autocomplete: combobox_like,
            visible: true,
            ..Default::default()
        };
        FieldClassifier::new().classify(&field, &ClassifyContext::default())
    }

    #[tokio::test]
    async fn native_select_by_label() {
        let page = MockPage::new("https://t", "t").with_elements(vec![native_select(
            "#channel",
            "Channel",
            &["Email", "SMS", "Push"],
        )]);
        let driver = Arc::new(MockDriver::new(page));
        let executor = executor(driver.clone());
        let result = executor
            .apply_dropdown(&classified("#channel", "select", false), "SMS")
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.method, "native-select-label");
        assert_eq!(driver.read_value("#channel").await.unwrap(), Some("SMS".into()));
    }

    #[tokio::test]
    async fn dropdown_without_match_fails_not_lies() {
        let page = MockPage::new("https://t", "t").with_elements(vec![native_select(
            "#channel",
            "Channel",
            &["Email", "SMS"],
        )]);
        let executor = executor(Arc::new(MockDriver::new(page)));
        let err = executor
            .apply_dropdown(&classified("#channel", "select", false), "Carrier pigeon")
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::OptionNotFound(_)));
    }

    #[tokio::test]
    async fn combobox_picks_exact_option() {
        let page = MockPage::new("https://t", "t")
            .with_elements(vec![combobox("#channel", "Channel", &["Email", "SMS"], false)]);
        let driver = Arc::new(MockDriver::new(page));
        let executor = executor(driver.clone());
        let result = executor
            .apply_combobox(&classified("#channel", "input", true), "Email")
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.method, "combobox-option");
        assert_eq!(
            driver.read_value("#channel").await.unwrap(),
            Some("Email".into())
        );
    }

    #[tokio::test]
    async fn combobox_uses_create_affordance_for_fresh_value() {
        let page = MockPage::new("https://t", "t")
            .with_elements(vec![combobox("#channel", "Channel", &["Email"], true)]);
        let driver = Arc::new(MockDriver::new(page));
        let executor = executor(driver.clone());
        let result = executor
            .apply_combobox(&classified("#channel", "input", true), "Push")
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.method, "combobox-create");
        assert_eq!(
            driver.read_value("#channel").await.unwrap(),
            Some("Push".into())
        );
    }

    #[tokio::test]
    async fn combobox_without_match_or_create_fails() {
        let page = MockPage::new("https://t", "t")
            .with_elements(vec![combobox("#channel", "Channel", &["Email"], false)]);
        let executor = executor(Arc::new(MockDriver::new(page)));
        let err = executor
            .apply_combobox(&classified("#channel", "input", true), "Pigeon")
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::OptionNotFound(_)));
    }
}
