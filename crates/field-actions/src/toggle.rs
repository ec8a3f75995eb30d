//! Radio, checkbox, date, and file strategies.

use driver_bridge::{ElementNode, Key};
use field_classifier::ClassifiedField;
use formpilot_types::InteractionResult;
use tracing::debug;

use crate::{ActionError, InteractionExecutor};

impl InteractionExecutor {
    /// Radio: match by shared group name plus target value, falling back
    /// to label text.
    pub(crate) async fn apply_radio(
        &self,
        field: &ClassifiedField,
        value: &str,
    ) -> Result<InteractionResult, ActionError> {
        let group = field.field.name_attr.clone();
        let elements = self.driver.snapshot_elements().await?;
        let radios: Vec<&ElementNode> = elements
            .iter()
            .filter(|e| {
                e.input_type.as_deref() == Some("radio")
                    && (group.is_none() || e.name_attr == group)
            })
            .collect();

        let needle = value.trim().to_lowercase();
        let by_value = radios.iter().find(|e| {
            e.attribute("value").map(|v| v.to_lowercase()) == Some(needle.clone())
                || e.value.to_lowercase() == needle
        });
        let (target, method) = match by_value {
            Some(el) => (*el, "radio-value"),
            None => {
                let by_label = radios.iter().find(|e| {
                    e.label
                        .as_deref()
                        .map(|l| l.to_lowercase().contains(&needle))
                        .unwrap_or(false)
                        || e.text.to_lowercase().contains(&needle)
                });
                match by_label {
                    Some(el) => (*el, "radio-label"),
                    None => {
                        debug!(value, "no radio in group matches");
                        return Err(ActionError::OptionNotFound(value.to_string()));
                    }
                }
            }
        };

        let selector = target.selector.clone();
        self.driver.click(&selector).await?;
        match self.driver.read_checked(&selector).await? {
            Some(true) => Ok(InteractionResult::ok(method, 1, Some(value.to_string()))),
            other => Err(ActionError::NotPersisted {
                selector,
                expected: "checked".into(),
                observed: format!("{other:?}"),
            }),
        }
    }

    /// Checkbox: check or uncheck directly, then confirm the state took.
    pub(crate) async fn apply_checkbox(
        &self,
        field: &ClassifiedField,
        value: &str,
    ) -> Result<InteractionResult, ActionError> {
        let selector = field.selector();
        let desired = parse_checkbox_value(value);
        let current = self
            .driver
            .read_checked(selector)
            .await?
            .unwrap_or(false);

        let method = if current == desired {
            "checkbox-noop"
        } else {
            self.driver.click(selector).await?;
            "checkbox-toggle"
        };

        match self.driver.read_checked(selector).await? {
            Some(state) if state == desired => Ok(InteractionResult::ok(
                method,
                1,
                Some(desired.to_string()),
            )),
            other => Err(ActionError::NotPersisted {
                selector: selector.to_string(),
                expected: desired.to_string(),
                observed: format!("{other:?}"),
            }),
        }
    }

    /// Date: direct value assignment, falling back to type plus Escape to
    /// dismiss any picker overlay.
    pub(crate) async fn apply_date(
        &self,
        selector: &str,
        value: &str,
    ) -> Result<InteractionResult, ActionError> {
        let mut attempts = 1;
        if self.driver.set_value(selector, value).await.is_ok()
            && self.verify_value(selector, value).await.is_ok()
        {
            return Ok(InteractionResult::ok(
                "date-direct",
                attempts,
                Some(value.to_string()),
            ));
        }

        attempts += 1;
        self.driver.click(selector).await?;
        self.driver.clear(selector).await?;
        self.driver
            .type_text(selector, value, self.config.type_delay_ms)
            .await?;
        self.driver.press_key(Key::Escape).await?;
        let observed = self.verify_value(selector, value).await?;
        Ok(InteractionResult::ok("date-type", attempts, observed))
    }

    /// File: attach by path, then confirm the input reflects it.
    pub(crate) async fn apply_file(
        &self,
        selector: &str,
        value: &str,
    ) -> Result<InteractionResult, ActionError> {
        self.driver
            .set_files(selector, &[value.to_string()])
            .await?;
        let observed = self.driver.read_value(selector).await?.unwrap_or_default();
        if observed.contains(value) {
            Ok(InteractionResult::ok("file-attach", 1, Some(observed)))
        } else {
            Err(ActionError::NotPersisted {
                selector: selector.to_string(),
                expected: value.to_string(),
                observed,
            })
        }
    }
}

fn parse_checkbox_value(value: &str) -> bool {
    !matches!(
        value.trim().to_lowercase().as_str(),
        "false" | "no" | "off" | "0" | "uncheck" | "unchecked"
    )
}
