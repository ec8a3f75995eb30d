//! The executor: dispatch per field type, text chain, blur ladder.

use std::sync::Arc;

use adaptive_wait::{AdaptiveWaiter, WaitConfig};
use driver_bridge::{Key, PageDriver};
use field_classifier::{ClassifiedField, FieldType};
use formpilot_types::InteractionResult;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::ActionError;

/// Executor tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Per-keystroke delay when typing.
    pub type_delay_ms: u64,
    /// Budget for each post-write persistence check.
    pub verify_timeout_ms: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            type_delay_ms: 30,
            verify_timeout_ms: 2_000,
        }
    }
}

/// Applies values to classified fields through layered fallback chains.
pub struct InteractionExecutor {
    pub(crate) driver: Arc<dyn PageDriver>,
    pub(crate) waiter: AdaptiveWaiter,
    pub(crate) config: ExecutorConfig,
}

impl InteractionExecutor {
    pub fn new(driver: Arc<dyn PageDriver>, config: ExecutorConfig) -> Self {
        let wait_config = WaitConfig {
            value_timeout_ms: config.verify_timeout_ms,
            ..WaitConfig::default()
        };
        let waiter = AdaptiveWaiter::with_config(driver.clone(), wait_config);
        Self {
            driver,
            waiter,
            config,
        }
    }

    /// Apply `value` to the field, cascading through the type's strategy
    /// chain until the applied value is verified to persist.
    #[instrument(skip(self, field), fields(selector = %field.selector(), field_type = ?field.field_type))]
    pub async fn apply(
        &self,
        field: &ClassifiedField,
        value: &str,
    ) -> Result<InteractionResult, ActionError> {
        match field.field_type {
            FieldType::Text | FieldType::Textarea | FieldType::Number | FieldType::Password => {
                self.apply_text(field.selector(), value).await
            }
            FieldType::Dropdown => self.apply_dropdown(field, value).await,
            FieldType::Combobox => self.apply_combobox(field, value).await,
            FieldType::Radio => self.apply_radio(field, value).await,
            FieldType::Checkbox => self.apply_checkbox(field, value).await,
            FieldType::Date => self.apply_date(field.selector(), value).await,
            FieldType::File => self.apply_file(field.selector(), value).await,
        }
    }

    /// Activate a control. Not value-bearing, so the only verification is
    /// that the driver accepted the click.
    #[instrument(skip(self))]
    pub async fn click(&self, selector: &str) -> Result<(), ActionError> {
        self.driver.click(selector).await.map_err(Into::into)
    }

    /// Text chain: click → clear → type-with-delay → blur ladder →
    /// verify → retry once via direct set.
    pub(crate) async fn apply_text(
        &self,
        selector: &str,
        value: &str,
    ) -> Result<InteractionResult, ActionError> {
        let mut attempts = 0;

        attempts += 1;
        match self.type_and_verify(selector, value).await {
            Ok(final_value) => {
                return Ok(InteractionResult::ok("type-with-delay", attempts, final_value))
            }
            Err(err) => {
                debug!(%err, "typed write did not persist, retrying via direct set");
            }
        }

        attempts += 1;
        self.driver.set_value(selector, value).await?;
        self.blur_ladder(selector).await?;
        let observed = self.verify_value(selector, value).await?;
        Ok(InteractionResult::ok("direct-set", attempts, observed))
    }

    async fn type_and_verify(
        &self,
        selector: &str,
        value: &str,
    ) -> Result<Option<String>, ActionError> {
        self.driver.click(selector).await?;
        self.driver.clear(selector).await?;
        self.driver
            .type_text(selector, value, self.config.type_delay_ms)
            .await?;
        self.blur_ladder(selector).await?;
        self.verify_value(selector, value).await
    }

    /// Blur ladder: Tab, then an outside click, then a synthetic blur
    /// event. Later rungs only fire when the earlier ones error out.
    pub(crate) async fn blur_ladder(&self, selector: &str) -> Result<(), ActionError> {
        if self.driver.press_key(Key::Tab).await.is_ok() {
            return Ok(());
        }
        warn!(selector, "tab blur failed, clicking outside");
        if self.driver.click("body").await.is_ok() {
            return Ok(());
        }
        warn!(selector, "outside click failed, dispatching synthetic blur");
        self.driver.blur(selector).await.map_err(Into::into)
    }

    /// Re-read the field and demand it equals `expected`. The single most
    /// important check in this crate: absence of an exception is not
    /// success.
    pub(crate) async fn verify_value(
        &self,
        selector: &str,
        expected: &str,
    ) -> Result<Option<String>, ActionError> {
        let outcome = self
            .waiter
            .wait_value_persisted(selector, expected)
            .await
            .map_err(|err| ActionError::Internal(err.to_string()))?;
        if outcome.satisfied {
            return Ok(Some(expected.to_string()));
        }
        let observed = self
            .driver
            .read_value(selector)
            .await?
            .unwrap_or_default();
        Err(ActionError::NotPersisted {
            selector: selector.to_string(),
            expected: expected.to_string(),
            observed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driver_bridge::mock::{required_text_input, text_input, MockDriver, MockPage};
    use field_classifier::{ClassifyContext, FieldClassifier};
    use formpilot_types::FieldInfo;

    fn fast_executor(driver: Arc<MockDriver>) -> InteractionExecutor {
        InteractionExecutor::new(
            driver,
            ExecutorConfig {
                type_delay_ms: 0,
                verify_timeout_ms: 100,
            },
        )
    }

    fn classify(field: &FieldInfo) -> ClassifiedField {
        FieldClassifier::new().classify(field, &ClassifyContext::default())
    }

    #[tokio::test]
    async fn text_write_is_verified() {
        let page = MockPage::new("https://t", "t")
            .with_elements(vec![required_text_input("#name", "Name")]);
        let driver = Arc::new(MockDriver::new(page));
        let executor = fast_executor(driver.clone());
        let field = classify(&FieldInfo {
            selector: "#name".into(),
            tag: "input".into(),
            input_type: Some("text".into()),
            visible: true,
            ..Default::default()
        });
        let result = executor.apply(&field, "My campaign").await.unwrap();
        assert!(result.success);
        assert_eq!(result.method, "type-with-delay");
        assert_eq!(result.final_value.as_deref(), Some("My campaign"));
        assert_eq!(
            driver.read_value("#name").await.unwrap(),
            Some("My campaign".into())
        );
    }

    #[tokio::test]
    async fn readonly_field_falls_back_to_direct_set() {
        let mut el = text_input("#locked", "Locked");
        el.readonly = true;
        let page = MockPage::new("https://t", "t").with_elements(vec![el]);
        let driver = Arc::new(MockDriver::new(page));
        let executor = fast_executor(driver);
        let field = classify(&FieldInfo {
            selector: "#locked".into(),
            tag: "input".into(),
            input_type: Some("text".into()),
            visible: true,
            ..Default::default()
        });
        let result = executor.apply(&field, "forced").await.unwrap();
        assert!(result.success);
        assert_eq!(result.method, "direct-set");
        assert_eq!(result.attempts, 2);
    }

    #[tokio::test]
    async fn missing_field_surfaces_not_found() {
        let page = MockPage::new("https://t", "t");
        let executor = fast_executor(Arc::new(MockDriver::new(page)));
        let field = classify(&FieldInfo {
            selector: "#ghost".into(),
            tag: "input".into(),
            input_type: Some("text".into()),
            visible: true,
            ..Default::default()
        });
        let err = executor.apply(&field, "x").await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
