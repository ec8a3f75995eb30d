//! Ranked recovery strategies per failure kind.

use std::sync::Arc;

use adaptive_wait::AdaptiveWaiter;
use driver_bridge::{DriverError, Key, PageDriver};
use element_locator::SelectorResolver;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::FailureKind;

/// Recovery failures (the machinery itself breaking, not the strategy
/// merely not helping).
#[derive(Debug, Error, Clone)]
pub enum RecoveryError {
    #[error("recovery aborted: {0}")]
    Driver(String),
}

impl From<DriverError> for RecoveryError {
    fn from(err: DriverError) -> Self {
        Self::Driver(err.to_string())
    }
}

/// Bounded corrective procedures, applied before re-attempting the
/// original action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecoveryStrategy {
    ScrollIntoView,
    DismissOverlay,
    AlternateSelector,
    ExtendedWait,
    Refocus,
    NetworkWait,
    /// Opt-in only; never chosen unless the context allows it.
    PageRefresh,
}

impl RecoveryStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ScrollIntoView => "scroll-into-view",
            Self::DismissOverlay => "dismiss-overlay",
            Self::AlternateSelector => "alternate-selector",
            Self::ExtendedWait => "extended-wait",
            Self::Refocus => "refocus",
            Self::NetworkWait => "network-wait",
            Self::PageRefresh => "page-refresh",
        }
    }
}

/// Ranked ladder for one failure kind, lower number tried first.
fn ladder(kind: FailureKind) -> Vec<(u8, RecoveryStrategy)> {
    use RecoveryStrategy::*;
    let mut ranked = match kind {
        FailureKind::ElementNotVisible => vec![(1, ScrollIntoView), (2, DismissOverlay), (3, ExtendedWait)],
        FailureKind::ElementNotInteractable => {
            vec![(1, ScrollIntoView), (2, DismissOverlay), (3, Refocus), (4, ExtendedWait)]
        }
        FailureKind::ElementNotFound => vec![(1, AlternateSelector), (2, ExtendedWait), (9, PageRefresh)],
        FailureKind::SelectorAmbiguous => vec![(1, AlternateSelector)],
        FailureKind::ValueNotPersisted => vec![(1, Refocus), (2, ExtendedWait)],
        FailureKind::Timeout => vec![(1, ExtendedWait), (2, NetworkWait)],
        FailureKind::ElementDetached => vec![(1, ExtendedWait), (2, AlternateSelector)],
        FailureKind::NavigationError => vec![(1, NetworkWait), (2, ExtendedWait), (9, PageRefresh)],
        FailureKind::NetworkError => vec![(1, NetworkWait), (9, PageRefresh)],
        FailureKind::Unknown => vec![(1, ExtendedWait)],
    };
    ranked.sort_by_key(|(priority, _)| *priority);
    ranked
}

/// What the failed action was working on.
#[derive(Debug, Clone, Default)]
pub struct RecoveryContext {
    /// Selector of the element the action targeted.
    pub selector: Option<String>,
    /// Visible text / label of the target, for alternate derivation.
    pub text_hint: Option<String>,
    /// Whether a full page refresh may be used as last resort.
    pub allow_refresh: bool,
}

/// Result of one recovery attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryOutcome {
    pub recovered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<RecoveryStrategy>,
    /// Set when the caller should retry the same logical action against a
    /// different selector.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement_selector: Option<String>,
}

impl RecoveryOutcome {
    fn not_recovered() -> Self {
        Self {
            recovered: false,
            strategy: None,
            replacement_selector: None,
        }
    }

    fn via(strategy: RecoveryStrategy) -> Self {
        Self {
            recovered: true,
            strategy: Some(strategy),
            replacement_selector: None,
        }
    }
}

/// Runs the ladder for a classified failure.
pub struct RecoveryManager {
    driver: Arc<dyn PageDriver>,
    resolver: SelectorResolver,
    waiter: AdaptiveWaiter,
}

impl RecoveryManager {
    pub fn new(driver: Arc<dyn PageDriver>, waiter: AdaptiveWaiter) -> Self {
        let resolver = SelectorResolver::new(driver.clone());
        Self {
            driver,
            resolver,
            waiter,
        }
    }

    /// Try the ranked strategies for this failure kind until one reports
    /// success. Never refreshes the page unless the context opts in.
    pub async fn recover(
        &self,
        kind: FailureKind,
        context: &RecoveryContext,
    ) -> Result<RecoveryOutcome, RecoveryError> {
        for (priority, strategy) in ladder(kind) {
            if strategy == RecoveryStrategy::PageRefresh && !context.allow_refresh {
                debug!("skipping page refresh: not opted in");
                continue;
            }
            debug!(kind = kind.name(), strategy = strategy.name(), priority, "trying recovery");
            if let Some(outcome) = self.try_strategy(strategy, context).await? {
                info!(
                    kind = kind.name(),
                    strategy = strategy.name(),
                    "recovery succeeded"
                );
                return Ok(outcome);
            }
        }
        Ok(RecoveryOutcome::not_recovered())
    }

    async fn try_strategy(
        &self,
        strategy: RecoveryStrategy,
        context: &RecoveryContext,
    ) -> Result<Option<RecoveryOutcome>, RecoveryError> {
        match strategy {
            RecoveryStrategy::ScrollIntoView => {
                let Some(selector) = &context.selector else {
                    return Ok(None);
                };
                if self.driver.scroll_into_view(selector).await.is_err() {
                    return Ok(None);
                }
                let state = self.driver.element_state(selector).await?;
                Ok(state
                    .is_interactable()
                    .then(|| RecoveryOutcome::via(strategy)))
            }
            RecoveryStrategy::DismissOverlay => {
                self.driver.press_key(Key::Escape).await?;
                Ok(Some(RecoveryOutcome::via(strategy)))
            }
            RecoveryStrategy::AlternateSelector => {
                let (Some(selector), Some(hint)) = (&context.selector, &context.text_hint) else {
                    return Ok(None);
                };
                let replacement = self
                    .resolver
                    .derive_alternate(selector, hint)
                    .await
                    .map_err(|err| RecoveryError::Driver(err.to_string()))?;
                Ok(replacement.map(|selector| RecoveryOutcome {
                    recovered: true,
                    strategy: Some(strategy),
                    replacement_selector: Some(selector),
                }))
            }
            RecoveryStrategy::ExtendedWait => {
                let outcome = self
                    .waiter
                    .wait_dom_stable()
                    .await
                    .map_err(|err| RecoveryError::Driver(err.to_string()))?;
                Ok(outcome.satisfied.then(|| RecoveryOutcome::via(strategy)))
            }
            RecoveryStrategy::Refocus => {
                let Some(selector) = &context.selector else {
                    return Ok(None);
                };
                Ok(self
                    .driver
                    .focus(selector)
                    .await
                    .is_ok()
                    .then(|| RecoveryOutcome::via(strategy)))
            }
            RecoveryStrategy::NetworkWait => {
                let outcome = self
                    .waiter
                    .wait_network_idle()
                    .await
                    .map_err(|err| RecoveryError::Driver(err.to_string()))?;
                Ok(outcome.satisfied.then(|| RecoveryOutcome::via(strategy)))
            }
            RecoveryStrategy::PageRefresh => {
                self.driver.refresh().await?;
                Ok(Some(RecoveryOutcome::via(strategy)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adaptive_wait::WaitConfig;
    use driver_bridge::mock::{button, MockDriver, MockPage};
    use formpilot_types::BoundingBox;

    fn manager(driver: Arc<MockDriver>) -> RecoveryManager {
        let waiter = AdaptiveWaiter::with_config(driver.clone(), WaitConfig::fast());
        RecoveryManager::new(driver, waiter)
    }

    #[tokio::test]
    async fn scroll_recovers_zero_size_element() {
        let mut el = button("#save", "Save");
        el.bbox = BoundingBox::default();
        el.visible = false;
        let page = MockPage::new("https://t", "t").with_elements(vec![el]);
        let driver = Arc::new(MockDriver::new(page));
        let outcome = manager(driver)
            .recover(
                FailureKind::ElementNotVisible,
                &RecoveryContext {
                    selector: Some("#save".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(outcome.recovered);
        assert_eq!(outcome.strategy, Some(RecoveryStrategy::ScrollIntoView));
    }

    #[tokio::test]
    async fn not_found_derives_replacement_selector() {
        let page =
            MockPage::new("https://t", "t").with_elements(vec![button("#new-save", "Save changes")]);
        let driver = Arc::new(MockDriver::new(page));
        let outcome = manager(driver)
            .recover(
                FailureKind::ElementNotFound,
                &RecoveryContext {
                    selector: Some("#old-save".into()),
                    text_hint: Some("Save changes".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(outcome.recovered);
        assert_eq!(
            outcome.replacement_selector.as_deref(),
            Some("text:Save changes")
        );
    }

    #[tokio::test]
    async fn refresh_requires_opt_in() {
        let driver = Arc::new(MockDriver::new(MockPage::new("https://t", "t")));
        driver.update(|p| p.inflight = 99); // keep NetworkWait unsatisfied
        let outcome = manager(driver.clone())
            .recover(FailureKind::NetworkError, &RecoveryContext::default())
            .await
            .unwrap();
        assert!(!outcome.recovered);

        let outcome = manager(driver)
            .recover(
                FailureKind::NetworkError,
                &RecoveryContext {
                    allow_refresh: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(outcome.recovered);
        assert_eq!(outcome.strategy, Some(RecoveryStrategy::PageRefresh));
    }

    #[tokio::test]
    async fn unknown_failures_wait_for_stability() {
        let driver = Arc::new(MockDriver::new(MockPage::new("https://t", "t")));
        let outcome = manager(driver)
            .recover(FailureKind::Unknown, &RecoveryContext::default())
            .await
            .unwrap();
        assert!(outcome.recovered);
        assert_eq!(outcome.strategy, Some(RecoveryStrategy::ExtendedWait));
    }
}
