//! Selector resolution.
//!
//! Given a field or control, produce a ranked list of locating expressions
//! by stability tier, validate uniqueness against the live page, and derive
//! text-based alternates when an original selector stops resolving.
//!
//! Expression forms understood by drivers: plain CSS (`#id`,
//! `[name='x']`), and `text:<content>` for visible-text matching.

use std::sync::Arc;

use driver_bridge::{DriverError, PageDriver};
use formpilot_types::{ControlInfo, FieldInfo};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Locator failures.
#[derive(Debug, Error, Clone)]
pub enum LocatorError {
    #[error("selector resolution failed: {0}")]
    Driver(String),
}

impl From<DriverError> for LocatorError {
    fn from(err: DriverError) -> Self {
        Self::Driver(err.to_string())
    }
}

/// Stability tiers, most stable first. The score encodes the ordering for
/// ranking; the tier name shows up in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorTier {
    Id,
    TestId,
    AriaLabel,
    NameAttr,
    LabelText,
    Text,
    CssPath,
}

impl LocatorTier {
    pub fn score(&self) -> f64 {
        match self {
            Self::Id => 0.95,
            Self::TestId => 0.90,
            Self::AriaLabel => 0.80,
            Self::NameAttr => 0.75,
            Self::LabelText => 0.65,
            Self::Text => 0.60,
            Self::CssPath => 0.50,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::TestId => "test-id",
            Self::AriaLabel => "aria-label",
            Self::NameAttr => "name",
            Self::LabelText => "label-text",
            Self::Text => "text",
            Self::CssPath => "css-path",
        }
    }
}

/// One ranked locating expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatorCandidate {
    pub selector: String,
    pub tier: LocatorTier,
    pub score: f64,
}

impl LocatorCandidate {
    fn new(selector: String, tier: LocatorTier) -> Self {
        Self {
            selector,
            tier,
            score: tier.score(),
        }
    }
}

/// Ranks locating expressions and validates them against the live page.
pub struct SelectorResolver {
    driver: Arc<dyn PageDriver>,
}

impl SelectorResolver {
    pub fn new(driver: Arc<dyn PageDriver>) -> Self {
        Self { driver }
    }

    /// Ranked candidates for a field, most stable first.
    pub fn rank_field(&self, field: &FieldInfo) -> Vec<LocatorCandidate> {
        let mut candidates = vec![classify_primary(&field.selector)];
        if let Some(aria) = &field.aria_label {
            candidates.push(LocatorCandidate::new(
                format!("[aria-label='{aria}']"),
                LocatorTier::AriaLabel,
            ));
        }
        if let Some(name) = &field.name_attr {
            candidates.push(LocatorCandidate::new(
                format!("[name='{name}']"),
                LocatorTier::NameAttr,
            ));
        }
        if let Some(label) = &field.label {
            candidates.push(LocatorCandidate::new(
                format!("text:{label}"),
                LocatorTier::LabelText,
            ));
        }
        sort_and_dedup(candidates)
    }

    /// Ranked candidates for a control, most stable first.
    pub fn rank_control(&self, control: &ControlInfo) -> Vec<LocatorCandidate> {
        let mut candidates = vec![classify_primary(&control.selector)];
        if !control.text.trim().is_empty() {
            candidates.push(LocatorCandidate::new(
                format!("text:{}", control.text.trim()),
                LocatorTier::Text,
            ));
        }
        sort_and_dedup(candidates)
    }

    /// A selector is usable only when it resolves exactly one element.
    pub async fn validate_unique(&self, selector: &str) -> Result<bool, LocatorError> {
        Ok(self.driver.count_matches(selector).await? == 1)
    }

    /// First candidate that resolves uniquely on the live page.
    pub async fn best_unique(
        &self,
        candidates: &[LocatorCandidate],
    ) -> Result<Option<LocatorCandidate>, LocatorError> {
        for candidate in candidates {
            if self.validate_unique(&candidate.selector).await? {
                return Ok(Some(candidate.clone()));
            }
        }
        Ok(None)
    }

    /// Re-derive a text-based selector when the original no longer
    /// resolves. Returns a replacement that resolves uniquely, or `None`.
    pub async fn derive_alternate(
        &self,
        original: &str,
        text_hint: &str,
    ) -> Result<Option<String>, LocatorError> {
        let hint = text_hint.trim();
        if hint.is_empty() {
            return Ok(None);
        }
        for candidate in [
            format!("text:{hint}"),
            format!("[aria-label='{hint}']"),
            format!("[name='{}']", hint.to_lowercase().replace(' ', "_")),
        ] {
            if candidate == original {
                continue;
            }
            if self.validate_unique(&candidate).await? {
                debug!(original, replacement = %candidate, "derived alternate selector");
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }
}

/// Tier of the primary selector, judged by its shape.
fn classify_primary(selector: &str) -> LocatorCandidate {
    let tier = if selector.starts_with('#') {
        LocatorTier::Id
    } else if selector.contains("data-testid") {
        LocatorTier::TestId
    } else if selector.starts_with("text:") {
        LocatorTier::Text
    } else {
        LocatorTier::CssPath
    };
    LocatorCandidate::new(selector.to_string(), tier)
}

fn sort_and_dedup(mut candidates: Vec<LocatorCandidate>) -> Vec<LocatorCandidate> {
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    candidates.dedup_by(|a, b| a.selector == b.selector);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use driver_bridge::mock::{button, text_input, MockDriver, MockPage};
    use formpilot_types::BoundingBox;

    fn resolver(page: MockPage) -> SelectorResolver {
        SelectorResolver::new(Arc::new(MockDriver::new(page)))
    }

    fn sample_field() -> FieldInfo {
        FieldInfo {
            selector: "#campaign-name".into(),
            tag: "input".into(),
            label: Some("Campaign name".into()),
            aria_label: Some("Campaign name".into()),
            name_attr: Some("campaign_name".into()),
            visible: true,
            bbox: BoundingBox::new(0.0, 0.0, 10.0, 10.0),
            ..Default::default()
        }
    }

    #[test]
    fn field_candidates_ranked_by_stability() {
        let resolver = resolver(MockPage::new("https://t", "t"));
        let ranked = resolver.rank_field(&sample_field());
        let tiers: Vec<LocatorTier> = ranked.iter().map(|c| c.tier).collect();
        assert_eq!(
            tiers,
            vec![
                LocatorTier::Id,
                LocatorTier::AriaLabel,
                LocatorTier::NameAttr,
                LocatorTier::LabelText,
            ]
        );
    }

    #[tokio::test]
    async fn uniqueness_rejects_duplicates() {
        let page = MockPage::new("https://t", "t").with_elements(vec![
            button("#a", "Save"),
            button("#a", "Save again"),
        ]);
        let resolver = resolver(page);
        assert!(!resolver.validate_unique("#a").await.unwrap());
    }

    #[tokio::test]
    async fn best_unique_skips_broken_primary() {
        let page = MockPage::new("https://t", "t")
            .with_elements(vec![text_input("#other-id", "Campaign name")]);
        let resolver = resolver(page);
        let mut field = sample_field();
        field.selector = "#stale-id".into();
        field.aria_label = None;
        field.name_attr = None;
        let ranked = resolver.rank_field(&field);
        let best = resolver.best_unique(&ranked).await.unwrap().unwrap();
        assert_eq!(best.tier, LocatorTier::LabelText);
        assert_eq!(best.selector, "text:Campaign name");
    }

    #[tokio::test]
    async fn alternate_derivation_finds_text_match() {
        let page =
            MockPage::new("https://t", "t").with_elements(vec![button("#new-id", "Save changes")]);
        let resolver = resolver(page);
        let alternate = resolver
            .derive_alternate("#stale-id", "Save changes")
            .await
            .unwrap();
        assert_eq!(alternate.as_deref(), Some("text:Save changes"));
    }

    #[tokio::test]
    async fn alternate_derivation_gives_up_cleanly() {
        let resolver = resolver(MockPage::new("https://t", "t"));
        let alternate = resolver.derive_alternate("#stale", "Nothing here").await.unwrap();
        assert!(alternate.is_none());
    }
}
