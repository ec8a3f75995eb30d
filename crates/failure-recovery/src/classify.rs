//! The failure taxonomy and keyword classifier.

use serde::{Deserialize, Serialize};

/// Closed failure taxonomy. Everything unmatched lands in `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    ElementNotFound,
    ElementNotVisible,
    ElementNotInteractable,
    ElementDetached,
    ValueNotPersisted,
    Timeout,
    NavigationError,
    NetworkError,
    SelectorAmbiguous,
    Unknown,
}

impl FailureKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ElementNotFound => "element-not-found",
            Self::ElementNotVisible => "element-not-visible",
            Self::ElementNotInteractable => "element-not-interactable",
            Self::ElementDetached => "element-detached",
            Self::ValueNotPersisted => "value-not-persisted",
            Self::Timeout => "timeout",
            Self::NavigationError => "navigation-error",
            Self::NetworkError => "network-error",
            Self::SelectorAmbiguous => "selector-ambiguous",
            Self::Unknown => "unknown",
        }
    }
}

/// Classify a failure by its message text.
///
/// Specific phrases are checked before substrings they contain ("not
/// persisted" before "not", "not interactable" before "not found"-style
/// fallbacks), so ordering here is load-bearing.
pub fn classify_failure(message: &str) -> FailureKind {
    let text = message.to_lowercase();

    if text.contains("not persisted") || text.contains("value mismatch") {
        return FailureKind::ValueNotPersisted;
    }
    if text.contains("detached") || text.contains("stale") {
        return FailureKind::ElementDetached;
    }
    if text.contains("not interactable")
        || text.contains("not clickable")
        || text.contains("is disabled")
        || text.contains("readonly")
    {
        return FailureKind::ElementNotInteractable;
    }
    if text.contains("not visible") || text.contains("invisible") || text.contains("obscured") {
        return FailureKind::ElementNotVisible;
    }
    if text.contains("ambiguous") || text.contains("multiple elements") {
        return FailureKind::SelectorAmbiguous;
    }
    if text.contains("not found") || text.contains("no such element") {
        return FailureKind::ElementNotFound;
    }
    if text.contains("timeout") || text.contains("timed out") || text.contains("deadline") {
        return FailureKind::Timeout;
    }
    if text.contains("navigation") {
        return FailureKind::NavigationError;
    }
    if text.contains("network") || text.contains("connection") {
        return FailureKind::NetworkError;
    }
    FailureKind::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_keywords_classify() {
        assert_eq!(
            classify_failure("element not found: #save"),
            FailureKind::ElementNotFound
        );
        assert_eq!(
            classify_failure("element not visible: #save"),
            FailureKind::ElementNotVisible
        );
        assert_eq!(
            classify_failure("element not interactable: #save is disabled"),
            FailureKind::ElementNotInteractable
        );
        assert_eq!(
            classify_failure("value not persisted: #name expected 'a', observed ''"),
            FailureKind::ValueNotPersisted
        );
        assert_eq!(classify_failure("timeout: click"), FailureKind::Timeout);
        assert_eq!(
            classify_failure("selector ambiguous: .btn"),
            FailureKind::SelectorAmbiguous
        );
        assert_eq!(
            classify_failure("element detached: #row-3"),
            FailureKind::ElementDetached
        );
        assert_eq!(
            classify_failure("navigation error: aborted"),
            FailureKind::NavigationError
        );
        assert_eq!(
            classify_failure("network error: fetch failed"),
            FailureKind::NetworkError
        );
        assert_eq!(classify_failure("something odd"), FailureKind::Unknown);
    }

    #[test]
    fn specific_phrases_win_over_substrings() {
        // "not persisted" messages also contain field text; must not land
        // in a generic bucket.
        assert_eq!(
            classify_failure("value not persisted: field timeout-input"),
            FailureKind::ValueNotPersisted
        );
    }
}
