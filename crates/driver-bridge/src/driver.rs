//! The `PageDriver` trait and its descriptor types.

use std::collections::BTreeMap;

use async_trait::async_trait;
use formpilot_types::BoundingBox;
use serde::{Deserialize, Serialize};

use crate::DriverError;

/// Raw descriptor of one interactive element, as the driver reports it.
///
/// This is the untreated input to the state extractor; `formpilot-types`
/// snapshots are derived from lists of these.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementNode {
    /// Locating descriptor the driver guarantees it can resolve again
    /// (until the element is re-rendered).
    pub selector: String,
    /// Lowercase tag name.
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    /// Trimmed visible text.
    pub text: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_attr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub required: bool,
    pub disabled: bool,
    pub readonly: bool,
    pub visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    /// Option labels for native selects.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub has_dropdown_indicator: bool,
    pub has_autocomplete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listbox_ref: Option<String>,
    /// Set when the element lives inside an open dialog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialog_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialog_title: Option<String>,
    pub bbox: BoundingBox,
    /// Anything else the driver knows (`class`, `data-testid`, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl ElementNode {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Point-in-time interactability of one element.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ElementState {
    pub exists: bool,
    pub visible: bool,
    pub enabled: bool,
    pub bbox: BoundingBox,
}

impl ElementState {
    /// Ready to receive an interaction right now.
    pub fn is_interactable(&self) -> bool {
        self.exists && self.visible && self.enabled && !self.bbox.is_zero()
    }
}

/// Keys the core presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Enter,
    Escape,
    Tab,
    ArrowDown,
    ArrowUp,
}

/// How `select_option` matches its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionMatch {
    Label,
    Value,
}

/// One option of a dropdown, combobox listbox, or native select.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionEntry {
    /// Clickable locating descriptor for this option.
    pub selector: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// True for "create new ..." affordances surfaced inside option lists.
    pub is_create_affordance: bool,
}

/// The browser-automation driver boundary.
///
/// Everything the autopilot core needs from a browser: DOM queries with
/// geometry, input primitives, navigation accessors, and the two counters
/// the adaptive waits poll. Implementations own all protocol detail.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Flat descriptors for every interactive element currently in the
    /// tree, including elements inside open dialogs.
    async fn snapshot_elements(&self) -> Result<Vec<ElementNode>, DriverError>;

    /// Number of elements the selector resolves to.
    async fn count_matches(&self, selector: &str) -> Result<usize, DriverError>;

    /// Current interactability of one element. Missing elements report
    /// `exists = false` rather than an error.
    async fn element_state(&self, selector: &str) -> Result<ElementState, DriverError>;

    async fn click(&self, selector: &str) -> Result<(), DriverError>;

    async fn focus(&self, selector: &str) -> Result<(), DriverError>;

    /// Dispatch a synthetic blur to the element.
    async fn blur(&self, selector: &str) -> Result<(), DriverError>;

    async fn clear(&self, selector: &str) -> Result<(), DriverError>;

    /// Type text with a per-character delay.
    async fn type_text(&self, selector: &str, text: &str, delay_ms: u64)
        -> Result<(), DriverError>;

    /// Press a key against the currently-focused element.
    async fn press_key(&self, key: Key) -> Result<(), DriverError>;

    /// Assign the value directly and fire an input event. Bypass for
    /// widgets that reject synthetic keystrokes.
    async fn set_value(&self, selector: &str, value: &str) -> Result<(), DriverError>;

    async fn read_value(&self, selector: &str) -> Result<Option<String>, DriverError>;

    /// Checked state for radios and checkboxes.
    async fn read_checked(&self, selector: &str) -> Result<Option<bool>, DriverError>;

    /// Native select interaction.
    async fn select_option(
        &self,
        selector: &str,
        matcher: OptionMatch,
        target: &str,
    ) -> Result<(), DriverError>;

    /// Options of the listbox/select the selector points at (or controls).
    async fn list_options(&self, selector: &str) -> Result<Vec<OptionEntry>, DriverError>;

    async fn set_files(&self, selector: &str, paths: &[String]) -> Result<(), DriverError>;

    async fn scroll_into_view(&self, selector: &str) -> Result<(), DriverError>;

    async fn current_url(&self) -> Result<String, DriverError>;

    async fn title(&self) -> Result<String, DriverError>;

    /// Concatenated visible text, for text-based success conditions.
    async fn page_text(&self) -> Result<String, DriverError>;

    /// Monotonic count of observed DOM mutations.
    async fn dom_mutation_count(&self) -> Result<u64, DriverError>;

    /// Number of in-flight network requests.
    async fn inflight_request_count(&self) -> Result<u32, DriverError>;

    /// Full page reload. Only the opt-in last-resort recovery calls this.
    async fn refresh(&self) -> Result<(), DriverError>;
}
