//! Immutable snapshot of a page's interactive surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Element geometry as reported by the driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Zero-area boxes mark elements that are not actually rendered.
    pub fn is_zero(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// One input-like element on the page.
///
/// Identity is the locating `selector`, not object reference: the underlying
/// node may be re-rendered between snapshots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldInfo {
    /// Locating descriptor the driver resolves this field by.
    pub selector: String,
    /// Lowercase tag name (`input`, `select`, `textarea`, ...).
    pub tag: String,
    /// ARIA role, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// `type` attribute for inputs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    /// Text of the associated label element.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,
    /// `name` attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_attr: Option<String>,
    /// Heading of the enclosing section or fieldset, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub required: bool,
    pub disabled: bool,
    pub readonly: bool,
    pub visible: bool,
    /// Current value as last observed.
    pub value: String,
    /// Checked state for radios and checkboxes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    /// Element renders a dropdown chevron or similar affordance.
    pub has_dropdown_indicator: bool,
    /// Element carries autocomplete wiring (`aria-autocomplete`, `list`).
    pub has_autocomplete: bool,
    /// Selector of a listbox this field controls, when advertised.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listbox_ref: Option<String>,
    /// Option labels for native selects.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub bbox: BoundingBox,
}

impl FieldInfo {
    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// All descriptive text for this field, concatenated for pattern
    /// matching. Order matters: explicit label first, generated hints last.
    pub fn descriptive_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(label) = &self.label {
            parts.push(label);
        }
        if let Some(placeholder) = &self.placeholder {
            parts.push(placeholder);
        }
        if let Some(aria) = &self.aria_label {
            parts.push(aria);
        }
        if let Some(name) = &self.name_attr {
            parts.push(name);
        }
        if let Some(section) = &self.section {
            parts.push(section);
        }
        parts.join(" ").to_lowercase()
    }

    /// Best human-readable handle for log lines and operator dumps.
    pub fn display_name(&self) -> &str {
        self.label
            .as_deref()
            .or(self.placeholder.as_deref())
            .or(self.aria_label.as_deref())
            .or(self.name_attr.as_deref())
            .unwrap_or(&self.selector)
    }
}

/// One activatable control (button or button-like element).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControlInfo {
    pub selector: String,
    /// Visible text, trimmed.
    pub text: String,
    pub disabled: bool,
    pub visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub bbox: BoundingBox,
}

impl ControlInfo {
    pub fn is_enabled(&self) -> bool {
        self.visible && !self.disabled
    }
}

/// Severity of a page banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Error,
    Warning,
    Success,
    Info,
}

/// Error/warning/success banner currently shown on the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertInfo {
    pub kind: AlertKind,
    pub message: String,
}

/// A currently-open dialog with its own nested surface.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModalInfo {
    pub selector: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub fields: Vec<FieldInfo>,
    pub controls: Vec<ControlInfo>,
}

/// Immutable record of the interactive surface at one instant.
///
/// A snapshot is a pure function of the page at capture time and is never
/// mutated afterwards; any action triggers a fresh capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub controls: Vec<ControlInfo>,
    pub fields: Vec<FieldInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alerts: Vec<AlertInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modals: Vec<ModalInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_tab: Option<String>,
    /// Concatenated visible text at capture time, for text-based success
    /// conditions.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub page_text: String,
    pub captured_at: DateTime<Utc>,
}

impl PageSnapshot {
    /// Find a visible control whose text contains `needle`
    /// (case-insensitive). Exact matches win over substring matches.
    pub fn find_control_by_text(&self, needle: &str) -> Option<&ControlInfo> {
        let wanted = needle.trim().to_lowercase();
        let mut partial = None;
        for control in &self.controls {
            if !control.visible {
                continue;
            }
            let text = control.text.trim().to_lowercase();
            if text == wanted {
                return Some(control);
            }
            if partial.is_none() && text.contains(&wanted) {
                partial = Some(control);
            }
        }
        partial
    }

    pub fn field_by_selector(&self, selector: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.selector == selector)
    }

    /// Visible, enabled, required fields that hold no value yet.
    pub fn empty_required_fields(&self) -> Vec<&FieldInfo> {
        self.fields
            .iter()
            .filter(|f| f.visible && !f.disabled && f.required && f.is_empty())
            .collect()
    }

    pub fn has_open_modal(&self) -> bool {
        !self.modals.is_empty()
    }

    /// Lightweight fingerprint of this snapshot for stuck detection.
    pub fn digest(&self, target_enabled: bool) -> super::StateDigest {
        let empty_required = self
            .fields
            .iter()
            .filter(|f| f.visible && f.required && f.is_empty())
            .count();
        let filled = self.fields.iter().filter(|f| !f.is_empty()).count();
        super::StateDigest {
            location: self.url.clone(),
            empty_required,
            filled,
            target_enabled,
        }
    }
}
