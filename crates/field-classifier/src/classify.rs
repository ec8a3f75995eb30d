//! The classifier itself.

use formpilot_types::FieldInfo;
use tracing::debug;

use crate::rules::{PurposeRule, DEFAULT_RULES};
use crate::values::suggest_value;
use crate::{ClassifiedField, FieldPurpose, FieldType};

/// Page-level context that sharpens purpose inference.
#[derive(Debug, Clone, Default)]
pub struct ClassifyContext {
    pub page_title: Option<String>,
    pub active_tab: Option<String>,
}

impl ClassifyContext {
    fn text(&self) -> String {
        let mut parts = Vec::new();
        if let Some(tab) = &self.active_tab {
            parts.push(tab.as_str());
        }
        if let Some(title) = &self.page_title {
            parts.push(title.as_str());
        }
        parts.join(" ").to_lowercase()
    }
}

/// Infers field type and semantic purpose with a confidence score.
///
/// Owns its rule table: construction copies the built-in defaults, and
/// callers may register additional rules on their own instance. The table
/// is kept sorted by priority, so registration order never matters.
pub struct FieldClassifier {
    rules: Vec<PurposeRule>,
    /// Per-run unique suffix woven into generated default values.
    run_suffix: String,
}

impl FieldClassifier {
    pub fn new() -> Self {
        let mut rules = DEFAULT_RULES.clone();
        rules.sort_by_key(|r| r.priority);
        Self {
            rules,
            run_suffix: crate::values::run_suffix(),
        }
    }

    /// Add a rule. The table is re-sorted; a lower priority number wins
    /// regardless of when the rule was registered.
    pub fn register_rule(&mut self, rule: PurposeRule) {
        self.rules.push(rule);
        self.rules.sort_by_key(|r| r.priority);
    }

    /// Classify one field against its surrounding context.
    pub fn classify(&self, field: &FieldInfo, context: &ClassifyContext) -> ClassifiedField {
        let field_type = infer_type(field);
        let type_resolved = type_was_resolved(field);
        let purpose = self.infer_purpose(field, context);

        let mut confidence: f64 = 0.5;
        if field.label.is_some() {
            confidence += 0.2;
        }
        if field.placeholder.is_some() {
            confidence += 0.1;
        }
        if field.aria_label.is_some() {
            confidence += 0.1;
        }
        if type_resolved {
            confidence += 0.1;
        }
        if purpose != FieldPurpose::Unknown {
            confidence += 0.1;
        }
        let confidence = confidence.min(1.0);

        debug!(
            selector = %field.selector,
            field_type = ?field_type,
            purpose = ?purpose,
            confidence,
            "classified field"
        );

        ClassifiedField {
            field: field.clone(),
            field_type,
            purpose,
            confidence,
            suggested_value: suggest_value(field_type, purpose, &self.run_suffix),
            hint: field_type.interaction_hint().to_string(),
        }
    }

    fn infer_purpose(&self, field: &FieldInfo, context: &ClassifyContext) -> FieldPurpose {
        let haystack = format!("{} {}", field.descriptive_text(), context.text());
        for rule in &self.rules {
            if rule.pattern.is_match(&haystack) {
                return rule.purpose;
            }
        }
        FieldPurpose::Unknown
    }
}

impl Default for FieldClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Type inference, most reliable signal first:
/// native select → combobox → listbox role → input-type → textarea → text.
fn infer_type(field: &FieldInfo) -> FieldType {
    if field.tag == "select" {
        return FieldType::Dropdown;
    }
    if field.role.as_deref() == Some("combobox")
        || (field.has_dropdown_indicator && field.has_autocomplete)
    {
        return FieldType::Combobox;
    }
    if field.role.as_deref() == Some("listbox") {
        // Driven through the option list like a dropdown.
        return FieldType::Dropdown;
    }
    if let Some(input_type) = field.input_type.as_deref() {
        match input_type {
            "radio" => return FieldType::Radio,
            "checkbox" => return FieldType::Checkbox,
            "file" => return FieldType::File,
            "date" | "datetime-local" | "month" | "week" | "time" => return FieldType::Date,
            "number" | "range" => return FieldType::Number,
            "password" => return FieldType::Password,
            _ => {}
        }
    }
    if field.tag == "textarea" {
        return FieldType::Textarea;
    }
    FieldType::Text
}

/// Whether the type came from an explicit signal rather than the generic
/// text fallback. Feeds the confidence score.
fn type_was_resolved(field: &FieldInfo) -> bool {
    if field.tag == "select" || field.tag == "textarea" {
        return true;
    }
    if field.has_dropdown_indicator && field.has_autocomplete {
        return true;
    }
    if matches!(field.role.as_deref(), Some("combobox") | Some("listbox")) {
        return true;
    }
    matches!(
        field.input_type.as_deref(),
        Some("radio")
            | Some("checkbox")
            | Some("file")
            | Some("date")
            | Some("datetime-local")
            | Some("month")
            | Some("week")
            | Some("time")
            | Some("number")
            | Some("range")
            | Some("password")
    )
}
