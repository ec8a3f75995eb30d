//! Default value generation.
//!
//! Generated values must be uniquely distinguishable per run so repeated
//! automation never collides with data created by an earlier run.

use chrono::Utc;

use crate::{FieldPurpose, FieldType};

/// Per-run unique suffix: compact timestamp plus the first uuid segment.
pub(crate) fn run_suffix() -> String {
    let stamp = Utc::now().format("%m%d%H%M%S");
    let uuid = uuid::Uuid::new_v4().to_string();
    let head = uuid.split('-').next().unwrap_or("0");
    format!("{stamp}-{head}")
}

/// Suggest a default value for a classified field, or `None` when the
/// engine should pick from the live surface instead (dropdowns, radios,
/// checkboxes, files).
pub(crate) fn suggest_value(
    field_type: FieldType,
    purpose: FieldPurpose,
    suffix: &str,
) -> Option<String> {
    match field_type {
        FieldType::Dropdown | FieldType::Combobox => combobox_value(purpose, suffix),
        FieldType::Radio | FieldType::Checkbox | FieldType::File => None,
        FieldType::Date => Some(Utc::now().format("%Y-%m-%d").to_string()),
        FieldType::Number => Some(numeric_value(purpose)),
        FieldType::Password => Some(format!("Qa!{suffix}")),
        FieldType::Text | FieldType::Textarea => Some(text_value(purpose, suffix)),
    }
}

/// A combobox that allows creation still benefits from a generated entity
/// name; plain dropdowns pick from existing options instead.
fn combobox_value(purpose: FieldPurpose, suffix: &str) -> Option<String> {
    match purpose {
        FieldPurpose::Channel
        | FieldPurpose::Campaign
        | FieldPurpose::AdGroup
        | FieldPurpose::Creative
        | FieldPurpose::Name => Some(entity_name(purpose, suffix)),
        _ => None,
    }
}

fn numeric_value(purpose: FieldPurpose) -> String {
    match purpose {
        FieldPurpose::Budget | FieldPurpose::Amount => "100".to_string(),
        _ => "1".to_string(),
    }
}

fn text_value(purpose: FieldPurpose, suffix: &str) -> String {
    match purpose {
        FieldPurpose::Email => format!("qa+{suffix}@example.com"),
        FieldPurpose::Url => format!("https://example.com/qa-{suffix}"),
        FieldPurpose::Phone => "+1 555 0100".to_string(),
        FieldPurpose::Username => format!("qa_{suffix}"),
        FieldPurpose::Password => format!("Qa!{suffix}"),
        FieldPurpose::Date => Utc::now().format("%Y-%m-%d").to_string(),
        FieldPurpose::Amount | FieldPurpose::Budget => "100".to_string(),
        FieldPurpose::Description => format!("Automated test entry {suffix}"),
        FieldPurpose::Channel
        | FieldPurpose::Campaign
        | FieldPurpose::AdGroup
        | FieldPurpose::Creative
        | FieldPurpose::Company
        | FieldPurpose::Name => entity_name(purpose, suffix),
        FieldPurpose::Search | FieldPurpose::Unknown => format!("test {suffix}"),
    }
}

fn entity_name(purpose: FieldPurpose, suffix: &str) -> String {
    let noun = match purpose {
        FieldPurpose::Channel => "Channel",
        FieldPurpose::Campaign => "Campaign",
        FieldPurpose::AdGroup => "Ad Group",
        FieldPurpose::Creative => "Creative",
        FieldPurpose::Company => "Company",
        _ => "Entry",
    };
    format!("QA {noun} {suffix}")
}
