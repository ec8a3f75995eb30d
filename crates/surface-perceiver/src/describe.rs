//! Operator-readable rendering of a snapshot.

use std::fmt::Write as _;

use formpilot_types::{ControlInfo, FieldInfo, PageSnapshot};

use crate::FormView;

/// Render a snapshot as text an operator can read at a glance. Backs the
/// autopilot's `get_readable_state()`.
pub fn describe(snapshot: &PageSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Page: {}", snapshot.url);
    if let Some(title) = &snapshot.title {
        let _ = writeln!(out, "Title: {title}");
    }
    if let Some(tab) = &snapshot.active_tab {
        let _ = writeln!(out, "Active tab: {tab}");
    }

    if !snapshot.alerts.is_empty() {
        let _ = writeln!(out, "\nAlerts:");
        for alert in &snapshot.alerts {
            let _ = writeln!(out, "  [{:?}] {}", alert.kind, alert.message);
        }
    }

    let _ = writeln!(out, "\nButtons ({}):", snapshot.controls.len());
    for control in &snapshot.controls {
        let _ = writeln!(out, "  {}", control_line(control));
    }

    let _ = writeln!(out, "\nFields ({}):", snapshot.fields.len());
    for field in &snapshot.fields {
        let _ = writeln!(out, "  {}", field_line(field));
    }

    for modal in &snapshot.modals {
        let _ = writeln!(
            out,
            "\nOpen dialog: {}",
            modal.title.as_deref().unwrap_or(&modal.selector)
        );
        for field in &modal.fields {
            let _ = writeln!(out, "  {}", field_line(field));
        }
        for control in &modal.controls {
            let _ = writeln!(out, "  {}", control_line(control));
        }
    }

    let view = FormView::derive(snapshot);
    if let Some(submit) = &view.likely_submit {
        let _ = writeln!(
            out,
            "\nLikely submit: \"{}\" ({})",
            submit.text,
            if submit.is_enabled() {
                "enabled"
            } else {
                "disabled"
            }
        );
    }
    if !view.required_empty.is_empty() {
        let names: Vec<&str> = view
            .required_empty
            .iter()
            .map(|f| f.display_name())
            .collect();
        let _ = writeln!(out, "Required and empty: {}", names.join(", "));
    }

    out
}

fn control_line(control: &ControlInfo) -> String {
    format!(
        "[{}] \"{}\"",
        if control.is_enabled() { "x" } else { " " },
        control.text
    )
}

fn field_line(field: &FieldInfo) -> String {
    let mut flags = Vec::new();
    if field.required {
        flags.push("required");
    }
    if field.disabled {
        flags.push("disabled");
    }
    if field.readonly {
        flags.push("readonly");
    }
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" ({})", flags.join(", "))
    };
    let value = if field.is_empty() {
        "<empty>".to_string()
    } else {
        format!("\"{}\"", field.value)
    };
    format!("{}{}: {}", field.display_name(), flags, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use formpilot_types::BoundingBox;

    #[test]
    fn describe_lists_surface() {
        let snapshot = PageSnapshot {
            url: "https://app.test/campaigns/new".into(),
            title: Some("New campaign".into()),
            controls: vec![ControlInfo {
                selector: "#save".into(),
                text: "Save".into(),
                disabled: true,
                visible: true,
                role: None,
                bbox: BoundingBox::new(0.0, 0.0, 10.0, 10.0),
            }],
            fields: vec![FieldInfo {
                selector: "#name".into(),
                tag: "input".into(),
                label: Some("Campaign name".into()),
                required: true,
                visible: true,
                bbox: BoundingBox::new(0.0, 0.0, 10.0, 10.0),
                ..Default::default()
            }],
            alerts: vec![],
            modals: vec![],
            active_tab: None,
            page_text: String::new(),
            captured_at: Utc::now(),
        };
        let text = describe(&snapshot);
        assert!(text.contains("New campaign"));
        assert!(text.contains("[ ] \"Save\""));
        assert!(text.contains("Campaign name (required): <empty>"));
        assert!(text.contains("Likely submit: \"Save\" (disabled)"));
        assert!(text.contains("Required and empty: Campaign name"));
    }
}
