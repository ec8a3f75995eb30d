//! Snapshot assembly from raw driver descriptors.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use driver_bridge::{ElementNode, PageDriver};
use formpilot_types::{
    AlertInfo, AlertKind, ControlInfo, FieldInfo, ModalInfo, PageSnapshot,
};
use tracing::debug;

use crate::PerceiverError;

/// Input types that render as activatable controls rather than fields.
const BUTTON_INPUT_TYPES: &[&str] = &["submit", "button", "reset", "image"];

/// Reads the live surface and produces immutable snapshots.
pub struct SurfacePerceiver {
    driver: Arc<dyn PageDriver>,
}

impl SurfacePerceiver {
    pub fn new(driver: Arc<dyn PageDriver>) -> Self {
        Self { driver }
    }

    /// Capture the current surface.
    ///
    /// Tolerates partially-rendered pages: any element whose bounding box
    /// has zero width or height is excluded, as is anything the driver
    /// reports invisible. Controls sharing an identical (text, aria-label)
    /// pair are deduplicated, keeping the first.
    pub async fn capture(&self) -> Result<PageSnapshot, PerceiverError> {
        let elements = self.driver.snapshot_elements().await?;
        let url = self.driver.current_url().await?;
        let title = self.driver.title().await.ok().filter(|t| !t.is_empty());
        let page_text = self.driver.page_text().await.unwrap_or_default();

        let mut controls = Vec::new();
        let mut fields = Vec::new();
        let mut alerts = Vec::new();
        let mut modals: Vec<ModalInfo> = Vec::new();
        let mut active_tab = None;
        let mut seen_controls: HashSet<(String, String)> = HashSet::new();

        for element in &elements {
            if !element.visible || element.bbox.is_zero() {
                continue;
            }

            if let Some(alert) = as_alert(element) {
                alerts.push(alert);
                continue;
            }

            if element.role.as_deref() == Some("tab")
                && element.attribute("aria-selected") == Some("true")
            {
                active_tab = Some(element.text.clone());
                continue;
            }

            if is_control(element) {
                let key = (
                    element.text.trim().to_lowercase(),
                    element
                        .aria_label
                        .as_deref()
                        .unwrap_or("")
                        .trim()
                        .to_lowercase(),
                );
                if !seen_controls.insert(key) {
                    continue;
                }
                let control = to_control(element);
                match &element.dialog_id {
                    Some(dialog_id) => {
                        modal_for(&mut modals, dialog_id, element).controls.push(control)
                    }
                    None => controls.push(control),
                }
                continue;
            }

            if is_field(element) {
                let field = to_field(element);
                match &element.dialog_id {
                    Some(dialog_id) => {
                        modal_for(&mut modals, dialog_id, element).fields.push(field)
                    }
                    None => fields.push(field),
                }
            }
        }

        debug!(
            controls = controls.len(),
            fields = fields.len(),
            alerts = alerts.len(),
            modals = modals.len(),
            "captured page surface"
        );

        Ok(PageSnapshot {
            url,
            title,
            controls,
            fields,
            alerts,
            modals,
            active_tab,
            page_text,
            captured_at: Utc::now(),
        })
    }
}

/// Find or start the modal group for a dialog id.
fn modal_for<'a>(
    modals: &'a mut Vec<ModalInfo>,
    dialog_id: &str,
    element: &ElementNode,
) -> &'a mut ModalInfo {
    let selector = format!("[data-dialog='{dialog_id}']");
    if let Some(index) = modals.iter().position(|m| m.selector == selector) {
        return &mut modals[index];
    }
    modals.push(ModalInfo {
        selector,
        title: element.dialog_title.clone(),
        fields: Vec::new(),
        controls: Vec::new(),
    });
    modals.last_mut().expect("just pushed")
}

fn is_control(element: &ElementNode) -> bool {
    if element.tag == "button" {
        return true;
    }
    if element.role.as_deref() == Some("button") {
        return true;
    }
    element.tag == "input"
        && element
            .input_type
            .as_deref()
            .map(|t| BUTTON_INPUT_TYPES.contains(&t))
            .unwrap_or(false)
}

fn is_field(element: &ElementNode) -> bool {
    match element.tag.as_str() {
        "select" | "textarea" => true,
        "input" => true,
        _ => matches!(
            element.role.as_deref(),
            Some("textbox") | Some("combobox") | Some("listbox") | Some("searchbox")
                | Some("checkbox") | Some("radio") | Some("spinbutton")
        ),
    }
}

fn as_alert(element: &ElementNode) -> Option<AlertInfo> {
    let role = element.role.as_deref().unwrap_or("");
    let class = element.attribute("class").unwrap_or("");
    let is_alert = role == "alert" || role == "status" || class.contains("alert");
    if !is_alert || element.text.trim().is_empty() {
        return None;
    }
    let haystack = format!("{role} {class}").to_lowercase();
    let kind = if haystack.contains("error") || haystack.contains("danger") || role == "alert" {
        AlertKind::Error
    } else if haystack.contains("warn") {
        AlertKind::Warning
    } else if haystack.contains("success") {
        AlertKind::Success
    } else {
        AlertKind::Info
    };
    Some(AlertInfo {
        kind,
        message: element.text.trim().to_string(),
    })
}

fn to_control(element: &ElementNode) -> ControlInfo {
    let text = if element.text.trim().is_empty() {
        // Input-style buttons carry their caption in `value`.
        element.value.trim().to_string()
    } else {
        element.text.trim().to_string()
    };
    ControlInfo {
        selector: element.selector.clone(),
        text,
        disabled: element.disabled,
        visible: element.visible,
        role: element.role.clone(),
        bbox: element.bbox,
    }
}

fn to_field(element: &ElementNode) -> FieldInfo {
    FieldInfo {
        selector: element.selector.clone(),
        tag: element.tag.clone(),
        role: element.role.clone(),
        input_type: element.input_type.clone(),
        label: element.label.clone(),
        placeholder: element.placeholder.clone(),
        aria_label: element.aria_label.clone(),
        name_attr: element.name_attr.clone(),
        section: element.section.clone(),
        required: element.required,
        disabled: element.disabled,
        readonly: element.readonly,
        visible: element.visible,
        value: element.value.clone(),
        checked: element.checked,
        has_dropdown_indicator: element.has_dropdown_indicator,
        has_autocomplete: element.has_autocomplete,
        listbox_ref: element.listbox_ref.clone(),
        options: element.options.clone(),
        bbox: element.bbox,
    }
}
