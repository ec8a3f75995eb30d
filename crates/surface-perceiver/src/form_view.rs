//! Derived, best-effort logical-form view.
//!
//! Bespoke UI frameworks frequently skip native form elements, so grouping
//! is computed from label keyword heuristics instead of DOM form
//! boundaries.

use formpilot_types::{ControlInfo, FieldInfo, PageSnapshot};
use serde::Serialize;

/// Submit-like keywords, most indicative first. The first keyword with any
/// matching control decides.
const SUBMIT_KEYWORDS: &[&str] = &[
    "save", "create", "confirm", "complete", "submit", "done", "continue", "next",
];

/// Best-effort logical form derived from one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    /// Visible required fields currently holding no value.
    pub required_empty: Vec<FieldInfo>,
    /// The control most likely to submit this surface.
    pub likely_submit: Option<ControlInfo>,
}

impl FormView {
    /// Derive the form view from a snapshot. Pure; does not touch the page.
    pub fn derive(snapshot: &PageSnapshot) -> Self {
        let required_empty = snapshot
            .empty_required_fields()
            .into_iter()
            .cloned()
            .collect();
        Self {
            required_empty,
            likely_submit: likely_submit(&snapshot.controls).cloned(),
        }
    }

    /// Whether everything required looks filled and the submit control is
    /// ready.
    pub fn is_submittable(&self) -> bool {
        self.required_empty.is_empty()
            && self
                .likely_submit
                .as_ref()
                .map(|c| c.is_enabled())
                .unwrap_or(false)
    }
}

fn likely_submit(controls: &[ControlInfo]) -> Option<&ControlInfo> {
    for keyword in SUBMIT_KEYWORDS {
        let mut candidates = controls
            .iter()
            .filter(|c| c.visible && c.text.to_lowercase().contains(keyword));
        // An enabled match beats a disabled one for the same keyword.
        let first = candidates.clone().find(|c| !c.disabled);
        if let Some(control) = first.or_else(|| candidates.next()) {
            return Some(control);
        }
    }
    None
}
