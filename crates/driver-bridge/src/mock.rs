//! In-memory `PageDriver` double.
//!
//! Models a page as a flat element list plus a little reactive machinery:
//! scriptable click handlers, enable-rules (a control enables once its
//! required fields hold values), dialog stacking, combobox listboxes, and
//! the mutation/network counters the adaptive waits poll.

use std::collections::BTreeMap;
use std::collections::HashMap;

use async_trait::async_trait;
use formpilot_types::BoundingBox;
use parking_lot::Mutex;
use tokio::time::{sleep, Duration};

use crate::{DriverError, ElementNode, ElementState, Key, OptionEntry, OptionMatch, PageDriver};

/// When an enable-rule is re-evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnableTrigger {
    /// After any value change.
    Change,
    /// Only after the changed field loses focus.
    Blur,
}

/// Enables `control` once every selector in `requires_filled` holds a
/// non-empty value (or is checked); disables it again otherwise.
#[derive(Debug, Clone)]
pub struct EnableRule {
    pub control: String,
    pub requires_filled: Vec<String>,
    pub on: EnableTrigger,
}

/// Mutable page model handed to click handlers.
pub struct MockPage {
    pub elements: Vec<ElementNode>,
    pub url: String,
    pub title: String,
    pub focused: Option<String>,
    pub dialog_stack: Vec<String>,
    pub mutations: u64,
    pub inflight: u32,
    /// Combobox whose listbox is currently open.
    pub open_listbox: Option<String>,
    /// Keyboard highlight index within the open listbox.
    pub highlight: Option<usize>,
}

impl MockPage {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            elements: Vec::new(),
            url: url.into(),
            title: title.into(),
            focused: None,
            dialog_stack: Vec::new(),
            mutations: 0,
            inflight: 0,
            open_listbox: None,
            highlight: None,
        }
    }

    pub fn with_elements(mut self, elements: Vec<ElementNode>) -> Self {
        self.elements = elements;
        self
    }

    pub fn element(&self, selector: &str) -> Option<&ElementNode> {
        self.elements.iter().find(|e| selector_matches(e, selector))
    }

    pub fn element_mut(&mut self, selector: &str) -> Option<&mut ElementNode> {
        self.elements
            .iter_mut()
            .find(|e| selector_matches(e, selector))
    }

    pub fn add_element(&mut self, element: ElementNode) {
        self.elements.push(element);
        self.mutations += 1;
    }

    /// Make the elements of a dialog visible and push it onto the stack.
    pub fn show_dialog(&mut self, dialog_id: &str) {
        for element in &mut self.elements {
            if element.dialog_id.as_deref() == Some(dialog_id) {
                element.visible = true;
            }
        }
        self.dialog_stack.push(dialog_id.to_string());
        self.mutations += 1;
    }

    /// Hide the topmost dialog's elements and pop it.
    pub fn close_top_dialog(&mut self) {
        if let Some(dialog_id) = self.dialog_stack.pop() {
            for element in &mut self.elements {
                if element.dialog_id.as_deref() == Some(dialog_id.as_str()) {
                    element.visible = false;
                }
            }
            self.mutations += 1;
        }
    }

    pub fn navigate(&mut self, url: impl Into<String>) {
        self.url = url.into();
        self.focused = None;
        self.open_listbox = None;
        self.highlight = None;
        self.mutations += 3;
    }

    pub(crate) fn matches(&self, selector: &str) -> usize {
        self.elements
            .iter()
            .filter(|e| selector_matches(e, selector))
            .count()
    }

    fn is_filled(&self, selector: &str) -> bool {
        match self.element(selector) {
            Some(el) => {
                if el.checked.is_some() {
                    el.checked == Some(true)
                } else {
                    !el.value.trim().is_empty()
                }
            }
            None => false,
        }
    }
}

/// Selector forms a real driver resolves: exact descriptor, `text:<content>`
/// (visible text or label, case-insensitive substring), and the attribute
/// shorthands the locator emits.
fn selector_matches(el: &ElementNode, selector: &str) -> bool {
    if el.selector == selector {
        return true;
    }
    if let Some(text) = selector.strip_prefix("text:") {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return false;
        }
        return el.visible
            && (el.text.to_lowercase().contains(&needle)
                || el
                    .label
                    .as_deref()
                    .map(|l| l.to_lowercase().contains(&needle))
                    .unwrap_or(false));
    }
    if let Some(name) = attr_shorthand(selector, "name") {
        return el.name_attr.as_deref() == Some(name);
    }
    if let Some(label) = attr_shorthand(selector, "aria-label") {
        return el.aria_label.as_deref() == Some(label);
    }
    if let Some(test_id) = attr_shorthand(selector, "data-testid") {
        return el.attribute("data-testid") == Some(test_id);
    }
    false
}

fn attr_shorthand<'a>(selector: &'a str, attr: &str) -> Option<&'a str> {
    selector
        .strip_prefix(&format!("[{attr}='"))
        .and_then(|rest| rest.strip_suffix("']"))
}

type ClickHandler = Box<dyn FnMut(&mut MockPage) + Send>;

struct Inner {
    page: MockPage,
    click_handlers: HashMap<String, ClickHandler>,
    enable_rules: Vec<EnableRule>,
}

/// In-memory driver double.
pub struct MockDriver {
    inner: Mutex<Inner>,
}

impl MockDriver {
    pub fn new(page: MockPage) -> Self {
        Self {
            inner: Mutex::new(Inner {
                page,
                click_handlers: HashMap::new(),
                enable_rules: Vec::new(),
            }),
        }
    }

    /// Register a handler run when `selector` is clicked.
    pub fn on_click<F>(&self, selector: &str, handler: F)
    where
        F: FnMut(&mut MockPage) + Send + 'static,
    {
        self.inner
            .lock()
            .click_handlers
            .insert(selector.to_string(), Box::new(handler));
    }

    pub fn add_enable_rule(&self, rule: EnableRule) {
        let mut inner = self.inner.lock();
        rule_pass(&mut inner.page, &[rule.clone()], None);
        inner.enable_rules.push(rule);
    }

    /// Mutate the page model directly (test setup).
    pub fn update<F: FnOnce(&mut MockPage)>(&self, f: F) {
        let mut inner = self.inner.lock();
        f(&mut inner.page);
    }

    /// Read the page model (test assertions).
    pub fn inspect<T>(&self, f: impl FnOnce(&MockPage) -> T) -> T {
        let inner = self.inner.lock();
        f(&inner.page)
    }

    fn check_interactable(page: &MockPage, selector: &str) -> Result<(), DriverError> {
        let el = page
            .element(selector)
            .ok_or_else(|| DriverError::NotFound(selector.to_string()))?;
        if !el.visible || el.bbox.is_zero() {
            return Err(DriverError::NotVisible(selector.to_string()));
        }
        if el.disabled {
            return Err(DriverError::NotInteractable(format!(
                "{selector} is disabled"
            )));
        }
        Ok(())
    }

    /// Commit a synthesized option selector (`<field>::option:<i>` or
    /// `<field>::create`) produced by `list_options`.
    fn click_option(inner: &mut Inner, selector: &str) -> Option<Result<(), DriverError>> {
        let (field_selector, suffix) = selector.split_once("::")?;
        let field_selector = field_selector.to_string();
        if suffix == "create" {
            let typed = inner.page.element(&field_selector)?.value.clone();
            if let Some(field) = inner.page.element_mut(&field_selector) {
                if !field.options.contains(&typed) {
                    field.options.push(typed.clone());
                }
                field.value = typed;
            }
            inner.page.open_listbox = None;
            inner.page.highlight = None;
            inner.page.mutations += 2;
            apply_rules(inner, EnableTrigger::Change);
            return Some(Ok(()));
        }
        let index: usize = suffix.strip_prefix("option:")?.parse().ok()?;
        let label = match inner.page.element(&field_selector) {
            Some(field) => field.options.get(index).cloned(),
            None => None,
        };
        let Some(label) = label else {
            return Some(Err(DriverError::NotFound(selector.to_string())));
        };
        if let Some(field) = inner.page.element_mut(&field_selector) {
            field.value = label;
        }
        inner.page.open_listbox = None;
        inner.page.highlight = None;
        inner.page.mutations += 1;
        apply_rules(inner, EnableTrigger::Change);
        Some(Ok(()))
    }
}

/// Re-evaluate enable rules for the given trigger (plus Change rules, which
/// always apply).
fn apply_rules(inner: &mut Inner, trigger: EnableTrigger) {
    let rules = inner.enable_rules.clone();
    rule_pass(&mut inner.page, &rules, Some(trigger));
}

fn rule_pass(page: &mut MockPage, rules: &[EnableRule], trigger: Option<EnableTrigger>) {
    for rule in rules {
        if let Some(trigger) = trigger {
            let applies = rule.on == EnableTrigger::Change || rule.on == trigger;
            if !applies {
                continue;
            }
        }
        let satisfied = rule.requires_filled.iter().all(|sel| page.is_filled(sel));
        if let Some(control) = page.element_mut(&rule.control) {
            let was = control.disabled;
            control.disabled = !satisfied;
            if was != control.disabled {
                page.mutations += 1;
            }
        }
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn snapshot_elements(&self) -> Result<Vec<ElementNode>, DriverError> {
        Ok(self.inner.lock().page.elements.clone())
    }

    async fn count_matches(&self, selector: &str) -> Result<usize, DriverError> {
        let inner = self.inner.lock();
        Ok(inner.page.matches(selector))
    }

    async fn element_state(&self, selector: &str) -> Result<ElementState, DriverError> {
        let inner = self.inner.lock();
        Ok(match inner.page.element(selector) {
            Some(el) => ElementState {
                exists: true,
                visible: el.visible,
                enabled: !el.disabled,
                bbox: el.bbox,
            },
            None => ElementState::default(),
        })
    }

    async fn click(&self, selector: &str) -> Result<(), DriverError> {
        let mut inner = self.inner.lock();
        if let Some(result) = Self::click_option(&mut inner, selector) {
            return result;
        }

        Self::check_interactable(&inner.page, selector)?;
        inner.page.focused = Some(selector.to_string());

        let (is_radio, is_checkbox, group) = {
            let el = inner.page.element(selector).expect("checked above");
            let input_type = el.input_type.as_deref().unwrap_or("");
            (
                input_type == "radio",
                input_type == "checkbox",
                el.name_attr.clone(),
            )
        };
        if is_radio {
            for el in &mut inner.page.elements {
                if el.input_type.as_deref() == Some("radio") && el.name_attr == group {
                    el.checked = Some(el.selector == selector);
                }
            }
        } else if is_checkbox {
            if let Some(el) = inner.page.element_mut(selector) {
                el.checked = Some(!el.checked.unwrap_or(false));
            }
        }

        if let Some(mut handler) = inner.click_handlers.remove(selector) {
            handler(&mut inner.page);
            inner.click_handlers.insert(selector.to_string(), handler);
        }

        inner.page.mutations += 1;
        apply_rules(&mut inner, EnableTrigger::Change);
        Ok(())
    }

    async fn focus(&self, selector: &str) -> Result<(), DriverError> {
        let mut inner = self.inner.lock();
        Self::check_interactable(&inner.page, selector)?;
        inner.page.focused = Some(selector.to_string());
        let opens_listbox = inner
            .page
            .element(selector)
            .map(|el| el.has_autocomplete || el.has_dropdown_indicator)
            .unwrap_or(false);
        if opens_listbox {
            inner.page.open_listbox = Some(selector.to_string());
        }
        Ok(())
    }

    async fn blur(&self, selector: &str) -> Result<(), DriverError> {
        let mut inner = self.inner.lock();
        if inner.page.focused.as_deref() == Some(selector) {
            inner.page.focused = None;
        }
        inner.page.open_listbox = None;
        inner.page.highlight = None;
        inner.page.mutations += 1;
        apply_rules(&mut inner, EnableTrigger::Blur);
        Ok(())
    }

    async fn clear(&self, selector: &str) -> Result<(), DriverError> {
        let mut inner = self.inner.lock();
        Self::check_interactable(&inner.page, selector)?;
        if let Some(el) = inner.page.element_mut(selector) {
            if el.readonly {
                return Err(DriverError::NotInteractable(format!(
                    "{selector} is readonly"
                )));
            }
            el.value.clear();
        }
        inner.page.mutations += 1;
        apply_rules(&mut inner, EnableTrigger::Change);
        Ok(())
    }

    async fn type_text(
        &self,
        selector: &str,
        text: &str,
        delay_ms: u64,
    ) -> Result<(), DriverError> {
        if delay_ms > 0 {
            sleep(Duration::from_millis(delay_ms)).await;
        }
        let mut inner = self.inner.lock();
        Self::check_interactable(&inner.page, selector)?;
        inner.page.focused = Some(selector.to_string());
        let mut opened = None;
        if let Some(el) = inner.page.element_mut(selector) {
            if el.readonly {
                return Err(DriverError::NotInteractable(format!(
                    "{selector} is readonly"
                )));
            }
            el.value.push_str(text);
            if el.has_autocomplete {
                opened = Some(selector.to_string());
            }
        }
        if opened.is_some() {
            inner.page.open_listbox = opened;
        }
        inner.page.mutations += 1;
        apply_rules(&mut inner, EnableTrigger::Change);
        Ok(())
    }

    async fn press_key(&self, key: Key) -> Result<(), DriverError> {
        let mut inner = self.inner.lock();
        match key {
            Key::Tab => {
                inner.page.focused = None;
                inner.page.open_listbox = None;
                inner.page.highlight = None;
                inner.page.mutations += 1;
                apply_rules(&mut inner, EnableTrigger::Blur);
            }
            Key::Escape => {
                if inner.page.open_listbox.take().is_some() {
                    inner.page.highlight = None;
                    inner.page.mutations += 1;
                } else if !inner.page.dialog_stack.is_empty() {
                    inner.page.close_top_dialog();
                }
            }
            Key::Enter => {
                let target = inner.page.open_listbox.clone();
                if let Some(field_selector) = target {
                    let highlight = inner.page.highlight;
                    let committed = {
                        let el = inner
                            .page
                            .element(&field_selector)
                            .ok_or_else(|| DriverError::Detached(field_selector.clone()))?;
                        let allow_create = el.attribute("allow-create") == Some("true");
                        match highlight {
                            Some(index) => el.options.get(index).cloned(),
                            None => {
                                let typed = el.value.clone();
                                if el.options.contains(&typed)
                                    || (allow_create && !typed.trim().is_empty())
                                {
                                    Some(typed)
                                } else {
                                    // Uncommitted free text is dropped.
                                    None
                                }
                            }
                        }
                    };
                    if let Some(el) = inner.page.element_mut(&field_selector) {
                        match committed {
                            Some(value) => {
                                if !el.options.contains(&value) {
                                    el.options.push(value.clone());
                                }
                                el.value = value;
                            }
                            None => el.value.clear(),
                        }
                    }
                    inner.page.open_listbox = None;
                    inner.page.highlight = None;
                    inner.page.mutations += 1;
                    apply_rules(&mut inner, EnableTrigger::Change);
                }
            }
            Key::ArrowDown | Key::ArrowUp => {
                let open = inner.page.open_listbox.clone();
                if let Some(field_selector) = open {
                    let count = inner
                        .page
                        .element(&field_selector)
                        .map(|el| el.options.len())
                        .unwrap_or(0);
                    if count > 0 {
                        let current = inner.page.highlight;
                        inner.page.highlight = Some(match (key, current) {
                            (Key::ArrowDown, None) => 0,
                            (Key::ArrowDown, Some(i)) => (i + 1).min(count - 1),
                            (Key::ArrowUp, None) => 0,
                            (Key::ArrowUp, Some(i)) => i.saturating_sub(1),
                            _ => 0,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    async fn set_value(&self, selector: &str, value: &str) -> Result<(), DriverError> {
        let mut inner = self.inner.lock();
        {
            let el = inner
                .page
                .element_mut(selector)
                .ok_or_else(|| DriverError::NotFound(selector.to_string()))?;
            if el.disabled {
                return Err(DriverError::NotInteractable(format!(
                    "{selector} is disabled"
                )));
            }
            el.value = value.to_string();
        }
        inner.page.mutations += 1;
        apply_rules(&mut inner, EnableTrigger::Change);
        Ok(())
    }

    async fn read_value(&self, selector: &str) -> Result<Option<String>, DriverError> {
        let inner = self.inner.lock();
        Ok(inner.page.element(selector).map(|el| el.value.clone()))
    }

    async fn read_checked(&self, selector: &str) -> Result<Option<bool>, DriverError> {
        let inner = self.inner.lock();
        Ok(inner.page.element(selector).and_then(|el| el.checked))
    }

    async fn select_option(
        &self,
        selector: &str,
        _matcher: OptionMatch,
        target: &str,
    ) -> Result<(), DriverError> {
        let mut inner = self.inner.lock();
        {
            let el = inner
                .page
                .element(selector)
                .ok_or_else(|| DriverError::NotFound(selector.to_string()))?;
            if el.tag != "select" {
                return Err(DriverError::NotInteractable(format!(
                    "{selector} is not a native select"
                )));
            }
            if !el.options.iter().any(|o| o == target) {
                return Err(DriverError::NotFound(format!(
                    "option '{target}' not found in {selector}"
                )));
            }
        }
        if let Some(el) = inner.page.element_mut(selector) {
            el.value = target.to_string();
        }
        inner.page.mutations += 1;
        apply_rules(&mut inner, EnableTrigger::Change);
        Ok(())
    }

    async fn list_options(&self, selector: &str) -> Result<Vec<OptionEntry>, DriverError> {
        let inner = self.inner.lock();
        let el = inner
            .page
            .element(selector)
            .ok_or_else(|| DriverError::NotFound(selector.to_string()))?;
        let mut entries: Vec<OptionEntry> = el
            .options
            .iter()
            .enumerate()
            .map(|(i, label)| OptionEntry {
                selector: format!("{selector}::option:{i}"),
                label: label.clone(),
                value: Some(label.clone()),
                is_create_affordance: false,
            })
            .collect();
        if el.attribute("allow-create") == Some("true") {
            entries.push(OptionEntry {
                selector: format!("{selector}::create"),
                label: format!("Create \"{}\"", el.value),
                value: None,
                is_create_affordance: true,
            });
        }
        Ok(entries)
    }

    async fn set_files(&self, selector: &str, paths: &[String]) -> Result<(), DriverError> {
        let mut inner = self.inner.lock();
        {
            let el = inner
                .page
                .element_mut(selector)
                .ok_or_else(|| DriverError::NotFound(selector.to_string()))?;
            if el.input_type.as_deref() != Some("file") {
                return Err(DriverError::NotInteractable(format!(
                    "{selector} is not a file input"
                )));
            }
            el.value = paths.join(";");
        }
        inner.page.mutations += 1;
        apply_rules(&mut inner, EnableTrigger::Change);
        Ok(())
    }

    async fn scroll_into_view(&self, selector: &str) -> Result<(), DriverError> {
        let mut inner = self.inner.lock();
        let el = inner
            .page
            .element_mut(selector)
            .ok_or_else(|| DriverError::NotFound(selector.to_string()))?;
        // Scrolling brings lazily-rendered elements into the viewport.
        if el.bbox.is_zero() {
            el.bbox = BoundingBox::new(0.0, 0.0, 120.0, 24.0);
            el.visible = true;
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        Ok(self.inner.lock().page.url.clone())
    }

    async fn title(&self) -> Result<String, DriverError> {
        Ok(self.inner.lock().page.title.clone())
    }

    async fn page_text(&self) -> Result<String, DriverError> {
        let inner = self.inner.lock();
        let mut parts: Vec<String> = vec![inner.page.title.clone()];
        for el in &inner.page.elements {
            if !el.visible {
                continue;
            }
            if !el.text.is_empty() {
                parts.push(el.text.clone());
            }
            if let Some(label) = &el.label {
                parts.push(label.clone());
            }
        }
        Ok(parts.join(" "))
    }

    async fn dom_mutation_count(&self) -> Result<u64, DriverError> {
        Ok(self.inner.lock().page.mutations)
    }

    async fn inflight_request_count(&self) -> Result<u32, DriverError> {
        Ok(self.inner.lock().page.inflight)
    }

    async fn refresh(&self) -> Result<(), DriverError> {
        let mut inner = self.inner.lock();
        inner.page.focused = None;
        inner.page.open_listbox = None;
        inner.page.highlight = None;
        while !inner.page.dialog_stack.is_empty() {
            inner.page.close_top_dialog();
        }
        inner.page.inflight = 0;
        inner.page.mutations += 5;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Element constructors for tests and the demo form.

fn base_element(selector: &str, tag: &str) -> ElementNode {
    ElementNode {
        selector: selector.to_string(),
        tag: tag.to_string(),
        visible: true,
        bbox: BoundingBox::new(0.0, 0.0, 160.0, 28.0),
        attributes: BTreeMap::new(),
        ..Default::default()
    }
}

/// Visible text input with a label.
pub fn text_input(selector: &str, label: &str) -> ElementNode {
    let mut el = base_element(selector, "input");
    el.input_type = Some("text".into());
    el.label = Some(label.to_string());
    el
}

/// Required variant of [`text_input`].
pub fn required_text_input(selector: &str, label: &str) -> ElementNode {
    let mut el = text_input(selector, label);
    el.required = true;
    el
}

/// Visible button with text.
pub fn button(selector: &str, text: &str) -> ElementNode {
    let mut el = base_element(selector, "button");
    el.text = text.to_string();
    el.role = Some("button".into());
    el
}

/// Disabled variant of [`button`].
pub fn disabled_button(selector: &str, text: &str) -> ElementNode {
    let mut el = button(selector, text);
    el.disabled = true;
    el
}

/// Combobox input with an autocomplete listbox.
pub fn combobox(selector: &str, label: &str, options: &[&str], allow_create: bool) -> ElementNode {
    let mut el = base_element(selector, "input");
    el.input_type = Some("text".into());
    el.label = Some(label.to_string());
    el.role = Some("combobox".into());
    el.has_dropdown_indicator = true;
    el.has_autocomplete = true;
    el.listbox_ref = Some(format!("{selector}-listbox"));
    el.options = options.iter().map(|s| s.to_string()).collect();
    if allow_create {
        el.attributes
            .insert("allow-create".into(), "true".into());
    }
    el
}

/// Native select element.
pub fn native_select(selector: &str, label: &str, options: &[&str]) -> ElementNode {
    let mut el = base_element(selector, "select");
    el.label = Some(label.to_string());
    el.options = options.iter().map(|s| s.to_string()).collect();
    el
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver() -> MockDriver {
        let page = MockPage::new("https://app.test/form", "Test form").with_elements(vec![
            required_text_input("#name", "Name"),
            disabled_button("#save", "Save"),
        ]);
        let driver = MockDriver::new(page);
        driver.add_enable_rule(EnableRule {
            control: "#save".into(),
            requires_filled: vec!["#name".into()],
            on: EnableTrigger::Change,
        });
        driver
    }

    #[tokio::test]
    async fn typing_fills_and_enables() {
        let driver = driver();
        driver.type_text("#name", "hello", 0).await.unwrap();
        assert_eq!(
            driver.read_value("#name").await.unwrap(),
            Some("hello".into())
        );
        let state = driver.element_state("#save").await.unwrap();
        assert!(state.enabled);
    }

    #[tokio::test]
    async fn clicking_disabled_button_fails() {
        let driver = driver();
        let err = driver.click("#save").await.unwrap_err();
        assert!(matches!(err, DriverError::NotInteractable(_)));
    }

    #[tokio::test]
    async fn combobox_enter_drops_unknown_value() {
        let page = MockPage::new("https://app.test", "t")
            .with_elements(vec![combobox("#channel", "Channel", &["Email"], false)]);
        let driver = MockDriver::new(page);
        driver.type_text("#channel", "Carrier pigeon", 0).await.unwrap();
        driver.press_key(Key::Enter).await.unwrap();
        assert_eq!(
            driver.read_value("#channel").await.unwrap(),
            Some(String::new())
        );
    }

    #[tokio::test]
    async fn combobox_create_affordance_commits() {
        let page = MockPage::new("https://app.test", "t")
            .with_elements(vec![combobox("#channel", "Channel", &["Email"], true)]);
        let driver = MockDriver::new(page);
        driver.type_text("#channel", "Push", 0).await.unwrap();
        let options = driver.list_options("#channel").await.unwrap();
        let create = options.iter().find(|o| o.is_create_affordance).unwrap();
        driver.click(&create.selector).await.unwrap();
        assert_eq!(driver.read_value("#channel").await.unwrap(), Some("Push".into()));
    }

    #[tokio::test]
    async fn escape_closes_dialog() {
        let mut confirm = button("#confirm", "Confirm");
        confirm.dialog_id = Some("dlg".into());
        confirm.visible = false;
        let page = MockPage::new("https://app.test", "t").with_elements(vec![confirm]);
        let driver = MockDriver::new(page);
        driver.update(|p| p.show_dialog("dlg"));
        assert!(driver.inspect(|p| p.element("#confirm").unwrap().visible));
        driver.press_key(Key::Escape).await.unwrap();
        assert!(!driver.inspect(|p| p.element("#confirm").unwrap().visible));
    }

    #[tokio::test]
    async fn radio_click_moves_checked_within_group() {
        let mut a = base_element("#r-a", "input");
        a.input_type = Some("radio".into());
        a.name_attr = Some("plan".into());
        a.checked = Some(true);
        let mut b = base_element("#r-b", "input");
        b.input_type = Some("radio".into());
        b.name_attr = Some("plan".into());
        b.checked = Some(false);
        let page = MockPage::new("https://app.test", "t").with_elements(vec![a, b]);
        let driver = MockDriver::new(page);
        driver.click("#r-b").await.unwrap();
        assert_eq!(driver.read_checked("#r-a").await.unwrap(), Some(false));
        assert_eq!(driver.read_checked("#r-b").await.unwrap(), Some(true));
    }
}
