//! Goal description: what "done" means for one automation run.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::PageSnapshot;

/// How the goal names its target control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSpec {
    /// Match by visible text (case-insensitive, substring allowed).
    Text(String),
    /// Match by exact locating descriptor.
    Selector(String),
    /// Match by ARIA role plus accessible name.
    Role { role: String, name: String },
}

/// How a field instruction names its field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRef {
    /// Match against label/placeholder/aria text.
    Label(String),
    Selector(String),
}

/// The value to put into an instructed field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSpec {
    Literal(String),
    /// Let the classifier generate a per-run unique value for the field's
    /// inferred purpose.
    Generated,
}

/// One explicit field instruction supplied with the goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldInstruction {
    pub field: FieldRef,
    pub value: ValueSpec,
    /// Treat failure to fill this field as fatal.
    pub required: bool,
    /// Leave the field alone when it already holds a value.
    pub skip_if_filled: bool,
    /// Clear any existing value before writing.
    pub clear_before: bool,
}

impl FieldInstruction {
    pub fn literal(field: FieldRef, value: impl Into<String>) -> Self {
        Self {
            field,
            value: ValueSpec::Literal(value.into()),
            required: true,
            skip_if_filled: true,
            clear_before: false,
        }
    }

    pub fn generated(field: FieldRef) -> Self {
        Self {
            field,
            value: ValueSpec::Generated,
            required: true,
            skip_if_filled: true,
            clear_before: false,
        }
    }

    pub fn overwrite(mut self) -> Self {
        self.skip_if_filled = false;
        self.clear_before = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// Success condition checked before every decision.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessCondition {
    /// Current URL contains the substring.
    UrlContains(String),
    /// Current URL matches the regex pattern (compiled on check).
    UrlMatches(String),
    /// The page shows this text somewhere visible.
    TextVisible(String),
    /// Caller-supplied predicate over the latest snapshot. Never serialized;
    /// it only ever originates in caller code.
    #[serde(skip)]
    Predicate(Arc<dyn Fn(&PageSnapshot) -> bool + Send + Sync>),
}

impl SuccessCondition {
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&PageSnapshot) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    /// Evaluate against the current URL, page text, and snapshot.
    pub fn is_met(&self, url: &str, page_text: &str, snapshot: &PageSnapshot) -> bool {
        match self {
            Self::UrlContains(sub) => url.contains(sub.as_str()),
            Self::UrlMatches(pattern) => match regex::Regex::new(pattern) {
                Ok(re) => re.is_match(url),
                Err(_) => false,
            },
            Self::TextVisible(text) => page_text.contains(text.as_str()),
            Self::Predicate(f) => f(snapshot),
        }
    }
}

impl fmt::Debug for SuccessCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UrlContains(sub) => f.debug_tuple("UrlContains").field(sub).finish(),
            Self::UrlMatches(pattern) => f.debug_tuple("UrlMatches").field(pattern).finish(),
            Self::TextVisible(text) => f.debug_tuple("TextVisible").field(text).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Recognized per-run options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoalOptions {
    /// Hard ceiling on loop iterations.
    pub max_steps: Option<u32>,
    /// Pause between steps, milliseconds.
    pub step_delay_ms: Option<u64>,
    /// When true, only explicit field instructions are honored; the generic
    /// emptiness scan is disabled.
    pub strict_mode: bool,
}

/// The caller's description of one automation run.
///
/// Supplied once per run and read-only thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<SuccessCondition>,
    #[serde(default)]
    pub options: GoalOptions,
}

impl Goal {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: None,
            fields: Vec::new(),
            success: None,
            options: GoalOptions::default(),
        }
    }

    pub fn click_target(mut self, target: TargetSpec) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_field(mut self, instruction: FieldInstruction) -> Self {
        self.fields.push(instruction);
        self
    }

    pub fn with_success(mut self, condition: SuccessCondition) -> Self {
        self.success = Some(condition);
        self
    }

    pub fn strict(mut self) -> Self {
        self.options.strict_mode = true;
        self
    }

    pub fn max_steps(mut self, steps: u32) -> Self {
        self.options.max_steps = Some(steps);
        self
    }
}
