//! Classification output types.

use formpilot_types::FieldInfo;
use serde::{Deserialize, Serialize};

/// Closed set of interaction types. Decides which fallback chain the
/// executor runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Textarea,
    Dropdown,
    Combobox,
    Radio,
    Checkbox,
    Date,
    File,
    Number,
    Password,
}

impl FieldType {
    /// Short hint naming the interaction technique for this type.
    pub fn interaction_hint(&self) -> &'static str {
        match self {
            Self::Text | Self::Textarea => "click-clear-type-blur",
            Self::Dropdown => "native-select-or-option-click",
            Self::Combobox => "type-then-confirm-option",
            Self::Radio => "click-group-member",
            Self::Checkbox => "toggle",
            Self::Date => "direct-set-or-type",
            Self::File => "attach-path",
            Self::Number => "click-clear-type-blur",
            Self::Password => "click-clear-type-blur",
        }
    }
}

/// Closed set of semantic purposes, most specific business entities first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldPurpose {
    Channel,
    Campaign,
    AdGroup,
    Creative,
    Budget,
    Email,
    Url,
    Phone,
    Username,
    Password,
    Company,
    Search,
    Date,
    Amount,
    Description,
    Name,
    Unknown,
}

impl FieldPurpose {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Channel => "channel",
            Self::Campaign => "campaign",
            Self::AdGroup => "ad group",
            Self::Creative => "creative",
            Self::Budget => "budget",
            Self::Email => "email",
            Self::Url => "url",
            Self::Phone => "phone",
            Self::Username => "username",
            Self::Password => "password",
            Self::Company => "company",
            Self::Search => "search",
            Self::Date => "date",
            Self::Amount => "amount",
            Self::Description => "description",
            Self::Name => "name",
            Self::Unknown => "unknown",
        }
    }
}

/// A field annotated with inferred type, purpose, and confidence.
///
/// Derived per snapshot; holds its own copy of the `FieldInfo` it was
/// derived from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedField {
    pub field: FieldInfo,
    pub field_type: FieldType,
    pub purpose: FieldPurpose,
    /// In `[0, 1]`.
    pub confidence: f64,
    /// Default value to write when the goal supplies none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_value: Option<String>,
    pub hint: String,
}

impl ClassifiedField {
    pub fn selector(&self) -> &str {
        &self.field.selector
    }
}
